//! Scoped publish/subscribe for route lifecycle events.
//!
//! A channel holds named listener lists. Broadcasts run listeners in
//! registration order, survive listener panics, and honor unsubscribes made
//! while the broadcast is running. Channels are cheap shared handles; every
//! clone addresses the same listener table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::response::Response;

/// Broadcast on the global channel before a location change is applied.
/// Cancelable via [`RouteEvent::prevent_default`].
pub const ROUTE_CHANGE_START: &str = "routeChangeStart";

/// Broadcast on the global channel after a new response became current.
pub const ROUTE_CHANGE_SUCCESS: &str = "routeChangeSuccess";

/// Broadcast on the global channel when a load fails with no error view to
/// fall back to. The shown view is left untouched.
pub const ROUTE_CHANGE_ERROR: &str = "routeChangeError";

/// Broadcast on the current response when it is refreshed in place.
pub const ROUTE_UPDATE: &str = "routeUpdate";

type Listener = Arc<dyn Fn(&mut RouteEvent, &EventPayload) + Send + Sync>;

struct ListenerSlot {
	callback: Listener,
	alive: AtomicBool,
}

/// Handle returned by [`EventChannel::on`].
///
/// Dropping the handle keeps the listener subscribed; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription {
	slot: Weak<ListenerSlot>,
}

impl Subscription {
	/// Marks the listener dead. It is skipped from now on and its slot is
	/// spliced out during the next broadcast of its event.
	pub fn unsubscribe(&self) {
		if let Some(slot) = self.slot.upgrade() {
			slot.alive.store(false, Ordering::Release);
		}
	}
}

/// Event object passed to listeners during a broadcast.
#[derive(Debug)]
pub struct RouteEvent {
	name: String,
	default_prevented: bool,
}

impl RouteEvent {
	fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			default_prevented: false,
		}
	}

	/// Name the event was broadcast under.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Asks the broadcaster to abort the action this event announces.
	/// Only meaningful for cancelable events such as `routeChangeStart`.
	pub fn prevent_default(&mut self) {
		self.default_prevented = true;
	}

	/// Whether any listener called [`prevent_default`](Self::prevent_default).
	pub fn default_prevented(&self) -> bool {
		self.default_prevented
	}
}

/// Payload carried by a broadcast.
#[derive(Debug, Clone, Default)]
pub enum EventPayload {
	/// No payload.
	#[default]
	None,
	/// Freshly loaded response (`routeChangeSuccess`, `routeUpdate`).
	Response(Arc<Response>),
	/// Failure response (`routeChangeError`).
	Failure(Arc<Response>),
	/// Target location (`routeChangeStart`).
	Location(String),
}

impl EventPayload {
	/// The carried response, success or failure.
	pub fn response(&self) -> Option<&Response> {
		match self {
			Self::Response(response) | Self::Failure(response) => Some(response),
			_ => None,
		}
	}

	/// The carried location, if any.
	pub fn location(&self) -> Option<&str> {
		match self {
			Self::Location(url) => Some(url),
			_ => None,
		}
	}
}

/// Minimal named-event channel.
#[derive(Clone, Default)]
pub struct EventChannel {
	listeners: Arc<Mutex<HashMap<String, Vec<Arc<ListenerSlot>>>>>,
}

impl EventChannel {
	/// Creates a channel with no listeners.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `listener` under `name`, after any existing listeners.
	pub fn on<F>(&self, name: &str, listener: F) -> Subscription
	where
		F: Fn(&mut RouteEvent, &EventPayload) + Send + Sync + 'static,
	{
		let slot = Arc::new(ListenerSlot {
			callback: Arc::new(listener),
			alive: AtomicBool::new(true),
		});
		let subscription = Subscription {
			slot: Arc::downgrade(&slot),
		};
		self.listeners
			.lock()
			.entry(name.to_string())
			.or_default()
			.push(slot);
		subscription
	}

	/// Broadcasts `payload` to every live listener of `name` in
	/// registration order, then returns the event for inspection.
	///
	/// Listeners run outside the channel lock, so they may subscribe,
	/// unsubscribe or broadcast reentrantly. Listeners registered during
	/// the broadcast are not invoked this round; listeners unsubscribed
	/// during it are skipped. A panicking listener is reported and the
	/// remaining listeners still run.
	pub fn broadcast(&self, name: &str, payload: EventPayload) -> RouteEvent {
		let snapshot: Vec<Arc<ListenerSlot>> = self
			.listeners
			.lock()
			.get(name)
			.cloned()
			.unwrap_or_default();

		let mut event = RouteEvent::new(name);
		for slot in &snapshot {
			if !slot.alive.load(Ordering::Acquire) {
				continue;
			}
			let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
				(slot.callback)(&mut event, &payload)
			}));
			if result.is_err() {
				tracing::error!(event = name, "route event listener panicked");
			}
		}

		if !snapshot.is_empty() {
			self.compact(name);
		}

		event
	}

	/// Live listener count for `name`.
	pub fn listener_count(&self, name: &str) -> usize {
		self.listeners.lock().get(name).map_or(0, |slots| {
			slots
				.iter()
				.filter(|slot| slot.alive.load(Ordering::Acquire))
				.count()
		})
	}

	/// Whether any live listener is registered for `name`.
	pub fn has_listeners(&self, name: &str) -> bool {
		self.listener_count(name) > 0
	}

	/// Splices dead slots out of the list for `name`.
	fn compact(&self, name: &str) {
		let mut listeners = self.listeners.lock();
		if let Some(slots) = listeners.get_mut(name) {
			slots.retain(|slot| slot.alive.load(Ordering::Acquire));
			if slots.is_empty() {
				listeners.remove(name);
			}
		}
	}
}

impl std::fmt::Debug for EventChannel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let listeners = self.listeners.lock();
		f.debug_struct("EventChannel")
			.field("events", &listeners.keys().collect::<Vec<_>>())
			.finish()
	}
}
