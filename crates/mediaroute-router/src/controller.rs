//! The route controller: location, current route and route events.

use std::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use mediaroute_core::error::RouteFailure;
use mediaroute_core::events::{
	EventChannel, EventPayload, RouteEvent, Subscription, ROUTE_CHANGE_ERROR, ROUTE_CHANGE_START,
	ROUTE_CHANGE_SUCCESS, ROUTE_UPDATE,
};
use mediaroute_core::response::{Response, RouterHandle};
use parking_lot::Mutex;

use crate::loader::ViewLoader;
use crate::location::LocationSource;
use crate::mapper::ApiMapper;
use crate::redirect::RedirectMap;

/// Drives the route lifecycle: reads the location, loads routes through
/// the [`ViewLoader`] and keeps the current response.
///
/// Cloning is cheap; clones share the current route, the event channel
/// and the reload bookkeeping.
#[derive(Clone)]
pub struct RouteController {
	inner: Arc<ControllerInner>,
}

struct ControllerInner {
	loader: Arc<ViewLoader>,
	location: Arc<dyn LocationSource>,
	mapper: Arc<dyn ApiMapper>,
	redirects: RedirectMap,
	events: EventChannel,
	enabled: bool,
	state: Mutex<ControllerState>,
}

#[derive(Default)]
struct ControllerState {
	current: Option<Response>,
	/// Monotonic reload counter; each reload takes the next value as its
	/// token.
	generation: u64,
	/// Token of the reload allowed to publish its result; `None` while
	/// idle.
	active: Option<u64>,
}

impl RouteController {
	/// Controller over the given collaborators. `enabled` gates the
	/// location-change entry points; programmatic reloads always work.
	pub fn new(
		loader: Arc<ViewLoader>,
		location: Arc<dyn LocationSource>,
		mapper: Arc<dyn ApiMapper>,
		redirects: RedirectMap,
		enabled: bool,
	) -> Self {
		Self {
			inner: Arc::new(ControllerInner {
				loader,
				location,
				mapper,
				redirects,
				events: EventChannel::new(),
				enabled,
				state: Mutex::new(ControllerState::default()),
			}),
		}
	}

	/// The current route, once a navigation completed.
	pub fn current(&self) -> Option<Response> {
		self.inner.state.lock().current.clone()
	}

	/// Channel carrying `routeChangeStart`, `routeChangeSuccess`,
	/// `routeChangeError` and `routeUpdate` broadcasts.
	pub fn events(&self) -> &EventChannel {
		&self.inner.events
	}

	/// Subscribes to a route event; see [`EventChannel::on`].
	pub fn on<F>(&self, event: &str, listener: F) -> Subscription
	where
		F: Fn(&mut RouteEvent, &EventPayload) + Send + Sync + 'static,
	{
		self.inner.events.on(event, listener)
	}

	/// Whether location-change notifications are acted upon.
	pub fn enabled(&self) -> bool {
		self.inner.enabled
	}

	/// Loads the route for the current location.
	///
	/// Redirects are consulted first; a hit rewrites the location and
	/// skips loading. Overlapping reloads settle compare-on-settle: only
	/// the newest one may publish, older results are discarded. With
	/// `force_reload` unset, a result for the same resource and media
	/// type merges into the current route and broadcasts `routeUpdate`
	/// on it; any other result replaces the current route and broadcasts
	/// `routeChangeSuccess`. Failures broadcast `routeChangeError` and
	/// leave the current route untouched.
	pub async fn reload(&self, force_reload: bool) {
		self.inner.reload(force_reload).await;
	}

	/// Navigates to a view path and loads its route.
	pub async fn navigate(&self, path: &str) {
		self.inner.navigate(path).await;
	}

	/// API URL of the current location.
	pub fn url(&self) -> String {
		self.inner.mapper.map_view_path(&self.inner.location.path())
	}

	/// Navigates to the view presenting an API resource URL.
	///
	/// The URL is mapped back to a view path; URLs outside the API space
	/// are ignored with a warning. Setting the current URL again is a
	/// no-op unless `reload` is set, which forces a reload instead.
	pub async fn set_url(&self, api_url: &str, reload: bool) {
		self.inner.set_url(api_url, reload).await;
	}

	/// Entry point for the environment's "location is about to change"
	/// notification.
	///
	/// Broadcasts a cancelable `routeChangeStart` carrying `new_url` and
	/// reports whether the change may proceed; `false` means a listener
	/// prevented it and the caller should abort the location change.
	/// Always `true` when the controller is disabled.
	pub fn handle_location_change_start(&self, new_url: &str) -> bool {
		if !self.inner.enabled {
			return true;
		}
		let event = self
			.inner
			.events
			.broadcast(ROUTE_CHANGE_START, EventPayload::Location(new_url.to_string()));
		!event.default_prevented()
	}

	/// Entry point for the environment's "location changed"
	/// notification; forces a reload unless the controller is disabled.
	pub async fn handle_location_changed(&self) {
		if !self.inner.enabled {
			return;
		}
		self.inner.reload(true).await;
	}
}

impl fmt::Debug for RouteController {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteController")
			.field("enabled", &self.inner.enabled)
			.finish_non_exhaustive()
	}
}

impl ControllerInner {
	async fn reload(self: &Arc<Self>, force_reload: bool) {
		let path = self.location.path();

		if let Some(target) = self.redirects.lookup(&path) {
			tracing::debug!(from = %path, to = target, "redirecting");
			self.location.replace(target);
			return;
		}

		let url = self.mapper.map_view_path(&path);

		let (token, current) = {
			let mut state = self.state.lock();
			state.generation += 1;
			state.active = Some(state.generation);
			(state.generation, state.current.clone())
		};

		tracing::debug!(url = %url, generation = token, "loading route");

		match self.loader.prepare_view(&url, current.as_ref(), force_reload).await {
			Ok(response) => self.finish_success(token, response),
			Err(failure) => self.finish_failure(token, failure),
		}
	}

	async fn navigate(self: &Arc<Self>, path: &str) {
		if self.location.path() != path {
			self.location.assign(path);
		}
		self.reload(true).await;
	}

	async fn set_url(self: &Arc<Self>, api_url: &str, reload: bool) {
		let Some(path) = self.mapper.map_api_url(api_url) else {
			tracing::warn!(url = api_url, "url does not map to a view path");
			return;
		};
		if self.location.path() != path {
			self.location.assign(&path);
			self.reload(true).await;
		} else if reload {
			self.reload(true).await;
		}
	}

	fn finish_success(self: &Arc<Self>, token: u64, mut response: Response) {
		enum Outcome {
			Update(Response),
			Swap(Response),
		}

		// Publish under the lock, broadcast outside it; listeners are
		// free to call back into the controller.
		let outcome = {
			let mut state = self.state.lock();
			if state.active != Some(token) {
				tracing::warn!(url = %response.url, "discarding stale route load, newer reload pending");
				return;
			}
			state.active = None;

			match (&mut state.current, response.route_data_update) {
				(Some(current), true) => {
					tracing::debug!(url = %response.url, "updating current route data");
					current.merge_update(response);
					Outcome::Update(current.clone())
				}
				(slot, _) => {
					tracing::debug!(url = %response.url, "setting current route");
					response.attach_router(Arc::new(ControllerLink {
						inner: Arc::downgrade(self),
					}));
					*slot = Some(response.clone());
					Outcome::Swap(response)
				}
			}
		};

		match outcome {
			Outcome::Update(current) => {
				let payload = EventPayload::Response(Arc::new(current.clone()));
				current.broadcast(ROUTE_UPDATE, payload);
			}
			Outcome::Swap(response) => {
				self.events
					.broadcast(ROUTE_CHANGE_SUCCESS, EventPayload::Response(Arc::new(response)));
			}
		}
	}

	fn finish_failure(&self, token: u64, failure: RouteFailure) {
		{
			let mut state = self.state.lock();
			if state.active != Some(token) {
				tracing::warn!(url = %failure.response.url, "discarding stale route failure, newer reload pending");
				return;
			}
			state.active = None;
		}

		tracing::error!(
			url = %failure.response.url,
			status = failure.status(),
			kind = %failure.kind,
			"error routing",
		);
		self.events
			.broadcast(ROUTE_CHANGE_ERROR, EventPayload::Failure(Arc::new(failure.response)));
	}
}

/// Handle attached to current responses. Holds the controller weakly so
/// a stored response never keeps its own controller alive.
struct ControllerLink {
	inner: Weak<ControllerInner>,
}

#[async_trait]
impl RouterHandle for ControllerLink {
	async fn reload(&self, force_reload: bool) {
		if let Some(inner) = self.inner.upgrade() {
			inner.reload(force_reload).await;
		}
	}

	async fn navigate(&self, path: &str) {
		if let Some(inner) = self.inner.upgrade() {
			inner.navigate(path).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use mediaroute_core::client::{HttpClient, HttpResponse};
	use mediaroute_core::error::HttpError;
	use mediaroute_core::registry::ViewRegistry;
	use mediaroute_core::resolve::StaticResolver;
	use mediaroute_core::template::MemoryTemplateCache;

	use crate::location::MemoryLocation;
	use crate::mapper::PrefixApiMapper;

	struct OfflineClient;

	#[async_trait]
	impl HttpClient for OfflineClient {
		async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
			Err(HttpError::Transport {
				url: url.to_string(),
				message: "offline".to_string(),
			})
		}
	}

	fn controller(enabled: bool) -> RouteController {
		let loader = ViewLoader::new(
			Arc::new(ViewRegistry::new()),
			Arc::new(OfflineClient),
			Arc::new(StaticResolver::new()),
			Arc::new(MemoryTemplateCache::new()),
		);
		RouteController::new(
			Arc::new(loader),
			Arc::new(MemoryLocation::new("/cart/42")),
			Arc::new(PrefixApiMapper::new("api/")),
			RedirectMap::new(),
			enabled,
		)
	}

	#[test]
	fn test_url_maps_the_location_through_the_mapper() {
		let controller = controller(true);

		assert_eq!(controller.url(), "api/cart/42");
	}

	#[test]
	fn test_location_change_start_may_proceed_without_listeners() {
		let controller = controller(true);

		assert!(controller.handle_location_change_start("/orders"));
	}

	#[test]
	fn test_location_change_start_honors_prevent_default() {
		let controller = controller(true);
		let _guard = controller.on(ROUTE_CHANGE_START, |event, _| event.prevent_default());

		assert!(!controller.handle_location_change_start("/orders"));
	}

	#[test]
	fn test_disabled_controller_never_cancels_location_changes() {
		let controller = controller(false);
		let _guard = controller.on(ROUTE_CHANGE_START, |event, _| event.prevent_default());

		assert!(controller.handle_location_change_start("/orders"));
	}

	#[tokio::test]
	async fn test_failed_reload_broadcasts_route_change_error() {
		let controller = controller(true);
		let errors = Arc::new(std::sync::atomic::AtomicUsize::new(0));
		let seen = Arc::clone(&errors);
		let _guard = controller.on(ROUTE_CHANGE_ERROR, move |_, _| {
			seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
		});

		controller.reload(false).await;

		assert_eq!(errors.load(std::sync::atomic::Ordering::SeqCst), 1);
		assert!(controller.current().is_none());
	}

	#[tokio::test]
	async fn test_disabled_location_changed_does_not_load() {
		let controller = controller(false);
		let errors = Arc::new(std::sync::atomic::AtomicUsize::new(0));
		let seen = Arc::clone(&errors);
		let _guard = controller.on(ROUTE_CHANGE_ERROR, move |_, _| {
			seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
		});

		controller.handle_location_changed().await;

		assert_eq!(errors.load(std::sync::atomic::Ordering::SeqCst), 0);
	}
}
