//! Location abstraction the route controller watches and writes.

use parking_lot::RwLock;

/// The environment's location.
///
/// The controller reads the current view path from here and writes it back
/// on redirects and navigation. Implementations adapt whatever the host
/// environment calls a location: a browser history shim, a terminal UI
/// route stack, an in-memory value in tests.
///
/// Implementations do not notify the controller of external changes; the
/// environment forwards those through
/// [`RouteController::handle_location_change_start`](crate::RouteController::handle_location_change_start)
/// and
/// [`RouteController::handle_location_changed`](crate::RouteController::handle_location_changed).
pub trait LocationSource: Send + Sync {
	/// Current view path, e.g. `/cart/42`.
	fn path(&self) -> String;

	/// Replaces the current location without growing history.
	fn replace(&self, path: &str);

	/// Assigns a new location, growing history where the environment has
	/// a history.
	fn assign(&self, path: &str);
}

/// In-memory [`LocationSource`] with no history.
///
/// The default location for embedded setups and tests; `replace` and
/// `assign` behave identically.
#[derive(Debug, Default)]
pub struct MemoryLocation {
	path: RwLock<String>,
}

impl MemoryLocation {
	/// Location positioned at `initial`.
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			path: RwLock::new(initial.into()),
		}
	}
}

impl LocationSource for MemoryLocation {
	fn path(&self) -> String {
		self.path.read().clone()
	}

	fn replace(&self, path: &str) {
		*self.path.write() = path.to_string();
	}

	fn assign(&self, path: &str) {
		*self.path.write() = path.to_string();
	}
}
