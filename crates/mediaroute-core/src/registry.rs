//! Registry mapping media types to view configurations.

use std::fmt;
use std::sync::Arc;

use mediaroute_match::{PatternMap, PredicateFn};

use crate::config::{ViewConfig, ViewSpec};
use crate::error::ConfigError;
use crate::media_type::normalize_media_type;

/// Synthetic type under which the generic error view is registered.
pub const ERROR_TYPE: &str = "$error";

/// Prefix of status-specific error view types.
pub const ERROR_TYPE_PREFIX: &str = "$error_";

/// Synthetic type for a status-specific error view. `status` may carry `?`
/// wildcards, e.g. `4??`.
pub fn error_type_for(status: impl fmt::Display) -> String {
	format!("{ERROR_TYPE_PREFIX}{status}")
}

/// Where a view registration attaches.
pub enum ViewKey {
	/// A media type, normalized at registration; `*`/`?` register as
	/// wildcards.
	MediaType(String),
	/// A predicate over normalized media types.
	Matcher(PredicateFn),
	/// The generic error view.
	Error,
	/// A status-specific error view; `?` wildcards allowed (`4??`).
	ErrorStatus(String),
}

impl fmt::Debug for ViewKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ViewKey::MediaType(media_type) => f.debug_tuple("MediaType").field(media_type).finish(),
			ViewKey::Matcher(_) => f.write_str("Matcher"),
			ViewKey::Error => f.write_str("Error"),
			ViewKey::ErrorStatus(status) => f.debug_tuple("ErrorStatus").field(status).finish(),
		}
	}
}

/// Media type to view registry.
///
/// Populated while configuring the router and read-only afterwards; the
/// builder enforces the split by filling the registry by value and handing
/// out an immutable handle.
///
/// String keys are normalized at registration. `match_type` takes its key
/// as given, so callers pass already-normalized types; error-view keys are
/// synthetic and used verbatim on both sides.
pub struct ViewRegistry {
	views: PatternMap<Arc<ViewConfig>>,
}

impl ViewRegistry {
	/// Empty registry.
	pub fn new() -> Self {
		Self {
			views: PatternMap::new(),
		}
	}

	/// Registers a view under a media type.
	///
	/// The type is normalized first, so `register_view("json", ..)` and
	/// `register_view("application/json", ..)` land on the same key. Types
	/// containing `*` or `?` register as wildcards. Re-registering an
	/// exact type replaces the previous view.
	pub fn register_view(&mut self, media_type: &str, spec: ViewSpec) -> Result<(), ConfigError> {
		let config = spec.parse()?;
		self.register_config(ViewKey::MediaType(media_type.to_string()), config);
		Ok(())
	}

	/// Registers a view under a predicate over normalized media types.
	pub fn register_matcher<F>(&mut self, predicate: F, spec: ViewSpec) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		let config = spec.parse()?;
		self.register_config(ViewKey::Matcher(Arc::new(predicate)), config);
		Ok(())
	}

	/// Registers the generic error view, matched when no status-specific
	/// error view exists.
	pub fn register_error(&mut self, spec: ViewSpec) -> Result<(), ConfigError> {
		let config = spec.parse()?;
		self.register_config(ViewKey::Error, config);
		Ok(())
	}

	/// Registers an error view for a status. `?` wildcards are honored, so
	/// `4??` catches every 4xx status.
	pub fn register_error_status(
		&mut self,
		status: impl fmt::Display,
		spec: ViewSpec,
	) -> Result<(), ConfigError> {
		let config = spec.parse()?;
		self.register_config(ViewKey::ErrorStatus(status.to_string()), config);
		Ok(())
	}

	/// Registers an already-parsed configuration under `key`.
	pub fn register_config(&mut self, key: ViewKey, config: ViewConfig) {
		match key {
			ViewKey::MediaType(media_type) => {
				let key = normalize_media_type(Some(&media_type)).unwrap_or_default();
				self.insert(&key, config);
			}
			ViewKey::Matcher(predicate) => {
				self.views
					.insert_predicate(move |media_type: &str| predicate(media_type), Arc::new(config));
			}
			ViewKey::Error => self.insert(ERROR_TYPE, config),
			ViewKey::ErrorStatus(status) => self.insert(&error_type_for(status), config),
		}
	}

	fn insert(&mut self, key: &str, config: ViewConfig) {
		if self.views.contains_exact(key) {
			tracing::debug!(media_type = key, "replacing existing view registration");
		}
		self.views.insert(key, Arc::new(config));
	}

	/// Looks up the view for an already-normalized media type.
	pub fn match_type(&self, media_type: &str) -> Option<Arc<ViewConfig>> {
		self.views.lookup(media_type).cloned()
	}

	/// Whether a raw media type has a registered view. Unlike
	/// [`match_type`](Self::match_type), the type is normalized here.
	pub fn is_known_type(&self, media_type: &str) -> bool {
		normalize_media_type(Some(media_type))
			.is_some_and(|normalized| self.match_type(&normalized).is_some())
	}

	/// Normalizes a media type; see [`normalize_media_type`].
	pub fn normalize_media_type(raw: Option<&str>) -> Option<String> {
		normalize_media_type(raw)
	}

	/// Number of registered views, error views included.
	pub fn len(&self) -> usize {
		self.views.len()
	}

	/// Whether no view is registered.
	pub fn is_empty(&self) -> bool {
		self.views.is_empty()
	}
}

impl Default for ViewRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for ViewRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewRegistry").field("views", &self.views).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry_with(types: &[&str]) -> ViewRegistry {
		let mut registry = ViewRegistry::new();
		for media_type in types {
			registry
				.register_view(media_type, ViewSpec::new().controller(*media_type))
				.unwrap();
		}
		registry
	}

	#[test]
	fn test_registration_normalizes_the_key() {
		let registry = registry_with(&["json"]);

		assert!(registry.match_type("application/json").is_some());
	}

	#[test]
	fn test_lookup_does_not_normalize() {
		let registry = registry_with(&["json"]);

		// Callers pass normalized types; raw types miss.
		assert!(registry.match_type("json").is_none());
		assert!(registry.match_type("application/hal+json").is_none());
	}

	#[test]
	fn test_is_known_type_normalizes() {
		let registry = registry_with(&["application/hal"]);

		assert!(registry.is_known_type("application/hal+json"));
		assert!(registry.is_known_type("hal"));
		assert!(!registry.is_known_type("application/json"));
		assert!(!registry.is_known_type(""));
	}

	#[test]
	fn test_wildcard_registration() {
		let registry = registry_with(&["application/x.*"]);

		assert!(registry.match_type("application/x.cart").is_some());
		assert!(registry.match_type("application/json").is_none());
	}

	#[test]
	fn test_exact_beats_wildcard_either_registration_order() {
		for types in [
			["application/*", "application/json"],
			["application/json", "application/*"],
		] {
			let registry = registry_with(&types);
			let config = registry.match_type("application/json").unwrap();
			assert_eq!(config.controller(), Some("application/json"));
		}
	}

	#[test]
	fn test_reregistration_replaces_exact_entry() {
		let mut registry = ViewRegistry::new();
		registry
			.register_view("application/json", ViewSpec::new().controller("First"))
			.unwrap();
		registry
			.register_view("application/json", ViewSpec::new().controller("Second"))
			.unwrap();

		let config = registry.match_type("application/json").unwrap();
		assert_eq!(config.controller(), Some("Second"));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_matcher_registration() {
		let mut registry = ViewRegistry::new();
		registry
			.register_matcher(
				|media_type: &str| media_type.starts_with("image/"),
				ViewSpec::new().controller("Image"),
			)
			.unwrap();

		assert!(registry.match_type("image/png").is_some());
		assert!(registry.match_type("video/mp4").is_none());
	}

	#[test]
	fn test_error_views_use_synthetic_keys() {
		let mut registry = ViewRegistry::new();
		registry.register_error(ViewSpec::new().controller("Generic")).unwrap();
		registry
			.register_error_status(404, ViewSpec::new().controller("NotFound"))
			.unwrap();

		// Synthetic keys bypass normalization entirely.
		let generic = registry.match_type(ERROR_TYPE).unwrap();
		assert_eq!(generic.controller(), Some("Generic"));
		let not_found = registry.match_type(&error_type_for(404)).unwrap();
		assert_eq!(not_found.controller(), Some("NotFound"));
	}

	#[test]
	fn test_wildcard_error_status() {
		let mut registry = ViewRegistry::new();
		registry
			.register_error_status("4??", ViewSpec::new().controller("ClientError"))
			.unwrap();

		assert!(registry.match_type(&error_type_for(404)).is_some());
		assert!(registry.match_type(&error_type_for(418)).is_some());
		assert!(registry.match_type(&error_type_for(500)).is_none());
	}

	#[test]
	fn test_specific_error_beats_wildcard_error() {
		let mut registry = ViewRegistry::new();
		registry
			.register_error_status("4??", ViewSpec::new().controller("ClientError"))
			.unwrap();
		registry
			.register_error_status(404, ViewSpec::new().controller("NotFound"))
			.unwrap();

		let config = registry.match_type(&error_type_for(404)).unwrap();
		assert_eq!(config.controller(), Some("NotFound"));
	}

	#[test]
	fn test_parse_errors_surface_at_registration() {
		let mut registry = ViewRegistry::new();
		let err = registry
			.register_view("application/json", ViewSpec::new().controller("Cart as"))
			.unwrap_err();

		assert!(matches!(err, ConfigError::MalformedController(_)));
		assert!(registry.is_empty());
	}
}
