//! Core types for the mediaroute data router.
//!
//! mediaroute routes on *what* a resource is instead of *where* it lives:
//! the server names a media type, the client picks the matching view. This
//! crate carries the pieces the pipeline is assembled from:
//!
//! - media type normalization ([`normalize_media_type`]);
//! - view configuration ([`ViewSpec`] parsed into [`ViewConfig`]) and the
//!   defaults merge policy;
//! - the [`ViewRegistry`] mapping media types (exact, wildcard or
//!   predicate) to views;
//! - the [`Response`] exchanged between loader and consumers, with its
//!   [`EventChannel`];
//! - collaborator traits ([`HttpClient`], [`TemplateCache`],
//!   [`DependencyResolver`]) and in-memory defaults.
//!
//! The loading pipeline itself lives in `mediaroute-router`.
//!
//! # Quick Start
//!
//! ```
//! use mediaroute_core::{ViewRegistry, ViewSpec};
//!
//! let mut registry = ViewRegistry::new();
//! registry
//!     .register_view(
//!         "application/x.cart",
//!         ViewSpec::new()
//!             .template_url("/templates/cart.html")
//!             .controller("Cart as cart"),
//!     )
//!     .unwrap();
//!
//! assert!(registry.is_known_type("application/x.cart+json"));
//! let view = registry.match_type("application/x.cart").unwrap();
//! assert_eq!(view.controller(), Some("Cart"));
//! assert_eq!(view.controller_as(), Some("cart"));
//! ```
//!
//! # Feature Flags
//!
//! - `default` - no optional dependencies
//! - `reqwest-client` - [`ReqwestClient`], an [`HttpClient`] backed by `reqwest`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod media_type;
pub mod registry;
pub mod resolve;
pub mod response;
pub mod template;

#[cfg(feature = "reqwest-client")]
pub use client::ReqwestClient;
pub use client::{HttpClient, HttpResponse, RequestConfig};
pub use config::{Resolve, ResolveFactory, TemplateValue, TransformFn, ViewConfig, ViewSpec};
pub use error::{
	ConfigError, ConfigResult, HttpError, ResolveError, RouteFailure, RouteFailureKind,
};
pub use events::{
	EventChannel, EventPayload, RouteEvent, Subscription, ROUTE_CHANGE_ERROR, ROUTE_CHANGE_START,
	ROUTE_CHANGE_SUCCESS, ROUTE_UPDATE,
};
pub use media_type::normalize_media_type;
pub use registry::{error_type_for, ViewKey, ViewRegistry, ERROR_TYPE, ERROR_TYPE_PREFIX};
pub use resolve::{DependencyResolver, ResolveArgs, ResolveFuture, StaticResolver};
pub use response::{
	Response, RouterHandle, LOCAL_DATA, LOCAL_DATA_TYPE, LOCAL_DATA_URL, STATUS_APPLICATION_ERROR,
	STATUS_TEXT_APPLICATION_ERROR,
};
pub use template::{MemoryTemplateCache, TemplateCache};

/// Re-export commonly used types.
pub mod prelude {
	#[cfg(feature = "reqwest-client")]
	pub use crate::client::ReqwestClient;
	pub use crate::client::{HttpClient, HttpResponse, RequestConfig};
	pub use crate::config::{Resolve, TemplateValue, ViewConfig, ViewSpec};
	pub use crate::error::{ConfigError, HttpError, ResolveError, RouteFailure, RouteFailureKind};
	pub use crate::events::{
		EventChannel, EventPayload, RouteEvent, Subscription, ROUTE_CHANGE_ERROR,
		ROUTE_CHANGE_START, ROUTE_CHANGE_SUCCESS, ROUTE_UPDATE,
	};
	pub use crate::media_type::normalize_media_type;
	pub use crate::registry::ViewRegistry;
	pub use crate::resolve::{DependencyResolver, ResolveArgs, StaticResolver};
	pub use crate::response::Response;
	pub use crate::template::{MemoryTemplateCache, TemplateCache};
}
