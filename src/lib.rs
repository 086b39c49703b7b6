//! # mediaroute
//!
//! Media type driven data routing for hypermedia clients.
//!
//! Classic client routers bind URL patterns to views, which couples every
//! screen to the shape of the server's URL space. mediaroute inverts that
//! contract: it fetches whatever resource the current location points at,
//! reads the media type of the response, and loads the view registered for
//! that type. URLs stay opaque; the media type is the only routing key, so
//! the server is free to restructure its URL space without breaking clients.
//!
//! ## Crates
//!
//! The workspace splits along reuse seams, and this crate re-exports all of
//! it; depending on `mediaroute` alone is enough.
//!
//! - [`mediaroute_match`] - ordered exact/glob/predicate pattern registry,
//!   media type agnostic.
//! - [`mediaroute_core`] - media type normalization, view configuration and
//!   the [`ViewRegistry`], the [`Response`] model with its [`EventChannel`],
//!   and the collaborator traits ([`HttpClient`], [`TemplateCache`],
//!   [`DependencyResolver`]).
//! - [`mediaroute_router`] - the [`ViewLoader`] pipeline, the
//!   [`RouteController`] with its location integration, and the
//!   [`RouterBuilder`] assembly surface behind the [`Router`] facade.
//!
//! ## Feature Flags
//!
//! - `reqwest-client` - ships [`ReqwestClient`] and makes it the default
//!   [`HttpClient`] when none is configured.
//!
//! ## Quick Example
//!
//! ```
//! use async_trait::async_trait;
//! use mediaroute::prelude::*;
//!
//! /// Serves one cart resource, whatever the URL.
//! struct CannedClient;
//!
//! #[async_trait]
//! impl HttpClient for CannedClient {
//! 	async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
//! 		let mut headers = http::HeaderMap::new();
//! 		headers.insert(
//! 			http::header::CONTENT_TYPE,
//! 			http::HeaderValue::from_static("application/x.cart+json"),
//! 		);
//! 		Ok(HttpResponse {
//! 			status: 200,
//! 			status_text: "OK".to_string(),
//! 			headers,
//! 			data: serde_json::json!({ "items": 3 }),
//! 			request: RequestConfig::get(url),
//! 		})
//! 	}
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let router = Router::builder()
//! 	.http_client(CannedClient)
//! 	.location(MemoryLocation::new("/"))
//! 	.when(
//! 		"application/x.cart",
//! 		ViewSpec::new().template("<cart-view>").controller("CartCtrl as cart"),
//! 	)
//! 	.build();
//!
//! router.navigate("/cart/1").await;
//!
//! let current = router.current().unwrap();
//! assert_eq!(current.url, "/cart/1");
//! assert_eq!(current.media_type.as_deref(), Some("application/x.cart"));
//! assert_eq!(current.template.as_deref(), Some("<cart-view>"));
//! assert_eq!(current.view.as_ref().unwrap().controller_as(), Some("cart"));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Re-export pattern matching
pub use mediaroute_match::{GlobPattern, PatternMap, PredicateFn};

// Re-export media type normalization and view configuration
pub use mediaroute_core::config::{
	Resolve, ResolveFactory, TemplateValue, TransformFn, ViewConfig, ViewSpec,
};
pub use mediaroute_core::media_type::normalize_media_type;

// Re-export the view registry
pub use mediaroute_core::registry::{
	error_type_for, ViewKey, ViewRegistry, ERROR_TYPE, ERROR_TYPE_PREFIX,
};

// Re-export the response model and route events
pub use mediaroute_core::events::{
	EventChannel, EventPayload, RouteEvent, Subscription, ROUTE_CHANGE_ERROR, ROUTE_CHANGE_START,
	ROUTE_CHANGE_SUCCESS, ROUTE_UPDATE,
};
pub use mediaroute_core::response::{
	Response, RouterHandle, LOCAL_DATA, LOCAL_DATA_TYPE, LOCAL_DATA_URL, STATUS_APPLICATION_ERROR,
	STATUS_TEXT_APPLICATION_ERROR,
};

// Re-export collaborator traits and their in-memory defaults
#[cfg(feature = "reqwest-client")]
pub use mediaroute_core::client::ReqwestClient;
pub use mediaroute_core::client::{HttpClient, HttpResponse, RequestConfig};
pub use mediaroute_core::resolve::{DependencyResolver, ResolveArgs, ResolveFuture, StaticResolver};
pub use mediaroute_core::template::{MemoryTemplateCache, TemplateCache};

// Re-export errors
pub use mediaroute_core::error::{
	ConfigError, ConfigResult, HttpError, ResolveError, RouteFailure, RouteFailureKind,
};

// Re-export the loading pipeline
pub use mediaroute_router::controller::RouteController;
pub use mediaroute_router::loader::{TypeExtractor, ViewLoader, DEFAULT_MEDIA_TYPE};

// Re-export navigation collaborators
pub use mediaroute_router::location::{LocationSource, MemoryLocation};
pub use mediaroute_router::mapper::{ApiMapper, IdentityMapper, PrefixApiMapper};
pub use mediaroute_router::redirect::RedirectMap;

// Re-export the assembly surface
pub use mediaroute_router::builder::{Router, RouterBuilder};

/// Commonly used types, ready for glob import.
pub mod prelude {
	pub use mediaroute_router::prelude::*;
}
