//! Route loading and navigation for media type driven clients.
//!
//! Where a classic client router matches URLs against route patterns,
//! this one lets the server decide: it fetches the data behind the
//! current location, reads the media type of what came back and loads
//! the view registered for that type. URLs stay opaque; the media type
//! is the routing key.
//!
//! The crate builds on [`mediaroute_core`]:
//!
//! - [`ViewLoader`] runs the loading pipeline: fetch data, match a view,
//!   resolve locals and template concurrently, fall back to error views.
//! - [`RouteController`] ties the pipeline to a [`LocationSource`],
//!   keeps the current route and broadcasts route events.
//! - [`RouterBuilder`] assembles both behind the [`Router`] facade and
//!   is the only place where views, redirects and collaborators are
//!   registered.
//!
//! # Quick Start
//!
//! ```
//! use async_trait::async_trait;
//! use mediaroute_core::client::{HttpClient, HttpResponse, RequestConfig};
//! use mediaroute_core::config::ViewSpec;
//! use mediaroute_core::error::HttpError;
//! use mediaroute_router::{MemoryLocation, Router};
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
//! 	.location(MemoryLocation::new("/cart/1"))
//! 	.when("application/x.cart", ViewSpec::new().template("<cart-view>"))
//! 	.build();
//!
//! router.reload(false).await;
//!
//! let current = router.current().unwrap();
//! assert_eq!(current.media_type.as_deref(), Some("application/x.cart"));
//! assert_eq!(current.template.as_deref(), Some("<cart-view>"));
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `reqwest-client`: forwards the `reqwest`-backed [`HttpClient`]
//!   from `mediaroute_core` and makes it the build-time default.
//!
//! [`HttpClient`]: mediaroute_core::client::HttpClient

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod controller;
pub mod loader;
pub mod location;
pub mod mapper;
pub mod redirect;

pub use builder::{Router, RouterBuilder};
pub use controller::RouteController;
pub use loader::{TypeExtractor, ViewLoader, DEFAULT_MEDIA_TYPE};
pub use location::{LocationSource, MemoryLocation};
pub use mapper::{ApiMapper, IdentityMapper, PrefixApiMapper};
pub use redirect::RedirectMap;

/// Commonly used types, ready for glob import.
pub mod prelude {
	pub use mediaroute_core::prelude::*;

	pub use crate::builder::{Router, RouterBuilder};
	pub use crate::controller::RouteController;
	pub use crate::loader::ViewLoader;
	pub use crate::location::{LocationSource, MemoryLocation};
	pub use crate::mapper::{ApiMapper, IdentityMapper, PrefixApiMapper};
	pub use crate::redirect::RedirectMap;
}
