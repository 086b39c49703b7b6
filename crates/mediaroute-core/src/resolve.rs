//! Dependency resolution for view locals.
//!
//! A view configuration may declare named values to compute before the view
//! is ready. References go through the injected [`DependencyResolver`];
//! factories are async closures invoked with the built-in inputs in
//! [`ResolveArgs`].

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::ResolveError;
use crate::response::Response;

/// Built-in inputs handed to factory resolves.
#[derive(Debug, Clone)]
pub struct ResolveArgs {
	/// Loaded payload, raw or transformed.
	pub data: Value,
	/// Normalized media type the view was matched on.
	pub data_type: Option<String>,
	/// Resource URL the data was loaded from.
	pub data_url: String,
	/// The response under construction.
	pub response: Response,
}

impl ResolveArgs {
	/// Captures the built-in inputs from a response mid-load.
	pub fn for_response(response: &Response) -> Self {
		Self {
			data: response.data.clone(),
			data_type: response.media_type.clone(),
			data_url: response.url.clone(),
			response: response.clone(),
		}
	}
}

/// Future returned by factory resolves.
pub type ResolveFuture = BoxFuture<'static, Result<Value, ResolveError>>;

/// Resolves named dependencies referenced from view configurations.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
	/// Resolves `name` to a value.
	async fn resolve(&self, name: &str) -> Result<Value, ResolveError>;
}

/// Map-backed [`DependencyResolver`] with fixed values.
///
/// Suited to embedding and tests; an application wires its own resolver
/// when values come from a real container.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
	values: HashMap<String, Value>,
}

impl StaticResolver {
	/// Creates an empty resolver.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a named value, chainable.
	pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
		self.values.insert(name.into(), value);
		self
	}

	/// Adds a named value.
	pub fn insert(&mut self, name: impl Into<String>, value: Value) {
		self.values.insert(name.into(), value);
	}
}

#[async_trait]
impl DependencyResolver for StaticResolver {
	async fn resolve(&self, name: &str) -> Result<Value, ResolveError> {
		self.values
			.get(name)
			.cloned()
			.ok_or_else(|| ResolveError::new(name, "no value registered"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn test_static_resolver_hit() {
		let resolver = StaticResolver::new().with("currency", json!("EUR"));

		let value = resolver.resolve("currency").await.unwrap();
		assert_eq!(value, json!("EUR"));
	}

	#[tokio::test]
	async fn test_static_resolver_miss() {
		let resolver = StaticResolver::new();

		let err = resolver.resolve("currency").await.unwrap_err();
		assert_eq!(err.name, "currency");
	}

	#[test]
	fn test_args_capture_response_fields() {
		let mut response = Response::new("/api/cart", 200, "OK");
		response.media_type = Some("application/x.cart".to_string());
		response.data = json!({"items": 3});

		let args = ResolveArgs::for_response(&response);
		assert_eq!(args.data_url, "/api/cart");
		assert_eq!(args.data_type.as_deref(), Some("application/x.cart"));
		assert_eq!(args.data["items"], 3);
		assert_eq!(args.response.status, 200);
	}
}
