//! HTTP collaborator interface.
//!
//! The router only ever issues GET requests; anything more belongs to the
//! application's own HTTP layer. Implementations map non-success statuses to
//! [`HttpError::Status`] so the pipeline sees them as failures while keeping
//! the original status parts.

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::Value;

use crate::error::HttpError;

/// Echo of the request that produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
	/// Requested URL.
	pub url: String,
	/// Request method; always GET in this pipeline.
	pub method: http::Method,
}

impl RequestConfig {
	/// Request echo for a GET of `url`.
	pub fn get(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			method: http::Method::GET,
		}
	}
}

/// Successful response returned by an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
	/// Response status code.
	pub status: u16,
	/// Response status text.
	pub status_text: String,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body, parsed as JSON when possible.
	pub data: Value,
	/// Echo of the request.
	pub request: RequestConfig,
}

impl HttpResponse {
	/// `Content-Type` header value, when present and readable as text.
	pub fn content_type(&self) -> Option<&str> {
		self.headers
			.get(http::header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
	}
}

/// GET-capable HTTP collaborator.
///
/// Timeout and retry policy live in the implementation; the router imposes
/// none of its own.
#[async_trait]
pub trait HttpClient: Send + Sync {
	/// Fetches `url`.
	///
	/// Non-success statuses are reported as [`HttpError::Status`];
	/// connection-level problems as [`HttpError::Transport`].
	async fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

/// [`HttpClient`] backed by `reqwest`.
///
/// Bodies are parsed as JSON when they are valid JSON, otherwise kept as a
/// plain string value.
#[cfg(feature = "reqwest-client")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
	client: reqwest::Client,
}

#[cfg(feature = "reqwest-client")]
impl ReqwestClient {
	/// Adapter with a default `reqwest` client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adapter over a preconfigured `reqwest` client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[cfg(feature = "reqwest-client")]
#[async_trait]
impl HttpClient for ReqwestClient {
	async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
		let response = self.client.get(url).send().await.map_err(|err| HttpError::Transport {
			url: url.to_string(),
			message: err.to_string(),
		})?;

		let status = response.status();
		let status_text = status.canonical_reason().unwrap_or("").to_string();
		let headers = response.headers().clone();
		let text = response.text().await.map_err(|err| HttpError::Transport {
			url: url.to_string(),
			message: err.to_string(),
		})?;
		let data = match serde_json::from_str(&text) {
			Ok(value) => value,
			Err(_) => Value::String(text),
		};

		if !status.is_success() {
			return Err(HttpError::Status {
				url: url.to_string(),
				status: status.as_u16(),
				status_text,
				headers,
				data,
			});
		}

		Ok(HttpResponse {
			status: status.as_u16(),
			status_text,
			headers,
			data,
			request: RequestConfig::get(url),
		})
	}
}
