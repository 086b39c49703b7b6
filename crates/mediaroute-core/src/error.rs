//! Error taxonomy for the routing pipeline.
//!
//! Configuration problems surface synchronously at registration time as
//! [`ConfigError`]. Everything that can go wrong while loading a route is
//! funneled into [`RouteFailure`], which carries the failure in response
//! shape so error views and event listeners can inspect it like any other
//! response.

use std::fmt;

use thiserror::Error;

use crate::response::Response;

/// Result type for registration-time configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while parsing a view configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
	/// Controller string matched neither `Name` nor `Name as alias`.
	#[error("badly formed controller string '{0}'")]
	MalformedController(String),

	/// Both the alias field and an `as` clause were supplied.
	#[error("both controllerAs and 'controller as' defined in '{0}'")]
	ConflictingControllerAlias(String),
}

/// Transport-level failure reported by an HTTP collaborator.
///
/// Implementations of [`HttpClient`](crate::client::HttpClient) map
/// non-success statuses to [`HttpError::Status`] so the pipeline can keep
/// the original status parts for error-view matching.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum HttpError {
	/// The server answered with a non-success status.
	#[error("status {status} {status_text} for {url}")]
	Status {
		/// Requested URL.
		url: String,
		/// Response status code.
		status: u16,
		/// Response status text.
		status_text: String,
		/// Response headers.
		headers: http::HeaderMap,
		/// Response body, parsed when possible.
		data: serde_json::Value,
	},

	/// No response was received at all. Maps to status `0`.
	#[error("transport failure for {url}: {message}")]
	Transport {
		/// Requested URL.
		url: String,
		/// Connection-level cause.
		message: String,
	},
}

/// Failure while computing a single resolve value or its template.
#[derive(Debug, Clone, Error)]
#[error("failed to resolve '{name}': {message}")]
pub struct ResolveError {
	/// Name of the failing local.
	pub name: String,
	/// Human-readable cause.
	pub message: String,
}

impl ResolveError {
	/// Creates a resolve error for `name`.
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
		}
	}
}

/// Rejection produced by the loading pipeline, in response shape.
///
/// `response` always carries `url`, `status`, `status_text` and `data`;
/// synthetic failures use status `999` with status text `Application Error`.
#[derive(Debug, Clone, Error)]
#[error("route load failed ({kind}): status {} {}", response.status, response.status_text)]
pub struct RouteFailure {
	/// The failure as a response.
	pub response: Response,
	/// Stage of the pipeline that failed.
	pub kind: RouteFailureKind,
}

impl RouteFailure {
	/// Wraps a failure response with its classification.
	pub fn new(response: Response, kind: RouteFailureKind) -> Self {
		Self { response, kind }
	}

	/// Status of the failing response.
	pub fn status(&self) -> u16 {
		self.response.status
	}
}

impl From<HttpError> for RouteFailure {
	fn from(error: HttpError) -> Self {
		Self {
			response: Response::from_http_error(error),
			kind: RouteFailureKind::Transport,
		}
	}
}

/// Classification of a [`RouteFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteFailureKind {
	/// No view is registered for the loaded media type.
	UnknownMediaType,
	/// A resolve or template failed while building the view.
	ResolveFailed,
	/// The transport layer failed or returned a non-success status.
	Transport,
}

impl fmt::Display for RouteFailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnknownMediaType => write!(f, "unknown media type"),
			Self::ResolveFailed => write!(f, "view resolution failed"),
			Self::Transport => write!(f, "transport failure"),
		}
	}
}
