//! The response: the unit exchanged between the loader and its consumers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::Value;

use crate::client::{HttpResponse, RequestConfig};
use crate::config::ViewConfig;
use crate::error::HttpError;
use crate::events::{EventChannel, EventPayload, RouteEvent, Subscription};

/// Synthetic status for internal pipeline failures. Reserved outside the
/// transport status range so error views can match on it.
pub const STATUS_APPLICATION_ERROR: u16 = 999;

/// Status text paired with [`STATUS_APPLICATION_ERROR`].
pub const STATUS_TEXT_APPLICATION_ERROR: &str = "Application Error";

/// Name of the built-in local carrying the loaded data.
pub const LOCAL_DATA: &str = "$data";

/// Name of the built-in local carrying the matched media type.
pub const LOCAL_DATA_TYPE: &str = "$dataType";

/// Name of the built-in local carrying the resource URL.
pub const LOCAL_DATA_URL: &str = "$dataUrl";

/// Navigation capability attached to a response once it becomes current.
///
/// Outcomes are reported through route events and the router's current
/// response, never as return values.
#[async_trait]
pub trait RouterHandle: Send + Sync {
	/// Reloads the current route's data.
	async fn reload(&self, force_reload: bool);

	/// Navigates to a new view path and loads its route.
	async fn navigate(&self, path: &str);
}

/// A loaded route: data, matched view and resolved locals.
///
/// Built up in stages by the loader. After `load_data` the data fields and
/// `view` are set; after `load_view` the `locals` and `template` are too.
/// A response owns a shared [`EventChannel`], so clones and long-lived
/// handles observe the same events.
#[derive(Clone)]
pub struct Response {
	/// Resource URL the data was loaded from.
	pub url: String,
	/// Status code; `999` and `0` are synthetic (internal failure and
	/// transport failure respectively).
	pub status: u16,
	/// Status text.
	pub status_text: String,
	/// Response headers.
	pub headers: HeaderMap,
	/// Echo of the request that produced this response.
	pub request: RequestConfig,
	/// Normalized media type the view was matched on.
	pub media_type: Option<String>,
	/// Loaded payload, raw or transformed.
	pub data: Value,
	/// Matched view configuration, defaults already merged in.
	pub view: Option<Arc<ViewConfig>>,
	/// Resolved locals; `Some` once view loading completed. Includes the
	/// built-ins `$data`, `$dataType` and `$dataUrl`.
	pub locals: Option<HashMap<String, Value>>,
	/// Resolved template text, when the view declares one.
	pub template: Option<String>,
	/// Refresh the mounted view in place instead of replacing it.
	pub route_data_update: bool,
	/// This response renders an error view.
	pub route_error: bool,
	router: Option<Arc<dyn RouterHandle>>,
	events: EventChannel,
}

impl Response {
	/// Bare response with empty headers and no data.
	pub fn new(url: impl Into<String>, status: u16, status_text: impl Into<String>) -> Self {
		let url = url.into();
		Self {
			request: RequestConfig::get(url.clone()),
			url,
			status,
			status_text: status_text.into(),
			headers: HeaderMap::new(),
			media_type: None,
			data: Value::Null,
			view: None,
			locals: None,
			template: None,
			route_data_update: false,
			route_error: false,
			router: None,
			events: EventChannel::new(),
		}
	}

	/// Response carrying freshly loaded data, before view matching.
	pub fn from_http(http: HttpResponse) -> Self {
		Self {
			url: http.request.url.clone(),
			status: http.status,
			status_text: http.status_text,
			headers: http.headers,
			request: http.request,
			media_type: None,
			data: http.data,
			view: None,
			locals: None,
			template: None,
			route_data_update: false,
			route_error: false,
			router: None,
			events: EventChannel::new(),
		}
	}

	/// Synthetic failure response: status `999` `Application Error`, with
	/// `message` in `data`.
	pub fn application_error(url: impl Into<String>, message: impl Into<String>) -> Self {
		let mut response = Self::new(url, STATUS_APPLICATION_ERROR, STATUS_TEXT_APPLICATION_ERROR);
		response.data = Value::String(message.into());
		response
	}

	/// Failure response preserving the transport's status parts. Transport
	/// failures map to status `0` with the cause in `data`.
	pub fn from_http_error(error: HttpError) -> Self {
		match error {
			HttpError::Status {
				url,
				status,
				status_text,
				headers,
				data,
			} => {
				let mut response = Self::new(url, status, status_text);
				response.headers = headers;
				response.data = data;
				response
			}
			HttpError::Transport { url, message } => {
				let mut response = Self::new(url, 0, "");
				response.data = Value::String(message);
				response
			}
		}
	}

	/// Resolved local by name, once view loading completed.
	pub fn local(&self, name: &str) -> Option<&Value> {
		self.locals.as_ref()?.get(name)
	}

	/// Applies a fresh data-only response onto this one in place.
	///
	/// Every data field is taken from `fresh`. The event channel keeps its
	/// subscribers, and locals and template survive when the fresh response
	/// carries none, so a mounted view keeps its resolved dependencies
	/// across a data refresh.
	pub fn merge_update(&mut self, fresh: Response) {
		self.url = fresh.url;
		self.status = fresh.status;
		self.status_text = fresh.status_text;
		self.headers = fresh.headers;
		self.request = fresh.request;
		self.media_type = fresh.media_type;
		self.data = fresh.data;
		self.view = fresh.view;
		if fresh.locals.is_some() {
			self.locals = fresh.locals;
		}
		if fresh.template.is_some() {
			self.template = fresh.template;
		}
		self.route_data_update = fresh.route_data_update;
		self.route_error = fresh.route_error;
	}

	/// Registers a listener on this response's channel.
	pub fn on<F>(&self, name: &str, listener: F) -> Subscription
	where
		F: Fn(&mut RouteEvent, &EventPayload) + Send + Sync + 'static,
	{
		self.events.on(name, listener)
	}

	/// Broadcasts on this response's channel.
	pub fn broadcast(&self, name: &str, payload: EventPayload) -> RouteEvent {
		self.events.broadcast(name, payload)
	}

	/// The response's event channel.
	pub fn events(&self) -> &EventChannel {
		&self.events
	}

	/// Attaches the router capability. Called when this response becomes
	/// current.
	pub fn attach_router(&mut self, router: Arc<dyn RouterHandle>) {
		self.router = Some(router);
	}

	/// Reloads this route through the attached router. No-op before the
	/// response became current.
	pub async fn reload(&self, force_reload: bool) {
		if let Some(router) = &self.router {
			router.reload(force_reload).await;
		}
	}

	/// Navigates through the attached router. No-op before the response
	/// became current.
	pub async fn navigate(&self, path: &str) {
		if let Some(router) = &self.router {
			router.navigate(path).await;
		}
	}
}

impl fmt::Debug for Response {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Response")
			.field("url", &self.url)
			.field("status", &self.status)
			.field("status_text", &self.status_text)
			.field("media_type", &self.media_type)
			.field("has_view", &self.view.is_some())
			.field("has_locals", &self.locals.is_some())
			.field("route_data_update", &self.route_data_update)
			.field("route_error", &self.route_error)
			.finish_non_exhaustive()
	}
}
