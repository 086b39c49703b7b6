//! The view loading pipeline: data, view match, locals and template.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};
use mediaroute_core::client::{HttpClient, HttpResponse};
use mediaroute_core::config::{Resolve, ViewConfig};
use mediaroute_core::error::{ResolveError, RouteFailure, RouteFailureKind};
use mediaroute_core::media_type::normalize_media_type;
use mediaroute_core::registry::{error_type_for, ViewRegistry, ERROR_TYPE};
use mediaroute_core::resolve::{DependencyResolver, ResolveArgs};
use mediaroute_core::response::{Response, LOCAL_DATA, LOCAL_DATA_TYPE, LOCAL_DATA_URL};
use mediaroute_core::template::TemplateCache;
use serde_json::Value;
use url::Url;

/// Media type assumed when the response declares none.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Reserved local under which the template joins the resolution step. It
/// is lifted onto the response afterwards and never reaches the locals
/// map.
const TEMPLATE_LOCAL: &str = "$template";

/// Extracts the media type to route on from a data response.
pub type TypeExtractor = Arc<dyn Fn(&HttpResponse) -> Option<String> + Send + Sync>;

/// Loads routes: fetches data, matches the view for its media type and
/// resolves everything the view needs to render.
///
/// The loader is stateless between calls; all caching lives in the
/// [`TemplateCache`] and in the memoized template URLs of the registered
/// views. It never touches the current route, so it can prepare detached
/// views (previews, embedded fragments) as well as main-route loads.
pub struct ViewLoader {
	registry: Arc<ViewRegistry>,
	client: Arc<dyn HttpClient>,
	resolver: Arc<dyn DependencyResolver>,
	templates: Arc<dyn TemplateCache>,
	type_extractor: TypeExtractor,
	template_base: Option<Url>,
}

impl ViewLoader {
	/// Loader reading the media type from the `Content-Type` header and
	/// using template URLs as given.
	pub fn new(
		registry: Arc<ViewRegistry>,
		client: Arc<dyn HttpClient>,
		resolver: Arc<dyn DependencyResolver>,
		templates: Arc<dyn TemplateCache>,
	) -> Self {
		Self {
			registry,
			client,
			resolver,
			templates,
			type_extractor: Arc::new(|response: &HttpResponse| {
				response.content_type().map(str::to_string)
			}),
			template_base: None,
		}
	}

	/// Replaces how the media type is derived from a data response.
	pub fn with_type_extractor<F>(mut self, extractor: F) -> Self
	where
		F: Fn(&HttpResponse) -> Option<String> + Send + Sync + 'static,
	{
		self.type_extractor = Arc::new(extractor);
		self
	}

	/// Base URL that relative template URLs are joined against.
	pub fn with_template_base(mut self, base: Url) -> Self {
		self.template_base = Some(base);
		self
	}

	/// Prepares the route for `url`.
	///
	/// Loads the data, matches a view for its media type and resolves the
	/// view's locals and template. When `current` matches the loaded data
	/// by URL and media type and `force_reload` is unset, view loading is
	/// skipped and the response comes back with `route_data_update` set,
	/// telling the consumer to refresh data in place.
	///
	/// Any failure falls back to the registered error views before it is
	/// returned: first `$error_<status>`, then `$error`. A matched error
	/// view goes through regular view loading with `route_error` set and
	/// comes back as `Ok`; a failure without an error view, or an error
	/// view that itself fails to load, is returned as `Err`.
	pub async fn prepare_view(
		&self,
		url: &str,
		current: Option<&Response>,
		force_reload: bool,
	) -> Result<Response, RouteFailure> {
		match self.prepare_inner(url, current, force_reload).await {
			Ok(response) => Ok(response),
			Err(failure) => self.load_error_view(failure).await,
		}
	}

	/// Eagerly loads the template of the view registered for
	/// `media_type`, so the first navigation to such a resource skips the
	/// template round trip. Failures are logged and swallowed.
	///
	/// The type is matched as given; pass it through
	/// [`normalize_media_type`] when it comes from an outside source.
	pub async fn prefetch_template(&self, media_type: &str) {
		match self.registry.match_type(media_type) {
			Some(view) => {
				tracing::debug!(media_type, "prefetching template");
				if let Err(err) = self.load_template(&view, media_type).await {
					tracing::debug!(media_type, error = %err, "template prefetch failed");
				}
			}
			None => {
				tracing::debug!(media_type, "cannot prefetch template, type is not registered");
			}
		}
	}

	async fn prepare_inner(
		&self,
		url: &str,
		current: Option<&Response>,
		force_reload: bool,
	) -> Result<Response, RouteFailure> {
		let mut next = self.load_data(url).await?;

		if !force_reload && current.is_some_and(|current| is_same_view(current, &next)) {
			tracing::debug!(url, "same view matched, updating data only");
			next.route_data_update = true;
			return Ok(next);
		}

		self.load_view(next).await
	}

	/// Fetches `url` and matches a view for the media type of the result.
	async fn load_data(&self, url: &str) -> Result<Response, RouteFailure> {
		tracing::debug!(url, "loading resource data");
		let http = match self.client.get(url).await {
			Ok(http) => http,
			Err(err) => {
				tracing::debug!(url, error = %err, "data request failed");
				return Err(RouteFailure::from(err));
			}
		};

		let media_type = normalize_media_type((self.type_extractor)(&http).as_deref())
			.unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

		let Some(view) = self.registry.match_type(&media_type) else {
			tracing::debug!(url, media_type = %media_type, "no view registered for media type");
			return Err(RouteFailure::new(
				Response::application_error(url, format!("Unknown content type {media_type}")),
				RouteFailureKind::UnknownMediaType,
			));
		};

		let mut response = Response::from_http(http);
		response.media_type = Some(media_type);
		response.view = Some(view.clone());

		if let Some(transform) = view.transform_response() {
			transform(&mut response);
		}

		Ok(response)
	}

	/// Resolves the locals and template of the matched view, all
	/// concurrently; the first failure cancels the rest.
	async fn load_view(&self, mut response: Response) -> Result<Response, RouteFailure> {
		let Some(view) = response.view.clone() else {
			return Ok(response);
		};
		let media_type = response.media_type.clone().unwrap_or_default();

		let args = ResolveArgs::for_response(&response);
		let mut names: Vec<String> = Vec::with_capacity(view.resolve().len() + 1);
		let mut pending: Vec<BoxFuture<'_, Result<Value, ResolveError>>> =
			Vec::with_capacity(view.resolve().len() + 1);

		for (name, resolve) in view.resolve() {
			names.push(name.clone());
			pending.push(match resolve {
				Resolve::Reference(target) => {
					let resolver = Arc::clone(&self.resolver);
					let target = target.clone();
					Box::pin(async move { resolver.resolve(&target).await })
				}
				Resolve::Factory(factory) => factory(args.clone()),
			});
		}

		// The template rides along under a reserved name, with absence
		// encoded as null.
		names.push(TEMPLATE_LOCAL.to_string());
		pending.push(Box::pin(async {
			let template = self.load_template(&view, &media_type).await?;
			Ok(template.map_or(Value::Null, Value::String))
		}));

		let resolved = match try_join_all(pending).await {
			Ok(resolved) => resolved,
			Err(err) => {
				tracing::warn!(media_type = %media_type, error = %err, "failed to resolve view");
				return Err(RouteFailure::new(
					Response::application_error(
						&response.url,
						format!("Failed to resolve view {media_type}"),
					),
					RouteFailureKind::ResolveFailed,
				));
			}
		};

		let mut locals: HashMap<String, Value> = HashMap::with_capacity(resolved.len() + 2);
		locals.insert(LOCAL_DATA.to_string(), response.data.clone());
		locals.insert(
			LOCAL_DATA_TYPE.to_string(),
			response.media_type.clone().map_or(Value::Null, Value::String),
		);
		locals.insert(LOCAL_DATA_URL.to_string(), Value::String(response.url.clone()));

		for (name, value) in names.into_iter().zip(resolved) {
			if name == TEMPLATE_LOCAL {
				if let Value::String(template) = value {
					response.template = Some(template);
				}
				continue;
			}
			locals.insert(name, value);
		}

		response.locals = Some(locals);
		Ok(response)
	}

	/// Routes a failure to the error views: `$error_<status>` first, the
	/// generic `$error` second. With no match the failure propagates. The
	/// response's type becomes whichever key matched, so the generic view
	/// sees the stable `$error` rather than a per-status value.
	async fn load_error_view(&self, failure: RouteFailure) -> Result<Response, RouteFailure> {
		let RouteFailure { mut response, kind } = failure;

		let error_type = error_type_for(response.status);
		let matched = match self.registry.match_type(&error_type) {
			Some(view) => Some((error_type, view)),
			None => self
				.registry
				.match_type(ERROR_TYPE)
				.map(|view| (ERROR_TYPE.to_string(), view)),
		};

		let Some((error_type, view)) = matched else {
			tracing::debug!(status = response.status, "no error view registered, propagating failure");
			return Err(RouteFailure::new(response, kind));
		};

		tracing::warn!(url = %response.url, status = response.status, error_type = %error_type, "showing error view");
		response.media_type = Some(error_type);
		response.view = Some(view);
		response.route_error = true;
		self.load_view(response).await
	}

	/// Template text for a view: inline template first, then the
	/// template URL through the cache.
	async fn load_template(
		&self,
		view: &Arc<ViewConfig>,
		media_type: &str,
	) -> Result<Option<String>, ResolveError> {
		if let Some(template) = view.template_for(media_type) {
			return Ok(Some(template));
		}

		let Some(template_url) = view.template_url_for(media_type) else {
			return Ok(None);
		};
		let url = self.absolute_template_url(template_url)?;

		if let Some(cached) = self.templates.get(&url) {
			tracing::debug!(url = %url, "template cache hit");
			return Ok(Some(cached));
		}

		tracing::debug!(url = %url, "fetching template");
		let http = self
			.client
			.get(&url)
			.await
			.map_err(|err| ResolveError::new(TEMPLATE_LOCAL, err.to_string()))?;
		let template = match http.data {
			Value::String(text) => text,
			other => other.to_string(),
		};
		self.templates.put(&url, template.clone());
		Ok(Some(template))
	}

	fn absolute_template_url(&self, template_url: &str) -> Result<String, ResolveError> {
		match &self.template_base {
			Some(base) => base
				.join(template_url)
				.map(|url| url.to_string())
				.map_err(|err| {
					ResolveError::new(
						TEMPLATE_LOCAL,
						format!("invalid template url '{template_url}': {err}"),
					)
				}),
			None => Ok(template_url.to_string()),
		}
	}
}

/// A data-only refresh applies when the resource and its type are
/// unchanged, so the mounted view can stay.
fn is_same_view(current: &Response, next: &Response) -> bool {
	current.url == next.url && current.media_type == next.media_type
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_same_view_requires_matching_url_and_type() {
		let mut current = Response::new("/api/cart/1", 200, "OK");
		current.media_type = Some("application/x.cart".to_string());

		let mut next = current.clone();
		assert!(is_same_view(&current, &next));

		next.url = "/api/cart/2".to_string();
		assert!(!is_same_view(&current, &next));

		next.url = current.url.clone();
		next.media_type = Some("application/x.order".to_string());
		assert!(!is_same_view(&current, &next));
	}

	#[test]
	fn test_absolute_template_url_joins_against_base() {
		let registry = Arc::new(ViewRegistry::new());
		let loader = ViewLoader::new(
			registry,
			Arc::new(NoClient),
			Arc::new(mediaroute_core::resolve::StaticResolver::new()),
			Arc::new(mediaroute_core::template::MemoryTemplateCache::new()),
		)
		.with_template_base(Url::parse("https://host/assets/").unwrap());

		assert_eq!(
			loader.absolute_template_url("cart.html").unwrap(),
			"https://host/assets/cart.html"
		);
		assert_eq!(
			loader.absolute_template_url("https://cdn/other.html").unwrap(),
			"https://cdn/other.html"
		);
	}

	#[test]
	fn test_template_urls_pass_through_without_base() {
		let registry = Arc::new(ViewRegistry::new());
		let loader = ViewLoader::new(
			registry,
			Arc::new(NoClient),
			Arc::new(mediaroute_core::resolve::StaticResolver::new()),
			Arc::new(mediaroute_core::template::MemoryTemplateCache::new()),
		);

		assert_eq!(loader.absolute_template_url("cart.html").unwrap(), "cart.html");
	}

	struct NoClient;

	#[async_trait::async_trait]
	impl HttpClient for NoClient {
		async fn get(&self, url: &str) -> Result<HttpResponse, mediaroute_core::error::HttpError> {
			Err(mediaroute_core::error::HttpError::Transport {
				url: url.to_string(),
				message: "no transport".to_string(),
			})
		}
	}
}
