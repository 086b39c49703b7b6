//! Router assembly.

use std::fmt;
use std::sync::Arc;

use mediaroute_core::client::{HttpClient, HttpResponse};
use mediaroute_core::config::{ViewConfig, ViewSpec};
use mediaroute_core::error::{ConfigError, RouteFailure};
use mediaroute_core::events::{EventChannel, EventPayload, RouteEvent, Subscription};
use mediaroute_core::media_type::normalize_media_type;
use mediaroute_core::registry::{ViewKey, ViewRegistry};
use mediaroute_core::resolve::{DependencyResolver, StaticResolver};
use mediaroute_core::response::Response;
use mediaroute_core::template::{MemoryTemplateCache, TemplateCache};
use url::Url;

use crate::controller::RouteController;
use crate::loader::{TypeExtractor, ViewLoader};
use crate::location::{LocationSource, MemoryLocation};
use crate::mapper::{ApiMapper, IdentityMapper, PrefixApiMapper};
use crate::redirect::RedirectMap;

/// Configures and assembles a [`Router`].
///
/// Registration happens here, matching and loading happen on the built
/// router; the split keeps every registry immutable once routing starts.
/// View configuration errors surface at the registration call: the
/// chainable methods panic, each has a fallible `try_` twin.
///
/// Collaborators default to in-memory implementations
/// ([`MemoryLocation`], [`MemoryTemplateCache`], [`StaticResolver`],
/// [`IdentityMapper`]); an HTTP client must be supplied unless the
/// `reqwest-client` feature provides the built-in one.
pub struct RouterBuilder {
	views: Vec<(ViewKey, ViewConfig)>,
	global: ViewConfig,
	redirects: RedirectMap,
	client: Option<Arc<dyn HttpClient>>,
	resolver: Arc<dyn DependencyResolver>,
	templates: Arc<dyn TemplateCache>,
	location: Arc<dyn LocationSource>,
	mapper: Arc<dyn ApiMapper>,
	type_extractor: Option<TypeExtractor>,
	template_base: Option<Url>,
	enabled: bool,
}

impl RouterBuilder {
	/// Builder with in-memory collaborators and no registered views.
	pub fn new() -> Self {
		Self {
			views: Vec::new(),
			global: ViewConfig::empty(),
			redirects: RedirectMap::new(),
			client: None,
			resolver: Arc::new(StaticResolver::new()),
			templates: Arc::new(MemoryTemplateCache::new()),
			location: Arc::new(MemoryLocation::default()),
			mapper: Arc::new(IdentityMapper),
			type_extractor: None,
			template_base: None,
			enabled: true,
		}
	}

	/// Registers a view for a media type; `*` and `?` wildcards match
	/// whole type families.
	///
	/// # Panics
	///
	/// Panics on a malformed controller expression; see
	/// [`try_when`](Self::try_when).
	pub fn when(self, media_type: &str, spec: ViewSpec) -> Self {
		match self.try_when(media_type, spec) {
			Ok(builder) => builder,
			Err(err) => panic!("invalid view for '{media_type}': {err}"),
		}
	}

	/// Fallible [`when`](Self::when).
	pub fn try_when(mut self, media_type: &str, spec: ViewSpec) -> Result<Self, ConfigError> {
		let config = spec.parse()?;
		self.views.push((ViewKey::MediaType(media_type.to_string()), config));
		Ok(self)
	}

	/// Registers a view under a predicate over normalized media types.
	///
	/// # Panics
	///
	/// Panics on a malformed controller expression; see
	/// [`try_when_matches`](Self::try_when_matches).
	pub fn when_matches<F>(self, predicate: F, spec: ViewSpec) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		match self.try_when_matches(predicate, spec) {
			Ok(builder) => builder,
			Err(err) => panic!("invalid matcher view: {err}"),
		}
	}

	/// Fallible [`when_matches`](Self::when_matches).
	pub fn try_when_matches<F>(mut self, predicate: F, spec: ViewSpec) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		let config = spec.parse()?;
		self.views.push((ViewKey::Matcher(Arc::new(predicate)), config));
		Ok(self)
	}

	/// Registers the generic error view, shown when a load fails and no
	/// status-specific error view matches.
	///
	/// # Panics
	///
	/// Panics on a malformed controller expression; see
	/// [`try_error`](Self::try_error).
	pub fn error(self, spec: ViewSpec) -> Self {
		match self.try_error(spec) {
			Ok(builder) => builder,
			Err(err) => panic!("invalid error view: {err}"),
		}
	}

	/// Fallible [`error`](Self::error).
	pub fn try_error(mut self, spec: ViewSpec) -> Result<Self, ConfigError> {
		let config = spec.parse()?;
		self.views.push((ViewKey::Error, config));
		Ok(self)
	}

	/// Registers an error view for a status; `?` wildcards match status
	/// families, e.g. `"4??"`.
	///
	/// # Panics
	///
	/// Panics on a malformed controller expression; see
	/// [`try_error_status`](Self::try_error_status).
	pub fn error_status(self, status: impl fmt::Display, spec: ViewSpec) -> Self {
		let status = status.to_string();
		match self.try_error_status(&status, spec) {
			Ok(builder) => builder,
			Err(err) => panic!("invalid error view for status '{status}': {err}"),
		}
	}

	/// Fallible [`error_status`](Self::error_status).
	pub fn try_error_status(
		mut self,
		status: impl fmt::Display,
		spec: ViewSpec,
	) -> Result<Self, ConfigError> {
		let config = spec.parse()?;
		self.views.push((ViewKey::ErrorStatus(status.to_string()), config));
		Ok(self)
	}

	/// Defaults merged under every registered view, no matter whether
	/// the view is registered before or after this call. Later calls
	/// override earlier ones field by field.
	///
	/// # Panics
	///
	/// Panics on a malformed controller expression; see
	/// [`try_global`](Self::try_global).
	pub fn global(self, spec: ViewSpec) -> Self {
		match self.try_global(spec) {
			Ok(builder) => builder,
			Err(err) => panic!("invalid global view defaults: {err}"),
		}
	}

	/// Fallible [`global`](Self::global).
	pub fn try_global(mut self, spec: ViewSpec) -> Result<Self, ConfigError> {
		let config = spec.parse()?;
		self.global = config.with_defaults(&self.global);
		Ok(self)
	}

	/// Rewrites view path `path` to `target` before anything loads;
	/// `path` may carry `*` and `?` wildcards.
	pub fn redirect(mut self, path: &str, target: impl Into<String>) -> Self {
		self.redirects.add(path, target);
		self
	}

	/// Rewrite guarded by a predicate over view paths.
	pub fn redirect_matches<F>(mut self, predicate: F, target: impl Into<String>) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.redirects.add_matcher(predicate, target);
		self
	}

	/// HTTP client used for data and template requests.
	pub fn http_client(mut self, client: impl HttpClient + 'static) -> Self {
		self.client = Some(Arc::new(client));
		self
	}

	/// Resolver answering [`Resolve::Reference`] lookups.
	///
	/// [`Resolve::Reference`]: mediaroute_core::config::Resolve::Reference
	pub fn resolver(mut self, resolver: impl DependencyResolver + 'static) -> Self {
		self.resolver = Arc::new(resolver);
		self
	}

	/// Cache backing template URL loads.
	pub fn template_cache(mut self, cache: impl TemplateCache + 'static) -> Self {
		self.templates = Arc::new(cache);
		self
	}

	/// Location the controller reads and writes.
	pub fn location(mut self, location: impl LocationSource + 'static) -> Self {
		self.location = Arc::new(location);
		self
	}

	/// Translation between view paths and API URLs.
	pub fn api_mapper(mut self, mapper: impl ApiMapper + 'static) -> Self {
		self.mapper = Arc::new(mapper);
		self
	}

	/// Shorthand for an [`ApiMapper`] that prepends `prefix` to view
	/// paths, e.g. `"api/"`.
	pub fn api_prefix(self, prefix: impl Into<String>) -> Self {
		self.api_mapper(PrefixApiMapper::new(prefix))
	}

	/// Replaces how the media type is derived from a data response. The
	/// default reads the `Content-Type` header.
	pub fn type_extractor<F>(mut self, extractor: F) -> Self
	where
		F: Fn(&HttpResponse) -> Option<String> + Send + Sync + 'static,
	{
		self.type_extractor = Some(Arc::new(extractor));
		self
	}

	/// Base URL relative template URLs are joined against.
	pub fn template_base(mut self, base: Url) -> Self {
		self.template_base = Some(base);
		self
	}

	/// Builds the router with the location-change entry points inert;
	/// programmatic reloads and navigation still work.
	pub fn disable(mut self) -> Self {
		self.enabled = false;
		self
	}

	/// Assembles the router. Global defaults are merged under every view
	/// here, which is what makes [`global`](Self::global) order
	/// independent.
	///
	/// # Panics
	///
	/// Panics when no HTTP client is configured and the `reqwest-client`
	/// feature is off.
	pub fn build(self) -> Router {
		let mut registry = ViewRegistry::new();
		for (key, config) in self.views {
			registry.register_config(key, config.with_defaults(&self.global));
		}
		let registry = Arc::new(registry);

		let client = match self.client {
			Some(client) => client,
			None => Self::fallback_client(),
		};

		let mut loader = ViewLoader::new(
			Arc::clone(&registry),
			client,
			self.resolver,
			self.templates,
		);
		if let Some(extractor) = self.type_extractor {
			loader = loader.with_type_extractor(move |response: &HttpResponse| extractor(response));
		}
		if let Some(base) = self.template_base {
			loader = loader.with_template_base(base);
		}
		let loader = Arc::new(loader);

		let controller = RouteController::new(
			Arc::clone(&loader),
			self.location,
			self.mapper,
			self.redirects,
			self.enabled,
		);

		Router {
			registry,
			loader,
			controller,
		}
	}

	#[cfg(feature = "reqwest-client")]
	fn fallback_client() -> Arc<dyn HttpClient> {
		Arc::new(mediaroute_core::client::ReqwestClient::new())
	}

	#[cfg(not(feature = "reqwest-client"))]
	fn fallback_client() -> Arc<dyn HttpClient> {
		panic!(
			"an http client is required; configure RouterBuilder::http_client or enable the reqwest-client feature"
		)
	}
}

impl Default for RouterBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for RouterBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterBuilder")
			.field("views", &self.views.len())
			.field("enabled", &self.enabled)
			.finish_non_exhaustive()
	}
}

/// An assembled router.
///
/// Thin facade over the [`ViewRegistry`], [`ViewLoader`] and
/// [`RouteController`] wired together by the builder. The router
/// performs no initial load; call [`reload`](Self::reload) once the
/// environment is ready.
pub struct Router {
	registry: Arc<ViewRegistry>,
	loader: Arc<ViewLoader>,
	controller: RouteController,
}

impl Router {
	/// Builder for a router.
	pub fn builder() -> RouterBuilder {
		RouterBuilder::new()
	}

	/// The registry the router matches views against.
	pub fn registry(&self) -> &ViewRegistry {
		&self.registry
	}

	/// The loader, for preparing detached views such as embedded
	/// fragments.
	pub fn loader(&self) -> &ViewLoader {
		&self.loader
	}

	/// Channel carrying `routeChangeStart`, `routeChangeSuccess`,
	/// `routeChangeError` and `routeUpdate` broadcasts.
	pub fn events(&self) -> &EventChannel {
		self.controller.events()
	}

	/// Subscribes to a route event; see [`EventChannel::on`].
	pub fn on<F>(&self, event: &str, listener: F) -> Subscription
	where
		F: Fn(&mut RouteEvent, &EventPayload) + Send + Sync + 'static,
	{
		self.controller.on(event, listener)
	}

	/// The current route, once a navigation completed.
	pub fn current(&self) -> Option<Response> {
		self.controller.current()
	}

	/// Loads the route for the current location; see
	/// [`RouteController::reload`].
	pub async fn reload(&self, force_reload: bool) {
		self.controller.reload(force_reload).await;
	}

	/// Navigates to a view path and loads its route.
	pub async fn navigate(&self, path: &str) {
		self.controller.navigate(path).await;
	}

	/// API URL of the current location.
	pub fn url(&self) -> String {
		self.controller.url()
	}

	/// Navigates to the view presenting an API resource URL; see
	/// [`RouteController::set_url`].
	pub async fn set_url(&self, api_url: &str, reload: bool) {
		self.controller.set_url(api_url, reload).await;
	}

	/// Forwards the environment's "location is about to change"
	/// notification; see
	/// [`RouteController::handle_location_change_start`].
	pub fn handle_location_change_start(&self, new_url: &str) -> bool {
		self.controller.handle_location_change_start(new_url)
	}

	/// Forwards the environment's "location changed" notification; see
	/// [`RouteController::handle_location_changed`].
	pub async fn handle_location_changed(&self) {
		self.controller.handle_location_changed().await;
	}

	/// Prepares a route without touching the current one; see
	/// [`ViewLoader::prepare_view`].
	pub async fn prepare_view(
		&self,
		url: &str,
		current: Option<&Response>,
		force_reload: bool,
	) -> Result<Response, RouteFailure> {
		self.loader.prepare_view(url, current, force_reload).await
	}

	/// Warms the template cache for a registered media type; see
	/// [`ViewLoader::prefetch_template`].
	pub async fn prefetch_template(&self, media_type: &str) {
		self.loader.prefetch_template(media_type).await;
	}

	/// Whether a raw media type has a registered view.
	pub fn is_known_type(&self, media_type: &str) -> bool {
		self.registry.is_known_type(media_type)
	}

	/// Matched view for an already-normalized media type.
	pub fn match_type(&self, media_type: &str) -> Option<Arc<ViewConfig>> {
		self.registry.match_type(media_type)
	}

	/// Normalizes a media type; see [`normalize_media_type`].
	pub fn normalize_media_type(raw: Option<&str>) -> Option<String> {
		normalize_media_type(raw)
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("views", &self.registry.len())
			.finish_non_exhaustive()
	}
}
