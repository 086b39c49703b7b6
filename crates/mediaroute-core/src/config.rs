//! View configuration: the raw spec, its parsed form and the merge policy.
//!
//! [`ViewSpec`] is what callers build; [`ViewConfig`] is the validated,
//! immutable form the registry stores. Parsing happens once, at
//! registration, so configuration mistakes fail loudly at startup instead
//! of surfacing mid-navigation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde_json::Value;

use crate::error::ConfigError;
use crate::resolve::{ResolveArgs, ResolveFuture};
use crate::response::Response;

/// `Name` or `Name as alias`.
static CONTROLLER_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^(\S+)(\s+as\s+(\w+))?$").expect("controller pattern is a valid regex"));

/// A template or template URL, given literally or as a function of the
/// matched media type.
#[derive(Clone)]
pub enum TemplateValue {
	/// Literal value.
	Text(String),
	/// Computed per media type.
	Fn(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl TemplateValue {
	/// Resolves the value for a concrete media type.
	pub fn resolve(&self, media_type: &str) -> String {
		match self {
			TemplateValue::Text(text) => text.clone(),
			TemplateValue::Fn(f) => f(media_type),
		}
	}
}

impl From<&str> for TemplateValue {
	fn from(text: &str) -> Self {
		TemplateValue::Text(text.to_string())
	}
}

impl From<String> for TemplateValue {
	fn from(text: String) -> Self {
		TemplateValue::Text(text)
	}
}

impl fmt::Debug for TemplateValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TemplateValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
			TemplateValue::Fn(_) => f.write_str("Fn"),
		}
	}
}

/// Async factory computing a resolve value from the built-in inputs.
pub type ResolveFactory = Arc<dyn Fn(ResolveArgs) -> ResolveFuture + Send + Sync>;

/// Function applied to the raw loaded response before view loading.
pub type TransformFn = Arc<dyn Fn(&mut Response) + Send + Sync>;

/// A dependency to compute before a view is ready.
#[derive(Clone)]
pub enum Resolve {
	/// A name looked up through the injected dependency resolver.
	Reference(String),
	/// An async factory invoked with the built-in locals as inputs.
	Factory(ResolveFactory),
}

impl fmt::Debug for Resolve {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Resolve::Reference(name) => f.debug_tuple("Reference").field(name).finish(),
			Resolve::Factory(_) => f.write_str("Factory"),
		}
	}
}

/// Raw, caller-facing view configuration.
///
/// Chainable; parsed into a [`ViewConfig`] at registration. The parsed form
/// owns its data, so reusing or mutating the spec afterwards cannot affect
/// what the registry matched.
#[derive(Clone, Default)]
pub struct ViewSpec {
	template: Option<TemplateValue>,
	template_url: Option<TemplateValue>,
	controller: Option<String>,
	controller_as: Option<String>,
	data_as: Option<String>,
	response_as: Option<String>,
	resolve: HashMap<String, Resolve>,
	transform_response: Option<TransformFn>,
}

impl ViewSpec {
	/// Empty spec.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the inline template. Wins over `template_url` when both are set.
	pub fn template(mut self, template: impl Into<TemplateValue>) -> Self {
		self.template = Some(template.into());
		self
	}

	/// Sets the inline template as a function of the matched media type.
	pub fn template_fn<F>(mut self, template: F) -> Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.template = Some(TemplateValue::Fn(Arc::new(template)));
		self
	}

	/// Sets the template URL.
	pub fn template_url(mut self, url: impl Into<TemplateValue>) -> Self {
		self.template_url = Some(url.into());
		self
	}

	/// Sets the template URL as a function of the matched media type.
	pub fn template_url_fn<F>(mut self, url: F) -> Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.template_url = Some(TemplateValue::Fn(Arc::new(url)));
		self
	}

	/// Sets the controller name. The `"Name as alias"` form also sets the
	/// alias; combining it with [`controller_as`](Self::controller_as) is a
	/// configuration error.
	pub fn controller(mut self, controller: impl Into<String>) -> Self {
		self.controller = Some(controller.into());
		self
	}

	/// Sets the controller alias.
	pub fn controller_as(mut self, alias: impl Into<String>) -> Self {
		self.controller_as = Some(alias.into());
		self
	}

	/// Name the loaded data is published under.
	pub fn data_as(mut self, alias: impl Into<String>) -> Self {
		self.data_as = Some(alias.into());
		self
	}

	/// Name the response is published under.
	pub fn response_as(mut self, alias: impl Into<String>) -> Self {
		self.response_as = Some(alias.into());
		self
	}

	/// Declares a dependency to resolve before the view is ready.
	pub fn resolve(mut self, name: impl Into<String>, resolve: Resolve) -> Self {
		self.resolve.insert(name.into(), resolve);
		self
	}

	/// Declares a dependency resolved by name through the injected resolver.
	pub fn resolve_ref(self, name: impl Into<String>, target: impl Into<String>) -> Self {
		self.resolve(name, Resolve::Reference(target.into()))
	}

	/// Declares a dependency computed by an async factory.
	pub fn resolve_factory<F, Fut>(self, name: impl Into<String>, factory: F) -> Self
	where
		F: Fn(ResolveArgs) -> Fut + Send + Sync + 'static,
		Fut: std::future::Future<Output = Result<Value, crate::error::ResolveError>> + Send + 'static,
	{
		let factory: ResolveFactory =
			Arc::new(move |args: ResolveArgs| -> ResolveFuture { Box::pin(factory(args)) });
		self.resolve(name, Resolve::Factory(factory))
	}

	/// Function run on the raw loaded response; it may replace `data`,
	/// `media_type` and other fields before the view loads.
	pub fn transform_response<F>(mut self, transform: F) -> Self
	where
		F: Fn(&mut Response) + Send + Sync + 'static,
	{
		self.transform_response = Some(Arc::new(transform));
		self
	}

	/// Parses and validates the spec, consuming it.
	///
	/// Splits a `"Name as alias"` controller string into name and alias.
	/// An empty controller string counts as absent.
	pub fn parse(self) -> Result<ViewConfig, ConfigError> {
		let mut controller = self.controller;
		let mut controller_as = self.controller_as;

		if let Some(raw) = controller.take().filter(|raw| !raw.is_empty()) {
			let captures = CONTROLLER_PATTERN
				.captures(&raw)
				.ok_or_else(|| ConfigError::MalformedController(raw.clone()))?;

			let alias = captures.get(3).map(|m| m.as_str().to_string());
			if alias.is_some() && controller_as.is_some() {
				return Err(ConfigError::ConflictingControllerAlias(raw.clone()));
			}
			if alias.is_some() {
				controller_as = alias;
			}
			controller = captures.get(1).map(|m| m.as_str().to_string());
		}

		Ok(ViewConfig {
			template: self.template,
			template_url: self.template_url,
			resolved_template_url: OnceCell::new(),
			controller,
			controller_as,
			data_as: self.data_as,
			response_as: self.response_as,
			resolve: self.resolve,
			transform_response: self.transform_response,
		})
	}
}

impl fmt::Debug for ViewSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewSpec")
			.field("template", &self.template)
			.field("template_url", &self.template_url)
			.field("controller", &self.controller)
			.field("controller_as", &self.controller_as)
			.field("data_as", &self.data_as)
			.field("response_as", &self.response_as)
			.field("resolve", &self.resolve.keys().collect::<Vec<_>>())
			.field("has_transform", &self.transform_response.is_some())
			.finish()
	}
}

/// Parsed, validated view configuration. Immutable once built.
pub struct ViewConfig {
	template: Option<TemplateValue>,
	template_url: Option<TemplateValue>,
	// First resolution of a function-valued URL, kept for later loads.
	resolved_template_url: OnceCell<String>,
	controller: Option<String>,
	controller_as: Option<String>,
	data_as: Option<String>,
	response_as: Option<String>,
	resolve: HashMap<String, Resolve>,
	transform_response: Option<TransformFn>,
}

impl ViewConfig {
	/// Configuration with nothing set; the identity of the merge.
	pub fn empty() -> Self {
		Self {
			template: None,
			template_url: None,
			resolved_template_url: OnceCell::new(),
			controller: None,
			controller_as: None,
			data_as: None,
			response_as: None,
			resolve: HashMap::new(),
			transform_response: None,
		}
	}

	/// Copy of `self` with gaps filled from `defaults`.
	///
	/// Scalar fields keep `self`'s value when present and fall back to
	/// `defaults` otherwise; an unset field on `self` never erases a set
	/// default. `resolve` entries merge key by key with `self` winning.
	pub fn with_defaults(&self, defaults: &ViewConfig) -> ViewConfig {
		let mut resolve = defaults.resolve.clone();
		resolve.extend(self.resolve.iter().map(|(name, value)| (name.clone(), value.clone())));

		ViewConfig {
			template: self.template.clone().or_else(|| defaults.template.clone()),
			template_url: self.template_url.clone().or_else(|| defaults.template_url.clone()),
			resolved_template_url: OnceCell::new(),
			controller: self.controller.clone().or_else(|| defaults.controller.clone()),
			controller_as: self.controller_as.clone().or_else(|| defaults.controller_as.clone()),
			data_as: self.data_as.clone().or_else(|| defaults.data_as.clone()),
			response_as: self.response_as.clone().or_else(|| defaults.response_as.clone()),
			resolve,
			transform_response: self
				.transform_response
				.clone()
				.or_else(|| defaults.transform_response.clone()),
		}
	}

	/// Inline template, if configured.
	pub fn template(&self) -> Option<&TemplateValue> {
		self.template.as_ref()
	}

	/// Template URL, if configured.
	pub fn template_url(&self) -> Option<&TemplateValue> {
		self.template_url.as_ref()
	}

	/// Inline template text for `media_type`.
	pub fn template_for(&self, media_type: &str) -> Option<String> {
		self.template.as_ref().map(|value| value.resolve(media_type))
	}

	/// Template URL for `media_type`.
	///
	/// A function-valued URL is resolved once; the first resolution is
	/// kept for every later load of this view.
	pub fn template_url_for(&self, media_type: &str) -> Option<&str> {
		let value = self.template_url.as_ref()?;
		Some(
			self.resolved_template_url
				.get_or_init(|| value.resolve(media_type))
				.as_str(),
		)
	}

	/// Controller name.
	pub fn controller(&self) -> Option<&str> {
		self.controller.as_deref()
	}

	/// Controller alias.
	pub fn controller_as(&self) -> Option<&str> {
		self.controller_as.as_deref()
	}

	/// Name the loaded data is published under.
	pub fn data_as(&self) -> Option<&str> {
		self.data_as.as_deref()
	}

	/// Name the response is published under.
	pub fn response_as(&self) -> Option<&str> {
		self.response_as.as_deref()
	}

	/// Declared dependencies by name.
	pub fn resolve(&self) -> &HashMap<String, Resolve> {
		&self.resolve
	}

	/// Response transform, if configured.
	pub fn transform_response(&self) -> Option<&TransformFn> {
		self.transform_response.as_ref()
	}
}

impl fmt::Debug for ViewConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewConfig")
			.field("template", &self.template)
			.field("template_url", &self.template_url)
			.field("controller", &self.controller)
			.field("controller_as", &self.controller_as)
			.field("data_as", &self.data_as)
			.field("response_as", &self.response_as)
			.field("resolve", &self.resolve.keys().collect::<Vec<_>>())
			.field("has_transform", &self.transform_response.is_some())
			.finish()
	}
}
