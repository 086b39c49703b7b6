//! View path to API URL translation.

/// Bidirectional translation between view paths and API URLs.
///
/// The controller navigates by view path but loads data by API URL; the
/// mapper ties the two address spaces together. `map_api_url` answers
/// `None` for URLs outside the mapped space, which makes
/// [`RouteController::set_url`](crate::RouteController::set_url) a no-op
/// for foreign URLs.
pub trait ApiMapper: Send + Sync {
	/// API URL serving the data of a view path.
	fn map_view_path(&self, path: &str) -> String;

	/// View path presenting the resource at an API URL, when the URL
	/// falls inside the mapped space.
	fn map_api_url(&self, url: &str) -> Option<String>;
}

/// Mapper swapping the leading `/` of view paths for a fixed API prefix.
///
/// `/cart/42` maps to `<prefix>cart/42` and back. The prefix usually ends
/// with `/` or names an absolute base such as `https://host/api/`.
#[derive(Debug, Clone)]
pub struct PrefixApiMapper {
	api_prefix: String,
}

impl PrefixApiMapper {
	/// Mapper rooted at `api_prefix`.
	pub fn new(api_prefix: impl Into<String>) -> Self {
		Self {
			api_prefix: api_prefix.into(),
		}
	}
}

impl ApiMapper for PrefixApiMapper {
	fn map_view_path(&self, path: &str) -> String {
		let path = path.strip_prefix('/').unwrap_or(path);
		format!("{}{}", self.api_prefix, path)
	}

	fn map_api_url(&self, url: &str) -> Option<String> {
		url.strip_prefix(self.api_prefix.as_str())
			.map(|rest| format!("/{rest}"))
	}
}

/// Mapper for setups where view paths are the API URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl ApiMapper for IdentityMapper {
	fn map_view_path(&self, path: &str) -> String {
		path.to_string()
	}

	fn map_api_url(&self, url: &str) -> Option<String> {
		Some(url.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_prefix_mapper_maps_view_path_to_api_url() {
		let mapper = PrefixApiMapper::new("api/");

		assert_eq!(mapper.map_view_path("/cart/42"), "api/cart/42");
		assert_eq!(mapper.map_view_path("cart/42"), "api/cart/42");
	}

	#[test]
	fn test_prefix_mapper_maps_api_url_back_to_view_path() {
		let mapper = PrefixApiMapper::new("api/");

		assert_eq!(mapper.map_api_url("api/cart/42"), Some("/cart/42".to_string()));
	}

	#[test]
	fn test_prefix_mapper_rejects_foreign_urls() {
		let mapper = PrefixApiMapper::new("api/");

		assert_eq!(mapper.map_api_url("https://elsewhere/cart"), None);
	}

	#[test]
	fn test_prefix_mapper_round_trips_with_absolute_base() {
		let mapper = PrefixApiMapper::new("https://host/api/");

		let url = mapper.map_view_path("/orders/7");
		assert_eq!(url, "https://host/api/orders/7");
		assert_eq!(mapper.map_api_url(&url), Some("/orders/7".to_string()));
	}

	#[test]
	fn test_identity_mapper_passes_paths_through() {
		let mapper = IdentityMapper;

		assert_eq!(mapper.map_view_path("/cart"), "/cart");
		assert_eq!(mapper.map_api_url("/cart"), Some("/cart".to_string()));
	}
}
