//! Template caching.
//!
//! Fetched template bodies are cached keyed on the resolved absolute URL
//! string, so navigation and prefetch share one store. Entries are treated
//! as immutable once stored; a concurrent double-fetch simply writes the
//! same content twice.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Store of fetched template bodies keyed on the absolute URL.
pub trait TemplateCache: Send + Sync {
	/// Returns the cached body for `url`, if any.
	fn get(&self, url: &str) -> Option<String>;

	/// Stores the body for `url`, replacing any previous entry.
	fn put(&self, url: &str, content: String);
}

/// In-memory [`TemplateCache`].
///
/// # Examples
///
/// ```
/// use mediaroute_core::{MemoryTemplateCache, TemplateCache};
///
/// let cache = MemoryTemplateCache::new();
/// cache.put("/templates/cart.html", "<div>cart</div>".to_string());
/// assert_eq!(cache.get("/templates/cart.html"), Some("<div>cart</div>".to_string()));
/// assert_eq!(cache.get("/templates/other.html"), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTemplateCache {
	entries: RwLock<HashMap<String, String>>,
}

impl MemoryTemplateCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of cached templates.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns whether the cache is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl TemplateCache for MemoryTemplateCache {
	fn get(&self, url: &str) -> Option<String> {
		self.entries.read().get(url).cloned()
	}

	fn put(&self, url: &str, content: String) {
		self.entries.write().insert(url.to_string(), content);
	}
}
