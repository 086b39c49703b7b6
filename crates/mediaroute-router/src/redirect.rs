//! Path rewrites applied before any loading happens.

use mediaroute_match::PatternMap;

/// Table of view path rewrites.
///
/// Consulted with the location path at the start of every reload; a hit
/// replaces the location with the target and skips loading entirely, so
/// redirects never cost a network round trip. Typical use is sending the
/// empty home path to an entry resource.
#[derive(Debug, Default)]
pub struct RedirectMap {
	targets: PatternMap<String>,
}

impl RedirectMap {
	/// Empty table.
	pub fn new() -> Self {
		Self {
			targets: PatternMap::new(),
		}
	}

	/// Registers a rewrite of `path` to `target`. `path` may carry `*`
	/// and `?` wildcards; the target is always used verbatim.
	pub fn add(&mut self, path: &str, target: impl Into<String>) {
		self.targets.insert(path, target.into());
	}

	/// Registers a rewrite guarded by a predicate over view paths.
	pub fn add_matcher<F>(&mut self, predicate: F, target: impl Into<String>)
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.targets.insert_predicate(predicate, target.into());
	}

	/// Rewrite target for `path`, if any entry matches.
	pub fn lookup(&self, path: &str) -> Option<&str> {
		self.targets.lookup(path).map(String::as_str)
	}

	/// Whether the table has no entries.
	pub fn is_empty(&self) -> bool {
		self.targets.is_empty()
	}
}
