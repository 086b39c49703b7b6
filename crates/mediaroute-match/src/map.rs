//! The pattern map itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::glob::GlobPattern;

/// Predicate key: an arbitrary test over the lookup key.
pub type PredicateFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One entry in the ordered fallback list.
enum Matcher {
	Glob(GlobPattern),
	Predicate(PredicateFn),
}

impl Matcher {
	fn test(&self, key: &str) -> bool {
		match self {
			Matcher::Glob(glob) => glob.is_match(key),
			Matcher::Predicate(pred) => pred(key),
		}
	}
}

impl fmt::Debug for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Matcher::Glob(glob) => write!(f, "Glob({})", glob),
			Matcher::Predicate(_) => write!(f, "Predicate"),
		}
	}
}

/// Ordered pattern registry.
///
/// Exact string keys live in a hash map (last write wins); glob and
/// predicate keys form an ordered list scanned front-to-back when no
/// exact entry matches. Absence is a normal outcome, never an error.
pub struct PatternMap<T> {
	exact: HashMap<String, T>,
	ordered: Vec<(Matcher, T)>,
}

impl<T> PatternMap<T> {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self {
			exact: HashMap::new(),
			ordered: Vec::new(),
		}
	}

	/// Registers a string key.
	///
	/// Keys containing `*` or `?` are compiled as globs and appended to
	/// the ordered fallback list; anything else becomes an exact entry,
	/// silently replacing a previous entry under the same key.
	pub fn insert(&mut self, key: &str, value: T) {
		if GlobPattern::is_glob(key) {
			self.ordered.push((Matcher::Glob(GlobPattern::new(key)), value));
		} else {
			self.exact.insert(key.to_string(), value);
		}
	}

	/// Registers a predicate key, appended to the ordered fallback list.
	pub fn insert_predicate<F>(&mut self, predicate: F, value: T)
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.ordered.push((Matcher::Predicate(Arc::new(predicate)), value));
	}

	/// Looks up a key.
	///
	/// Exact entries take precedence regardless of registration order;
	/// otherwise the ordered list is scanned and the first hit wins.
	pub fn lookup(&self, key: &str) -> Option<&T> {
		if let Some(value) = self.exact.get(key) {
			return Some(value);
		}
		self.ordered
			.iter()
			.find(|(matcher, _)| matcher.test(key))
			.map(|(_, value)| value)
	}

	/// Returns whether an exact entry exists for `key`.
	pub fn contains_exact(&self, key: &str) -> bool {
		self.exact.contains_key(key)
	}

	/// Total number of registered entries.
	pub fn len(&self) -> usize {
		self.exact.len() + self.ordered.len()
	}

	/// Returns whether the map holds no entries.
	pub fn is_empty(&self) -> bool {
		self.exact.is_empty() && self.ordered.is_empty()
	}
}

impl<T> Default for PatternMap<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for PatternMap<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PatternMap")
			.field("exact_keys", &self.exact.keys().collect::<Vec<_>>())
			.field("ordered", &self.ordered.iter().map(|(m, _)| m).collect::<Vec<_>>())
			.finish()
	}
}
