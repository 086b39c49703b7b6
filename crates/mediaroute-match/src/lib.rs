//! Ordered pattern registry for string dispatch keys.
//!
//! `PatternMap` maps keys to payloads three ways: exact strings, glob
//! patterns (`*`/`?`), and arbitrary predicate functions. Exact entries
//! always win; glob and predicate entries are tried in registration order.
//!
//! The map was built for media-type dispatch (`"application/json"`,
//! `"application/*"`, `"*+json"`) but carries no media-type knowledge of
//! its own — keys are opaque strings.
//!
//! # Example
//!
//! ```
//! use mediaroute_match::PatternMap;
//!
//! let mut map = PatternMap::new();
//! map.insert("application/*", "wildcard");
//! map.insert("application/json", "exact");
//!
//! // Exact entries take precedence regardless of registration order.
//! assert_eq!(map.lookup("application/json"), Some(&"exact"));
//! assert_eq!(map.lookup("application/xml"), Some(&"wildcard"));
//! assert_eq!(map.lookup("text/plain"), None);
//! ```

#![warn(missing_docs)]

mod glob;
mod map;

pub use glob::GlobPattern;
pub use map::{PatternMap, PredicateFn};
