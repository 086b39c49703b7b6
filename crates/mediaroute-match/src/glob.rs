//! Glob pattern compilation.
//!
//! Globs support two metacharacters: `*` (any run of characters, empty
//! included) and `?` (exactly one character). Everything else matches
//! literally. Patterns are anchored at both ends, so `"app*"` does not
//! match `"xapp/y"`.

use std::fmt;

/// A glob pattern compiled to an anchored regular expression.
///
/// Compiled once at registration; matching is a plain regex test.
#[derive(Debug, Clone)]
pub struct GlobPattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled anchored regex.
	regex: regex::Regex,
}

impl GlobPattern {
	/// Returns whether `key` contains a glob metacharacter.
	///
	/// Keys without one should be stored as exact entries instead.
	pub fn is_glob(key: &str) -> bool {
		key.contains('*') || key.contains('?')
	}

	/// Compiles a glob pattern.
	pub fn new(pattern: &str) -> Self {
		let regex_str = Self::compile(pattern);

		// Every metacharacter except */? is escaped above, so the
		// translated pattern is always a valid regex.
		let regex = regex::Regex::new(&regex_str).expect("escaped glob compiles to a valid regex");

		Self {
			pattern: pattern.to_string(),
			regex,
		}
	}

	/// Translates a glob into an anchored regex string.
	fn compile(pattern: &str) -> String {
		let mut regex_str = String::with_capacity(pattern.len() + 8);
		regex_str.push('^');

		for c in pattern.chars() {
			match c {
				'*' => regex_str.push_str(".*"),
				'?' => regex_str.push('.'),
				'.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
					regex_str.push('\\');
					regex_str.push(c);
				}
				_ => regex_str.push(c),
			}
		}

		regex_str.push('$');
		regex_str
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Tests a key against this pattern.
	pub fn is_match(&self, key: &str) -> bool {
		self.regex.is_match(key)
	}
}

impl PartialEq for GlobPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for GlobPattern {}

impl fmt::Display for GlobPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_is_glob() {
		assert!(GlobPattern::is_glob("application/*"));
		assert!(GlobPattern::is_glob("4??"));
		assert!(!GlobPattern::is_glob("application/json"));
	}

	#[test]
	fn test_star_matches_any_run() {
		let glob = GlobPattern::new("*+json");
		assert!(glob.is_match("application/hal+json"));
		assert!(glob.is_match("+json"));
		assert!(!glob.is_match("application/json"));
	}

	#[test]
	fn test_question_mark_matches_single_char() {
		let glob = GlobPattern::new("4??");
		assert!(glob.is_match("404"));
		assert!(glob.is_match("418"));
		assert!(!glob.is_match("40"));
		assert!(!glob.is_match("4040"));
		assert!(!glob.is_match("500"));
	}

	#[test]
	fn test_anchored_both_ends() {
		let glob = GlobPattern::new("app*");
		assert!(glob.is_match("application/json"));
		assert!(!glob.is_match("xapp/y"));

		let glob = GlobPattern::new("*json");
		assert!(!glob.is_match("application/json-patch"));
	}

	#[rstest]
	#[case("application/vnd.example", "application/vnd.example", true)]
	#[case("application/vnd.example", "application/vndXexample", false)]
	#[case("a+b", "a+b", true)]
	#[case("a+b", "aab", false)]
	fn test_metacharacters_are_literal(
		#[case] pattern: &str,
		#[case] key: &str,
		#[case] matches: bool,
	) {
		assert_eq!(GlobPattern::new(pattern).is_match(key), matches);
	}

	#[test]
	fn test_display_and_eq_use_original_pattern() {
		let glob = GlobPattern::new("application/*");
		assert_eq!(format!("{}", glob), "application/*");
		assert_eq!(glob, GlobPattern::new("application/*"));
		assert_ne!(glob, GlobPattern::new("text/*"));
	}
}
