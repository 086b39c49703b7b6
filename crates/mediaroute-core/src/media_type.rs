//! Media type normalization.
//!
//! All dispatch keys in the router are normalized `main/sub` media types:
//! suffix (`+json`) and parameter (`;charset=...`) segments are stripped, and
//! a bare subtype is understood as `application/<subtype>`.

/// Normalizes a raw media type into its dispatch form.
///
/// `None` or an empty string yields `None`. Otherwise everything from the
/// first `+` or `;` onward is dropped, together with whitespace immediately
/// before it, and a value without `/` gets an `application/` prefix.
///
/// # Examples
///
/// ```
/// use mediaroute_core::normalize_media_type;
///
/// assert_eq!(normalize_media_type(Some("json")), Some("application/json".to_string()));
/// assert_eq!(normalize_media_type(Some("application/hal+json")), Some("application/hal".to_string()));
/// assert_eq!(normalize_media_type(None), None);
/// ```
pub fn normalize_media_type(raw: Option<&str>) -> Option<String> {
	let raw = raw?;
	if raw.is_empty() {
		return None;
	}

	let stripped = match raw.find(['+', ';']) {
		Some(idx) => raw[..idx].trim_end(),
		None => raw,
	};

	if stripped.contains('/') {
		Some(stripped.to_string())
	} else {
		Some(format!("application/{stripped}"))
	}
}
