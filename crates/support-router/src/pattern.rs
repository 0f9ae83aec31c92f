//! Route path patterns.
//!
//! A route path is matched against the path portion of a URL only. Anything
//! from the first `?` on is a query marker (e.g. `/agent/ticket?ticket=`) and is
//! stripped before compilation, leaving the *base pattern*.
//!
//! Supported syntax:
//! - `/agent/tickets` - Exact match
//! - `/agent/ticket/{ticket}` - One embedded parameter capturing a single
//!   path segment
//!
//! Embedded parameter values are percent-encoded when a path is built and
//! decoded when one is matched, so a value may contain `/`, `?` or `%`.

use crate::error::RouterError;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Bytes escaped in an embedded parameter: all but the RFC 3986 unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~');

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a route pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// A compiled, exact-match route path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The pattern as configured, including any query marker.
	raw: String,
	/// The pattern with the query marker removed.
	base: String,
	regex: regex::Regex,
	/// Name of the embedded parameter, if any.
	param: Option<String>,
}

impl PathPattern {
	/// Compiles a route path.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if the pattern is too long, has
	/// too many segments, embeds more than one parameter, or has a malformed
	/// parameter marker.
	pub fn new(pattern: &str) -> Result<Self, RouterError> {
		let invalid = |reason: String| RouterError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		};

		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let base = base_path(pattern);
		let segment_count = base.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(invalid(format!(
				"{} path segments, exceeding maximum of {}",
				segment_count, MAX_PATH_SEGMENTS
			)));
		}

		let (regex_str, param) = compile(base).map_err(invalid)?;
		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| invalid(format!("failed to compile regex: {}", e)))?;

		Ok(Self {
			raw: pattern.to_string(),
			base: base.to_string(),
			regex,
			param,
		})
	}

	/// Returns the pattern as configured.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// Returns the pattern with any query marker removed.
	pub fn base(&self) -> &str {
		&self.base
	}

	/// Returns the name of the embedded parameter.
	pub fn param_name(&self) -> Option<&str> {
		self.param.as_deref()
	}

	/// Checks whether `path` matches this pattern exactly.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Matches `path`, returning the decoded embedded parameter if any.
	///
	/// The outer `Option` is the match result; the inner one is the capture.
	pub fn matches(&self, path: &str) -> Option<Option<(String, String)>> {
		let caps = self.regex.captures(path)?;
		Some(self.param.as_ref().and_then(|name| {
			caps.name(name).map(|m| {
				let value = percent_decode_str(m.as_str()).decode_utf8_lossy();
				(name.clone(), value.into_owned())
			})
		}))
	}

	/// Builds a concrete path, filling the embedded parameter via `lookup`.
	///
	/// Returns `None` if the pattern has a parameter and `lookup` yields no
	/// value, or an empty one, for it.
	pub fn reverse<'a, F>(&self, lookup: F) -> Option<String>
	where
		F: FnOnce(&str) -> Option<&'a str>,
	{
		match &self.param {
			None => Some(self.base.clone()),
			Some(name) => {
				let value = lookup(name).filter(|value| !value.is_empty())?;
				let encoded = utf8_percent_encode(value, SEGMENT).to_string();
				Some(self.base.replace(&format!("{{{}}}", name), &encoded))
			}
		}
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}

impl Eq for PathPattern {}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}

/// Strips the query-marker suffix from a route path.
pub fn base_path(pattern: &str) -> &str {
	pattern.split_once('?').map_or(pattern, |(base, _)| base)
}

/// Compiles a base pattern into an anchored regex, returning the parameter name.
fn compile(base: &str) -> Result<(String, Option<String>), String> {
	let mut regex_str = String::from("^");
	let mut param: Option<String> = None;
	let mut rest = base;

	while let Some(start) = rest.find('{') {
		regex_str.push_str(&regex::escape(&rest[..start]));
		let after = &rest[start + 1..];
		let end = after
			.find('}')
			.ok_or_else(|| "unterminated parameter marker".to_string())?;
		let name = &after[..end];

		if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
			return Err(format!("invalid parameter name '{}'", name));
		}
		if param.is_some() {
			return Err("at most one parameter marker is supported".to_string());
		}

		regex_str.push_str(&format!("(?P<{}>[^/]+)", name));
		param = Some(name.to_string());
		rest = &after[end + 1..];
	}

	if rest.contains('}') {
		return Err("unmatched '}' in pattern".to_string());
	}
	regex_str.push_str(&regex::escape(rest));
	regex_str.push('$');
	Ok((regex_str, param))
}
