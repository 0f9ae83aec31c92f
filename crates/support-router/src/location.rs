//! Browser-style location (path + query string).

use std::fmt;

/// The path and query components of the current URL.
///
/// The query is stored without its leading `?`. A URL ending in a bare `?`
/// carries no query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
	path: String,
	query: Option<String>,
}

impl Location {
	/// Creates a location from its parts.
	pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
		let path = path.into();
		Self {
			path: if path.is_empty() { "/".to_string() } else { path },
			query: query
				.map(|q| q.trim_start_matches('?').to_string())
				.filter(|q| !q.is_empty()),
		}
	}

	/// Splits a URL (`/path?query#fragment`) into a location.
	///
	/// The fragment, if any, is discarded.
	pub fn parse(url: &str) -> Self {
		let url = url.split_once('#').map_or(url, |(head, _)| head);
		match url.split_once('?') {
			Some((path, query)) => Self::new(path, Some(query.to_string())),
			None => Self::new(url, None),
		}
	}

	/// Returns the path component.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the query string without the leading `?`.
	pub fn query(&self) -> Option<&str> {
		self.query.as_deref()
	}

	/// Returns the URL this location represents.
	pub fn href(&self) -> String {
		match &self.query {
			Some(query) => format!("{}?{}", self.path, query),
			None => self.path.clone(),
		}
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.href())
	}
}

impl From<&str> for Location {
	fn from(url: &str) -> Self {
		Self::parse(url)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/agent/tickets", "/agent/tickets", None)]
	#[case("/agent/ticket?ticket=ISS-1", "/agent/ticket", Some("ticket=ISS-1"))]
	#[case("/agent/tickets?", "/agent/tickets", None)]
	#[case("/agent?key=abc#top", "/agent", Some("key=abc"))]
	#[case("", "/", None)]
	fn test_location_parse(
		#[case] url: &str,
		#[case] path: &str,
		#[case] query: Option<&str>,
	) {
		let location = Location::parse(url);
		assert_eq!(location.path(), path);
		assert_eq!(location.query(), query);
	}

	#[rstest]
	fn test_location_href_omits_empty_query() {
		assert_eq!(Location::new("/a", Some(String::new())).href(), "/a");
		assert_eq!(Location::new("/a", Some("?x=1".to_string())).href(), "/a?x=1");
	}
}
