//! Query-string parameters.
//!
//! Parameters are plain URL-encoded key/value pairs: no nesting and no
//! repeated-key arrays. A repeated key keeps its first position and takes the
//! value of its last occurrence.
//!
//! # Example
//!
//! ```
//! use support_router::{Location, extract_params};
//!
//! let location = Location::parse("/agent/ticket?ticket=ISS-001");
//! let params = extract_params(&location).unwrap();
//! assert_eq!(params.get("ticket"), Some("ISS-001"));
//!
//! // No query string at all is "unknown", not "known empty".
//! assert!(extract_params(&Location::parse("/agent/tickets")).is_none());
//! ```

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// Insertion-ordered string parameters.
///
/// Serializes as a sequence of `(key, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
	pairs: Vec<(String, String)>,
}

impl QueryParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a query string (with or without its leading `?`).
	///
	/// Parsing never fails; keys the router does not know are kept as-is.
	pub fn parse(query: &str) -> Self {
		let query = query.trim_start_matches('?');
		// Decoding is lossy: bad escapes stay verbatim and invalid UTF-8 is
		// replaced, so plain string pairs always deserialize.
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
		pairs.into_iter().collect()
	}

	/// Sets a parameter, replacing the value of an existing key in place.
	///
	/// Returns the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		let key = key.into();
		let value = value.into();
		match self.pairs.iter_mut().find(|(k, _)| *k == key) {
			Some((_, existing)) => Some(std::mem::replace(existing, value)),
			None => {
				self.pairs.push((key, value));
				None
			}
		}
	}

	/// Builder form of [`insert`](Self::insert).
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(key, value);
		self
	}

	/// Removes a parameter, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		let index = self.pairs.iter().position(|(k, _)| k == key)?;
		Some(self.pairs.remove(index).1)
	}

	/// Returns the value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.pairs
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Iterates over the keys in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.pairs.iter().map(|(k, _)| k.as_str())
	}

	/// Iterates over `(key, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	/// Serializes the parameters as a URL-encoded query string (no `?`).
	pub fn to_query_string(&self) -> String {
		// Plain string pairs cannot fail to encode.
		serde_urlencoded::to_string(&self.pairs).unwrap_or_default()
	}
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::new();
		for (k, v) in iter {
			params.insert(k, v);
		}
		params
	}
}

impl<K, V> Extend<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (k, v) in iter {
			self.insert(k, v);
		}
	}
}

/// Parses a raw query string.
///
/// Returns `None` when the query string is absent or empty.
pub fn parse_query(query: &str) -> Option<QueryParams> {
	let query = query.trim_start_matches('?');
	(!query.is_empty()).then(|| QueryParams::parse(query))
}

/// Extracts the query parameters of a location.
///
/// Returns `None` when the location has no query string.
pub fn extract_params(location: &Location) -> Option<QueryParams> {
	location.query().and_then(parse_query)
}
