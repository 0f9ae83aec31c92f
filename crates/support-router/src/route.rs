//! Route definitions and the ordered route table.
//!
//! The table is the router's static configuration. Declaration order is
//! significant: path matching is first-match-wins, and overload resolution by
//! name falls back to the first definition carrying that name.

use crate::error::RouterError;
use crate::params::QueryParams;
use crate::pattern::PathPattern;
use crate::view::LazyView;
use std::collections::BTreeSet;

/// A single route definition.
pub struct RouteDefinition<V: 'static> {
	name: String,
	pattern: PathPattern,
	/// Query parameter names the view wants extracted.
	accepted_params: Vec<String>,
	view: LazyView<V>,
}

impl<V: 'static> RouteDefinition<V> {
	/// Creates a route accepting no query parameters.
	pub fn new(name: impl Into<String>, path: &str, view: LazyView<V>) -> Result<Self, RouterError> {
		Ok(Self {
			name: name.into(),
			pattern: PathPattern::new(path)?,
			accepted_params: Vec::new(),
			view,
		})
	}

	/// Declares the query parameters this route's view accepts.
	pub fn accepting<I, S>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for param in params {
			let param = param.into();
			if !self.accepted_params.contains(&param) {
				self.accepted_params.push(param);
			}
		}
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	pub fn accepted_params(&self) -> &[String] {
		&self.accepted_params
	}

	pub fn view(&self) -> &LazyView<V> {
		&self.view
	}

	/// Returns whether the route can take `key`, either as a declared query
	/// parameter or as its embedded path parameter.
	pub fn accepts(&self, key: &str) -> bool {
		self.accepted_params.iter().any(|p| p == key) || self.pattern.param_name() == Some(key)
	}

	/// Returns whether every key of `params` is accepted by this route.
	///
	/// A route that accepts nothing never qualifies.
	fn accepts_all(&self, params: &QueryParams) -> bool {
		(!self.accepted_params.is_empty() || self.pattern.param_name().is_some())
			&& params.keys().all(|key| self.accepts(key))
	}

	fn accepted_set(&self) -> BTreeSet<&str> {
		self.accepted_params.iter().map(String::as_str).collect()
	}
}

impl<V: 'static> Clone for RouteDefinition<V> {
	fn clone(&self) -> Self {
		Self {
			name: self.name.clone(),
			pattern: self.pattern.clone(),
			accepted_params: self.accepted_params.clone(),
			view: self.view.clone(),
		}
	}
}

impl<V: 'static> std::fmt::Debug for RouteDefinition<V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("name", &self.name)
			.field("pattern", &self.pattern.raw())
			.field("accepted_params", &self.accepted_params)
			.finish()
	}
}

/// A path matched against the table.
#[derive(Debug)]
pub struct RouteMatch<'a, V: 'static> {
	/// The first definition whose base pattern matched.
	pub route: &'a RouteDefinition<V>,
	/// The embedded path parameter, if the pattern has one.
	pub capture: Option<(String, String)>,
}

/// Ordered, validated list of route definitions.
pub struct RouteTable<V: 'static> {
	routes: Vec<RouteDefinition<V>>,
	/// Route used at startup when the entry path matches nothing.
	fallback: Option<String>,
}

impl<V: 'static> RouteTable<V> {
	/// Creates a table, preserving declaration order.
	///
	/// # Errors
	///
	/// Returns [`RouterError::DuplicateRoute`] when two definitions share a
	/// name and the same accepted-parameter set, since `push` could never
	/// tell them apart.
	pub fn new(routes: Vec<RouteDefinition<V>>) -> Result<Self, RouterError> {
		for (i, route) in routes.iter().enumerate() {
			let clash = routes[..i]
				.iter()
				.any(|earlier| earlier.name == route.name && earlier.accepted_set() == route.accepted_set());
			if clash {
				return Err(RouterError::DuplicateRoute {
					name: route.name.clone(),
					accepted: route.accepted_params.clone(),
				});
			}
		}
		Ok(Self {
			routes,
			fallback: None,
		})
	}

	/// Names the route to start on when the initial path matches nothing.
	///
	/// # Errors
	///
	/// Returns [`RouterError::RouteNotFound`] if no definition carries `name`.
	pub fn with_fallback(mut self, name: impl Into<String>) -> Result<Self, RouterError> {
		let name = name.into();
		if !self.has_route(&name) {
			return Err(RouterError::RouteNotFound(name));
		}
		self.fallback = Some(name);
		Ok(self)
	}

	/// Returns the fallback route name.
	pub fn fallback(&self) -> Option<&str> {
		self.fallback.as_deref()
	}

	/// Starts a table builder.
	pub fn builder() -> RouteTableBuilder<V> {
		RouteTableBuilder {
			routes: Vec::new(),
			fallback: None,
		}
	}

	/// Resolves `path` to the first definition whose base pattern matches it
	/// exactly.
	pub fn match_path(&self, path: &str) -> Result<RouteMatch<'_, V>, RouterError> {
		self.routes
			.iter()
			.find_map(|route| {
				route
					.pattern
					.matches(path)
					.map(|capture| RouteMatch { route, capture })
			})
			.ok_or_else(|| RouterError::NoMatch(path.to_string()))
	}

	/// Picks the definition `push` navigates to.
	///
	/// With non-empty `params`, the first definition named `name` that
	/// accepts every supplied key wins. Otherwise, or when none qualifies, the
	/// first definition named `name` in table order is used.
	pub fn select(
		&self,
		name: &str,
		params: Option<&QueryParams>,
	) -> Result<&RouteDefinition<V>, RouterError> {
		let mut candidates = self.routes.iter().filter(|route| route.name == name).peekable();
		let first = *candidates
			.peek()
			.ok_or_else(|| RouterError::RouteNotFound(name.to_string()))?;

		Ok(match params.filter(|p| !p.is_empty()) {
			Some(params) => candidates
				.find(|route| route.accepts_all(params))
				.unwrap_or(first),
			None => first,
		})
	}

	/// Checks if any definition carries `name`.
	pub fn has_route(&self, name: &str) -> bool {
		self.routes.iter().any(|route| route.name == name)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, RouteDefinition<V>> {
		self.routes.iter()
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

impl<V: 'static> Clone for RouteTable<V> {
	fn clone(&self) -> Self {
		Self {
			routes: self.routes.clone(),
			fallback: self.fallback.clone(),
		}
	}
}

impl<V: 'static> std::fmt::Debug for RouteTable<V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteTable")
			.field("routes", &self.routes)
			.field("fallback", &self.fallback)
			.finish()
	}
}

/// Builder collecting route definitions in declaration order.
///
/// Pattern errors surface from [`build`](Self::build).
pub struct RouteTableBuilder<V: 'static> {
	routes: Vec<Result<RouteDefinition<V>, RouterError>>,
	fallback: Option<String>,
}

impl<V: 'static> RouteTableBuilder<V> {
	/// Adds a route accepting no query parameters.
	pub fn route(mut self, name: &str, path: &str, view: LazyView<V>) -> Self {
		self.routes.push(RouteDefinition::new(name, path, view));
		self
	}

	/// Adds a route accepting the given query parameters.
	pub fn route_accepting<I, S>(mut self, name: &str, path: &str, params: I, view: LazyView<V>) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.routes
			.push(RouteDefinition::new(name, path, view).map(|route| route.accepting(params)));
		self
	}

	/// Names the route to start on when the initial path matches nothing.
	pub fn fallback(mut self, name: &str) -> Self {
		self.fallback = Some(name.to_string());
		self
	}

	/// Validates and builds the table.
	pub fn build(self) -> Result<RouteTable<V>, RouterError> {
		let table = RouteTable::new(self.routes.into_iter().collect::<Result<Vec<_>, _>>()?)?;
		match self.fallback {
			Some(name) => table.with_fallback(name),
			None => Ok(table),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table() -> RouteTable<&'static str> {
		RouteTable::builder()
			.route("login", "/agent", LazyView::ready("Login"))
			.route("ticket", "/agent/ticket", LazyView::ready("TicketBare"))
			.route_accepting("ticket", "/agent/ticket/open", ["ticket"], LazyView::ready("Ticket"))
			.route("tickets", "/agent/tickets", LazyView::ready("Tickets"))
			.build()
			.unwrap()
	}

	#[rstest]
	fn test_match_first_wins(table: RouteTable<&'static str>) {
		let m = table.match_path("/agent/ticket").unwrap();
		assert_eq!(m.route.name(), "ticket");
		assert_eq!(m.route.accepted_params().len(), 0);
		assert_eq!(table.match_path("/agent/tickets").unwrap().route.name(), "tickets");
	}

	#[rstest]
	fn test_match_no_route(table: RouteTable<&'static str>) {
		assert_eq!(
			table.match_path("/agent/unknown").unwrap_err(),
			RouterError::NoMatch("/agent/unknown".to_string())
		);
	}

	#[rstest]
	fn test_select_by_params(table: RouteTable<&'static str>) {
		let params = QueryParams::new().with("ticket", "X");
		let route = table.select("ticket", Some(&params)).unwrap();
		assert_eq!(route.pattern().base(), "/agent/ticket/open");
	}

	#[rstest]
	fn test_select_without_params_takes_first(table: RouteTable<&'static str>) {
		assert_eq!(table.select("ticket", None).unwrap().pattern().base(), "/agent/ticket");
		assert_eq!(
			table
				.select("ticket", Some(&QueryParams::new()))
				.unwrap()
				.pattern()
				.base(),
			"/agent/ticket"
		);
	}

	#[rstest]
	fn test_select_falls_back_when_no_superset(table: RouteTable<&'static str>) {
		let params = QueryParams::new().with("ticket", "X").with("tab", "replies");
		assert_eq!(
			table.select("ticket", Some(&params)).unwrap().pattern().base(),
			"/agent/ticket"
		);
	}

	#[rstest]
	fn test_select_unknown_name(table: RouteTable<&'static str>) {
		assert_eq!(
			table.select("does-not-exist", None).unwrap_err(),
			RouterError::RouteNotFound("does-not-exist".to_string())
		);
	}

	#[rstest]
	fn test_duplicate_name_and_params_rejected() {
		let result = RouteTable::builder()
			.route_accepting("ticket", "/a", ["ticket", "tab"], LazyView::ready(()))
			.route_accepting("ticket", "/b", ["tab", "ticket"], LazyView::ready(()))
			.build();
		assert!(matches!(result, Err(RouterError::DuplicateRoute { .. })));
	}

	#[rstest]
	fn test_builder_surfaces_pattern_errors() {
		let result = RouteTable::builder()
			.route("ok", "/ok", LazyView::ready(()))
			.route("bad", "/a/{x}/{y}", LazyView::ready(()))
			.build();
		assert!(matches!(result, Err(RouterError::InvalidPattern { .. })));
	}

	#[rstest]
	fn test_fallback_must_exist() {
		let result = RouteTable::builder()
			.route("login", "/agent", LazyView::ready(()))
			.fallback("home")
			.build();
		assert_eq!(result.unwrap_err(), RouterError::RouteNotFound("home".to_string()));

		let table = RouteTable::builder()
			.route("login", "/agent", LazyView::ready(()))
			.fallback("login")
			.build()
			.unwrap();
		assert_eq!(table.fallback(), Some("login"));
	}

	#[rstest]
	fn test_path_param_counts_as_accepted() {
		let route = RouteDefinition::new("ticket", "/t/{ticket}", LazyView::ready(())).unwrap();
		assert!(route.accepts("ticket"));
		assert!(!route.accepts("tab"));
	}
}
