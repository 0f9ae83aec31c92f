//! Core Router Implementation.
//!
//! `Router` owns the single [`RouterState`] of a page session. State changes
//! only through three transitions: initial resolution in [`Router::init`],
//! programmatic navigation ([`Router::push`] / [`Router::replace`]), and the
//! history listener reacting to back/forward navigation. Each transition writes
//! the whole state at once, so subscribers never observe a half-updated route.

use crate::error::RouterError;
use crate::history::History;
use crate::location::Location;
use crate::observable::{Observable, SubscriptionId};
use crate::params::{QueryParams, extract_params};
use crate::route::{RouteDefinition, RouteTable};
use crate::view::LazyView;
use std::fmt;
use std::rc::{Rc, Weak};

/// The currently active route, its parameters and its view.
pub struct RouterState<V: 'static> {
	/// Name of the active route; `None` when the location matches nothing.
	pub route_name: Option<String>,
	/// Parameters of the current location; `None` when it carries none.
	pub params: Option<QueryParams>,
	/// View of the active route.
	pub active_view: Option<LazyView<V>>,
}

impl<V: 'static> RouterState<V> {
	/// State for a location no route matches.
	pub fn unmatched(params: Option<QueryParams>) -> Self {
		Self {
			route_name: None,
			params,
			active_view: None,
		}
	}

	fn activate(route: &RouteDefinition<V>, params: Option<QueryParams>) -> Self {
		Self {
			route_name: Some(route.name().to_string()),
			params,
			active_view: Some(route.view().clone()),
		}
	}

	/// Returns whether a route is active.
	pub fn is_matched(&self) -> bool {
		self.route_name.is_some()
	}

	/// Returns a parameter of the active route.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.as_ref().and_then(|p| p.get(key))
	}
}

impl<V: 'static> Default for RouterState<V> {
	fn default() -> Self {
		Self::unmatched(None)
	}
}

impl<V: 'static> Clone for RouterState<V> {
	fn clone(&self) -> Self {
		Self {
			route_name: self.route_name.clone(),
			params: self.params.clone(),
			active_view: self.active_view.clone(),
		}
	}
}

impl<V: 'static> PartialEq for RouterState<V> {
	fn eq(&self, other: &Self) -> bool {
		let same_view = match (&self.active_view, &other.active_view) {
			(Some(a), Some(b)) => a.ptr_eq(b),
			(None, None) => true,
			_ => false,
		};
		self.route_name == other.route_name && self.params == other.params && same_view
	}
}

impl<V: 'static> fmt::Debug for RouterState<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterState")
			.field("route_name", &self.route_name)
			.field("params", &self.params)
			.field("active_view", &self.active_view)
			.finish()
	}
}

/// Where a navigation goes: a route name plus optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
	name: String,
	params: Option<QueryParams>,
}

impl NavigationTarget {
	/// Targets the route `name` without parameters.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			params: None,
		}
	}

	/// Adds one parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.get_or_insert_with(QueryParams::new).insert(key, value);
		self
	}

	/// Replaces all parameters.
	pub fn with_params(mut self, params: QueryParams) -> Self {
		self.params = Some(params);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> Option<&QueryParams> {
		self.params.as_ref()
	}

	/// Parameters, with an empty set normalised to `None`.
	fn effective_params(&self) -> Option<&QueryParams> {
		self.params.as_ref().filter(|p| !p.is_empty())
	}
}

impl From<&str> for NavigationTarget {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for NavigationTarget {
	fn from(name: String) -> Self {
		Self::new(name)
	}
}

/// Type of navigation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// New history entry (pushState).
	Push,
	/// Replace current entry (replaceState).
	Replace,
}

struct RouterInner<V: 'static> {
	table: RouteTable<V>,
	history: Rc<dyn History>,
	state: Observable<RouterState<V>>,
}

impl<V: 'static> RouterInner<V> {
	/// Handles a back/forward navigation.
	fn on_history_change(&self, location: &Location) {
		let state = match resolve(&self.table, location) {
			Ok(state) => state,
			Err(err) => {
				tracing::warn!(location = %location, error = %err, "history navigation to unrouted location");
				RouterState::unmatched(extract_params(location))
			}
		};
		tracing::debug!(route = ?state.route_name, location = %location, "history navigation");
		self.state.set(state);
	}
}

/// Client-side router.
///
/// Clones share the same route table, history and state.
///
/// # Example
///
/// ```
/// use support_router::{LazyView, MemoryHistory, NavigationTarget, RouteTable, Router};
///
/// let table = RouteTable::builder()
///     .route("login", "/agent", LazyView::ready("Login"))
///     .route("tickets", "/agent/tickets", LazyView::ready("Tickets"))
///     .route_accepting("ticket", "/agent/ticket", ["ticket"], LazyView::ready("Ticket"))
///     .build()?;
///
/// let history = MemoryHistory::new("/agent");
/// let router = Router::init(table, history.clone())?;
///
/// router.push(NavigationTarget::new("ticket").param("ticket", "ISS-001"))?;
/// assert_eq!(history.current().href(), "/agent/ticket?ticket=ISS-001");
/// assert_eq!(router.state().param("ticket"), Some("ISS-001"));
/// # Ok::<(), support_router::RouterError>(())
/// ```
pub struct Router<V: 'static> {
	inner: Rc<RouterInner<V>>,
}

impl<V: 'static> Clone for Router<V> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<V: 'static> fmt::Debug for Router<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes_count", &self.inner.table.len())
			.field("state", &self.inner.state)
			.finish()
	}
}

impl<V: 'static> Router<V> {
	/// Resolves the current location and starts listening for back/forward
	/// navigation. Call once per page load.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NoMatch`] when the entry path matches no route
	/// and the table has no fallback, or [`RouterError::NavigationFailed`]
	/// when the history backend is unusable.
	pub fn init<H>(table: RouteTable<V>, history: H) -> Result<Self, RouterError>
	where
		H: History + 'static,
	{
		let location = history.location()?;
		let state = match resolve(&table, &location) {
			Ok(state) => state,
			Err(RouterError::NoMatch(path)) => match table.fallback() {
				Some(fallback) => {
					tracing::debug!(%path, %fallback, "entry path unrouted, starting on fallback route");
					let route = table.select(fallback, None)?;
					RouterState::activate(route, extract_params(&location))
				}
				None => return Err(RouterError::NoMatch(path)),
			},
			Err(err) => return Err(err),
		};
		tracing::debug!(route = ?state.route_name, location = %location, "router initialised");

		let inner = Rc::new(RouterInner {
			table,
			history: Rc::new(history),
			state: Observable::new(state),
		});

		let weak: Weak<RouterInner<V>> = Rc::downgrade(&inner);
		inner.history.listen(Box::new(move |location: &Location| {
			if let Some(inner) = weak.upgrade() {
				inner.on_history_change(location);
			}
		}))?;

		Ok(Self { inner })
	}

	/// Navigates to a named route, adding a history entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::RouteNotFound`] if no route has the target's
	/// name. The state is left untouched on any error.
	pub fn push(&self, target: impl Into<NavigationTarget>) -> Result<(), RouterError> {
		self.navigate(target.into(), NavigationType::Push)
	}

	/// Navigates to a named route, replacing the current history entry.
	pub fn replace(&self, target: impl Into<NavigationTarget>) -> Result<(), RouterError> {
		self.navigate(target.into(), NavigationType::Replace)
	}

	/// Returns the URL `push` would navigate to, without navigating.
	pub fn href(&self, target: &NavigationTarget) -> Result<String, RouterError> {
		let route = self
			.inner
			.table
			.select(target.name(), target.effective_params())?;
		url_for(route, target.effective_params())
	}

	fn navigate(&self, target: NavigationTarget, nav_type: NavigationType) -> Result<(), RouterError> {
		let params = target.effective_params();
		let route = self.inner.table.select(target.name(), params)?;
		let url = url_for(route, params)?;

		match nav_type {
			NavigationType::Push => self.inner.history.push(&url)?,
			NavigationType::Replace => self.inner.history.replace(&url)?,
		}

		tracing::debug!(route = route.name(), %url, ?nav_type, "navigated");
		self.inner
			.state
			.set(RouterState::activate(route, params.cloned()));
		Ok(())
	}

	/// Returns a snapshot of the current state.
	pub fn state(&self) -> RouterState<V> {
		self.inner.state.get()
	}

	/// Returns the active route name.
	pub fn route_name(&self) -> Option<String> {
		self.inner.state.with(|s| s.route_name.clone())
	}

	/// Returns the active parameters.
	pub fn params(&self) -> Option<QueryParams> {
		self.inner.state.with(|s| s.params.clone())
	}

	/// Checks whether `name` is the active route.
	pub fn is_active(&self, name: &str) -> bool {
		self.inner
			.state
			.with(|s| s.route_name.as_deref() == Some(name))
	}

	/// Subscribes to state changes.
	pub fn subscribe(&self, subscriber: impl Fn(&RouterState<V>) + 'static) -> SubscriptionId {
		self.inner.state.subscribe(subscriber)
	}

	/// Removes a subscription.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.inner.state.unsubscribe(id)
	}

	/// Resolves the active route's view.
	///
	/// Returns `Ok(None)` when no route is active.
	pub fn resolve_view(&self) -> Result<Option<V>, RouterError>
	where
		V: Clone,
	{
		let state = self.state();
		let (Some(name), Some(view)) = (state.route_name, state.active_view) else {
			return Ok(None);
		};
		view.resolve(&name).map(Some).map_err(|err| {
			tracing::warn!(route = %name, error = %err, "view failed to load");
			RouterError::View(err)
		})
	}

	/// Returns the current location as reported by the history backend.
	pub fn location(&self) -> Result<Location, RouterError> {
		Ok(self.inner.history.location()?)
	}

	/// Returns the route table.
	pub fn table(&self) -> &RouteTable<V> {
		&self.inner.table
	}
}

/// Resolves a location against the table.
///
/// The embedded path parameter, if any, is merged with the query parameters;
/// query parameters win on a key clash.
fn resolve<V: 'static>(table: &RouteTable<V>, location: &Location) -> Result<RouterState<V>, RouterError> {
	let matched = table.match_path(location.path())?;
	let query = extract_params(location);

	let params = match (matched.capture, query) {
		(None, query) => query,
		(Some((key, value)), None) => Some(QueryParams::new().with(key, value)),
		(Some((key, value)), Some(query)) => {
			let mut params = QueryParams::new().with(key, value);
			params.extend(query.iter());
			Some(params)
		}
	};

	Ok(RouterState::activate(matched.route, params))
}

/// Builds the URL for navigating to `route` with `params`.
///
/// The query string is omitted entirely when no parameters remain.
fn url_for<V: 'static>(route: &RouteDefinition<V>, params: Option<&QueryParams>) -> Result<String, RouterError> {
	let mut query = params.cloned().unwrap_or_default();

	let path = route
		.pattern()
		.reverse(|name| query.get(name))
		.ok_or_else(|| RouterError::MissingParameter {
			route: route.name().to_string(),
			param: route.pattern().param_name().unwrap_or_default().to_string(),
		})?;
	if let Some(name) = route.pattern().param_name() {
		query.remove(name);
	}

	Ok(if query.is_empty() {
		path
	} else {
		format!("{}?{}", path, query.to_query_string())
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MemoryHistory;
	use rstest::{fixture, rstest};
	use std::cell::RefCell;

	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	enum Page {
		Login,
		Tickets,
		Ticket,
	}

	#[fixture]
	fn table() -> RouteTable<Page> {
		RouteTable::builder()
			.route("login", "/agent", LazyView::ready(Page::Login))
			.route("tickets", "/agent/tickets", LazyView::ready(Page::Tickets))
			.route_accepting("ticket", "/agent/ticket", ["ticket"], LazyView::ready(Page::Ticket))
			.build()
			.unwrap()
	}

	fn router_at(table: RouteTable<Page>, url: &str) -> (Router<Page>, MemoryHistory) {
		let history = MemoryHistory::new(url);
		let router = Router::init(table, history.clone()).unwrap();
		(router, history)
	}

	#[rstest]
	fn test_init_resolves_entry_location(table: RouteTable<Page>) {
		let (router, _) = router_at(table, "/agent/ticket?ticket=ISS-1");
		let state = router.state();
		assert_eq!(state.route_name.as_deref(), Some("ticket"));
		assert_eq!(state.param("ticket"), Some("ISS-1"));
		assert_eq!(router.resolve_view().unwrap(), Some(Page::Ticket));
	}

	#[rstest]
	fn test_init_without_query_has_no_params(table: RouteTable<Page>) {
		let (router, _) = router_at(table, "/agent/tickets");
		assert!(router.params().is_none());
	}

	#[rstest]
	fn test_init_unrouted_without_fallback_fails(table: RouteTable<Page>) {
		let result = Router::init(table, MemoryHistory::new("/elsewhere"));
		assert_eq!(result.unwrap_err(), RouterError::NoMatch("/elsewhere".to_string()));
	}

	#[rstest]
	fn test_init_unrouted_uses_fallback(table: RouteTable<Page>) {
		let table = table.with_fallback("login").unwrap();
		let (router, history) = router_at(table, "/elsewhere?key=abc");
		assert!(router.is_active("login"));
		assert_eq!(router.state().param("key"), Some("abc"));
		// The address is left as the user entered it.
		assert_eq!(history.current().path(), "/elsewhere");
	}

	#[rstest]
	fn test_push_updates_history_and_state(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		router
			.push(NavigationTarget::new("ticket").param("ticket", "ISS-001"))
			.unwrap();

		assert_eq!(history.len(), 2);
		assert_eq!(history.current().href(), "/agent/ticket?ticket=ISS-001");
		assert!(router.is_active("ticket"));
		assert_eq!(router.state().param("ticket"), Some("ISS-001"));
	}

	#[rstest]
	fn test_push_without_params_omits_query(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent/ticket?ticket=old");
		router.push("tickets").unwrap();
		assert_eq!(history.current().href(), "/agent/tickets");
		assert!(router.params().is_none());

		router
			.push(NavigationTarget::new("tickets").with_params(QueryParams::new()))
			.unwrap();
		assert_eq!(history.current().href(), "/agent/tickets");
		assert!(router.params().is_none());
	}

	#[rstest]
	fn test_push_unknown_route_leaves_state(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent/tickets");
		let before = router.state();

		let err = router.push("does-not-exist").unwrap_err();
		assert_eq!(err, RouterError::RouteNotFound("does-not-exist".to_string()));
		assert_eq!(router.state(), before);
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_replace_keeps_history_length(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		router.replace("tickets").unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history.current().path(), "/agent/tickets");
		assert!(router.is_active("tickets"));
	}

	#[rstest]
	fn test_href_does_not_navigate(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		let target = NavigationTarget::new("ticket").param("ticket", "A B");
		assert_eq!(router.href(&target).unwrap(), "/agent/ticket?ticket=A+B");
		assert_eq!(history.len(), 1);
		assert!(router.is_active("login"));
	}

	#[rstest]
	fn test_back_forward_restore_state(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		router.push("tickets").unwrap();
		router
			.push(NavigationTarget::new("ticket").param("ticket", "ISS-2"))
			.unwrap();

		history.back();
		assert!(router.is_active("tickets"));
		assert!(router.params().is_none());

		history.forward();
		assert!(router.is_active("ticket"));
		assert_eq!(router.state().param("ticket"), Some("ISS-2"));
	}

	#[rstest]
	fn test_history_to_unrouted_location_is_explicit_unmatched(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		history.set_location("/nowhere?x=1");

		let state = router.state();
		assert!(!state.is_matched());
		assert!(state.active_view.is_none());
		assert_eq!(state.param("x"), Some("1"));
		assert_eq!(router.resolve_view().unwrap(), None);

		// The listener survives and keeps routing.
		history.back();
		assert!(router.is_active("login"));
	}

	#[rstest]
	fn test_subscribers_notified_once_per_transition(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		router.subscribe(move |state| sink.borrow_mut().push(state.route_name.clone()));

		router.push("tickets").unwrap();
		history.back();
		let _ = router.push("missing");

		assert_eq!(
			*seen.borrow(),
			vec![Some("tickets".to_string()), Some("login".to_string())]
		);
	}

	#[rstest]
	fn test_dropped_router_detaches_listener(table: RouteTable<Page>) {
		let (router, history) = router_at(table, "/agent");
		router.push("tickets").unwrap();
		drop(router);
		assert!(history.back());
	}

	#[rstest]
	fn test_path_param_route_round_trip() {
		let table = RouteTable::builder()
			.route("tickets", "/agent/tickets", LazyView::ready(Page::Tickets))
			.route("ticket", "/agent/tickets/{ticket}", LazyView::ready(Page::Ticket))
			.build()
			.unwrap();
		let (router, history) = router_at(table.clone(), "/agent/tickets");

		router
			.push(NavigationTarget::new("ticket").param("ticket", "ISS-7").param("tab", "sla"))
			.unwrap();
		assert_eq!(history.current().href(), "/agent/tickets/ISS-7?tab=sla");

		let (reloaded, _) = router_at(table, &history.current().href());
		assert_eq!(reloaded.state().params, router.state().params);
		assert_eq!(reloaded.route_name(), router.route_name());
	}

	#[rstest]
	fn test_path_param_missing_is_error() {
		let table = RouteTable::builder()
			.route("tickets", "/agent/tickets", LazyView::ready(Page::Tickets))
			.route("ticket", "/agent/tickets/{ticket}", LazyView::ready(Page::Ticket))
			.build()
			.unwrap();
		let (router, _) = router_at(table, "/agent/tickets");
		assert!(matches!(
			router.push("ticket"),
			Err(RouterError::MissingParameter { .. })
		));
		assert!(router.is_active("tickets"));
	}

	#[rstest]
	fn test_failing_view_reports_view_error() {
		let table = RouteTable::builder()
			.route(
				"tickets",
				"/agent/tickets",
				LazyView::new(|| Err::<Page, _>("bundle missing")),
			)
			.build()
			.unwrap();
		let (router, _) = router_at(table, "/agent/tickets");
		assert!(matches!(router.resolve_view(), Err(RouterError::View(_))));
	}
}
