//! Error types for client-side routing.

/// Error raised by a [`History`](crate::History) backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
	/// The platform history/location object is not reachable
	/// (e.g. no `window` in the current context).
	#[error("History API unavailable: {0}")]
	Unavailable(String),
	/// The platform rejected the history operation.
	#[error("History operation rejected: {0}")]
	Rejected(String),
}

/// Error raised when a lazily loaded view cannot be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to load view for route '{route}': {reason}")]
pub struct ViewError {
	/// Name of the route whose view failed to load.
	pub route: String,
	/// Reason reported by the view factory.
	pub reason: String,
}

impl ViewError {
	/// Creates a new view error.
	pub fn new(route: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			route: route.into(),
			reason: reason.into(),
		}
	}
}

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route definition carries the requested name.
	#[error("Route not found: {0}")]
	RouteNotFound(String),
	/// No route definition matches the given path.
	#[error("No route matches path: {0}")]
	NoMatch(String),
	/// A route's embedded path parameter was not supplied.
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route being navigated to.
		route: String,
		/// Name of the missing parameter.
		param: String,
	},
	/// A route path could not be compiled.
	#[error("Invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending path pattern.
		pattern: String,
		/// Why compilation failed.
		reason: String,
	},
	/// Two definitions share both a name and an accepted-parameter set.
	#[error("Duplicate route '{name}' accepting {accepted:?}")]
	DuplicateRoute {
		/// Shared route name.
		name: String,
		/// Shared accepted-parameter names.
		accepted: Vec<String>,
	},
	/// The history backend refused the navigation.
	#[error("Navigation failed: {0}")]
	NavigationFailed(#[from] HistoryError),
	/// The active route's view could not be resolved.
	#[error(transparent)]
	View(#[from] ViewError),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::RouteNotFound("tickets".to_string()).to_string(),
			"Route not found: tickets"
		);
		assert_eq!(
			RouterError::NoMatch("/nowhere".to_string()).to_string(),
			"No route matches path: /nowhere"
		);
	}

	#[rstest]
	fn test_view_error_is_distinct_from_route_not_found() {
		let err: RouterError = ViewError::new("ticket", "chunk failed").into();
		assert!(matches!(err, RouterError::View(_)));
		assert_eq!(
			err.to_string(),
			"Failed to load view for route 'ticket': chunk failed"
		);
	}

	#[rstest]
	fn test_history_error_converts_to_navigation_failed() {
		let err: RouterError = HistoryError::Rejected("SecurityError".to_string()).into();
		assert!(matches!(err, RouterError::NavigationFailed(_)));
		assert!(err.to_string().contains("SecurityError"));
	}
}
