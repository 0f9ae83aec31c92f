//! Ticket list filters.
//!
//! The ticket list shows the agent's open tickets assigned to them unless
//! the agent widens either filter.

use crate::api::TicketSummary;
use crate::status::TicketStatus;
use serde::{Deserialize, Serialize};

/// Which tickets to show by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusFilter {
	/// Everything not closed.
	#[default]
	Open,
	All,
	/// Only closed tickets.
	#[serde(rename = "Close")]
	Closed,
}

impl StatusFilter {
	/// Parses a filter option value (`Open`, `All` or `Close`).
	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"Open" => Some(Self::Open),
			"All" => Some(Self::All),
			"Close" => Some(Self::Closed),
			_ => None,
		}
	}

	pub fn value(self) -> &'static str {
		match self {
			Self::Open => "Open",
			Self::All => "All",
			Self::Closed => "Close",
		}
	}

	/// Checks a raw issue status against the filter.
	pub fn matches(self, status: &str) -> bool {
		let closed = TicketStatus::from_raw(status) == TicketStatus::Closed;
		match self {
			Self::Open => !closed,
			Self::All => true,
			Self::Closed => closed,
		}
	}
}

/// Which tickets to show by assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentFilter {
	/// Only tickets assigned to the logged-in agent.
	#[default]
	Me,
	All,
}

impl AssignmentFilter {
	/// Parses a filter option value (`me` or `all`).
	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"me" => Some(Self::Me),
			"all" => Some(Self::All),
			_ => None,
		}
	}

	pub fn value(self) -> &'static str {
		match self {
			Self::Me => "me",
			Self::All => "all",
		}
	}

	/// Checks a ticket's assignment against the filter for `agent_email`.
	pub fn matches(self, ticket: &TicketSummary, agent_email: &str) -> bool {
		match self {
			Self::Me => ticket.assignees().iter().any(|email| email == agent_email),
			Self::All => true,
		}
	}
}

/// Filter applied to the agent's ticket list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketFilter {
	pub status: StatusFilter,
	pub assignment: AssignmentFilter,
}

impl TicketFilter {
	pub fn new(status: StatusFilter, assignment: AssignmentFilter) -> Self {
		Self { status, assignment }
	}

	/// Checks one ticket as seen by `agent_email`.
	pub fn matches(&self, ticket: &TicketSummary, agent_email: &str) -> bool {
		self.status.matches(&ticket.status) && self.assignment.matches(ticket, agent_email)
	}

	/// Keeps the matching tickets, preserving their order.
	pub fn apply<'a, I>(&self, tickets: I, agent_email: &str) -> Vec<TicketSummary>
	where
		I: IntoIterator<Item = &'a TicketSummary>,
	{
		tickets
			.into_iter()
			.filter(|ticket| self.matches(ticket, agent_email))
			.cloned()
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	const ME: &str = "jane@acme.test";

	fn ticket(name: &str, status: &str, assign: Option<&str>) -> TicketSummary {
		TicketSummary {
			name: name.to_string(),
			status: status.to_string(),
			assign: assign.map(str::to_string),
			..TicketSummary::default()
		}
	}

	#[fixture]
	fn tickets() -> Vec<TicketSummary> {
		vec![
			ticket("ISS-1", "Open", Some(r#"["jane@acme.test"]"#)),
			ticket("ISS-2", "Replied", Some(r#"["joe@acme.test","jane@acme.test"]"#)),
			ticket("ISS-3", "Closed", Some(r#"["jane@acme.test"]"#)),
			ticket("ISS-4", "Open", Some(r#"["joe@acme.test"]"#)),
			ticket("ISS-5", "Closed", None),
			ticket("ISS-6", "Paused", Some("not json")),
		]
	}

	#[rstest]
	fn test_default_is_open_and_mine() {
		let filter = TicketFilter::default();
		assert_eq!(filter.status, StatusFilter::Open);
		assert_eq!(filter.assignment, AssignmentFilter::Me);
	}

	#[rstest]
	#[case(StatusFilter::Open, AssignmentFilter::Me, vec!["ISS-1", "ISS-2"])]
	#[case(StatusFilter::Open, AssignmentFilter::All, vec!["ISS-1", "ISS-2", "ISS-4", "ISS-6"])]
	#[case(StatusFilter::All, AssignmentFilter::Me, vec!["ISS-1", "ISS-2", "ISS-3"])]
	#[case(StatusFilter::All, AssignmentFilter::All, vec!["ISS-1", "ISS-2", "ISS-3", "ISS-4", "ISS-5", "ISS-6"])]
	#[case(StatusFilter::Closed, AssignmentFilter::Me, vec!["ISS-3"])]
	#[case(StatusFilter::Closed, AssignmentFilter::All, vec!["ISS-3", "ISS-5"])]
	fn test_filter_combinations(
		tickets: Vec<TicketSummary>,
		#[case] status: StatusFilter,
		#[case] assignment: AssignmentFilter,
		#[case] expected: Vec<&str>,
	) {
		let shown = TicketFilter::new(status, assignment).apply(&tickets, ME);
		let names: Vec<&str> = shown.iter().map(|t| t.name.as_str()).collect();
		assert_eq!(names, expected);
	}

	#[rstest]
	#[case("Open", Some(StatusFilter::Open))]
	#[case("All", Some(StatusFilter::All))]
	#[case("Close", Some(StatusFilter::Closed))]
	#[case("Closed", None)]
	fn test_status_filter_values(#[case] value: &str, #[case] expected: Option<StatusFilter>) {
		assert_eq!(StatusFilter::from_value(value), expected);
		if let Some(filter) = expected {
			assert_eq!(filter.value(), value);
		}
	}

	#[rstest]
	fn test_filter_deserializes_option_values() {
		let filter: TicketFilter =
			serde_json::from_str(r#"{"status":"Close","assignment":"all"}"#).unwrap();
		assert_eq!(filter, TicketFilter::new(StatusFilter::Closed, AssignmentFilter::All));
		assert_eq!(AssignmentFilter::from_value("me"), Some(AssignmentFilter::Me));
		assert_eq!(AssignmentFilter::from_value("everyone"), None);
	}
}
