//! Ticket status grouping for display.

use std::fmt;

/// Status group an agent sees for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStatus {
	Open,
	AwaitingReply,
	Closed,
}

impl TicketStatus {
	/// Groups a raw issue status.
	///
	/// `Replied` is shown as awaiting a reply; anything not closed or awaiting
	/// a reply is open.
	pub fn from_raw(status: &str) -> Self {
		match status {
			"Closed" => Self::Closed,
			"Awaiting Reply" | "Replied" => Self::AwaitingReply,
			_ => Self::Open,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Open => "Open",
			Self::AwaitingReply => "Awaiting Reply",
			Self::Closed => "Closed",
		}
	}

	/// Indicator colour of the group.
	pub fn indicator_color(self) -> &'static str {
		indicator_color(self.label())
	}
}

impl fmt::Display for TicketStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Display label for a raw issue status.
pub fn status_label(status: &str) -> &'static str {
	TicketStatus::from_raw(status).label()
}

/// Indicator colour for a status string.
///
/// The colour is keyed on the exact string, so a raw `Replied` shows green
/// while its grouped label shows yellow.
pub fn indicator_color(status: &str) -> &'static str {
	match status {
		"Open" => "red",
		"Awaiting Reply" => "yellow",
		_ => "green",
	}
}

/// Whether a ticket still has a resolution deadline worth showing.
pub fn is_resolution_pending(status: &str) -> bool {
	!matches!(status, "Closed" | "Resolved")
}
