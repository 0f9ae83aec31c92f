//! Portal views and their route table.

use crate::settings::PortalSettings;
use std::fmt;
use support_router::{LazyView, RouteTable, RouterError};

/// Route name of the login screen.
pub const LOGIN: &str = "login";
/// Route name of the ticket list.
pub const TICKETS: &str = "tickets";
/// Route name of a single ticket.
pub const TICKET: &str = "ticket";
/// Route name of the team settings screen.
pub const SETTINGS: &str = "settings";

/// Query parameter naming the open ticket.
pub const TICKET_PARAM: &str = "ticket";

/// The screens of the agent portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalView {
	Login,
	Tickets,
	Ticket,
	Settings,
}

impl PortalView {
	/// All views, in route table order.
	pub const ALL: [PortalView; 4] = [
		PortalView::Login,
		PortalView::Tickets,
		PortalView::Ticket,
		PortalView::Settings,
	];

	/// Returns the route name of this view.
	pub fn route_name(self) -> &'static str {
		match self {
			PortalView::Login => LOGIN,
			PortalView::Tickets => TICKETS,
			PortalView::Ticket => TICKET,
			PortalView::Settings => SETTINGS,
		}
	}

	/// Returns the view registered under a route name.
	pub fn from_route_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|view| view.route_name() == name)
	}

	fn segment(self) -> &'static str {
		match self {
			PortalView::Login => "",
			PortalView::Tickets => "tickets",
			PortalView::Ticket => "ticket",
			PortalView::Settings => "settings",
		}
	}

	fn accepted_params(self) -> &'static [&'static str] {
		match self {
			PortalView::Ticket => &[TICKET_PARAM],
			_ => &[],
		}
	}
}

impl fmt::Display for PortalView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.route_name())
	}
}

/// Builds the agent portal route table below `settings.base_path`.
///
/// Unrouted entry paths start on the login screen.
pub fn agent_routes(settings: &PortalSettings) -> Result<RouteTable<PortalView>, RouterError> {
	PortalView::ALL
		.into_iter()
		.fold(RouteTable::builder(), |builder, view| {
			builder.route_accepting(
				view.route_name(),
				&settings.path(view.segment()),
				view.accepted_params().iter().copied(),
				LazyView::ready(view),
			)
		})
		.fallback(LOGIN)
		.build()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/support/portal/agent", PortalView::Login)]
	#[case("/support/portal/agent/tickets", PortalView::Tickets)]
	#[case("/support/portal/agent/ticket", PortalView::Ticket)]
	#[case("/support/portal/agent/settings", PortalView::Settings)]
	fn test_default_routes(#[case] path: &str, #[case] view: PortalView) {
		let table = agent_routes(&PortalSettings::default()).unwrap();
		let matched = table.match_path(path).unwrap();
		assert_eq!(matched.route.name(), view.route_name());
		assert_eq!(matched.route.view().resolve(path).unwrap(), view);
	}

	#[rstest]
	fn test_ticket_route_accepts_ticket_param() {
		let table = agent_routes(&PortalSettings::default()).unwrap();
		let ticket = table.select(TICKET, None).unwrap();
		assert_eq!(ticket.accepted_params(), ["ticket".to_string()]);
		assert_eq!(table.fallback(), Some(LOGIN));
	}

	#[rstest]
	fn test_route_name_round_trip() {
		for view in PortalView::ALL {
			assert_eq!(PortalView::from_route_name(view.route_name()), Some(view));
		}
		assert_eq!(PortalView::from_route_name("admin"), None);
	}
}
