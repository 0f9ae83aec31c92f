//! Facade re-export tests

#![cfg(feature = "portal")]

use rstest::rstest;
use support_desk::portal::{PortalSettings, PortalView, agent_routes};
use support_desk::router::{MemoryHistory, NavigationTarget, Router};

#[rstest]
#[case("/support/portal/agent", PortalView::Login)]
#[case("/support/portal/agent/settings", PortalView::Settings)]
fn test_facade_routes(#[case] url: &str, #[case] view: PortalView) {
	let router = Router::init(
		agent_routes(&PortalSettings::default()).unwrap(),
		MemoryHistory::new(url),
	)
	.unwrap();
	assert_eq!(router.resolve_view().unwrap(), Some(view));
}

#[rstest]
fn test_facade_settings_from_toml() {
	let settings = PortalSettings::from_toml_str(
		r#"
base_path = "/helpdesk/agent"
session_storage_key = "helpdesk-key"
"#,
	)
	.unwrap();
	let history = MemoryHistory::new("/helpdesk/agent/tickets");
	let router = Router::init(agent_routes(&settings).unwrap(), history.clone()).unwrap();

	router
		.push(NavigationTarget::new("ticket").param("ticket", "HD-1"))
		.unwrap();
	assert_eq!(history.current().href(), "/helpdesk/agent/ticket?ticket=HD-1");
}
