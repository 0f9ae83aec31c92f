//! Agent portal application state.
//!
//! `AgentPortal` wires the router, the agent API and the stored session key
//! together. It starts on the screen the URL points at, resolves the session
//! in [`AgentPortal::initialize`], and sends the agent back to the login
//! screen whenever the server rejects the session.

use crate::api::{Agent, AgentApi, NewAgent, Reply, Ticket, TicketSummary};
use crate::error::{ApiError, PortalError};
use crate::filter::TicketFilter;
use crate::session::{SessionKeyStore, SessionStorage};
use crate::settings::PortalSettings;
use crate::views::{self, PortalView, TICKET_PARAM, agent_routes};
use regex::Regex;
use std::sync::LazyLock;
use support_router::{
	History, Location, NavigationTarget, Observable, Router, SubscriptionId, extract_params,
};

/// Query parameter carrying a session key from a login link.
pub const SESSION_KEY_PARAM: &str = "key";

static EMAIL_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Checks an email address before a login link is requested for it.
pub fn is_valid_email(email: &str) -> bool {
	EMAIL_PATTERN.is_match(email)
}

/// Arguments the portal reads from its entry URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
	/// Session key from a login link (`?key=`).
	pub session_key: Option<String>,
	/// Ticket to open after login (`?ticket=`).
	pub open_ticket: Option<String>,
}

impl UrlState {
	/// Picks the portal's arguments out of a location.
	pub fn from_location(location: &Location) -> Self {
		let params = extract_params(location);
		let arg = |name: &str| {
			params
				.as_ref()
				.and_then(|p| p.get(name))
				.filter(|value| !value.is_empty())
				.map(str::to_string)
		};
		Self {
			session_key: arg(SESSION_KEY_PARAM),
			open_ticket: arg(TICKET_PARAM),
		}
	}
}

/// Shared portal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalState {
	/// True until the session has been resolved.
	pub initializing: bool,
	pub session_key: Option<String>,
	/// The logged-in agent, once fetched.
	pub agent: Option<Agent>,
}

impl PortalState {
	fn logged_out() -> Self {
		Self {
			initializing: false,
			session_key: None,
			agent: None,
		}
	}
}

/// The agent portal.
pub struct AgentPortal<A, S> {
	settings: PortalSettings,
	router: Router<PortalView>,
	api: A,
	sessions: SessionKeyStore<S>,
	url_state: UrlState,
	state: Observable<PortalState>,
}

impl<A, S> AgentPortal<A, S>
where
	A: AgentApi,
	S: SessionStorage,
{
	/// Builds the portal for the current page.
	///
	/// A session key in the URL is persisted right away so that it survives
	/// the navigation away from the login link.
	///
	/// # Errors
	///
	/// Fails when the route table cannot be built, the history is unusable,
	/// or the session key cannot be stored.
	pub fn new<H>(settings: PortalSettings, api: A, storage: S, history: H) -> Result<Self, PortalError>
	where
		H: History + 'static,
	{
		let table = agent_routes(&settings)?;
		let url_state = UrlState::from_location(&history.location()?);
		let sessions = SessionKeyStore::new(storage, settings.session_storage_key.clone());
		if let Some(key) = &url_state.session_key {
			sessions.store(Some(key.as_str()))?;
		}
		let router = Router::init(table, history)?;

		let state = Observable::new(PortalState {
			initializing: true,
			session_key: url_state.session_key.clone(),
			agent: None,
		});

		Ok(Self {
			settings,
			router,
			api,
			sessions,
			url_state,
			state,
		})
	}

	/// Resolves the session and moves to the first screen.
	///
	/// Without a session key the login screen is shown. With one, the agent
	/// is fetched and the portal opens the ticket named in the entry URL, or
	/// the ticket list. A rejected session logs out; any other failure is
	/// returned and leaves the portal initialising.
	pub async fn initialize(&self) -> Result<(), PortalError> {
		let session_key = self
			.state
			.with(|s| s.session_key.clone())
			.or_else(|| self.sessions.get());

		let Some(session_key) = session_key else {
			self.state.update(|s| s.initializing = false);
			self.router.push(views::LOGIN)?;
			return Ok(());
		};

		match self.api.get_agent(&session_key).await {
			Ok(agent) => {
				tracing::debug!(agent = %agent.email, "session resolved");
				self.state.set(PortalState {
					initializing: false,
					session_key: Some(session_key),
					agent: Some(agent),
				});
				match &self.url_state.open_ticket {
					Some(ticket) => self.open_ticket(ticket),
					None => self.show_tickets(),
				}
			}
			Err(err) if err.is_invalid_session() => {
				tracing::error!(error = %err, "stored session rejected");
				self.logout()
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to initialise agent portal");
				Err(err.into())
			}
		}
	}

	/// Validates `session_key`, persists it and opens the ticket list.
	pub async fn login(&self, session_key: &str) -> Result<(), PortalError> {
		self.api.login(session_key).await?;
		self.sessions.store(Some(session_key))?;
		self.state.update(|s| {
			s.initializing = false;
			s.session_key = Some(session_key.to_string());
		});
		self.show_tickets()
	}

	/// Requests a login link for `email`.
	pub async fn send_login_link(&self, email: &str) -> Result<(), PortalError> {
		if !is_valid_email(email) {
			return Err(PortalError::InvalidEmail(email.to_string()));
		}
		self.api.send_login_link(email).await?;
		Ok(())
	}

	/// Clears the stored key and portal state and returns to the login screen.
	pub fn logout(&self) -> Result<(), PortalError> {
		self.sessions.clear()?;
		self.api.clear_session_key();
		self.state.set(PortalState::logged_out());
		tracing::debug!("logged out");
		self.router.push(views::LOGIN)?;
		Ok(())
	}

	/// Shows the login screen, or the ticket list when already logged in.
	pub fn show_login(&self) -> Result<(), PortalError> {
		if self.is_logged_in() {
			self.show_tickets()
		} else {
			self.router.push(views::LOGIN)?;
			Ok(())
		}
	}

	/// Opens a single ticket.
	pub fn open_ticket(&self, name: &str) -> Result<(), PortalError> {
		self.router
			.push(NavigationTarget::new(views::TICKET).param(TICKET_PARAM, name))?;
		Ok(())
	}

	pub fn show_tickets(&self) -> Result<(), PortalError> {
		self.router.push(views::TICKETS)?;
		Ok(())
	}

	pub fn show_settings(&self) -> Result<(), PortalError> {
		self.router.push(views::SETTINGS)?;
		Ok(())
	}

	/// Lists the logged-in agent's tickets that pass `filter`.
	///
	/// Empty until the agent has been fetched.
	pub fn tickets(&self, filter: &TicketFilter) -> Vec<TicketSummary> {
		self.state.with(|s| {
			s.agent
				.as_ref()
				.map(|agent| filter.apply(&agent.tickets, &agent.email))
				.unwrap_or_default()
		})
	}

	/// Name of the ticket the router currently shows.
	pub fn current_ticket_name(&self) -> Option<String> {
		if !self.router.is_active(views::TICKET) {
			return None;
		}
		self.router.state().param(TICKET_PARAM).map(str::to_string)
	}

	/// Fetches the open ticket.
	pub async fn load_ticket(&self) -> Result<Ticket, PortalError> {
		let name = self.current_ticket_name().ok_or(PortalError::NoTicket)?;
		let result = self.api.get_ticket(&name).await;
		self.checked(result)
	}

	/// Replies to the open ticket. Blank content is not sent.
	pub async fn reply(&self, content: &str) -> Result<Option<Reply>, PortalError> {
		if content.trim().is_empty() {
			return Ok(None);
		}
		let name = self.current_ticket_name().ok_or(PortalError::NoTicket)?;
		let result = self.api.reply_to_ticket(&name, content).await;
		self.checked(result).map(Some)
	}

	/// Assigns or unassigns an agent on the open ticket.
	pub async fn toggle_assignee(&self, assignee: &str) -> Result<Vec<String>, PortalError> {
		let name = self.current_ticket_name().ok_or(PortalError::NoTicket)?;
		let result = self.api.toggle_assignee(&name, assignee).await;
		self.checked(result)
	}

	/// Sets the status of the open ticket.
	pub async fn set_status(&self, status: &str) -> Result<String, PortalError> {
		let name = self.current_ticket_name().ok_or(PortalError::NoTicket)?;
		let result = self.api.set_status(&name, status).await;
		self.checked(result)
	}

	/// Lists the agent's team.
	pub async fn team(&self) -> Result<Vec<Agent>, PortalError> {
		let result = self.api.get_agents().await;
		self.checked(result)
	}

	/// Registers a team member.
	pub async fn add_agent(&self, new_agent: &NewAgent) -> Result<Option<Agent>, PortalError> {
		if [&new_agent.email, &new_agent.firstname, &new_agent.lastname]
			.iter()
			.any(|field| field.trim().is_empty())
		{
			return Err(PortalError::IncompleteAgent);
		}
		if !is_valid_email(&new_agent.email) {
			return Err(PortalError::InvalidEmail(new_agent.email.clone()));
		}
		let result = self.api.add_agent(new_agent).await;
		self.checked(result)
	}

	pub async fn remove_agent(&self, email: &str) -> Result<(), PortalError> {
		let result = self.api.remove_agent(email).await;
		self.checked(result)
	}

	pub async fn disable_agent(&self, email: &str) -> Result<(), PortalError> {
		let result = self.api.disable_agent(email).await;
		self.checked(result)
	}

	/// Logs out on a rejected session, then passes the result on.
	fn checked<T>(&self, result: Result<T, ApiError>) -> Result<T, PortalError> {
		match result {
			Err(err) if err.is_invalid_session() => {
				tracing::warn!(error = %err, "session rejected, logging out");
				self.logout()?;
				Err(err.into())
			}
			other => Ok(other?),
		}
	}

	/// Returns a snapshot of the portal state.
	pub fn state(&self) -> PortalState {
		self.state.get()
	}

	/// Subscribes to portal state changes.
	pub fn subscribe(&self, subscriber: impl Fn(&PortalState) + 'static) -> SubscriptionId {
		self.state.subscribe(subscriber)
	}

	pub fn is_logged_in(&self) -> bool {
		self.state.with(|s| s.session_key.is_some())
	}

	/// Returns the view the router shows.
	pub fn current_view(&self) -> Option<PortalView> {
		self.router
			.route_name()
			.and_then(|name| PortalView::from_route_name(&name))
	}

	pub fn router(&self) -> &Router<PortalView> {
		&self.router
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	pub fn sessions(&self) -> &SessionKeyStore<S> {
		&self.sessions
	}

	pub fn settings(&self) -> &PortalSettings {
		&self.settings
	}

	pub fn url_state(&self) -> &UrlState {
		&self.url_state
	}
}
