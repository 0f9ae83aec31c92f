//! Support desk agent portal.
//!
//! The portal is a single-page application mounted below
//! [`PortalSettings::base_path`]. It routes between the login screen, the
//! ticket list, a single ticket and the team settings with
//! [`support_router`], keeps the agent's session key in web storage, and
//! talks to the support site through [`AgentApi`].
//!
//! ## Modules
//!
//! - [`settings`]: TOML-loadable configuration
//! - [`views`]: the portal screens and their route table
//! - [`session`]: session key persistence
//! - [`api`]: RPC client and response types
//! - [`status`]: ticket status labels and indicator colours
//! - [`filter`]: ticket list filters
//! - [`portal`]: [`AgentPortal`], the application state

pub mod api;
pub mod error;
pub mod filter;
pub mod portal;
pub mod session;
pub mod settings;
pub mod status;
pub mod views;

pub use api::{
	Agent, AgentApi, HttpTransport, NewAgent, Reply, RpcAgentApi, RpcTransport, Ticket, TicketSummary,
};
pub use error::{ApiError, PortalError, StorageError};
pub use filter::{AssignmentFilter, StatusFilter, TicketFilter};
pub use portal::{AgentPortal, PortalState, UrlState, is_valid_email};
#[cfg(target_arch = "wasm32")]
pub use session::LocalStorage;
pub use session::{MemoryStorage, SessionKeyStore, SessionStorage};
pub use settings::{PortalSettings, SettingsError};
pub use status::{TicketStatus, indicator_color, status_label};
pub use views::{PortalView, agent_routes};
