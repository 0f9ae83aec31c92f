//! # Support Desk
//!
//! Client-side routing and the agent portal of the support desk.
//!
//! The History API router ([`router`]) is always built.
//!
//! ## Feature Flags
//!
//! - `portal` (default) - Agent portal state, sessions and RPC client ([`portal`])
//!
//! ## Example
//!
//! ```
//! # #[cfg(feature = "portal")]
//! # {
//! use support_desk::portal::{PortalSettings, PortalView, agent_routes};
//! use support_desk::router::{MemoryHistory, Router};
//!
//! let settings = PortalSettings::default();
//! let router = Router::init(
//!     agent_routes(&settings).unwrap(),
//!     MemoryHistory::new("/support/portal/agent/tickets"),
//! )
//! .unwrap();
//! assert_eq!(router.resolve_view().unwrap(), Some(PortalView::Tickets));
//! # }
//! ```

#[cfg(feature = "portal")]
pub mod portal;
pub mod router;
