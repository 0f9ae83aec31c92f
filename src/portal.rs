//! Support desk agent portal
//!
//! Screens, session handling and the agent RPC client. See [`AgentPortal`].

// Re-export all support-portal functionality
pub use support_portal::*;
