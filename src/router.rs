//! History API based client-side routing
//!
//! Named routes, query parameter extraction, push/replace navigation and
//! back/forward handling on top of [`History`].

// Re-export all support-router functionality
pub use support_router::*;
