//! Portal error types.

use crate::settings::SettingsError;
use support_router::{HistoryError, RouterError};

/// Marker the server puts in messages for expired or unknown session keys.
pub const INVALID_SESSION_MARKER: &str = "Invalid Session";

/// Error raised by the agent API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
	/// The session key was rejected or is missing.
	#[error("Invalid Session: {0}")]
	InvalidSession(String),
	/// The server reported an application error.
	#[error("Server error: {0}")]
	Server(String),
	/// The request did not complete.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The response payload had an unexpected shape.
	#[error("Failed to decode response: {0}")]
	Decode(String),
}

impl ApiError {
	/// Classifies a server error message.
	pub fn from_server_message(message: impl Into<String>) -> Self {
		let message = message.into();
		if message.contains(INVALID_SESSION_MARKER) {
			Self::InvalidSession(message)
		} else {
			Self::Server(message)
		}
	}

	/// Checks whether the error means the agent must log in again.
	pub fn is_invalid_session(&self) -> bool {
		matches!(self, Self::InvalidSession(_))
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		Self::Decode(err.to_string())
	}
}

/// Error raised by a session storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
	/// No storage is reachable in the current context.
	#[error("Storage unavailable: {0}")]
	Unavailable(String),
	/// The storage rejected the write (quota, privacy mode).
	#[error("Storage write rejected: {0}")]
	Rejected(String),
}

/// Error type for portal operations.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
	#[error(transparent)]
	Router(#[from] RouterError),
	#[error(transparent)]
	Api(#[from] ApiError),
	#[error(transparent)]
	Storage(#[from] StorageError),
	#[error(transparent)]
	Settings(#[from] SettingsError),
	/// The entered email address is not usable for a login link.
	#[error("Invalid email address: {0}")]
	InvalidEmail(String),
	/// A new team member is missing a name or email.
	#[error("All fields are required")]
	IncompleteAgent,
	/// A ticket operation ran while no ticket is open.
	#[error("No ticket is open")]
	NoTicket,
}

impl From<HistoryError> for PortalError {
	fn from(err: HistoryError) -> Self {
		Self::Router(RouterError::from(err))
	}
}

impl PortalError {
	/// Checks whether the error means the agent must log in again.
	pub fn is_invalid_session(&self) -> bool {
		matches!(self, Self::Api(err) if err.is_invalid_session())
	}
}
