//! Portal settings.
//!
//! Settings are plain TOML. Every key is optional and falls back to the
//! values the support site is deployed with.
//!
//! ```toml
//! base_path = "/support/portal/agent"
//! api_base = "support.www.support.portal.agent"
//! session_storage_key = "support-agent-key"
//! ```

use serde::{Deserialize, Serialize};

/// Default mount point of the agent portal.
pub const DEFAULT_BASE_PATH: &str = "/support/portal/agent";
/// Default dotted module path of the agent RPC methods.
pub const DEFAULT_API_BASE: &str = "support.www.support.portal.agent";
/// Default storage key for the agent session key.
pub const DEFAULT_SESSION_STORAGE_KEY: &str = "support-agent-key";

/// Error raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The TOML document could not be parsed.
	#[error("Failed to parse portal settings: {0}")]
	Parse(#[from] toml::de::Error),
	/// A value is present but unusable.
	#[error("Invalid portal setting '{key}': {reason}")]
	Invalid {
		/// The offending key.
		key: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}

/// Agent portal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
	/// Path the portal is mounted at; all routes live below it.
	pub base_path: String,
	/// Dotted module path prefixed to every RPC method name.
	pub api_base: String,
	/// Storage key under which the session key is persisted.
	pub session_storage_key: String,
}

impl Default for PortalSettings {
	fn default() -> Self {
		Self {
			base_path: DEFAULT_BASE_PATH.to_string(),
			api_base: DEFAULT_API_BASE.to_string(),
			session_storage_key: DEFAULT_SESSION_STORAGE_KEY.to_string(),
		}
	}
}

impl PortalSettings {
	/// Parses and validates settings from a TOML document.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Parse`] for malformed TOML and
	/// [`SettingsError::Invalid`] for unusable values.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(source)?;
		settings.validated()
	}

	/// Normalises and checks the settings.
	///
	/// A trailing `/` on `base_path` is dropped, except for the root path.
	pub fn validated(mut self) -> Result<Self, SettingsError> {
		if !self.base_path.starts_with('/') {
			return Err(SettingsError::Invalid {
				key: "base_path",
				reason: format!("'{}' must start with '/'", self.base_path),
			});
		}
		if self.base_path.contains(['?', '#', '{', '}']) {
			return Err(SettingsError::Invalid {
				key: "base_path",
				reason: format!("'{}' must be a plain path", self.base_path),
			});
		}
		let trimmed = self.base_path.trim_end_matches('/');
		self.base_path = if trimmed.is_empty() {
			"/".to_string()
		} else {
			trimmed.to_string()
		};

		if self.api_base.trim().is_empty() {
			return Err(SettingsError::Invalid {
				key: "api_base",
				reason: "must not be empty".to_string(),
			});
		}
		if self.session_storage_key.trim().is_empty() {
			return Err(SettingsError::Invalid {
				key: "session_storage_key",
				reason: "must not be empty".to_string(),
			});
		}
		Ok(self)
	}

	/// Joins `segment` onto the base path.
	pub fn path(&self, segment: &str) -> String {
		if segment.is_empty() {
			self.base_path.clone()
		} else if self.base_path == "/" {
			format!("/{}", segment)
		} else {
			format!("{}/{}", self.base_path, segment)
		}
	}

	/// Returns the fully qualified RPC method path.
	pub fn api_method(&self, method: &str) -> String {
		format!("{}.{}", self.api_base, method)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = PortalSettings::default();
		assert_eq!(settings.base_path, "/support/portal/agent");
		assert_eq!(settings.api_base, "support.www.support.portal.agent");
		assert_eq!(settings.session_storage_key, "support-agent-key");
		assert_eq!(settings.path("tickets"), "/support/portal/agent/tickets");
		assert_eq!(
			settings.api_method("get_agent"),
			"support.www.support.portal.agent.get_agent"
		);
	}

	#[rstest]
	fn test_partial_toml_keeps_defaults() {
		let settings = PortalSettings::from_toml_str(r#"base_path = "/helpdesk/""#).unwrap();
		assert_eq!(settings.base_path, "/helpdesk");
		assert_eq!(settings.api_base, DEFAULT_API_BASE);
		assert_eq!(settings.path(""), "/helpdesk");
	}

	#[rstest]
	fn test_root_base_path() {
		let settings = PortalSettings::from_toml_str(r#"base_path = "/""#).unwrap();
		assert_eq!(settings.path("settings"), "/settings");
	}

	#[rstest]
	#[case(r#"base_path = "support""#, "base_path")]
	#[case(r#"base_path = "/agent?x""#, "base_path")]
	#[case(r#"api_base = " ""#, "api_base")]
	#[case(r#"session_storage_key = """#, "session_storage_key")]
	fn test_invalid_values(#[case] source: &str, #[case] expected_key: &str) {
		match PortalSettings::from_toml_str(source) {
			Err(SettingsError::Invalid { key, .. }) => assert_eq!(key, expected_key),
			other => panic!("expected invalid setting, got {:?}", other),
		}
	}

	#[rstest]
	fn test_malformed_toml() {
		assert!(matches!(
			PortalSettings::from_toml_str("base_path = "),
			Err(SettingsError::Parse(_))
		));
	}
}
