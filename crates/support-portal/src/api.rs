//! Agent API client.
//!
//! The portal talks to whitelisted server methods addressed by dotted paths
//! (`{api_base}.{method}`). Each call posts JSON arguments and receives the
//! method's return value in the response's `message` field.
//!
//! [`AgentApi`] is the seam the portal depends on. [`RpcAgentApi`] implements
//! it over any [`RpcTransport`]; [`HttpTransport`] is the `reqwest` based
//! transport used in production.

use crate::error::ApiError;
use crate::settings::PortalSettings;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::cell::RefCell;

/// Deserializes `0`/`1`, booleans and `null` as a flag.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Flag {
		Bool(bool),
		Int(i64),
	}

	Ok(match Option::<Flag>::deserialize(deserializer)? {
		Some(Flag::Bool(value)) => value,
		Some(Flag::Int(value)) => value != 0,
		None => false,
	})
}

/// Parses the JSON-encoded assignee list the server stores per issue.
fn parse_assignees(raw: Option<&str>) -> Vec<String> {
	raw.and_then(|raw| serde_json::from_str(raw).ok())
		.unwrap_or_default()
}

/// A support agent as returned by `get_agent`, `get_agents` and `add_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
	pub support_provider: String,
	pub team: String,
	pub team_name: Option<String>,
	pub email: String,
	#[serde(deserialize_with = "flag")]
	pub disabled: bool,
	pub full_name: Option<String>,
	/// Tickets of the agent's support provider, newest first.
	pub tickets: Vec<TicketSummary>,
}

impl Agent {
	/// Name to show for the agent; falls back to the email address.
	pub fn display_name(&self) -> &str {
		self.full_name.as_deref().unwrap_or(&self.email)
	}
}

/// A row of the ticket list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketSummary {
	pub name: String,
	pub subject: String,
	pub status: String,
	pub priority: Option<String>,
	pub modified: Option<String>,
	pub creation: Option<String>,
	pub site_name: Option<String>,
	#[serde(rename = "_assign")]
	pub assign: Option<String>,
	#[serde(rename = "_comments")]
	pub comments: Option<String>,
}

impl TicketSummary {
	/// Emails of the assigned agents.
	pub fn assignees(&self) -> Vec<String> {
		parse_assignees(self.assign.as_deref())
	}
}

/// A ticket with its reply thread.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
	pub name: String,
	pub status: String,
	pub subject: String,
	pub response_by: Option<String>,
	pub first_responded_on: Option<String>,
	pub resolution_on: Option<String>,
	pub resolution_by: Option<String>,
	pub raised_by: Option<String>,
	pub site_name: Option<String>,
	#[serde(rename = "_assign")]
	pub assign: Option<String>,
	/// Replies, newest first.
	pub replies: Vec<Reply>,
}

impl Ticket {
	/// Emails of the assigned agents.
	pub fn assignees(&self) -> Vec<String> {
		parse_assignees(self.assign.as_deref())
	}
}

/// A message in a ticket thread.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reply {
	pub name: String,
	pub sender: String,
	pub recipients: Option<String>,
	pub sender_full_name: Option<String>,
	pub content: String,
	#[serde(deserialize_with = "flag")]
	pub seen: bool,
	pub subject: Option<String>,
	pub creation: Option<String>,
	pub sent_or_received: String,
}

impl Reply {
	/// Whether the reply was sent by an agent rather than received.
	pub fn is_sent(&self) -> bool {
		self.sent_or_received == "Sent"
	}
}

/// Details for registering a new team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgent {
	pub email: String,
	pub firstname: String,
	pub lastname: String,
}

impl NewAgent {
	pub fn new(email: impl Into<String>, firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
		Self {
			email: email.into(),
			firstname: firstname.into(),
			lastname: lastname.into(),
		}
	}
}

/// Transport for dotted-path RPC calls.
#[async_trait(?Send)]
pub trait RpcTransport {
	/// Calls `method` with JSON `args` and returns the response `message`.
	///
	/// A server-side failure must be reported through
	/// [`ApiError::from_server_message`] so session expiry is recognised.
	async fn call(&self, method: &str, args: Value) -> Result<Value, ApiError>;
}

/// Operations the agent portal performs against the server.
#[async_trait(?Send)]
pub trait AgentApi {
	/// Validates a session key and makes it the active one.
	async fn login(&self, session_key: &str) -> Result<(), ApiError>;

	/// Emails a login link to a registered agent.
	async fn send_login_link(&self, email: &str) -> Result<(), ApiError>;

	/// Fetches the agent owning `session_key`, with their tickets.
	async fn get_agent(&self, session_key: &str) -> Result<Agent, ApiError>;

	/// Lists the members of the agent's team.
	async fn get_agents(&self) -> Result<Vec<Agent>, ApiError>;

	/// Adds a team member. Returns `None` when the agent already exists.
	async fn add_agent(&self, new_agent: &NewAgent) -> Result<Option<Agent>, ApiError>;

	async fn remove_agent(&self, email: &str) -> Result<(), ApiError>;

	async fn disable_agent(&self, email: &str) -> Result<(), ApiError>;

	async fn get_ticket(&self, issue: &str) -> Result<Ticket, ApiError>;

	/// Posts a reply and returns it as stored.
	async fn reply_to_ticket(&self, issue: &str, content: &str) -> Result<Reply, ApiError>;

	/// Assigns or unassigns `assignee`; returns the resulting assignees.
	async fn toggle_assignee(&self, issue: &str, assignee: &str) -> Result<Vec<String>, ApiError>;

	/// Sets the issue status; returns the status as saved.
	async fn set_status(&self, issue: &str, status: &str) -> Result<String, ApiError>;

	/// Forgets the active session key.
	fn clear_session_key(&self);
}

/// [`AgentApi`] over an [`RpcTransport`].
///
/// The key accepted by `login` or `get_agent` authenticates later calls.
#[derive(Debug)]
pub struct RpcAgentApi<T> {
	transport: T,
	api_base: String,
	session_key: RefCell<Option<String>>,
}

impl<T: RpcTransport> RpcAgentApi<T> {
	/// Creates a client for the methods below `settings.api_base`.
	pub fn new(transport: T, settings: &PortalSettings) -> Self {
		Self::with_api_base(transport, settings.api_base.clone())
	}

	pub fn with_api_base(transport: T, api_base: impl Into<String>) -> Self {
		Self {
			transport,
			api_base: api_base.into(),
			session_key: RefCell::new(None),
		}
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Returns the active session key.
	pub fn session_key(&self) -> Option<String> {
		self.session_key.borrow().clone()
	}

	/// Returns the fully qualified method path.
	pub fn method_path(&self, method: &str) -> String {
		format!("{}.{}", self.api_base, method)
	}

	fn active_key(&self) -> Result<String, ApiError> {
		self.session_key()
			.ok_or_else(|| ApiError::InvalidSession("no active session key".to_string()))
	}

	fn remember(&self, session_key: &str) {
		*self.session_key.borrow_mut() = Some(session_key.to_string());
	}

	async fn call<R: DeserializeOwned>(&self, method: &str, args: Value) -> Result<R, ApiError> {
		let path = self.method_path(method);
		tracing::debug!(method = %path, "rpc call");
		let message = self.transport.call(&path, args).await?;
		Ok(serde_json::from_value(message)?)
	}
}

#[async_trait(?Send)]
impl<T: RpcTransport> AgentApi for RpcAgentApi<T> {
	async fn login(&self, session_key: &str) -> Result<(), ApiError> {
		self.call::<Value>("login", json!({ "session_key": session_key }))
			.await?;
		self.remember(session_key);
		Ok(())
	}

	async fn send_login_link(&self, email: &str) -> Result<(), ApiError> {
		self.call::<Value>("send_login_link", json!({ "email": email }))
			.await?;
		Ok(())
	}

	async fn get_agent(&self, session_key: &str) -> Result<Agent, ApiError> {
		let agent = self
			.call("get_agent", json!({ "session_key": session_key }))
			.await?;
		self.remember(session_key);
		Ok(agent)
	}

	async fn get_agents(&self) -> Result<Vec<Agent>, ApiError> {
		let session_key = self.active_key()?;
		self.call("get_agents", json!({ "session_key": session_key }))
			.await
	}

	async fn add_agent(&self, new_agent: &NewAgent) -> Result<Option<Agent>, ApiError> {
		let session_key = self.active_key()?;
		self.call(
			"add_agent",
			json!({ "session_key": session_key, "new_agent": new_agent }),
		)
		.await
	}

	async fn remove_agent(&self, email: &str) -> Result<(), ApiError> {
		let session_key = self.active_key()?;
		self.call::<Value>(
			"remove_agent",
			json!({ "session_key": session_key, "email": email }),
		)
		.await?;
		Ok(())
	}

	async fn disable_agent(&self, email: &str) -> Result<(), ApiError> {
		let session_key = self.active_key()?;
		self.call::<Value>(
			"disable_agent",
			json!({ "session_key": session_key, "email": email }),
		)
		.await?;
		Ok(())
	}

	async fn get_ticket(&self, issue: &str) -> Result<Ticket, ApiError> {
		let session_key = self.active_key()?;
		self.call(
			"get_ticket",
			json!({ "session_key": session_key, "issue_name": issue }),
		)
		.await
	}

	async fn reply_to_ticket(&self, issue: &str, content: &str) -> Result<Reply, ApiError> {
		let session_key = self.active_key()?;
		// The reply travels as an encoded object so the server leaves its
		// markup untouched.
		let reply = json!({ "content": content }).to_string();
		self.call(
			"reply_to_ticket",
			json!({ "session_key": session_key, "issue_name": issue, "reply": reply }),
		)
		.await
	}

	async fn toggle_assignee(&self, issue: &str, assignee: &str) -> Result<Vec<String>, ApiError> {
		let session_key = self.active_key()?;
		let assign: Option<String> = self
			.call(
				"toggle_assignee",
				json!({ "session_key": session_key, "issue_name": issue, "assignee": assignee }),
			)
			.await?;
		Ok(parse_assignees(assign.as_deref()))
	}

	async fn set_status(&self, issue: &str, status: &str) -> Result<String, ApiError> {
		let session_key = self.active_key()?;
		self.call(
			"set_status",
			json!({ "session_key": session_key, "issue_name": issue, "status": status }),
		)
		.await
	}

	fn clear_session_key(&self) {
		self.session_key.borrow_mut().take();
	}
}

/// `reqwest` transport posting to `{endpoint}/api/method/{method}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpTransport {
	/// Creates a transport for the site at `endpoint` (scheme and host).
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), endpoint)
	}

	pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
		Self {
			client,
			endpoint: endpoint.into().trim_end_matches('/').to_string(),
		}
	}

	/// Returns the URL a method is posted to.
	pub fn method_url(&self, method: &str) -> String {
		format!("{}/api/method/{}", self.endpoint, method)
	}
}

#[async_trait(?Send)]
impl RpcTransport for HttpTransport {
	async fn call(&self, method: &str, args: Value) -> Result<Value, ApiError> {
		let response = self
			.client
			.post(self.method_url(method))
			.header(reqwest::header::ACCEPT, "application/json")
			.json(&args)
			.send()
			.await
			.map_err(|err| ApiError::Transport(err.to_string()))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|err| ApiError::Transport(err.to_string()))?;
		decode_response(method, status, &body)
	}
}

/// Turns an RPC response into its `message` payload or an error.
///
/// A failed call whose body is not JSON (a proxy error page, say) is
/// reported by its HTTP status.
fn decode_response(method: &str, status: reqwest::StatusCode, body: &str) -> Result<Value, ApiError> {
	if status.is_success() {
		let body: Value = serde_json::from_str(body)?;
		return Ok(body.get("message").cloned().unwrap_or(Value::Null));
	}

	let message = serde_json::from_str::<Value>(body)
		.ok()
		.and_then(|body| server_message(&body))
		.unwrap_or_else(|| status.to_string());
	tracing::debug!(%method, %status, %message, "rpc call failed");
	Err(ApiError::from_server_message(message))
}

/// Extracts a human-readable error from a failed RPC response body.
///
/// Looks at `exception`, then the JSON-encoded `_server_messages` list, then
/// a plain string `message`.
pub fn server_message(body: &Value) -> Option<String> {
	if let Some(exception) = body.get("exception").and_then(Value::as_str) {
		return Some(exception.to_string());
	}

	let from_server_messages = body
		.get("_server_messages")
		.and_then(Value::as_str)
		.and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
		.map(|messages| {
			messages
				.iter()
				.map(|entry| {
					serde_json::from_str::<Value>(entry)
						.ok()
						.and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
						.unwrap_or_else(|| entry.clone())
				})
				.collect::<Vec<_>>()
				.join("\n")
		})
		.filter(|joined| !joined.is_empty());
	if from_server_messages.is_some() {
		return from_server_messages;
	}

	body.get("message")
		.and_then(Value::as_str)
		.map(str::to_string)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_agent_decodes_integer_flags() {
		let agent: Agent = serde_json::from_value(json!({
			"support_provider": "Acme",
			"team": "TEAM-0001",
			"team_name": "Acme Support",
			"email": "jane@acme.test",
			"disabled": 0,
			"full_name": "Jane Doe",
			"tickets": [{
				"name": "ISS-1",
				"subject": "Site down",
				"status": "Replied",
				"_assign": "[\"jane@acme.test\"]"
			}]
		}))
		.unwrap();

		assert!(!agent.disabled);
		assert_eq!(agent.display_name(), "Jane Doe");
		assert_eq!(agent.tickets[0].assignees(), vec!["jane@acme.test".to_string()]);
	}

	#[rstest]
	fn test_missing_fields_default() {
		let reply: Reply = serde_json::from_value(json!({
			"name": "COMM-1",
			"content": "Hi",
			"seen": null,
			"sent_or_received": "Sent"
		}))
		.unwrap();
		assert!(reply.is_sent());
		assert!(!reply.seen);
		assert_eq!(reply.sender_full_name, None);
	}

	#[rstest]
	#[case(None, vec![])]
	#[case(Some("not json"), vec![])]
	#[case(Some("[\"a@x.test\",\"b@x.test\"]"), vec!["a@x.test", "b@x.test"])]
	fn test_parse_assignees(#[case] raw: Option<&str>, #[case] expected: Vec<&str>) {
		assert_eq!(parse_assignees(raw), expected);
	}

	#[rstest]
	fn test_server_message_prefers_exception() {
		let body = json!({
			"exception": "frappe.exceptions.ValidationError: Invalid Session Key",
			"_server_messages": "[\"{\\\"message\\\": \\\"Invalid Session Key\\\"}\"]"
		});
		assert_eq!(
			server_message(&body).as_deref(),
			Some("frappe.exceptions.ValidationError: Invalid Session Key")
		);
	}

	#[rstest]
	fn test_server_message_from_server_messages() {
		let body = json!({
			"_server_messages": "[\"{\\\"message\\\": \\\"Agent does not exist.\\\"}\"]"
		});
		assert_eq!(server_message(&body).as_deref(), Some("Agent does not exist."));
		assert_eq!(server_message(&json!({})), None);
	}

	#[rstest]
	fn test_http_transport_method_url() {
		let transport = HttpTransport::new("https://support.example.com/");
		assert_eq!(
			transport.method_url("support.www.support.portal.agent.get_agent"),
			"https://support.example.com/api/method/support.www.support.portal.agent.get_agent"
		);
	}

	#[rstest]
	fn test_decode_success_returns_message() {
		let value = decode_response("get_agent", reqwest::StatusCode::OK, r#"{"message":{"email":"a@x.test"}}"#).unwrap();
		assert_eq!(value, json!({ "email": "a@x.test" }));

		let value = decode_response("logout", reqwest::StatusCode::OK, "{}").unwrap();
		assert_eq!(value, Value::Null);
	}

	#[rstest]
	fn test_decode_success_with_bad_body_is_decode_error() {
		let err = decode_response("get_agent", reqwest::StatusCode::OK, "<html>").unwrap_err();
		assert!(matches!(err, ApiError::Decode(_)));
	}

	#[rstest]
	#[case(reqwest::StatusCode::BAD_GATEWAY, "<html><body>Bad Gateway</body></html>")]
	#[case(reqwest::StatusCode::SERVICE_UNAVAILABLE, "")]
	fn test_decode_error_page_keeps_status(#[case] status: reqwest::StatusCode, #[case] body: &str) {
		let err = decode_response("get_agent", status, body).unwrap_err();
		assert_eq!(err, ApiError::Server(status.to_string()));
	}

	#[rstest]
	fn test_decode_error_body_message() {
		let body = r#"{"exception":"frappe.exceptions.AuthenticationError: Invalid Session Key"}"#;
		let err = decode_response("get_agent", reqwest::StatusCode::FORBIDDEN, body).unwrap_err();
		assert!(err.is_invalid_session());

		let err = decode_response("get_agent", reqwest::StatusCode::FORBIDDEN, "{}").unwrap_err();
		assert_eq!(err, ApiError::Server("403 Forbidden".to_string()));
	}
}
