//! Router link for declarative navigation.
//!
//! A `RouterLink` pairs a [`NavigationTarget`] with link content. Its `href`
//! is the URL `push` would produce, so the link still works when opened in a
//! new tab, while a normal click navigates through the router without a page
//! reload.
//!
//! # Example
//!
//! ```
//! use support_router::{LazyView, MemoryHistory, NavigationTarget, RouteTable, Router, RouterLink};
//!
//! let table = RouteTable::builder()
//!     .route("tickets", "/agent/tickets", LazyView::ready(()))
//!     .route_accepting("ticket", "/agent/ticket", ["ticket"], LazyView::ready(()))
//!     .build()?;
//! let router = Router::init(table, MemoryHistory::new("/agent/tickets"))?;
//!
//! let link = RouterLink::new(NavigationTarget::new("ticket").param("ticket", "ISS-3"), "ISS-3");
//! assert_eq!(link.href(&router)?, "/agent/ticket?ticket=ISS-3");
//! link.activate(&router)?;
//! assert!(router.is_active("ticket"));
//! # Ok::<(), support_router::RouterError>(())
//! ```

use crate::error::RouterError;
use crate::router::{NavigationTarget, Router};

/// A link that navigates without a full page reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterLink {
	to: NavigationTarget,
	content: String,
	class: Option<String>,
	/// Whether to replace the current history entry.
	replace: bool,
}

impl RouterLink {
	/// Creates a new link.
	pub fn new(to: impl Into<NavigationTarget>, content: impl Into<String>) -> Self {
		Self {
			to: to.into(),
			content: content.into(),
			class: None,
			replace: false,
		}
	}

	/// Sets the CSS class.
	pub fn class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}

	/// Sets whether to replace the current history entry.
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	pub fn to(&self) -> &NavigationTarget {
		&self.to
	}

	pub fn content(&self) -> &str {
		&self.content
	}

	pub fn is_replace(&self) -> bool {
		self.replace
	}

	/// Returns the link's URL.
	pub fn href<V: 'static>(&self, router: &Router<V>) -> Result<String, RouterError> {
		router.href(&self.to)
	}

	/// Anchor attributes for the view layer.
	pub fn attributes<V: 'static>(&self, router: &Router<V>) -> Result<Vec<(String, String)>, RouterError> {
		let mut attrs = vec![
			("href".to_string(), self.href(router)?),
			("data-link".to_string(), "true".to_string()),
		];
		if let Some(class) = &self.class {
			attrs.push(("class".to_string(), class.clone()));
		}
		if self.replace {
			attrs.push(("data-replace".to_string(), "true".to_string()));
		}
		Ok(attrs)
	}

	/// Navigates to the link's target.
	pub fn activate<V: 'static>(&self, router: &Router<V>) -> Result<(), RouterError> {
		if self.replace {
			router.replace(self.to.clone())
		} else {
			router.push(self.to.clone())
		}
	}

	/// Click handler: suppresses the browser's own navigation and routes
	/// through the router instead.
	#[cfg(target_arch = "wasm32")]
	pub fn on_click<V: 'static>(&self, router: &Router<V>, event: &web_sys::Event) -> Result<(), RouterError> {
		event.prevent_default();
		event.stop_propagation();
		self.activate(router)
	}
}
