//! History API based client-side router.
//!
//! Maps browser locations (path + query string) to named routes and their
//! lazily loaded views, and drives navigation through `pushState` /
//! `replaceState` without full page reloads.
//!
//! ## Architecture
//!
//! - [`location`]: the path/query pair the router resolves
//! - [`params`]: insertion-ordered query parameters
//! - [`pattern`]: exact path patterns with an optional `{name}` segment
//! - [`route`]: route definitions and the ordered [`RouteTable`]
//! - [`view`]: lazily resolved, cached views
//! - [`observable`]: the subscribable cell holding [`RouterState`]
//! - [`history`]: the [`History`] boundary, in memory or backed by `window.history`
//! - [`router`]: the [`Router`] itself
//! - [`link`]: declarative navigation links
//!
//! ## Example
//!
//! ```
//! use support_router::{LazyView, MemoryHistory, NavigationTarget, RouteTable, Router};
//!
//! let table = RouteTable::builder()
//!     .route("login", "/support/portal/agent", LazyView::ready("login"))
//!     .route("tickets", "/support/portal/agent/tickets", LazyView::ready("tickets"))
//!     .route_accepting(
//!         "ticket",
//!         "/support/portal/agent/ticket",
//!         ["ticket"],
//!         LazyView::ready("ticket"),
//!     )
//!     .build()?;
//!
//! let history = MemoryHistory::new("/support/portal/agent/tickets");
//! let router = Router::init(table, history.clone())?;
//! assert!(router.is_active("tickets"));
//!
//! router.push(NavigationTarget::new("ticket").param("ticket", "ISS-9"))?;
//! assert_eq!(router.resolve_view()?, Some("ticket"));
//!
//! history.back();
//! assert!(router.is_active("tickets"));
//! # Ok::<(), support_router::RouterError>(())
//! ```

pub mod error;
pub mod history;
pub mod link;
pub mod location;
pub mod observable;
pub mod params;
pub mod pattern;
pub mod route;
pub mod router;
pub mod view;

pub use error::{HistoryError, RouterError, ViewError};
#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
pub use history::{History, MemoryHistory, PopListener};
pub use link::RouterLink;
pub use location::Location;
pub use observable::{Observable, SubscriptionId};
pub use params::{QueryParams, extract_params, parse_query};
pub use pattern::{PathPattern, base_path};
pub use route::{RouteDefinition, RouteMatch, RouteTable, RouteTableBuilder};
pub use router::{NavigationTarget, NavigationType, Router, RouterState};
pub use view::LazyView;
