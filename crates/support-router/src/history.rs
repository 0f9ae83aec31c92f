//! History API boundary.
//!
//! The router reads the current location and writes new URLs through the
//! [`History`] trait. [`MemoryHistory`] keeps the back/forward stack in memory
//! (native targets and tests); on `wasm32` targets [`BrowserHistory`] drives
//! `window.history` and listens for `popstate`.

use crate::error::HistoryError;
use crate::location::Location;
use std::cell::RefCell;
use std::rc::Rc;

/// Callback invoked after a back/forward navigation with the new location.
pub type PopListener = Box<dyn Fn(&Location)>;

/// Browser history and location access.
pub trait History {
	/// Returns the current location.
	fn location(&self) -> Result<Location, HistoryError>;

	/// Pushes a new history entry and makes it current, without reloading.
	fn push(&self, url: &str) -> Result<(), HistoryError>;

	/// Replaces the current history entry, without reloading.
	fn replace(&self, url: &str) -> Result<(), HistoryError>;

	/// Registers a listener for back/forward navigation.
	///
	/// `push` and `replace` never invoke listeners.
	fn listen(&self, listener: PopListener) -> Result<(), HistoryError>;
}

#[derive(Debug)]
struct Stack {
	entries: Vec<Location>,
	index: usize,
}

/// In-memory history stack.
///
/// Clones share the same stack and listeners, so a test can keep a handle to
/// drive back/forward navigation after handing one to the router.
#[derive(Clone)]
pub struct MemoryHistory {
	stack: Rc<RefCell<Stack>>,
	listeners: Rc<RefCell<Vec<Rc<dyn Fn(&Location)>>>>,
}

impl MemoryHistory {
	/// Creates a history whose only entry is `url`.
	pub fn new(url: &str) -> Self {
		Self {
			stack: Rc::new(RefCell::new(Stack {
				entries: vec![Location::parse(url)],
				index: 0,
			})),
			listeners: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Returns the current location.
	pub fn current(&self) -> Location {
		let stack = self.stack.borrow();
		stack.entries[stack.index].clone()
	}

	/// Returns all entries, oldest first.
	pub fn entries(&self) -> Vec<Location> {
		self.stack.borrow().entries.clone()
	}

	/// Returns the index of the current entry.
	pub fn index(&self) -> usize {
		self.stack.borrow().index
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.stack.borrow().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.stack.borrow().entries.is_empty()
	}

	/// Moves one entry back. Returns `false` at the start of the stack.
	pub fn back(&self) -> bool {
		self.go(-1)
	}

	/// Moves one entry forward. Returns `false` at the end of the stack.
	pub fn forward(&self) -> bool {
		self.go(1)
	}

	/// Moves `delta` entries and notifies listeners.
	///
	/// Out-of-range moves are ignored and return `false`.
	pub fn go(&self, delta: isize) -> bool {
		{
			let mut stack = self.stack.borrow_mut();
			let target = stack.index as isize + delta;
			if delta == 0 || target < 0 || target >= stack.entries.len() as isize {
				return false;
			}
			stack.index = target as usize;
		}
		self.notify();
		true
	}

	/// Simulates the user loading `url` from outside the application
	/// (address-bar edit, external link) and notifies listeners.
	pub fn set_location(&self, url: &str) {
		self.push_entry(Location::parse(url));
		self.notify();
	}

	fn push_entry(&self, location: Location) {
		let mut stack = self.stack.borrow_mut();
		let next = stack.index + 1;
		stack.entries.truncate(next);
		stack.entries.push(location);
		stack.index = next;
	}

	fn notify(&self) {
		let location = self.current();
		let listeners: Vec<_> = self.listeners.borrow().iter().cloned().collect();
		for listener in listeners {
			listener(&location);
		}
	}
}

impl std::fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryHistory")
			.field("stack", &*self.stack.borrow())
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

impl History for MemoryHistory {
	fn location(&self) -> Result<Location, HistoryError> {
		Ok(self.current())
	}

	fn push(&self, url: &str) -> Result<(), HistoryError> {
		self.push_entry(Location::parse(url));
		Ok(())
	}

	fn replace(&self, url: &str) -> Result<(), HistoryError> {
		let mut stack = self.stack.borrow_mut();
		let index = stack.index;
		stack.entries[index] = Location::parse(url);
		Ok(())
	}

	fn listen(&self, listener: PopListener) -> Result<(), HistoryError> {
		self.listeners.borrow_mut().push(Rc::from(listener));
		Ok(())
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;

#[cfg(target_arch = "wasm32")]
mod browser {
	use super::{History, PopListener};
	use crate::error::HistoryError;
	use crate::location::Location;
	use wasm_bindgen::JsCast;
	use wasm_bindgen::JsValue;
	use wasm_bindgen::closure::Closure;

	/// `window.history` / `window.location` backed history.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct BrowserHistory;

	fn window() -> Result<web_sys::Window, HistoryError> {
		web_sys::window().ok_or_else(|| HistoryError::Unavailable("no global window".to_string()))
	}

	fn rejected(value: JsValue) -> HistoryError {
		HistoryError::Rejected(format!("{:?}", value))
	}

	fn history() -> Result<web_sys::History, HistoryError> {
		window()?.history().map_err(rejected)
	}

	impl History for BrowserHistory {
		fn location(&self) -> Result<Location, HistoryError> {
			let location = window()?.location();
			let path = location.pathname().map_err(rejected)?;
			let search = location.search().map_err(rejected)?;
			Ok(Location::new(path, Some(search)))
		}

		fn push(&self, url: &str) -> Result<(), HistoryError> {
			history()?
				.push_state_with_url(&JsValue::NULL, "", Some(url))
				.map_err(rejected)
		}

		fn replace(&self, url: &str) -> Result<(), HistoryError> {
			history()?
				.replace_state_with_url(&JsValue::NULL, "", Some(url))
				.map_err(rejected)
		}

		fn listen(&self, listener: PopListener) -> Result<(), HistoryError> {
			let closure = Closure::<dyn FnMut(web_sys::PopStateEvent)>::new(
				move |_event: web_sys::PopStateEvent| match BrowserHistory.location() {
					Ok(location) => listener(&location),
					Err(err) => tracing::warn!(error = %err, "popstate without readable location"),
				},
			);
			window()?
				.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
				.map_err(rejected)?;
			// The listener lives for the rest of the page session.
			closure.forget();
			Ok(())
		}
	}
}
