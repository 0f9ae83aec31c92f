//! Observable - single-writer state container with synchronous notification.
//!
//! `Observable<T>` holds a value shared by reference counting, like a reactive
//! signal, and keeps an explicit list of subscribers. Every `set()` or
//! `update()` calls each subscriber with the new value before returning, so a
//! write is visible to all current subscribers before the next event is
//! processed.
//!
//! ## Example
//!
//! ```
//! use support_router::Observable;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = Observable::new(0);
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! count.subscribe(move |n| sink.set(*n));
//!
//! count.set(42);
//! assert_eq!(seen.get(), 42);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
	value: RefCell<T>,
	subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
	next_id: Cell<u64>,
}

/// A shared value that notifies subscribers on every write.
///
/// Clones share the same value and subscriber list.
pub struct Observable<T: 'static> {
	inner: Rc<Inner<T>>,
}

impl<T: Clone + 'static> Observable<T> {
	/// Creates an observable with the given initial value.
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(Inner {
				value: RefCell::new(value),
				subscribers: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
			}),
		}
	}

	/// Returns a snapshot of the current value.
	pub fn get(&self) -> T {
		self.inner.value.borrow().clone()
	}

	/// Reads the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Replaces the value and notifies subscribers.
	pub fn set(&self, value: T) {
		*self.inner.value.borrow_mut() = value;
		self.notify();
	}

	/// Mutates the value in place and notifies subscribers once.
	pub fn update(&self, f: impl FnOnce(&mut T)) {
		f(&mut self.inner.value.borrow_mut());
		self.notify();
	}

	/// Registers a subscriber called after every write.
	pub fn subscribe(&self, subscriber: impl Fn(&T) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.inner.next_id.get());
		self.inner.next_id.set(id.0 + 1);
		self.inner
			.subscribers
			.borrow_mut()
			.push((id, Rc::new(subscriber)));
		id
	}

	/// Removes a subscriber. Returns `false` if it was not registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.inner.subscribers.borrow_mut();
		let before = subscribers.len();
		subscribers.retain(|(sid, _)| *sid != id);
		subscribers.len() != before
	}

	/// Returns the number of registered subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.borrow().len()
	}

	fn notify(&self) {
		// Subscribers may read, write, subscribe or unsubscribe; hold no borrows
		// while calling them.
		let snapshot = self.get();
		let subscribers: Vec<Subscriber<T>> = self
			.inner
			.subscribers
			.borrow()
			.iter()
			.map(|(_, s)| Rc::clone(s))
			.collect();
		for subscriber in subscribers {
			subscriber(&snapshot);
		}
	}
}

impl<T: 'static> Clone for Observable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Observable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Observable")
			.field("value", &*self.inner.value.borrow())
			.field("subscribers", &self.inner.subscribers.borrow().len())
			.finish()
	}
}
