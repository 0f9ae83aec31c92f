//! Lazily resolved route views.

use crate::error::ViewError;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

type ViewFactory<V> = dyn Fn() -> Result<V, String>;

/// A view handle resolved on first activation.
///
/// Clones share both the factory and the resolved value, so a view is built
/// at most once per route definition. A failed resolution is not cached and
/// will be retried on the next activation.
pub struct LazyView<V: 'static> {
	factory: Rc<ViewFactory<V>>,
	resolved: Rc<OnceCell<V>>,
}

impl<V: 'static> LazyView<V> {
	/// Creates a view from a fallible factory.
	pub fn new<F, E>(factory: F) -> Self
	where
		F: Fn() -> Result<V, E> + 'static,
		E: fmt::Display,
	{
		Self {
			factory: Rc::new(move || factory().map_err(|e| e.to_string())),
			resolved: Rc::new(OnceCell::new()),
		}
	}

	/// Creates a view that is already resolved.
	pub fn ready(value: V) -> Self
	where
		V: Clone,
	{
		let resolved = OnceCell::new();
		let _ = resolved.set(value.clone());
		Self {
			factory: Rc::new(move || Ok(value.clone())),
			resolved: Rc::new(resolved),
		}
	}

	/// Returns whether the factory has already produced the view.
	pub fn is_resolved(&self) -> bool {
		self.resolved.get().is_some()
	}

	/// Resolves the view, invoking the factory on first use.
	///
	/// `route` names the owning route in the returned error.
	pub fn resolve(&self, route: &str) -> Result<V, ViewError>
	where
		V: Clone,
	{
		if let Some(view) = self.resolved.get() {
			return Ok(view.clone());
		}
		let view = (self.factory)().map_err(|reason| ViewError::new(route, reason))?;
		Ok(self.resolved.get_or_init(|| view).clone())
	}

	/// Returns whether two handles share the same factory.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.resolved, &other.resolved)
	}
}

impl<V: 'static> Clone for LazyView<V> {
	fn clone(&self) -> Self {
		Self {
			factory: Rc::clone(&self.factory),
			resolved: Rc::clone(&self.resolved),
		}
	}
}

impl<V: 'static> fmt::Debug for LazyView<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LazyView")
			.field("resolved", &self.is_resolved())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_factory_runs_once() {
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		let view = LazyView::new(move || {
			counter.set(counter.get() + 1);
			Ok::<_, String>("tickets")
		});

		assert!(!view.is_resolved());
		assert_eq!(view.resolve("tickets").unwrap(), "tickets");
		assert_eq!(view.clone().resolve("tickets").unwrap(), "tickets");
		assert_eq!(calls.get(), 1);
		assert!(view.is_resolved());
	}

	#[rstest]
	fn test_failed_resolution_is_retried() {
		let attempts = Rc::new(Cell::new(0));
		let counter = Rc::clone(&attempts);
		let view = LazyView::new(move || {
			counter.set(counter.get() + 1);
			if counter.get() < 2 {
				Err("offline")
			} else {
				Ok(7)
			}
		});

		let err = view.resolve("ticket").unwrap_err();
		assert_eq!(err, ViewError::new("ticket", "offline"));
		assert_eq!(view.resolve("ticket").unwrap(), 7);
		assert_eq!(attempts.get(), 2);
	}

	#[rstest]
	fn test_ready_view() {
		let view = LazyView::ready("login");
		assert!(view.is_resolved());
		assert!(view.ptr_eq(&view.clone()));
		assert!(!view.ptr_eq(&LazyView::ready("login")));
	}
}
