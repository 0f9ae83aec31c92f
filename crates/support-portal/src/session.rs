//! Session key persistence.
//!
//! The agent's session key survives reloads in web storage. [`MemoryStorage`]
//! stands in for it on native targets and in tests.

use crate::error::StorageError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Key/value storage in the shape of the Web Storage API.
pub trait SessionStorage {
	fn get_item(&self, key: &str) -> Option<String>;

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

	fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share their data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
	data: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a storage with initial data.
	pub fn with_data(data: HashMap<String, String>) -> Self {
		Self {
			data: Rc::new(RefCell::new(data)),
		}
	}

	pub fn len(&self) -> usize {
		self.data.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.borrow().is_empty()
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.data.borrow().contains_key(key)
	}
}

impl SessionStorage for MemoryStorage {
	fn get_item(&self, key: &str) -> Option<String> {
		self.data.borrow().get(key).cloned()
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.data
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.data.borrow_mut().remove(key);
		Ok(())
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
	use super::SessionStorage;
	use crate::error::StorageError;

	/// `window.localStorage` backed storage.
	#[derive(Debug, Clone)]
	pub struct LocalStorage {
		storage: web_sys::Storage,
	}

	impl LocalStorage {
		/// Opens the page's local storage.
		pub fn open() -> Result<Self, StorageError> {
			let window = web_sys::window()
				.ok_or_else(|| StorageError::Unavailable("no global window".to_string()))?;
			let storage = window
				.local_storage()
				.map_err(|err| StorageError::Unavailable(format!("{:?}", err)))?
				.ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
			Ok(Self { storage })
		}
	}

	impl SessionStorage for LocalStorage {
		fn get_item(&self, key: &str) -> Option<String> {
			self.storage.get_item(key).ok().flatten()
		}

		fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
			self.storage
				.set_item(key, value)
				.map_err(|err| StorageError::Rejected(format!("{:?}", err)))
		}

		fn remove_item(&self, key: &str) -> Result<(), StorageError> {
			self.storage
				.remove_item(key)
				.map_err(|err| StorageError::Rejected(format!("{:?}", err)))
		}
	}
}

/// Reads and writes the agent session key under a fixed storage key.
#[derive(Debug, Clone)]
pub struct SessionKeyStore<S> {
	storage: S,
	key: String,
}

impl<S: SessionStorage> SessionKeyStore<S> {
	pub fn new(storage: S, key: impl Into<String>) -> Self {
		Self {
			storage,
			key: key.into(),
		}
	}

	/// Returns the storage key.
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Returns the stored session key. An empty entry counts as none.
	pub fn get(&self) -> Option<String> {
		self.storage
			.get_item(&self.key)
			.filter(|value| !value.is_empty())
	}

	/// Stores `session_key`; `None` or an empty key removes the entry.
	pub fn store(&self, session_key: Option<&str>) -> Result<(), StorageError> {
		match session_key.filter(|value| !value.is_empty()) {
			Some(value) => self.storage.set_item(&self.key, value),
			None => self.storage.remove_item(&self.key),
		}
	}

	/// Removes the stored session key.
	pub fn clear(&self) -> Result<(), StorageError> {
		self.store(None)
	}
}
