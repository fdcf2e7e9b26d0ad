/* src/context.rs */

//!
//! Request-scoped key/value bag consulted by strategies.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied, read-only values passed into strategy evaluation.
///
/// Values are arbitrary payloads looked up by their expected type; a lookup
/// with the wrong type behaves like a missing key.
#[derive(Clone, Default)]
pub struct ExecutionContext {
	values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a value, builder style.
	pub fn with<V: Any + Send + Sync>(mut self, key: impl Into<String>, value: V) -> Self {
		self.insert(key, value);
		self
	}

	pub fn insert<V: Any + Send + Sync>(&mut self, key: impl Into<String>, value: V) {
		self.values.insert(key.into(), Arc::new(value));
	}

	/// Looks up `key` as a `V`.
	pub fn get<V: Any + Send + Sync>(&self, key: &str) -> Option<&V> {
		self.values.get(key).and_then(|value| value.downcast_ref::<V>())
	}

	/// Looks up a text value stored as `String` or `&'static str`.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get::<String>(key)
			.map(String::as_str)
			.or_else(|| self.get::<&'static str>(key).copied())
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl fmt::Debug for ExecutionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<_> = self.values.keys().collect();
		keys.sort();
		f.debug_struct("ExecutionContext")
			.field("keys", &keys)
			.finish()
	}
}
