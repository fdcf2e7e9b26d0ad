/* src/memory/property.rs */

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use super::map::MemoryMap;
#[cfg(feature = "events")]
use super::StoreEvent;
use crate::error::{Entity, FlagError, FlagResult, ensure_not_blank};
use crate::property::AnyProperty;
use crate::store::{PropertyStore, PropertyTransform, compound};

/// Volatile, single-process [`PropertyStore`].
///
/// `update_with` runs its read-modify-write inside the store lock.
pub struct InMemoryPropertyStore {
	map: MemoryMap<AnyProperty>,
}

impl InMemoryPropertyStore {
	pub fn new() -> Self {
		Self {
			map: MemoryMap::new(Entity::Property),
		}
	}

	/// Creates a store seeded with `properties`; duplicate names fail with
	/// `AlreadyExists`.
	pub fn with_properties<I, P>(properties: I) -> FlagResult<Self>
	where
		I: IntoIterator<Item = P>,
		P: Into<AnyProperty>,
	{
		let mut map = HashMap::new();
		for property in properties {
			let property = property.into();
			let name = property.name().to_string();
			if map.contains_key(&name) {
				return Err(FlagError::property_exists(&name));
			}
			map.insert(name, property);
		}
		Ok(Self {
			map: MemoryMap::from_map(Entity::Property, map),
		})
	}

	#[cfg(feature = "events")]
	pub fn with_event_capacity(mut self, capacity: usize) -> Self {
		self.map = self.map.with_event_capacity(capacity);
		self
	}

	#[cfg(feature = "events")]
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent<AnyProperty>> {
		self.map.subscribe()
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}
}

impl Default for InMemoryPropertyStore {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for InMemoryPropertyStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InMemoryPropertyStore")
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
	async fn get(&self, name: &str) -> FlagResult<Option<AnyProperty>> {
		ensure_not_blank(name, "property name")?;
		Ok(self.map.get(name).await)
	}

	async fn get_all(&self) -> FlagResult<HashMap<String, AnyProperty>> {
		Ok(self.map.snapshot().await)
	}

	async fn add(&self, property: AnyProperty) -> FlagResult<()> {
		let name = property.name().to_string();
		self.map.insert_new(name, property).await
	}

	async fn update(&self, property: AnyProperty) -> FlagResult<()> {
		let name = property.name().to_string();
		self.map.replace(name, property).await.map(drop)
	}

	async fn remove(&self, name: &str) -> FlagResult<AnyProperty> {
		ensure_not_blank(name, "property name")?;
		self.map.remove(name).await
	}

	async fn clear(&self) -> FlagResult<()> {
		let count = self.map.clear().await;
		tracing::debug!(count, "property store cleared");
		Ok(())
	}

	async fn is_empty(&self) -> FlagResult<bool> {
		Ok(self.map.locked(async { self.map.len() == 0 }).await)
	}

	async fn update_with(&self, name: &str, transform: PropertyTransform) -> FlagResult<AnyProperty> {
		self.map
			.locked(compound::update_property_with(self, name, transform))
			.await
	}
}
