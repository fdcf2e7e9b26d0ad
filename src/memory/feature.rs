/* src/memory/feature.rs */

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use super::map::MemoryMap;
#[cfg(feature = "events")]
use super::StoreEvent;
use crate::error::{Entity, FlagError, FlagResult, ensure_not_blank};
use crate::feature::Feature;
use crate::store::{FeatureStore, compound};

/// Volatile, single-process [`FeatureStore`].
///
/// Compound operations (toggle, group and permission changes) run inside
/// the store lock, so concurrent toggles never lose an update.
pub struct InMemoryFeatureStore {
	map: MemoryMap<Feature>,
}

impl InMemoryFeatureStore {
	pub fn new() -> Self {
		Self {
			map: MemoryMap::new(Entity::Feature),
		}
	}

	/// Creates a store seeded with `features`; duplicate uids fail with
	/// `AlreadyExists`.
	pub fn with_features(features: impl IntoIterator<Item = Feature>) -> FlagResult<Self> {
		let mut map = HashMap::new();
		for feature in features {
			let uid = feature.uid().to_string();
			if map.contains_key(&uid) {
				return Err(FlagError::feature_exists(&uid));
			}
			map.insert(uid, feature);
		}
		Ok(Self {
			map: MemoryMap::from_map(Entity::Feature, map),
		})
	}

	/// Sets the event channel capacity.
	#[cfg(feature = "events")]
	pub fn with_event_capacity(mut self, capacity: usize) -> Self {
		self.map = self.map.with_event_capacity(capacity);
		self
	}

	/// Subscribes to change events.
	#[cfg(feature = "events")]
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent<Feature>> {
		self.map.subscribe()
	}

	/// Number of stored features.
	pub fn len(&self) -> usize {
		self.map.len()
	}
}

impl Default for InMemoryFeatureStore {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for InMemoryFeatureStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InMemoryFeatureStore")
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl FeatureStore for InMemoryFeatureStore {
	async fn get(&self, uid: &str) -> FlagResult<Option<Feature>> {
		ensure_not_blank(uid, "feature uid")?;
		Ok(self.map.get(uid).await)
	}

	async fn get_all(&self) -> FlagResult<HashMap<String, Feature>> {
		Ok(self.map.snapshot().await)
	}

	async fn add(&self, feature: Feature) -> FlagResult<()> {
		let uid = feature.uid().to_string();
		self.map.insert_new(uid, feature).await
	}

	async fn update(&self, feature: Feature) -> FlagResult<()> {
		let uid = feature.uid().to_string();
		self.map.replace(uid, feature).await.map(drop)
	}

	async fn remove(&self, uid: &str) -> FlagResult<()> {
		ensure_not_blank(uid, "feature uid")?;
		self.map.remove(uid).await.map(drop)
	}

	async fn clear(&self) -> FlagResult<()> {
		let count = self.map.clear().await;
		tracing::debug!(count, "feature store cleared");
		Ok(())
	}

	async fn toggle(&self, uid: &str) -> FlagResult<()> {
		self.map.locked(compound::toggle(self, uid)).await
	}

	async fn enable(&self, uid: &str) -> FlagResult<()> {
		self.map.locked(compound::set_enabled(self, uid, true)).await
	}

	async fn disable(&self, uid: &str) -> FlagResult<()> {
		self.map.locked(compound::set_enabled(self, uid, false)).await
	}

	async fn grant_permission(&self, uid: &str, permission: &str) -> FlagResult<()> {
		self.map
			.locked(compound::grant_permission(self, uid, permission))
			.await
	}

	async fn revoke_permission(&self, uid: &str, permission: &str) -> FlagResult<()> {
		self.map
			.locked(compound::revoke_permission(self, uid, permission))
			.await
	}

	async fn enable_group(&self, group: &str) -> FlagResult<()> {
		self.map
			.locked(compound::set_group_enabled(self, group, true))
			.await
	}

	async fn disable_group(&self, group: &str) -> FlagResult<()> {
		self.map
			.locked(compound::set_group_enabled(self, group, false))
			.await
	}

	async fn add_to_group(&self, uid: &str, group: &str) -> FlagResult<()> {
		self.map
			.locked(compound::add_to_group(self, uid, group))
			.await
	}

	async fn remove_from_group(&self, uid: &str) -> FlagResult<()> {
		self.map
			.locked(compound::remove_from_group(self, uid))
			.await
	}

	async fn count(&self) -> FlagResult<usize> {
		Ok(self.map.locked(async { self.map.len() }).await)
	}
}
