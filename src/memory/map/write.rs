/* src/memory/map/write.rs */

use std::convert::Infallible;

#[cfg(feature = "events")]
use super::super::StoreEvent;
use super::MemoryMap;
use crate::error::{FlagError, FlagResult};

impl<V> MemoryMap<V>
where
	V: Clone + Send + Sync,
{
	/// Inserts a value under a new key; fails with `AlreadyExists`.
	pub(crate) async fn insert_new(&self, key: String, value: V) -> FlagResult<()> {
		self.locked(async {
			self.apply(|map| {
				if map.contains_key(&key) {
					return Err(FlagError::AlreadyExists {
						entity: self.entity,
						key: key.clone(),
					});
				}
				map.insert(key.clone(), value.clone());
				Ok(())
			})?;

			#[cfg(feature = "events")]
			{
				let _ = self.events.send(StoreEvent::Added { key, value });
			}
			#[cfg(not(feature = "events"))]
			{
				let _ = (key, value);
			}

			Ok(())
		})
		.await
	}

	/// Replaces the value under an existing key and returns the old one;
	/// fails with `NotFound`.
	pub(crate) async fn replace(&self, key: String, value: V) -> FlagResult<V> {
		self.locked(async {
			let old = self.apply(|map| match map.get_mut(&key) {
				Some(slot) => Ok(std::mem::replace(slot, value.clone())),
				None => Err(FlagError::NotFound {
					entity: self.entity,
					key: key.clone(),
				}),
			})?;

			#[cfg(feature = "events")]
			{
				let _ = self.events.send(StoreEvent::Updated {
					key,
					old: old.clone(),
					new: value,
				});
			}
			#[cfg(not(feature = "events"))]
			{
				let _ = (key, value);
			}

			Ok(old)
		})
		.await
	}

	/// Removes and returns the value under `key`; fails with `NotFound`.
	pub(crate) async fn remove(&self, key: &str) -> FlagResult<V> {
		self.locked(async {
			let removed = self.apply(|map| {
				map.remove(key).ok_or_else(|| FlagError::NotFound {
					entity: self.entity,
					key: key.to_string(),
				})
			})?;

			#[cfg(feature = "events")]
			{
				let _ = self.events.send(StoreEvent::Removed {
					key: key.to_string(),
					value: removed.clone(),
				});
			}

			Ok(removed)
		})
		.await
	}

	/// Removes every entry and returns how many there were.
	pub(crate) async fn clear(&self) -> usize {
		self.locked(async {
			let Ok(count) = self.apply(|map| {
				let count = map.len();
				map.clear();
				Ok::<_, Infallible>(count)
			});

			#[cfg(feature = "events")]
			{
				let _ = self.events.send(StoreEvent::Cleared { count });
			}

			count
		})
		.await
	}
}
