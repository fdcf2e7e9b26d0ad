/* src/memory/map/read.rs */

use std::collections::HashMap;

#[cfg(feature = "events")]
use super::super::StoreEvent;
use super::MemoryMap;

impl<V> MemoryMap<V>
where
	V: Clone + Send + Sync,
{
	/// Gets a copy of the value for `key`.
	pub(crate) async fn get(&self, key: &str) -> Option<V> {
		self.locked(async { self.inner.load().get(key).cloned() })
			.await
	}

	/// Copies every entry while holding the lock.
	pub(crate) async fn snapshot(&self) -> HashMap<String, V> {
		self.locked(async { (**self.inner.load()).clone() })
			.await
	}

	/// Number of entries as of the last published write.
	pub(crate) fn len(&self) -> usize {
		self.inner.load().len()
	}

	#[cfg(feature = "events")]
	pub(crate) fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent<V>> {
		self.events.subscribe()
	}
}
