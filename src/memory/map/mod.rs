mod read;
mod write;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::Entity;
use crate::lock::ReentrantLock;
#[cfg(feature = "events")]
use super::StoreEvent;

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Keyed values guarded by one reentrant lock.
///
/// Every read and write runs inside the lock scope, so operations are
/// totally ordered by acquisition. Writes build the next map and publish it
/// in one swap, so a failed validation never leaves a partial change.
pub(crate) struct MemoryMap<V> {
	pub(crate) inner: ArcSwap<HashMap<String, V>>,
	pub(crate) lock: ReentrantLock,
	pub(crate) entity: Entity,
	#[cfg(feature = "events")]
	pub(crate) events: tokio::sync::broadcast::Sender<StoreEvent<V>>,
}

impl<V> MemoryMap<V>
where
	V: Clone + Send + Sync,
{
	pub(crate) fn new(entity: Entity) -> Self {
		Self::from_map(entity, HashMap::new())
	}

	pub(crate) fn from_map(entity: Entity, map: HashMap<String, V>) -> Self {
		Self {
			inner: ArcSwap::from_pointee(map),
			lock: ReentrantLock::new(),
			entity,
			#[cfg(feature = "events")]
			events: tokio::sync::broadcast::channel(DEFAULT_EVENT_CAPACITY).0,
		}
	}

	/// Note: events are dropped for subscribers that fall behind by more
	/// than `capacity`.
	#[cfg(feature = "events")]
	pub(crate) fn with_event_capacity(mut self, capacity: usize) -> Self {
		self.events = tokio::sync::broadcast::channel(capacity.max(1)).0;
		self
	}

	/// Runs `fut` inside this map's lock. Calls made by `fut` back into the
	/// map re-enter the lock.
	pub(crate) async fn locked<F: Future>(&self, fut: F) -> F::Output {
		self.lock.scope(fut).await
	}

	/// Applies `f` to a copy of the map and publishes the copy if `f` succeeds.
	/// Must be called with the lock held.
	pub(crate) fn apply<R, E>(
		&self,
		f: impl FnOnce(&mut HashMap<String, V>) -> Result<R, E>,
	) -> Result<R, E> {
		let mut next = (**self.inner.load()).clone();
		let out = f(&mut next)?;
		self.inner.store(Arc::new(next));
		Ok(out)
	}
}
