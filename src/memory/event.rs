/* src/memory/event.rs */

/// Events emitted by an in-memory store after each successful write.
#[derive(Debug, Clone)]
pub enum StoreEvent<T> {
	/// A new entry was added.
	Added { key: String, value: T },
	/// An existing entry was replaced.
	Updated { key: String, old: T, new: T },
	/// An entry was removed.
	Removed { key: String, value: T },
	/// The store was emptied.
	Cleared { count: usize },
}

impl<T> StoreEvent<T> {
	/// Key of the entry concerned, `None` for `Cleared`.
	pub fn key(&self) -> Option<&str> {
		match self {
			Self::Added { key, .. } | Self::Updated { key, .. } | Self::Removed { key, .. } => {
				Some(key)
			}
			Self::Cleared { .. } => None,
		}
	}
}
