/* src/memory/mod.rs */

//!
//! In-memory reference backend.
//!
//! Each store owns one map and one reentrant lock; distinct stores share
//! nothing. Contents are lost with the process.

mod event;
mod feature;
mod map;
mod property;

pub use event::StoreEvent;
pub use feature::InMemoryFeatureStore;
pub use map::DEFAULT_EVENT_CAPACITY;
pub use property::InMemoryPropertyStore;
