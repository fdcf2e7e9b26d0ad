/* src/lib.rs */

//!
//! Feature flags and typed properties behind pluggable stores.
//!
//! - **property**: Typed named values with optional fixed-values domains.
//! - **feature**: Toggles with group, permissions, strategy and custom properties.
//! - **store**: The `FeatureStore` / `PropertyStore` contracts and their
//!   compound operations.
//! - **memory**: In-memory backends guarded by a task-reentrant lock.
//! - **strategy**: Activation strategies and the registry that rebuilds them.
//! - **engine**: The `FlagEngine` facade answering "is this feature active".
//! - **codec**: Self-describing JSON / YAML wire form.
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `memory`: In-memory stores (default).
//! - `events`: Broadcast `StoreEvent`s from the in-memory stores.
//! - `json` (default), `yaml`: Codec formats.
//! - `validate`: Length checks on decoded feature records.
//!
//! ## Basic Usage
//!
//! See `demos/basic.rs` for a complete example.

pub mod codec;
pub mod context;
pub mod engine;
pub mod error;
pub mod feature;
pub mod lock;
#[cfg(feature = "memory")]
pub mod memory;
pub mod property;
pub mod store;
pub mod strategy;

pub use context::ExecutionContext;
pub use engine::{EngineSettings, FlagEngine, FlagEngineBuilder};
pub use error::{Entity, FlagError, FlagResult};
pub use feature::Feature;
pub use lock::ReentrantLock;
#[cfg(feature = "memory")]
pub use memory::{InMemoryFeatureStore, InMemoryPropertyStore};
pub use property::{AnyProperty, CustomProperty, FixedValues, LogLevel, Property, PropertyValue};
pub use store::{FeatureStore, PropertyStore, PropertyStoreExt};
pub use strategy::{FlippingStrategy, SharedStrategy, StrategyRegistry, StrategySpec};
