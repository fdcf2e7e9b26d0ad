/* src/engine/builder.rs */

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::{EngineSettings, FlagEngine};
use crate::error::FlagResult;
use crate::store::{FeatureStore, PropertyStore};

/// Builder for [`FlagEngine`].
///
/// Stores left unset default to the in-memory backend when the `memory`
/// feature is enabled, and are required otherwise.
#[derive(Default)]
pub struct FlagEngineBuilder {
	features: Option<Arc<dyn FeatureStore>>,
	properties: Option<Arc<dyn PropertyStore>>,
	settings: EngineSettings,
}

impl FlagEngineBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn feature_store(mut self, store: impl FeatureStore + 'static) -> Self {
		self.features = Some(Arc::new(store));
		self
	}

	pub fn shared_feature_store(mut self, store: Arc<dyn FeatureStore>) -> Self {
		self.features = Some(store);
		self
	}

	pub fn property_store(mut self, store: impl PropertyStore + 'static) -> Self {
		self.properties = Some(Arc::new(store));
		self
	}

	pub fn shared_property_store(mut self, store: Arc<dyn PropertyStore>) -> Self {
		self.properties = Some(store);
		self
	}

	/// Create missing features (disabled) on first check instead of failing.
	pub fn auto_create(mut self, auto_create: bool) -> Self {
		self.settings.auto_create = auto_create;
		self
	}

	pub fn settings(mut self, settings: EngineSettings) -> Self {
		self.settings = settings;
		self
	}

	pub fn build(self) -> FlagResult<FlagEngine> {
		let features = match self.features {
			Some(store) => store,
			None => default_feature_store()?,
		};
		let properties = match self.properties {
			Some(store) => store,
			None => default_property_store()?,
		};

		Ok(FlagEngine {
			features,
			properties,
			settings: ArcSwap::from_pointee(self.settings),
		})
	}
}

#[cfg(feature = "memory")]
fn default_feature_store() -> FlagResult<Arc<dyn FeatureStore>> {
	Ok(Arc::new(crate::memory::InMemoryFeatureStore::new()))
}

#[cfg(not(feature = "memory"))]
fn default_feature_store() -> FlagResult<Arc<dyn FeatureStore>> {
	Err(crate::error::FlagError::InvalidArgument(
		"feature store is required".to_string(),
	))
}

#[cfg(feature = "memory")]
fn default_property_store() -> FlagResult<Arc<dyn PropertyStore>> {
	Ok(Arc::new(crate::memory::InMemoryPropertyStore::new()))
}

#[cfg(not(feature = "memory"))]
fn default_property_store() -> FlagResult<Arc<dyn PropertyStore>> {
	Err(crate::error::FlagError::InvalidArgument(
		"property store is required".to_string(),
	))
}
