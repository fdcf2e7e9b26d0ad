/* src/engine/mod.rs */

//!
//! The engine answers "is this feature active now".
//!
//! It looks the feature up in its [`FeatureStore`], applies the auto-create
//! policy, and evaluates the attached strategy against the caller's context.

mod builder;

pub use builder::FlagEngineBuilder;

use std::fmt;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use crate::context::ExecutionContext;
use crate::error::{FlagError, FlagResult};
use crate::feature::Feature;
use crate::property::{AnyProperty, Property, PropertyValue};
use crate::store::{FeatureStore, PropertyStore, PropertyStoreExt};
use crate::strategy::FlippingStrategy;

static EMPTY_CONTEXT: LazyLock<ExecutionContext> = LazyLock::new(ExecutionContext::new);

/// Runtime policy of a [`FlagEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineSettings {
	/// Create a missing feature, disabled, when it is first checked.
	pub auto_create: bool,
}

/// Facade over a feature store and a property store.
pub struct FlagEngine {
	features: Arc<dyn FeatureStore>,
	properties: Arc<dyn PropertyStore>,
	settings: ArcSwap<EngineSettings>,
}

impl FlagEngine {
	pub fn builder() -> FlagEngineBuilder {
		FlagEngineBuilder::new()
	}

	pub fn new(features: Arc<dyn FeatureStore>, properties: Arc<dyn PropertyStore>) -> Self {
		Self {
			features,
			properties,
			settings: ArcSwap::from_pointee(EngineSettings::default()),
		}
	}

	pub fn feature_store(&self) -> &Arc<dyn FeatureStore> {
		&self.features
	}

	pub fn property_store(&self) -> &Arc<dyn PropertyStore> {
		&self.properties
	}

	pub fn settings(&self) -> EngineSettings {
		**self.settings.load()
	}

	pub fn auto_create(&self) -> bool {
		self.settings().auto_create
	}

	/// Switches the auto-create policy; takes effect for subsequent checks.
	pub fn set_auto_create(&self, auto_create: bool) {
		self.settings.rcu(|current| EngineSettings {
			auto_create,
			..**current
		});
	}

	/// Returns whether `uid` is active for `context`.
	///
	/// A disabled feature is inactive without consulting its strategy. An
	/// enabled feature without strategy is active. Otherwise the strategy
	/// decides, and its errors are returned as-is.
	pub async fn check(&self, uid: &str, context: Option<&ExecutionContext>) -> FlagResult<bool> {
		let feature = self.resolve(uid).await?;
		if !feature.is_enabled() {
			tracing::debug!(uid = %uid, "feature disabled");
			return Ok(false);
		}
		let Some(strategy) = feature.flipping_strategy() else {
			return Ok(true);
		};
		let context = context.unwrap_or(&EMPTY_CONTEXT);
		let active = strategy
			.evaluate(uid, self.features.as_ref(), context)
			.await?;
		tracing::debug!(uid = %uid, strategy = strategy.kind(), active, "strategy evaluated");
		Ok(active)
	}

	/// Like [`check`](Self::check) but evaluates `strategy` in place of the
	/// one attached to the feature.
	pub async fn check_with(
		&self,
		uid: &str,
		strategy: &dyn FlippingStrategy,
		context: Option<&ExecutionContext>,
	) -> FlagResult<bool> {
		let feature = self.resolve(uid).await?;
		if !feature.is_enabled() {
			return Ok(false);
		}
		let context = context.unwrap_or(&EMPTY_CONTEXT);
		strategy
			.evaluate(uid, self.features.as_ref(), context)
			.await
	}

	/// Fetches a feature, applying the auto-create policy.
	pub async fn feature(&self, uid: &str) -> FlagResult<Feature> {
		self.resolve(uid).await
	}

	pub async fn create_feature(&self, feature: Feature) -> FlagResult<()> {
		self.features.add(feature).await
	}

	pub async fn delete_feature(&self, uid: &str) -> FlagResult<()> {
		self.features.remove(uid).await
	}

	pub async fn enable(&self, uid: &str) -> FlagResult<()> {
		self.features.enable(uid).await
	}

	pub async fn disable(&self, uid: &str) -> FlagResult<()> {
		self.features.disable(uid).await
	}

	pub async fn toggle(&self, uid: &str) -> FlagResult<()> {
		self.features.toggle(uid).await
	}

	/// Fetches a property; fails with `NotFound` if absent.
	pub async fn property(&self, name: &str) -> FlagResult<AnyProperty> {
		self.properties
			.get(name)
			.await?
			.ok_or_else(|| FlagError::property_not_found(name))
	}

	/// Fetches a typed property; fails with `NotFound` or `TypeMismatch`.
	pub async fn property_as<T: PropertyValue>(&self, name: &str) -> FlagResult<Property<T>> {
		self.properties
			.get_as::<T>(name)
			.await?
			.ok_or_else(|| FlagError::property_not_found(name))
	}

	pub async fn create_property(&self, property: impl Into<AnyProperty>) -> FlagResult<()> {
		self.properties.add(property.into()).await
	}

	pub async fn delete_property(&self, name: &str) -> FlagResult<()> {
		self.properties.remove(name).await.map(drop)
	}

	async fn resolve(&self, uid: &str) -> FlagResult<Feature> {
		if let Some(feature) = self.features.get(uid).await? {
			return Ok(feature);
		}
		let auto_create = self.settings().auto_create;
		if !auto_create {
			return Err(FlagError::feature_not_found(uid));
		}

		let feature = Feature::new(uid)?;
		match self.features.add(feature.clone()).await {
			Ok(()) => {
				tracing::info!(uid = %uid, "feature auto-created");
				Ok(feature)
			}
			// Lost the race against another creator; use theirs.
			Err(e) if e.is_already_exists() => self
				.features
				.get(uid)
				.await?
				.ok_or_else(|| FlagError::feature_not_found(uid)),
			Err(e) => Err(e),
		}
	}
}

impl fmt::Debug for FlagEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FlagEngine")
			.field("settings", &self.settings())
			.finish_non_exhaustive()
	}
}
