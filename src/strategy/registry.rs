/* src/strategy/registry.rs */

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use super::{
	ClientFilterStrategy, DenyListStrategy, ExpressionStrategy, PonderationStrategy,
	ReleaseDateStrategy, SharedStrategy,
};
use crate::error::{FlagError, FlagResult};

/// Builds a strategy from its init parameters.
pub type StrategyFactory =
	Arc<dyn Fn(&BTreeMap<String, String>) -> FlagResult<SharedStrategy> + Send + Sync>;

static GLOBAL: LazyLock<StrategyRegistry> = LazyLock::new(StrategyRegistry::with_builtins);

/// Maps strategy kinds to factories so decoded features can rebuild their
/// strategy from data.
///
/// Reads are lock-free; registration copies the map (RCU).
pub struct StrategyRegistry {
	factories: ArcSwap<HashMap<String, StrategyFactory>>,
}

impl StrategyRegistry {
	/// Creates a registry without any kinds.
	pub fn empty() -> Self {
		Self {
			factories: ArcSwap::from_pointee(HashMap::new()),
		}
	}

	/// Creates a registry knowing every built-in kind.
	pub fn with_builtins() -> Self {
		let registry = Self::empty();
		registry.register(ClientFilterStrategy::KIND, |params| {
			Ok(Arc::new(ClientFilterStrategy::from_params(params)?) as SharedStrategy)
		});
		registry.register(DenyListStrategy::KIND, |params| {
			Ok(Arc::new(DenyListStrategy::from_params(params)?) as SharedStrategy)
		});
		registry.register(ReleaseDateStrategy::KIND, |params| {
			Ok(Arc::new(ReleaseDateStrategy::from_params(params)?) as SharedStrategy)
		});
		registry.register(PonderationStrategy::KIND, |params| {
			Ok(Arc::new(PonderationStrategy::from_params(params)?) as SharedStrategy)
		});
		registry.register(ExpressionStrategy::KIND, |params| {
			Ok(Arc::new(ExpressionStrategy::from_params(params)?) as SharedStrategy)
		});
		registry
	}

	/// The process-wide registry used when decoding features.
	pub fn global() -> &'static StrategyRegistry {
		&GLOBAL
	}

	/// Registers or replaces the factory for `kind`.
	pub fn register<F>(&self, kind: impl Into<String>, factory: F)
	where
		F: Fn(&BTreeMap<String, String>) -> FlagResult<SharedStrategy> + Send + Sync + 'static,
	{
		let kind = kind.into();
		let factory: StrategyFactory = Arc::new(factory);
		self.factories.rcu(|current| {
			let mut next = (**current).clone();
			next.insert(kind.clone(), Arc::clone(&factory));
			next
		});
		tracing::debug!(kind = %kind, "strategy kind registered");
	}

	pub fn contains(&self, kind: &str) -> bool {
		self.factories.load().contains_key(kind)
	}

	pub fn kinds(&self) -> Vec<String> {
		let mut kinds: Vec<String> = self.factories.load().keys().cloned().collect();
		kinds.sort();
		kinds
	}

	/// Instantiates `kind` with `params`.
	pub fn create(&self, kind: &str, params: &BTreeMap<String, String>) -> FlagResult<SharedStrategy> {
		let factory = self
			.factories
			.load()
			.get(kind)
			.cloned()
			.ok_or_else(|| FlagError::InvalidArgument(format!("unknown strategy kind: {kind}")))?;
		factory(params)
	}
}

impl Default for StrategyRegistry {
	fn default() -> Self {
		Self::with_builtins()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builtins_registered() {
		let registry = StrategyRegistry::with_builtins();
		assert_eq!(
			registry.kinds(),
			vec![
				"client_filter",
				"deny_list",
				"expression",
				"ponderation",
				"release_date"
			]
		);
	}

	#[test]
	fn test_unknown_kind() {
		let registry = StrategyRegistry::empty();
		let err = registry.create("nope", &BTreeMap::new()).unwrap_err();
		assert!(matches!(err, FlagError::InvalidArgument(_)));
	}

	#[test]
	fn test_create_passes_params() {
		let registry = StrategyRegistry::with_builtins();
		let params = BTreeMap::from([("weight".to_string(), "0.25".to_string())]);
		let strategy = registry.create("ponderation", &params).unwrap();
		assert_eq!(strategy.kind(), "ponderation");
		assert_eq!(strategy.init_params(), &params);
	}
}
