/* src/strategy/mod.rs */

//!
//! Pluggable activation strategies.
//!
//! A strategy narrows an enabled feature: the engine evaluates it only when
//! the feature's base flag is on. Strategies are configured once through
//! string parameters and are shared between features through [`SharedStrategy`].
//!
//! - [`ClientFilterStrategy`] - allow-list on the `client` context value
//! - [`DenyListStrategy`] - deny-list on the `client` context value
//! - [`ReleaseDateStrategy`] - active from a given instant
//! - [`PonderationStrategy`] - stable percentage rollout by `user`
//! - [`ExpressionStrategy`] - boolean expression over other features

mod client;
mod expression;
mod ponderation;
mod registry;
mod release;

pub use client::{ClientFilterStrategy, DenyListStrategy};
pub use expression::ExpressionStrategy;
pub use ponderation::PonderationStrategy;
pub use registry::{StrategyFactory, StrategyRegistry};
pub use release::ReleaseDateStrategy;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::error::{FlagError, FlagResult};
use crate::store::FeatureStore;

/// Context key holding the caller's client identifier (`String` or `&'static str`).
pub const CLIENT_KEY: &str = "client";
/// Context key holding the caller's user identifier.
pub const USER_KEY: &str = "user";
/// Context key overriding the clock (`chrono::DateTime<Utc>`).
pub const NOW_KEY: &str = "now";

/// A pluggable predicate deciding activation of an enabled feature.
#[async_trait]
pub trait FlippingStrategy: Send + Sync + fmt::Debug {
	/// Registry name of the implementation.
	fn kind(&self) -> &str;

	/// Static configuration captured at construction.
	fn init_params(&self) -> &BTreeMap<String, String>;

	/// Decides whether `feature_id` is active. `store` may be queried for
	/// other features.
	async fn evaluate(
		&self,
		feature_id: &str,
		store: &dyn FeatureStore,
		context: &ExecutionContext,
	) -> FlagResult<bool>;
}

/// Strategy instance shared between features.
pub type SharedStrategy = Arc<dyn FlippingStrategy>;

/// Serializable description of a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
	pub kind: String,
	#[serde(default)]
	pub params: BTreeMap<String, String>,
}

impl StrategySpec {
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			params: BTreeMap::new(),
		}
	}

	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());
		self
	}

	pub fn of(strategy: &dyn FlippingStrategy) -> Self {
		Self {
			kind: strategy.kind().to_string(),
			params: strategy.init_params().clone(),
		}
	}
}

/// Fetches a required init parameter.
pub(crate) fn required_param<'a>(
	kind: &str,
	params: &'a BTreeMap<String, String>,
	key: &str,
) -> FlagResult<&'a str> {
	params
		.get(key)
		.map(|value| value.trim())
		.filter(|value| !value.is_empty())
		.ok_or_else(|| {
			FlagError::InvalidArgument(format!("strategy '{kind}' requires parameter '{key}'"))
		})
}

/// Splits a comma separated parameter into trimmed, non-empty items.
pub(crate) fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|item| !item.is_empty())
		.map(str::to_string)
		.collect()
}
