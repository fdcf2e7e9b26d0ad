/* src/strategy/ponderation.rs */

use std::collections::BTreeMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{FlippingStrategy, USER_KEY, required_param};
use crate::context::ExecutionContext;
use crate::error::{FlagError, FlagResult};
use crate::store::FeatureStore;

/// Percentage rollout.
///
/// Each `user` lands in a stable bucket derived from the feature id, so the
/// same user keeps the same answer while `weight` is unchanged. Callers
/// without a user are left out.
#[derive(Debug, Clone)]
pub struct PonderationStrategy {
	params: BTreeMap<String, String>,
	weight: f64,
}

impl PonderationStrategy {
	pub const KIND: &'static str = "ponderation";
	pub const PARAM: &'static str = "weight";

	pub fn new(weight: f64) -> FlagResult<Self> {
		Self::check_weight(weight)?;
		Ok(Self {
			params: BTreeMap::from([(Self::PARAM.to_string(), weight.to_string())]),
			weight,
		})
	}

	pub fn from_params(params: &BTreeMap<String, String>) -> FlagResult<Self> {
		let raw = required_param(Self::KIND, params, Self::PARAM)?;
		let weight: f64 = raw.parse().map_err(|_| {
			FlagError::InvalidArgument(format!("strategy '{}': weight '{raw}' is not a number", Self::KIND))
		})?;
		Self::check_weight(weight)?;
		Ok(Self {
			params: params.clone(),
			weight,
		})
	}

	pub fn weight(&self) -> f64 {
		self.weight
	}

	fn check_weight(weight: f64) -> FlagResult<()> {
		if !(0.0..=1.0).contains(&weight) {
			return Err(FlagError::InvalidArgument(format!(
				"strategy '{}': weight must be within [0, 1], got {weight}",
				Self::KIND
			)));
		}
		Ok(())
	}

	/// Maps (feature, user) onto [0, 1).
	fn bucket(feature_id: &str, user: &str) -> f64 {
		let mut hasher = Sha256::new();
		hasher.update(feature_id.as_bytes());
		hasher.update(b":");
		hasher.update(user.as_bytes());
		let digest = hasher.finalize();
		let head = u16::from_be_bytes([digest[0], digest[1]]);
		f64::from(head) / 65536.0
	}
}

#[async_trait]
impl FlippingStrategy for PonderationStrategy {
	fn kind(&self) -> &str {
		Self::KIND
	}

	fn init_params(&self) -> &BTreeMap<String, String> {
		&self.params
	}

	async fn evaluate(
		&self,
		feature_id: &str,
		_store: &dyn FeatureStore,
		context: &ExecutionContext,
	) -> FlagResult<bool> {
		let Some(user) = context.get_str(USER_KEY) else {
			return Ok(false);
		};
		Ok(Self::bucket(feature_id, user) < self.weight)
	}
}
