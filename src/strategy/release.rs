use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{FlippingStrategy, NOW_KEY, required_param};
use crate::context::ExecutionContext;
use crate::error::{FlagError, FlagResult};
use crate::store::FeatureStore;

/// Active once the clock reaches `release_date` (RFC 3339).
///
/// A `DateTime<Utc>` under the `now` context key replaces the system clock.
#[derive(Debug, Clone)]
pub struct ReleaseDateStrategy {
	params: BTreeMap<String, String>,
	release: DateTime<Utc>,
}

impl ReleaseDateStrategy {
	pub const KIND: &'static str = "release_date";
	pub const PARAM: &'static str = "release_date";

	pub fn new(release: DateTime<Utc>) -> Self {
		Self {
			params: BTreeMap::from([(Self::PARAM.to_string(), release.to_rfc3339())]),
			release,
		}
	}

	pub fn from_params(params: &BTreeMap<String, String>) -> FlagResult<Self> {
		let raw = required_param(Self::KIND, params, Self::PARAM)?;
		let release = DateTime::parse_from_rfc3339(raw)
			.map_err(|e| {
				FlagError::InvalidArgument(format!("strategy '{}': bad release date '{raw}': {e}", Self::KIND))
			})?
			.with_timezone(&Utc);
		Ok(Self {
			params: params.clone(),
			release,
		})
	}

	pub fn release(&self) -> DateTime<Utc> {
		self.release
	}
}

#[async_trait]
impl FlippingStrategy for ReleaseDateStrategy {
	fn kind(&self) -> &str {
		Self::KIND
	}

	fn init_params(&self) -> &BTreeMap<String, String> {
		&self.params
	}

	async fn evaluate(
		&self,
		_feature_id: &str,
		_store: &dyn FeatureStore,
		context: &ExecutionContext,
	) -> FlagResult<bool> {
		let now = context
			.get::<DateTime<Utc>>(NOW_KEY)
			.copied()
			.unwrap_or_else(Utc::now);
		Ok(now >= self.release)
	}
}
