/* src/strategy/client.rs */

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use super::{CLIENT_KEY, FlippingStrategy, split_list};
use crate::context::ExecutionContext;
use crate::error::{FlagError, FlagResult};
use crate::store::FeatureStore;

/// Active only for clients named in `granted_clients`.
#[derive(Debug, Clone)]
pub struct ClientFilterStrategy {
	params: BTreeMap<String, String>,
	clients: BTreeSet<String>,
}

impl ClientFilterStrategy {
	pub const KIND: &'static str = "client_filter";
	pub const PARAM: &'static str = "granted_clients";

	/// Fails when a client name cannot be written as a list item.
	pub fn new<I, S>(clients: I) -> FlagResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let clients = checked_clients(Self::KIND, clients)?;
		Ok(Self {
			params: list_params(Self::PARAM, &clients),
			clients,
		})
	}

	/// A missing or empty parameter names no clients.
	pub fn from_params(params: &BTreeMap<String, String>) -> FlagResult<Self> {
		let clients = parsed_clients(params, Self::PARAM);
		Ok(Self {
			params: list_params(Self::PARAM, &clients),
			clients,
		})
	}
}

#[async_trait]
impl FlippingStrategy for ClientFilterStrategy {
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
		Ok(context
			.get_str(CLIENT_KEY)
			.is_some_and(|client| self.clients.contains(client)))
	}
}

/// Active for every client except those named in `denied_clients`.
#[derive(Debug, Clone)]
pub struct DenyListStrategy {
	params: BTreeMap<String, String>,
	clients: BTreeSet<String>,
}

impl DenyListStrategy {
	pub const KIND: &'static str = "deny_list";
	pub const PARAM: &'static str = "denied_clients";

	/// Fails when a client name cannot be written as a list item.
	pub fn new<I, S>(clients: I) -> FlagResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let clients = checked_clients(Self::KIND, clients)?;
		Ok(Self {
			params: list_params(Self::PARAM, &clients),
			clients,
		})
	}

	/// A missing or empty parameter names no clients.
	pub fn from_params(params: &BTreeMap<String, String>) -> FlagResult<Self> {
		let clients = parsed_clients(params, Self::PARAM);
		Ok(Self {
			params: list_params(Self::PARAM, &clients),
			clients,
		})
	}
}

#[async_trait]
impl FlippingStrategy for DenyListStrategy {
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
		// Anonymous callers are not on any deny-list.
		Ok(context
			.get_str(CLIENT_KEY)
			.is_none_or(|client| !self.clients.contains(client)))
	}
}

fn checked_clients<I, S>(kind: &str, clients: I) -> FlagResult<BTreeSet<String>>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	clients
		.into_iter()
		.map(|client| {
			let client: String = client.into();
			if client.is_empty() || client.contains(',') || client.trim() != client {
				return Err(FlagError::InvalidArgument(format!(
					"strategy '{kind}': client '{client}' cannot be stored in a comma list"
				)));
			}
			Ok(client)
		})
		.collect()
}

fn parsed_clients(params: &BTreeMap<String, String>, key: &str) -> BTreeSet<String> {
	params
		.get(key)
		.map(|raw| split_list(raw).into_iter().collect())
		.unwrap_or_default()
}

fn list_params(key: &str, clients: &BTreeSet<String>) -> BTreeMap<String, String> {
	let joined = clients.iter().map(String::as_str).collect::<Vec<_>>().join(",");
	BTreeMap::from([(key.to_string(), joined)])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_client_lists_survive_params() {
		let lists: [&[&str]; 3] = [&[], &["web"], &["web", "ios", "android"]];
		for list in lists {
			let filter = ClientFilterStrategy::new(list.iter().copied()).unwrap();
			let rebuilt = ClientFilterStrategy::from_params(filter.init_params()).unwrap();
			assert_eq!(rebuilt.clients, filter.clients);
			assert_eq!(rebuilt.init_params(), filter.init_params());

			let deny = DenyListStrategy::new(list.iter().copied()).unwrap();
			let rebuilt = DenyListStrategy::from_params(deny.init_params()).unwrap();
			assert_eq!(rebuilt.clients, deny.clients);
			assert_eq!(rebuilt.init_params(), deny.init_params());
		}
	}

	#[test]
	fn test_missing_param_names_no_clients() {
		let filter = ClientFilterStrategy::from_params(&BTreeMap::new()).unwrap();
		assert!(filter.clients.is_empty());
		assert_eq!(
			filter.init_params(),
			ClientFilterStrategy::new(Vec::<String>::new()).unwrap().init_params()
		);
	}

	#[test]
	fn test_params_are_normalised() {
		let params = BTreeMap::from([(
			DenyListStrategy::PARAM.to_string(),
			" ios , web,,ios ".to_string(),
		)]);
		let deny = DenyListStrategy::from_params(&params).unwrap();
		assert_eq!(deny.init_params()[DenyListStrategy::PARAM], "ios,web");
	}

	#[test]
	fn test_unlistable_clients_rejected() {
		for bad in ["a,b", " web", "ios ", ""] {
			assert!(matches!(
				ClientFilterStrategy::new([bad]),
				Err(FlagError::InvalidArgument(_))
			));
			assert!(DenyListStrategy::new(["ok", bad]).is_err());
		}
	}
}
