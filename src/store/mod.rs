/* src/store/mod.rs */

//!
//! Backend contracts for features and properties.
//!
//! A backend implements the primitive operations (`get`, `get_all`, `add`,
//! `update`, `remove`, `clear`). Everything else has a default body in
//! terms of those primitives, see [`compound`]. Backends that can make a
//! compound operation atomic override it and delegate to the same helper
//! inside their own critical section.

pub mod compound;
mod ext;

pub use ext::PropertyStoreExt;

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::error::FlagResult;
use crate::feature::Feature;
use crate::property::AnyProperty;

/// Read-modify-write function applied by [`PropertyStore::update_with`].
pub type PropertyTransform = Box<dyn FnOnce(AnyProperty) -> FlagResult<AnyProperty> + Send>;

/// Persistence contract for features.
#[async_trait]
pub trait FeatureStore: Send + Sync {
	/// Returns the feature, `None` on miss.
	async fn get(&self, uid: &str) -> FlagResult<Option<Feature>>;

	/// Returns a copy of every feature keyed by uid.
	async fn get_all(&self) -> FlagResult<HashMap<String, Feature>>;

	/// Stores a new feature; fails with `AlreadyExists` on a duplicate uid.
	async fn add(&self, feature: Feature) -> FlagResult<()>;

	/// Replaces a stored feature; fails with `NotFound` if absent.
	async fn update(&self, feature: Feature) -> FlagResult<()>;

	/// Deletes a feature; fails with `NotFound` if absent.
	async fn remove(&self, uid: &str) -> FlagResult<()>;

	async fn clear(&self) -> FlagResult<()>;

	async fn exists(&self, uid: &str) -> FlagResult<bool> {
		compound::exists(self, uid).await
	}

	/// Flips the enabled flag.
	async fn toggle(&self, uid: &str) -> FlagResult<()> {
		compound::toggle(self, uid).await
	}

	async fn enable(&self, uid: &str) -> FlagResult<()> {
		compound::set_enabled(self, uid, true).await
	}

	async fn disable(&self, uid: &str) -> FlagResult<()> {
		compound::set_enabled(self, uid, false).await
	}

	async fn grant_permission(&self, uid: &str, permission: &str) -> FlagResult<()> {
		compound::grant_permission(self, uid, permission).await
	}

	async fn revoke_permission(&self, uid: &str, permission: &str) -> FlagResult<()> {
		compound::revoke_permission(self, uid, permission).await
	}

	/// Enables every member of `group`. No-op on an empty group.
	async fn enable_group(&self, group: &str) -> FlagResult<()> {
		compound::set_group_enabled(self, group, true).await
	}

	/// Disables every member of `group`. No-op on an empty group.
	async fn disable_group(&self, group: &str) -> FlagResult<()> {
		compound::set_group_enabled(self, group, false).await
	}

	async fn add_to_group(&self, uid: &str, group: &str) -> FlagResult<()> {
		compound::add_to_group(self, uid, group).await
	}

	async fn remove_from_group(&self, uid: &str) -> FlagResult<()> {
		compound::remove_from_group(self, uid).await
	}

	/// Members of `group` keyed by uid.
	async fn read_group(&self, group: &str) -> FlagResult<HashMap<String, Feature>> {
		compound::read_group(self, group).await
	}

	async fn exists_group(&self, group: &str) -> FlagResult<bool> {
		compound::exists_group(self, group).await
	}

	/// Every distinct group name in use.
	async fn list_groups(&self) -> FlagResult<BTreeSet<String>> {
		compound::list_groups(self).await
	}

	async fn count(&self) -> FlagResult<usize> {
		Ok(self.get_all().await?.len())
	}
}

/// Persistence contract for properties.
#[async_trait]
pub trait PropertyStore: Send + Sync {
	/// Returns the property, `None` on miss.
	async fn get(&self, name: &str) -> FlagResult<Option<AnyProperty>>;

	/// Returns a copy of every property keyed by name.
	async fn get_all(&self) -> FlagResult<HashMap<String, AnyProperty>>;

	/// Stores a new property; fails with `AlreadyExists` on a duplicate name.
	async fn add(&self, property: AnyProperty) -> FlagResult<()>;

	/// Replaces a stored property; fails with `NotFound` if absent.
	async fn update(&self, property: AnyProperty) -> FlagResult<()>;

	/// Deletes a property and returns it; fails with `NotFound` if absent.
	async fn remove(&self, name: &str) -> FlagResult<AnyProperty>;

	async fn clear(&self) -> FlagResult<()>;

	async fn contains(&self, name: &str) -> FlagResult<bool> {
		Ok(self.get(name).await?.is_some())
	}

	async fn list_property_ids(&self) -> FlagResult<BTreeSet<String>> {
		Ok(self.get_all().await?.into_keys().collect())
	}

	async fn is_empty(&self) -> FlagResult<bool> {
		Ok(self.get_all().await?.is_empty())
	}

	/// Replaces a property with `transform(current)`.
	///
	/// The transformed property must keep the original name; a rename fails
	/// with `InvalidArgument` and leaves the store untouched.
	async fn update_with(&self, name: &str, transform: PropertyTransform) -> FlagResult<AnyProperty> {
		compound::update_property_with(self, name, transform).await
	}
}
