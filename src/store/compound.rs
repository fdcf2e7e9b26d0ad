/* src/store/compound.rs */

//!
//! Compound store operations built only from the primitives.
//!
//! These are the default bodies of the store traits. They are not atomic on
//! their own: a backend wanting atomicity runs them inside its lock.

use std::collections::{BTreeSet, HashMap};

use super::{FeatureStore, PropertyStore, PropertyTransform};
use crate::error::{FlagError, FlagResult, ensure_not_blank};
use crate::feature::Feature;
use crate::property::AnyProperty;

async fn require<S: FeatureStore + ?Sized>(store: &S, uid: &str) -> FlagResult<Feature> {
	ensure_not_blank(uid, "feature uid")?;
	store
		.get(uid)
		.await?
		.ok_or_else(|| FlagError::feature_not_found(uid))
}

pub async fn exists<S: FeatureStore + ?Sized>(store: &S, uid: &str) -> FlagResult<bool> {
	ensure_not_blank(uid, "feature uid")?;
	Ok(store.get(uid).await?.is_some())
}

pub async fn toggle<S: FeatureStore + ?Sized>(store: &S, uid: &str) -> FlagResult<()> {
	let feature = require(store, uid).await?;
	store.update(feature.toggled()).await
}

/// Sets the enabled flag; writes only when it changes.
pub async fn set_enabled<S: FeatureStore + ?Sized>(
	store: &S,
	uid: &str,
	enabled: bool,
) -> FlagResult<()> {
	let feature = require(store, uid).await?;
	if feature.is_enabled() == enabled {
		return Ok(());
	}
	store.update(feature.with_enabled(enabled)).await
}

pub async fn grant_permission<S: FeatureStore + ?Sized>(
	store: &S,
	uid: &str,
	permission: &str,
) -> FlagResult<()> {
	ensure_not_blank(permission, "permission")?;
	let feature = require(store, uid).await?;
	if feature.permissions().contains(permission) {
		return Ok(());
	}
	store.update(feature.with_permission(permission)).await
}

pub async fn revoke_permission<S: FeatureStore + ?Sized>(
	store: &S,
	uid: &str,
	permission: &str,
) -> FlagResult<()> {
	let feature = require(store, uid).await?;
	if !feature.permissions().contains(permission) {
		return Ok(());
	}
	store.update(feature.without_permission(permission)).await
}

pub async fn set_group_enabled<S: FeatureStore + ?Sized>(
	store: &S,
	group: &str,
	enabled: bool,
) -> FlagResult<()> {
	let members = read_group(store, group).await?;
	let mut changed = 0usize;
	for feature in members.into_values() {
		if feature.is_enabled() != enabled {
			store.update(feature.with_enabled(enabled)).await?;
			changed += 1;
		}
	}
	if changed > 0 {
		tracing::info!(group = %group, enabled, changed, "group updated");
	}
	Ok(())
}

pub async fn add_to_group<S: FeatureStore + ?Sized>(
	store: &S,
	uid: &str,
	group: &str,
) -> FlagResult<()> {
	let feature = require(store, uid).await?;
	store.update(feature.with_group(group)).await
}

pub async fn remove_from_group<S: FeatureStore + ?Sized>(store: &S, uid: &str) -> FlagResult<()> {
	let feature = require(store, uid).await?;
	if feature.group().is_none() {
		return Ok(());
	}
	store.update(feature.without_group()).await
}

pub async fn read_group<S: FeatureStore + ?Sized>(
	store: &S,
	group: &str,
) -> FlagResult<HashMap<String, Feature>> {
	let mut all = store.get_all().await?;
	all.retain(|_, feature| feature.in_group(group));
	Ok(all)
}

pub async fn exists_group<S: FeatureStore + ?Sized>(store: &S, group: &str) -> FlagResult<bool> {
	Ok(store
		.get_all()
		.await?
		.values()
		.any(|feature| feature.in_group(group)))
}

pub async fn list_groups<S: FeatureStore + ?Sized>(store: &S) -> FlagResult<BTreeSet<String>> {
	Ok(store
		.get_all()
		.await?
		.values()
		.filter_map(|feature| feature.group().map(str::to_string))
		.collect())
}

pub async fn update_property_with<S: PropertyStore + ?Sized>(
	store: &S,
	name: &str,
	transform: PropertyTransform,
) -> FlagResult<AnyProperty> {
	ensure_not_blank(name, "property name")?;
	let current = store
		.get(name)
		.await?
		.ok_or_else(|| FlagError::property_not_found(name))?;
	let next = transform(current)?;
	if next.name() != name {
		tracing::warn!(from = %name, to = %next.name(), "transform tried to rename property");
		return Err(FlagError::InvalidArgument(format!(
			"transform must keep the property name '{name}', got '{}'",
			next.name()
		)));
	}
	store.update(next.clone()).await?;
	Ok(next)
}
