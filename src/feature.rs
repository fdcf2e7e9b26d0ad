/* src/feature.rs */

//!
//! Named boolean flags.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{FlagError, FlagResult, ensure_not_blank};
use crate::property::AnyProperty;
use crate::strategy::{FlippingStrategy, SharedStrategy, StrategyRegistry, StrategySpec};

/// A named boolean flag with optional group, permissions, activation
/// strategy and attached properties.
///
/// Values are snapshots: mutating helpers consume `self` and return the
/// changed copy. The `uid` is fixed at construction.
#[derive(Debug, Clone)]
pub struct Feature {
	uid: String,
	enabled: bool,
	description: Option<String>,
	group: Option<String>,
	permissions: BTreeSet<String>,
	flipping_strategy: Option<SharedStrategy>,
	custom_properties: HashMap<String, AnyProperty>,
}

impl Feature {
	/// Creates a disabled feature with no group, permissions or strategy.
	pub fn new(uid: impl Into<String>) -> FlagResult<Self> {
		let uid = uid.into();
		ensure_not_blank(&uid, "feature uid")?;
		Ok(Self {
			uid,
			enabled: false,
			description: None,
			group: None,
			permissions: BTreeSet::new(),
			flipping_strategy: None,
			custom_properties: HashMap::new(),
		})
	}

	pub fn uid(&self) -> &str {
		&self.uid
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn group(&self) -> Option<&str> {
		self.group.as_deref()
	}

	pub fn permissions(&self) -> &BTreeSet<String> {
		&self.permissions
	}

	pub fn flipping_strategy(&self) -> Option<&SharedStrategy> {
		self.flipping_strategy.as_ref()
	}

	pub fn custom_properties(&self) -> &HashMap<String, AnyProperty> {
		&self.custom_properties
	}

	pub fn property(&self, name: &str) -> Option<&AnyProperty> {
		self.custom_properties.get(name)
	}

	pub fn in_group(&self, group: &str) -> bool {
		self.group.as_deref() == Some(group)
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn toggled(self) -> Self {
		let enabled = !self.enabled;
		self.with_enabled(enabled)
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn without_group(mut self) -> Self {
		self.group = None;
		self
	}

	pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
		self.permissions.insert(permission.into());
		self
	}

	pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.permissions
			.extend(permissions.into_iter().map(Into::into));
		self
	}

	pub fn without_permission(mut self, permission: &str) -> Self {
		self.permissions.remove(permission);
		self
	}

	pub fn with_strategy(self, strategy: impl FlippingStrategy + 'static) -> Self {
		self.with_shared_strategy(Arc::new(strategy))
	}

	/// Attaches a strategy instance that may be shared with other features.
	pub fn with_shared_strategy(mut self, strategy: SharedStrategy) -> Self {
		self.flipping_strategy = Some(strategy);
		self
	}

	pub fn without_strategy(mut self) -> Self {
		self.flipping_strategy = None;
		self
	}

	/// Attaches a property under its own name, replacing any previous one.
	pub fn with_property(mut self, property: impl Into<AnyProperty>) -> Self {
		let property = property.into();
		self.custom_properties
			.insert(property.name().to_string(), property);
		self
	}

	pub fn without_property(mut self, name: &str) -> Self {
		self.custom_properties.remove(name);
		self
	}
}

impl PartialEq for Feature {
	fn eq(&self, other: &Self) -> bool {
		let same_strategy = match (&self.flipping_strategy, &other.flipping_strategy) {
			(None, None) => true,
			(Some(a), Some(b)) => a.kind() == b.kind() && a.init_params() == b.init_params(),
			_ => false,
		};
		same_strategy
			&& self.uid == other.uid
			&& self.enabled == other.enabled
			&& self.description == other.description
			&& self.group == other.group
			&& self.permissions == other.permissions
			&& self.custom_properties == other.custom_properties
	}
}

/// Wire shape of a [`Feature`]. The strategy travels as kind + params and is
/// rebuilt through the global [`StrategyRegistry`].
///
/// The uid rule matches [`Feature::new`]; `group` is free-form.
#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
pub(crate) struct FeatureRepr {
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	uid: String,
	#[serde(default)]
	enabled: bool,
	#[serde(default)]
	description: Option<String>,
	#[serde(default)]
	group: Option<String>,
	#[serde(default)]
	permissions: BTreeSet<String>,
	#[serde(default)]
	flipping_strategy: Option<StrategySpec>,
	#[serde(default)]
	custom_properties: BTreeMap<String, AnyProperty>,
}

impl FeatureRepr {
	/// Rebuilds the feature, checking the invariants the wire cannot express.
	pub(crate) fn into_feature(self) -> FlagResult<Feature> {
		#[cfg(feature = "validate")]
		validator::Validate::validate(&self)
			.map_err(|e| FlagError::InvalidArgument(format!("feature '{}': {e}", self.uid)))?;

		let mut feature = Feature::new(self.uid)?.with_enabled(self.enabled);
		feature.description = self.description;
		feature.group = self.group;
		feature.permissions = self.permissions;

		if let Some(spec) = self.flipping_strategy {
			let strategy = StrategyRegistry::global().create(&spec.kind, &spec.params)?;
			feature.flipping_strategy = Some(strategy);
		}

		for (key, property) in self.custom_properties {
			if key != property.name() {
				return Err(FlagError::InvalidArgument(format!(
					"feature '{}': property key '{}' does not match property name '{}'",
					feature.uid,
					key,
					property.name()
				)));
			}
			feature.custom_properties.insert(key, property);
		}
		Ok(feature)
	}
}

impl Serialize for Feature {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		FeatureRepr {
			uid: self.uid.clone(),
			enabled: self.enabled,
			description: self.description.clone(),
			group: self.group.clone(),
			permissions: self.permissions.clone(),
			flipping_strategy: self
				.flipping_strategy
				.as_deref()
				.map(StrategySpec::of),
			custom_properties: self
				.custom_properties
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
		}
		.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Feature {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		FeatureRepr::deserialize(deserializer)?
			.into_feature()
			.map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::property::Property;

	#[test]
	fn test_new_feature_is_disabled() {
		let feature = Feature::new("f").unwrap();
		assert_eq!(feature.uid(), "f");
		assert!(!feature.is_enabled());
		assert!(feature.permissions().is_empty());
		assert!(feature.flipping_strategy().is_none());
	}

	#[test]
	fn test_blank_uid_rejected() {
		assert!(matches!(
			Feature::new(""),
			Err(FlagError::InvalidArgument(_))
		));
	}

	#[test]
	fn test_properties_keyed_by_name() {
		let feature = Feature::new("f")
			.unwrap()
			.with_property(Property::new("ttl", 60i64).unwrap())
			.with_property(Property::new("ttl", 90i64).unwrap());
		assert_eq!(feature.custom_properties().len(), 1);
		assert_eq!(feature.property("ttl").unwrap().value_string(), "90");
	}

	#[test]
	fn test_toggled_keeps_uid() {
		let feature = Feature::new("f").unwrap().toggled();
		assert!(feature.is_enabled());
		assert_eq!(feature.uid(), "f");
		assert!(!feature.toggled().is_enabled());
	}

	#[test]
	fn test_mismatched_property_key_rejected() {
		let json = r#"{
			"uid": "f",
			"custom_properties": {
				"a": {"type": "int", "name": "b", "value": 1}
			}
		}"#;
		let err = serde_json::from_str::<Feature>(json).unwrap_err();
		assert!(err.to_string().contains("does not match"));
	}
}
