/* src/property/mod.rs */

//!
//! Typed, immutable configuration values.
//!
//! [`Property<T>`] is the generic container; [`AnyProperty`] is the closed
//! set of value domains a store holds, tagged by a `type` discriminator on
//! the wire.

mod any;
mod fixed;
mod level;
mod value;

pub use any::{AnyProperty, CustomProperty};
pub use fixed::FixedValues;
pub use level::LogLevel;
pub use value::PropertyValue;

use std::hash::{Hash, Hasher};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{FlagError, FlagResult, ensure_not_blank};

/// A named, typed, optionally value-constrained configuration entry.
///
/// Construction fails with [`FlagError::InvalidValue`] when `fixed_values`
/// is non-empty and does not contain `value`. Every way of producing a new
/// value (`with_value`, deserialization) re-checks this.
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T> {
	name: String,
	value: T,
	description: Option<String>,
	fixed_values: FixedValues<T>,
	read_only: bool,
}

/// Builder for [`Property`].
#[derive(Debug, Clone)]
pub struct PropertyBuilder<T> {
	name: String,
	value: T,
	description: Option<String>,
	fixed_values: FixedValues<T>,
	read_only: bool,
}

impl<T: PropertyValue> PropertyBuilder<T> {
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn fixed_value(mut self, value: T) -> Self {
		self.fixed_values.insert(value);
		self
	}

	pub fn fixed_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
		self.fixed_values.extend(values);
		self
	}

	pub fn read_only(mut self, read_only: bool) -> Self {
		self.read_only = read_only;
		self
	}

	pub fn build(self) -> FlagResult<Property<T>> {
		let property = Property {
			name: self.name,
			value: self.value,
			description: self.description,
			fixed_values: self.fixed_values,
			read_only: self.read_only,
		};
		property.validate()?;
		Ok(property)
	}
}

impl<T: PropertyValue> Property<T> {
	/// Creates an unconstrained, writable property.
	pub fn new(name: impl Into<String>, value: T) -> FlagResult<Self> {
		Self::builder(name, value).build()
	}

	pub fn builder(name: impl Into<String>, value: T) -> PropertyBuilder<T> {
		PropertyBuilder {
			name: name.into(),
			value,
			description: None,
			fixed_values: FixedValues::new(),
			read_only: false,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &T {
		&self.value
	}

	pub fn into_value(self) -> T {
		self.value
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn fixed_values(&self) -> &FixedValues<T> {
		&self.fixed_values
	}

	pub fn read_only(&self) -> bool {
		self.read_only
	}

	pub fn has_fixed_values(&self) -> bool {
		!self.fixed_values.is_empty()
	}

	/// Returns a copy holding `value`, re-validated against the fixed values.
	pub fn with_value(mut self, value: T) -> FlagResult<Self> {
		self.value = value;
		self.validate()?;
		Ok(self)
	}

	/// Returns a copy under a different name.
	pub fn with_name(mut self, name: impl Into<String>) -> FlagResult<Self> {
		self.name = name.into();
		ensure_not_blank(&self.name, "property name")?;
		Ok(self)
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Wraps this property into the type-erased store representation.
	pub fn into_any(self) -> FlagResult<AnyProperty> {
		T::into_any(self)
	}

	fn validate(&self) -> FlagResult<()> {
		ensure_not_blank(&self.name, "property name")?;
		for value in std::iter::once(&self.value).chain(self.fixed_values.iter()) {
			value.check().map_err(|reason| FlagError::InvalidValue {
				name: self.name.clone(),
				reason,
			})?;
		}
		if self.has_fixed_values() && !self.fixed_values.contains(&self.value) {
			return Err(FlagError::InvalidValue {
				name: self.name.clone(),
				reason: format!(
					"{} is not one of the fixed values [{}]",
					self.value.to_display(),
					self.fixed_values
						.iter()
						.map(PropertyValue::to_display)
						.collect::<Vec<_>>()
						.join(", ")
				),
			});
		}
		Ok(())
	}
}

impl<T> Property<T> {
	/// Converts every value (current and fixed) without re-validating.
	pub(crate) fn map_values<U, E>(
		self,
		mut f: impl FnMut(T) -> Result<U, E>,
	) -> Result<Property<U>, E> {
		let value = f(self.value)?;
		let mut fixed_values = Vec::with_capacity(self.fixed_values.len());
		for fixed in self.fixed_values {
			fixed_values.push(f(fixed)?);
		}
		Ok(Property {
			name: self.name,
			value,
			description: self.description,
			fixed_values: FixedValues::from_vec_unchecked(fixed_values),
			read_only: self.read_only,
		})
	}
}

impl<T: PropertyValue> Hash for Property<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name.hash(state);
		self.value.hash_value(state);
		self.description.hash(state);
		self.fixed_values.hash_unordered(state);
		self.read_only.hash(state);
	}
}

/// Wire shape shared by every variant, minus the discriminator.
#[derive(Serialize, Deserialize)]
struct PropertyRepr<W> {
	name: String,
	value: W,
	#[serde(default)]
	description: Option<String>,
	#[serde(default = "Vec::new")]
	fixed_values: Vec<W>,
	#[serde(default)]
	read_only: bool,
}

impl<T: PropertyValue> Serialize for Property<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		PropertyRepr {
			name: self.name.clone(),
			value: self.value.to_wire(),
			description: self.description.clone(),
			fixed_values: self.fixed_values.iter().map(PropertyValue::to_wire).collect(),
			read_only: self.read_only,
		}
		.serialize(serializer)
	}
}

impl<'de, T: PropertyValue> Deserialize<'de> for Property<T> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		use serde::de::Error;

		let repr = PropertyRepr::<T::Wire>::deserialize(deserializer)?;
		let value = T::from_wire(repr.value).map_err(D::Error::custom)?;
		let fixed_values = repr
			.fixed_values
			.into_iter()
			.map(T::from_wire)
			.collect::<Result<Vec<_>, _>>()
			.map_err(D::Error::custom)?;

		let mut builder = Property::builder(repr.name, value)
			.fixed_values(fixed_values)
			.read_only(repr.read_only);
		if let Some(description) = repr.description {
			builder = builder.description(description);
		}
		builder.build().map_err(D::Error::custom)
	}
}
