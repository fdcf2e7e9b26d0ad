/* src/property/value.rs */

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{AnyProperty, CustomProperty, LogLevel, Property};
use crate::error::{FlagError, FlagResult};

/// A value domain a [`Property`] can be parameterized over.
///
/// Built-in domains map onto their own [`AnyProperty`] variant. Other types
/// only need `KIND`, the wire conversion and `hash_value`; the default
/// `into_any`/`from_any` carry them through [`AnyProperty::Custom`].
pub trait PropertyValue: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
	/// Discriminator written to the wire.
	const KIND: &'static str;

	/// Representation used on the wire.
	type Wire: Serialize + DeserializeOwned;

	fn to_wire(&self) -> Self::Wire;

	fn from_wire(wire: Self::Wire) -> Result<Self, String>;

	/// Feeds the value into a hasher. Must agree with `PartialEq`.
	fn hash_value<H: Hasher>(&self, state: &mut H);

	/// Rejects values the wire form cannot carry.
	fn check(&self) -> Result<(), String> {
		Ok(())
	}

	/// Human readable form of the value.
	fn to_display(&self) -> String {
		format!("{self:?}")
	}

	fn into_any(property: Property<Self>) -> FlagResult<AnyProperty> {
		let name = property.name().to_string();
		let property = property
			.map_values(|value| serde_json::to_value(value.to_wire()))
			.map_err(|e| FlagError::InvalidValue {
				name,
				reason: e.to_string(),
			})?;
		Ok(AnyProperty::Custom(CustomProperty::new(Self::KIND, property)))
	}

	fn from_any(property: &AnyProperty) -> Option<Property<Self>> {
		let AnyProperty::Custom(custom) = property else {
			return None;
		};
		if custom.kind() != Self::KIND {
			return None;
		}
		custom
			.property()
			.clone()
			.map_values(|value| {
				serde_json::from_value::<Self::Wire>(value)
					.map_err(|e| e.to_string())
					.and_then(Self::from_wire)
			})
			.ok()
	}
}

macro_rules! builtin_value {
	(@common $ty:ty, $variant:ident) => {
		fn to_display(&self) -> String {
			self.to_string()
		}

		fn into_any(property: Property<Self>) -> FlagResult<AnyProperty> {
			Ok(AnyProperty::$variant(property))
		}

		fn from_any(property: &AnyProperty) -> Option<Property<Self>> {
			match property {
				AnyProperty::$variant(p) => Some(p.clone()),
				_ => None,
			}
		}
	};
	($ty:ty, $variant:ident, $kind:literal) => {
		impl PropertyValue for $ty {
			const KIND: &'static str = $kind;
			type Wire = $ty;

			fn to_wire(&self) -> Self::Wire {
				self.clone()
			}

			fn from_wire(wire: Self::Wire) -> Result<Self, String> {
				Ok(wire)
			}

			fn hash_value<H: Hasher>(&self, state: &mut H) {
				self.hash(state);
			}

			builtin_value!(@common $ty, $variant);
		}

		impl From<Property<$ty>> for AnyProperty {
			fn from(property: Property<$ty>) -> Self {
				AnyProperty::$variant(property)
			}
		}
	};
	($ty:ty, $variant:ident, $kind:literal, bits) => {
		impl PropertyValue for $ty {
			const KIND: &'static str = $kind;
			type Wire = $ty;

			fn to_wire(&self) -> Self::Wire {
				*self
			}

			fn from_wire(wire: Self::Wire) -> Result<Self, String> {
				Ok(wire)
			}

			fn hash_value<H: Hasher>(&self, state: &mut H) {
				// -0.0 == 0.0, so both must hash alike.
				let value = if *self == 0.0 { 0.0 } else { *self };
				value.to_bits().hash(state);
			}

			fn check(&self) -> Result<(), String> {
				if !self.is_finite() {
					return Err(format!("{self} is not a finite number"));
				}
				Ok(())
			}

			builtin_value!(@common $ty, $variant);
		}

		impl From<Property<$ty>> for AnyProperty {
			fn from(property: Property<$ty>) -> Self {
				AnyProperty::$variant(property)
			}
		}
	};
	($ty:ty, $variant:ident, $kind:literal, text) => {
		impl PropertyValue for $ty {
			const KIND: &'static str = $kind;
			type Wire = String;

			fn to_wire(&self) -> Self::Wire {
				self.to_string()
			}

			fn from_wire(wire: Self::Wire) -> Result<Self, String> {
				wire.trim().parse::<$ty>().map_err(|e| e.to_string())
			}

			fn hash_value<H: Hasher>(&self, state: &mut H) {
				self.hash(state);
			}

			builtin_value!(@common $ty, $variant);
		}

		impl From<Property<$ty>> for AnyProperty {
			fn from(property: Property<$ty>) -> Self {
				AnyProperty::$variant(property)
			}
		}
	};
}

builtin_value!(String, String, "string");
builtin_value!(i8, Byte, "byte");
builtin_value!(i16, Short, "short");
builtin_value!(i32, Int, "int");
builtin_value!(i64, Long, "long");
builtin_value!(f32, Float, "float", bits);
builtin_value!(f64, Double, "double", bits);
builtin_value!(bool, Boolean, "boolean");
// Wider than any JSON number, so carried as text.
builtin_value!(i128, BigInteger, "big_integer", text);
builtin_value!(Decimal, BigDecimal, "big_decimal", text);
builtin_value!(DateTime<Utc>, Instant, "instant");
builtin_value!(NaiveDateTime, LocalDateTime, "local_date_time");
builtin_value!(NaiveDate, LocalDate, "local_date");
builtin_value!(LogLevel, LogLevel, "log_level");

impl PropertyValue for serde_json::Value {
	const KIND: &'static str = "json";
	type Wire = serde_json::Value;

	fn to_wire(&self) -> Self::Wire {
		self.clone()
	}

	fn from_wire(wire: Self::Wire) -> Result<Self, String> {
		Ok(wire)
	}

	fn hash_value<H: Hasher>(&self, state: &mut H) {
		self.to_string().hash(state);
	}

	fn to_display(&self) -> String {
		self.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_big_integer_wire_is_text() {
		let big = i128::MAX;
		assert_eq!(big.to_wire(), i128::MAX.to_string());
		assert_eq!(i128::from_wire(big.to_wire()), Ok(big));
		assert!(i128::from_wire("twelve".to_string()).is_err());
	}

	fn hash_of<T: PropertyValue>(value: &T) -> u64 {
		let mut hasher = std::hash::DefaultHasher::new();
		value.hash_value(&mut hasher);
		hasher.finish()
	}

	#[test]
	fn test_float_signed_zero_hashes_alike() {
		assert_eq!(0.0f64, -0.0f64);
		assert_eq!(hash_of(&0.0f64), hash_of(&-0.0f64));
		assert_eq!(hash_of(&0.0f32), hash_of(&-0.0f32));
		assert_ne!(hash_of(&1.0f64), hash_of(&-1.0f64));
	}

	#[test]
	fn test_float_non_finite_rejected() {
		assert!(f64::INFINITY.check().is_err());
		assert!(f64::NAN.check().is_err());
		assert!(f32::NEG_INFINITY.check().is_err());
		assert!(1.5f32.check().is_ok());
	}

	#[test]
	fn test_builtin_into_any_keeps_variant() {
		let property = Property::new("retries", 3i32).unwrap();
		let any = i32::into_any(property.clone()).unwrap();
		assert_eq!(any.kind(), "int");
		assert_eq!(i32::from_any(&any), Some(property));
		assert_eq!(i64::from_any(&any), None);
	}
}
