/* src/property/any.rs */

use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LogLevel, Property, PropertyValue};
use crate::error::{FlagError, FlagResult};

/// A property of a value domain outside the built-in set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomProperty {
	kind: String,
	property: Property<serde_json::Value>,
}

impl CustomProperty {
	pub fn new(kind: impl Into<String>, property: Property<serde_json::Value>) -> Self {
		Self {
			kind: kind.into(),
			property,
		}
	}

	/// Discriminator of the user type.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn property(&self) -> &Property<serde_json::Value> {
		&self.property
	}
}

/// Type-erased property, one variant per value domain.
///
/// Serialized with a `type` field naming the variant so a decoder can pick
/// the right domain from the data alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnyProperty {
	String(Property<String>),
	Byte(Property<i8>),
	Short(Property<i16>),
	Int(Property<i32>),
	Long(Property<i64>),
	Float(Property<f32>),
	Double(Property<f64>),
	Boolean(Property<bool>),
	BigInteger(Property<i128>),
	BigDecimal(Property<Decimal>),
	Instant(Property<DateTime<Utc>>),
	LocalDateTime(Property<NaiveDateTime>),
	LocalDate(Property<NaiveDate>),
	LogLevel(Property<LogLevel>),
	Custom(CustomProperty),
}

macro_rules! each_variant {
	($any:expr, $p:ident => $body:expr) => {
		match $any {
			AnyProperty::String($p) => $body,
			AnyProperty::Byte($p) => $body,
			AnyProperty::Short($p) => $body,
			AnyProperty::Int($p) => $body,
			AnyProperty::Long($p) => $body,
			AnyProperty::Float($p) => $body,
			AnyProperty::Double($p) => $body,
			AnyProperty::Boolean($p) => $body,
			AnyProperty::BigInteger($p) => $body,
			AnyProperty::BigDecimal($p) => $body,
			AnyProperty::Instant($p) => $body,
			AnyProperty::LocalDateTime($p) => $body,
			AnyProperty::LocalDate($p) => $body,
			AnyProperty::LogLevel($p) => $body,
			AnyProperty::Custom(custom) => {
				let $p = &custom.property;
				$body
			}
		}
	};
}

impl AnyProperty {
	/// Wraps a typed property.
	pub fn from_typed<T: PropertyValue>(property: Property<T>) -> FlagResult<Self> {
		T::into_any(property)
	}

	pub fn name(&self) -> &str {
		each_variant!(self, p => p.name())
	}

	pub fn description(&self) -> Option<&str> {
		each_variant!(self, p => p.description())
	}

	pub fn read_only(&self) -> bool {
		each_variant!(self, p => p.read_only())
	}

	pub fn has_fixed_values(&self) -> bool {
		each_variant!(self, p => p.has_fixed_values())
	}

	/// The wire discriminator of the held domain.
	pub fn kind(&self) -> &str {
		match self {
			Self::String(_) => String::KIND,
			Self::Byte(_) => i8::KIND,
			Self::Short(_) => i16::KIND,
			Self::Int(_) => i32::KIND,
			Self::Long(_) => i64::KIND,
			Self::Float(_) => f32::KIND,
			Self::Double(_) => f64::KIND,
			Self::Boolean(_) => bool::KIND,
			Self::BigInteger(_) => i128::KIND,
			Self::BigDecimal(_) => Decimal::KIND,
			Self::Instant(_) => <DateTime<Utc>>::KIND,
			Self::LocalDateTime(_) => NaiveDateTime::KIND,
			Self::LocalDate(_) => NaiveDate::KIND,
			Self::LogLevel(_) => LogLevel::KIND,
			Self::Custom(custom) => custom.kind(),
		}
	}

	/// Display form of the current value.
	pub fn value_string(&self) -> String {
		each_variant!(self, p => p.value().to_display())
	}

	/// Downcasts to a typed property, `None` if the domain differs.
	pub fn as_typed<T: PropertyValue>(&self) -> Option<Property<T>> {
		T::from_any(self)
	}

	/// Downcasts to a typed property, failing with `TypeMismatch`.
	pub fn typed<T: PropertyValue>(&self) -> FlagResult<Property<T>> {
		self.as_typed::<T>().ok_or_else(|| FlagError::TypeMismatch {
			name: self.name().to_string(),
			expected: T::KIND,
			found: self.kind().to_string(),
		})
	}
}

impl Hash for AnyProperty {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.kind().hash(state);
		each_variant!(self, p => p.hash(state))
	}
}

impl From<CustomProperty> for AnyProperty {
	fn from(custom: CustomProperty) -> Self {
		Self::Custom(custom)
	}
}
