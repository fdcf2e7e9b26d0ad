/* src/error.rs */

use std::fmt;

/// Kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
	Feature,
	Property,
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Feature => f.write_str("feature"),
			Self::Property => f.write_str("property"),
		}
	}
}

/// Errors surfaced by stores, the property model and the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlagError {
	/// The entity is absent on an operation requiring presence.
	#[error("{entity} not found: {key}")]
	NotFound { entity: Entity, key: String },
	/// Duplicate key on create.
	#[error("{entity} already exists: {key}")]
	AlreadyExists { entity: Entity, key: String },
	/// A value violates the fixed-values invariant, or a required value is missing.
	#[error("invalid value for '{name}': {reason}")]
	InvalidValue { name: String, reason: String },
	/// Blank identifiers, mismatched names and malformed parameters.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),
	/// A property was requested with a different value type than it holds.
	#[error("property '{name}' holds {found}, not {expected}")]
	TypeMismatch {
		name: String,
		expected: &'static str,
		found: String,
	},
	/// A strategy could not reach a decision.
	#[error("strategy '{kind}' failed: {reason}")]
	Strategy { kind: String, reason: String },
}

impl FlagError {
	pub(crate) fn feature_not_found(uid: &str) -> Self {
		Self::NotFound {
			entity: Entity::Feature,
			key: uid.to_string(),
		}
	}

	pub(crate) fn property_not_found(name: &str) -> Self {
		Self::NotFound {
			entity: Entity::Property,
			key: name.to_string(),
		}
	}

	pub(crate) fn feature_exists(uid: &str) -> Self {
		Self::AlreadyExists {
			entity: Entity::Feature,
			key: uid.to_string(),
		}
	}

	pub(crate) fn property_exists(name: &str) -> Self {
		Self::AlreadyExists {
			entity: Entity::Property,
			key: name.to_string(),
		}
	}

	/// Returns true for `NotFound` of any entity.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	/// Returns true for `AlreadyExists` of any entity.
	pub fn is_already_exists(&self) -> bool {
		matches!(self, Self::AlreadyExists { .. })
	}
}

/// Result type alias.
pub type FlagResult<T> = std::result::Result<T, FlagError>;

/// Rejects empty and whitespace-only identifiers.
pub(crate) fn ensure_not_blank(id: &str, what: &str) -> FlagResult<()> {
	if id.trim().is_empty() {
		return Err(FlagError::InvalidArgument(format!("{what} must not be blank")));
	}
	Ok(())
}
