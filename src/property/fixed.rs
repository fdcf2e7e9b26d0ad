/* src/property/fixed.rs */

use std::hash::{DefaultHasher, Hash, Hasher};

use super::PropertyValue;

/// The closed set of values a property may hold.
///
/// Backed by a vector so that value domains without `Eq`/`Hash` (floats)
/// can take part. Duplicates are dropped on insert; equality and hashing
/// ignore insertion order.
#[derive(Debug, Clone)]
pub struct FixedValues<T>(Vec<T>);

impl<T> FixedValues<T> {
	/// Creates an empty (unconstrained) set.
	pub const fn new() -> Self {
		Self(Vec::new())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.0.iter()
	}

	/// Wraps values already known to be distinct.
	pub(crate) fn from_vec_unchecked(values: Vec<T>) -> Self {
		Self(values)
	}
}

impl<T: PartialEq> FixedValues<T> {
	/// Adds a value. Returns false if an equal value was already present.
	pub fn insert(&mut self, value: T) -> bool {
		if self.contains(&value) {
			return false;
		}
		self.0.push(value);
		true
	}

	pub fn contains(&self, value: &T) -> bool {
		self.0.iter().any(|v| v == value)
	}
}

impl<T> Default for FixedValues<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: PartialEq> PartialEq for FixedValues<T> {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|v| other.contains(v))
	}
}

impl<T: PropertyValue> FixedValues<T> {
	/// Order-independent hash: element hashes are combined commutatively.
	pub(crate) fn hash_unordered<H: Hasher>(&self, state: &mut H) {
		let combined = self.iter().fold(0u64, |acc, value| {
			let mut hasher = DefaultHasher::new();
			value.hash_value(&mut hasher);
			acc.wrapping_add(hasher.finish())
		});
		self.len().hash(state);
		combined.hash(state);
	}
}

impl<T: PartialEq> FromIterator<T> for FixedValues<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut set = Self::new();
		for value in iter {
			set.insert(value);
		}
		set
	}
}

impl<T: PartialEq> Extend<T> for FixedValues<T> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for value in iter {
			self.insert(value);
		}
	}
}

impl<'a, T> IntoIterator for &'a FixedValues<T> {
	type Item = &'a T;
	type IntoIter = std::slice::Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl<T> IntoIterator for FixedValues<T> {
	type Item = T;
	type IntoIter = std::vec::IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
