use async_trait::async_trait;

use super::{PropertyStore, PropertyTransform};
use crate::error::FlagResult;
use crate::property::{Property, PropertyValue};

/// Typed access on top of any [`PropertyStore`].
#[async_trait]
pub trait PropertyStoreExt: PropertyStore {
	/// Fetches `name` as a `Property<T>`; a different domain fails with `TypeMismatch`.
	async fn get_as<T: PropertyValue>(&self, name: &str) -> FlagResult<Option<Property<T>>> {
		match self.get(name).await? {
			Some(any) => any.typed::<T>().map(Some),
			None => Ok(None),
		}
	}

	async fn value_of<T: PropertyValue>(&self, name: &str) -> FlagResult<Option<T>> {
		Ok(self.get_as::<T>(name).await?.map(Property::into_value))
	}

	/// Fetches `name`, or returns `default` (without storing it) when absent.
	async fn get_or_default<T: PropertyValue>(
		&self,
		name: &str,
		default: Property<T>,
	) -> FlagResult<Property<T>> {
		Ok(self.get_as::<T>(name).await?.unwrap_or(default))
	}

	async fn add_typed<T: PropertyValue>(&self, property: Property<T>) -> FlagResult<()> {
		self.add(T::into_any(property)?).await
	}

	/// Typed read-modify-write, see [`PropertyStore::update_with`].
	async fn update_as<T, F>(&self, name: &str, transform: F) -> FlagResult<Property<T>>
	where
		T: PropertyValue,
		F: FnOnce(Property<T>) -> FlagResult<Property<T>> + Send + 'static,
	{
		let transform: PropertyTransform = Box::new(move |current| {
			let next = transform(current.typed::<T>()?)?;
			T::into_any(next)
		});
		self.update_with(name, transform).await?.typed::<T>()
	}
}

impl<S: PropertyStore + ?Sized> PropertyStoreExt for S {}
