/* tests/property_store_tests.rs */

#![cfg(feature = "memory")]

use flipswitch::store::PropertyTransform;
use flipswitch::{
	AnyProperty, Entity, FlagError, InMemoryPropertyStore, LogLevel, Property, PropertyStore,
	PropertyStoreExt,
};

fn int(name: &str, value: i32) -> AnyProperty {
	Property::new(name, value).unwrap().into()
}

#[tokio::test]
async fn test_add_get_remove() {
	let store = InMemoryPropertyStore::new();
	assert!(store.is_empty().await.unwrap());

	store.add(int("timeout", 30)).await.unwrap();
	assert!(store.contains("timeout").await.unwrap());
	assert_eq!(store.get("timeout").await.unwrap(), Some(int("timeout", 30)));

	let removed = store.remove("timeout").await.unwrap();
	assert_eq!(removed.value_string(), "30");
	assert!(!store.contains("timeout").await.unwrap());
	assert!(store.remove("timeout").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_duplicate_and_missing() {
	let store = InMemoryPropertyStore::new();
	store.add(int("p", 1)).await.unwrap();

	assert_eq!(
		store.add(int("p", 2)).await.unwrap_err(),
		FlagError::AlreadyExists {
			entity: Entity::Property,
			key: "p".to_string(),
		}
	);
	assert!(store.update(int("q", 1)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_property_ids_sorted() {
	let store =
		InMemoryPropertyStore::with_properties([int("b", 2), int("a", 1), int("c", 3)]).unwrap();
	let ids: Vec<_> = store.list_property_ids().await.unwrap().into_iter().collect();
	assert_eq!(ids, ["a", "b", "c"]);

	store.clear().await.unwrap();
	assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_transform_update() {
	let store = InMemoryPropertyStore::with_properties([int("timeout", 30)]).unwrap();

	let transform: PropertyTransform = Box::new(|current| {
		let current = current.typed::<i32>()?;
		let next = *current.value() + 1;
		Ok(current.with_value(next)?.into())
	});
	let updated = store.update_with("timeout", transform).await.unwrap();

	assert_eq!(updated, int("timeout", 31));
	assert_eq!(store.get("timeout").await.unwrap(), Some(int("timeout", 31)));
}

#[tokio::test]
async fn test_transform_rename_rejected() {
	let store = InMemoryPropertyStore::with_properties([int("timeout", 30)]).unwrap();

	let transform: PropertyTransform =
		Box::new(|current| Ok(current.typed::<i32>()?.with_name("renamed")?.into()));
	let err = store.update_with("timeout", transform).await.unwrap_err();

	assert!(matches!(err, FlagError::InvalidArgument(_)));
	assert_eq!(store.get("timeout").await.unwrap(), Some(int("timeout", 30)));
	assert!(!store.contains("renamed").await.unwrap());
}

#[tokio::test]
async fn test_transform_missing_property() {
	let store = InMemoryPropertyStore::new();
	let transform: PropertyTransform = Box::new(|current| Ok(current));
	let err = store.update_with("nope", transform).await.unwrap_err();
	assert!(err.is_not_found());
}

#[tokio::test]
async fn test_transform_error_leaves_store_untouched() {
	let store = InMemoryPropertyStore::with_properties([Property::builder("mode", "a".to_string())
		.fixed_values(["a".to_string(), "b".to_string()])
		.build()
		.unwrap()])
	.unwrap();

	let err = store
		.update_as::<String, _>("mode", |current| current.with_value("z".to_string()))
		.await
		.unwrap_err();
	assert!(matches!(err, FlagError::InvalidValue { .. }));
	assert_eq!(
		store.value_of::<String>("mode").await.unwrap().as_deref(),
		Some("a")
	);
}

#[tokio::test]
async fn test_typed_access() {
	let store = InMemoryPropertyStore::new();
	store
		.add_typed(Property::new("level", LogLevel::Warn).unwrap())
		.await
		.unwrap();

	let level = store.get_as::<LogLevel>("level").await.unwrap().unwrap();
	assert_eq!(*level.value(), LogLevel::Warn);
	assert_eq!(
		store.value_of::<LogLevel>("level").await.unwrap(),
		Some(LogLevel::Warn)
	);
	assert_eq!(store.get_as::<LogLevel>("absent").await.unwrap(), None);

	let err = store.get_as::<bool>("level").await.unwrap_err();
	assert!(matches!(
		err,
		FlagError::TypeMismatch { expected: "boolean", ref found, .. } if found == "log_level"
	));
}

#[tokio::test]
async fn test_get_or_default_does_not_store() {
	let store = InMemoryPropertyStore::new();
	let default = Property::new("retries", 3i64).unwrap();

	let got = store.get_or_default("retries", default.clone()).await.unwrap();
	assert_eq!(got, default);
	assert!(!store.contains("retries").await.unwrap());

	store.add(Property::new("retries", 5i64).unwrap().into()).await.unwrap();
	let got = store.get_or_default("retries", default).await.unwrap();
	assert_eq!(*got.value(), 5);
}

#[tokio::test]
async fn test_update_as() {
	let store = InMemoryPropertyStore::with_properties([Property::new("ratio", 0.5f64).unwrap()])
		.unwrap();
	let updated = store
		.update_as::<f64, _>("ratio", |current| {
			let doubled = current.value() * 2.0;
			current.with_value(doubled)
		})
		.await
		.unwrap();
	assert_eq!(*updated.value(), 1.0);
}
