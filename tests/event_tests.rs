/* tests/event_tests.rs */

#![cfg(feature = "events")]

use flipswitch::memory::StoreEvent;
use flipswitch::{
	Feature, FeatureStore, InMemoryFeatureStore, InMemoryPropertyStore, Property, PropertyStore,
};

#[tokio::test]
async fn test_feature_events() {
	let store = InMemoryFeatureStore::new();
	let mut rx = store.subscribe();

	store.add(Feature::new("f").unwrap()).await.unwrap();
	store.toggle("f").await.unwrap();
	store.remove("f").await.unwrap();
	store.clear().await.unwrap();

	match rx.recv().await.unwrap() {
		StoreEvent::Added { key, value } => {
			assert_eq!(key, "f");
			assert!(!value.is_enabled());
		}
		other => panic!("expected Added, got {other:?}"),
	}
	match rx.recv().await.unwrap() {
		StoreEvent::Updated { key, old, new } => {
			assert_eq!(key, "f");
			assert!(!old.is_enabled());
			assert!(new.is_enabled());
		}
		other => panic!("expected Updated, got {other:?}"),
	}
	let removed = rx.recv().await.unwrap();
	assert!(matches!(removed, StoreEvent::Removed { .. }));
	assert_eq!(removed.key(), Some("f"));
	assert!(matches!(
		rx.recv().await.unwrap(),
		StoreEvent::Cleared { count: 0 }
	));
}

#[tokio::test]
async fn test_failed_write_emits_nothing() {
	let store = InMemoryFeatureStore::new();
	store.add(Feature::new("f").unwrap()).await.unwrap();
	let mut rx = store.subscribe();

	assert!(store.add(Feature::new("f").unwrap()).await.is_err());
	// Idempotent disable does not write.
	store.disable("f").await.unwrap();

	assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_property_events() {
	let store = InMemoryPropertyStore::new().with_event_capacity(8);
	let mut rx = store.subscribe();

	store
		.add(Property::new("p", 1i32).unwrap().into())
		.await
		.unwrap();

	match rx.recv().await.unwrap() {
		StoreEvent::Added { key, value } => {
			assert_eq!(key, "p");
			assert_eq!(value.value_string(), "1");
		}
		other => panic!("expected Added, got {other:?}"),
	}
}

#[tokio::test]
async fn test_writes_succeed_without_subscribers() {
	let store = InMemoryFeatureStore::new().with_event_capacity(1);
	for i in 0..10 {
		store.add(Feature::new(format!("f{i}")).unwrap()).await.unwrap();
	}
	assert_eq!(store.len(), 10);
}
