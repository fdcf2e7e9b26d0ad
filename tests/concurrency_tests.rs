/* tests/concurrency_tests.rs */

#![cfg(feature = "memory")]

use std::sync::Arc;
use std::time::Duration;

use flipswitch::store::PropertyTransform;
use flipswitch::{
	Feature, FeatureStore, FlagEngine, InMemoryFeatureStore, InMemoryPropertyStore, Property,
	PropertyStore, PropertyStoreExt,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_adds() {
	let store = Arc::new(InMemoryFeatureStore::new());

	let mut handles = Vec::new();
	for i in 0..100 {
		let store = Arc::clone(&store);
		handles.push(tokio::spawn(async move {
			store.add(Feature::new(format!("f{i}")).unwrap()).await
		}));
	}
	for handle in handles {
		handle.await.unwrap().unwrap();
	}

	assert_eq!(store.count().await.unwrap(), 100);
	assert_eq!(store.get_all().await.unwrap().len(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_adds_single_winner() {
	let store = Arc::new(InMemoryFeatureStore::new());

	let mut handles = Vec::new();
	for _ in 0..20 {
		let store = Arc::clone(&store);
		handles.push(tokio::spawn(async move {
			store.add(Feature::new("same").unwrap()).await
		}));
	}
	let mut ok = 0;
	for handle in handles {
		match handle.await.unwrap() {
			Ok(()) => ok += 1,
			Err(e) => assert!(e.is_already_exists()),
		}
	}
	assert_eq!(ok, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_toggles_do_not_lose_updates() {
	let store = Arc::new(InMemoryFeatureStore::new());
	store.add(Feature::new("f").unwrap()).await.unwrap();

	let mut handles = Vec::new();
	for _ in 0..50 {
		let store = Arc::clone(&store);
		handles.push(tokio::spawn(async move { store.toggle("f").await }));
	}
	for _ in 0..50 {
		let store = Arc::clone(&store);
		handles.push(tokio::spawn(async move {
			store.get("f").await.map(|feature| {
				assert!(feature.is_some(), "feature must stay visible");
			})
		}));
	}

	let all = async {
		for handle in handles {
			handle.await.unwrap().unwrap();
		}
	};
	tokio::time::timeout(Duration::from_secs(5), all)
		.await
		.expect("no deadlock");

	// An even number of toggles returns to the initial state.
	assert!(!store.get("f").await.unwrap().unwrap().is_enabled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transform_updates() {
	let store = Arc::new(
		InMemoryPropertyStore::with_properties([Property::new("counter", 0i64).unwrap()])
			.unwrap(),
	);

	let mut handles = Vec::new();
	for _ in 0..40 {
		let store = Arc::clone(&store);
		handles.push(tokio::spawn(async move {
			let transform: PropertyTransform = Box::new(|current| {
				let current = current.typed::<i64>()?;
				let next = current.value() + 1;
				Ok(current.with_value(next)?.into())
			});
			store.update_with("counter", transform).await.map(drop)
		}));
	}
	for handle in handles {
		handle.await.unwrap().unwrap();
	}

	assert_eq!(store.value_of::<i64>("counter").await.unwrap(), Some(40));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_auto_create() {
	let engine = Arc::new(FlagEngine::builder().auto_create(true).build().unwrap());

	let mut handles = Vec::new();
	for _ in 0..20 {
		let engine = Arc::clone(&engine);
		handles.push(tokio::spawn(async move { engine.check("lazy", None).await }));
	}
	for handle in handles {
		assert!(!handle.await.unwrap().unwrap());
	}
	assert_eq!(engine.feature_store().count().await.unwrap(), 1);
}
