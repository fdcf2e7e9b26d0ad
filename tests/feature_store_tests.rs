/* tests/feature_store_tests.rs */

#![cfg(feature = "memory")]

use flipswitch::{Entity, Feature, FeatureStore, FlagError, InMemoryFeatureStore};

fn feature(uid: &str) -> Feature {
	Feature::new(uid).unwrap()
}

#[tokio::test]
async fn test_add_get_remove() {
	let store = InMemoryFeatureStore::new();
	store.add(feature("f1").with_description("first")).await.unwrap();

	let got = store.get("f1").await.unwrap().unwrap();
	assert_eq!(got.description(), Some("first"));
	assert!(store.exists("f1").await.unwrap());
	assert_eq!(store.count().await.unwrap(), 1);

	store.remove("f1").await.unwrap();
	assert!(store.get("f1").await.unwrap().is_none());
	assert!(!store.exists("f1").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_add_rejected() {
	let store = InMemoryFeatureStore::new();
	store.add(feature("f1")).await.unwrap();

	let err = store.add(feature("f1").with_enabled(true)).await.unwrap_err();
	assert_eq!(
		err,
		FlagError::AlreadyExists {
			entity: Entity::Feature,
			key: "f1".to_string(),
		}
	);
	// First write wins.
	assert!(!store.get("f1").await.unwrap().unwrap().is_enabled());
}

#[tokio::test]
async fn test_missing_feature_errors() {
	let store = InMemoryFeatureStore::new();

	assert!(store.update(feature("ghost")).await.unwrap_err().is_not_found());
	assert!(store.remove("ghost").await.unwrap_err().is_not_found());
	assert!(store.toggle("ghost").await.unwrap_err().is_not_found());
	assert!(store.enable("ghost").await.unwrap_err().is_not_found());
	assert!(
		store
			.grant_permission("ghost", "admin")
			.await
			.unwrap_err()
			.is_not_found()
	);
}

#[tokio::test]
async fn test_blank_uid_rejected() {
	let store = InMemoryFeatureStore::new();
	assert!(matches!(
		store.get("").await,
		Err(FlagError::InvalidArgument(_))
	));
	assert!(matches!(
		store.toggle("   ").await,
		Err(FlagError::InvalidArgument(_))
	));
	assert!(matches!(
		store.exists("").await,
		Err(FlagError::InvalidArgument(_))
	));
}

#[tokio::test]
async fn test_toggle_scenario() {
	let store = InMemoryFeatureStore::new();
	store.add(feature("f1")).await.unwrap();

	store.toggle("f1").await.unwrap();
	assert!(store.get("f1").await.unwrap().unwrap().is_enabled());

	store.toggle("f1").await.unwrap();
	assert!(!store.get("f1").await.unwrap().unwrap().is_enabled());
}

#[tokio::test]
async fn test_enable_disable_idempotent() {
	let store = InMemoryFeatureStore::new();
	store.add(feature("f1")).await.unwrap();

	store.disable("f1").await.unwrap();
	store.disable("f1").await.unwrap();
	assert!(!store.get("f1").await.unwrap().unwrap().is_enabled());

	store.enable("f1").await.unwrap();
	store.enable("f1").await.unwrap();
	assert!(store.get("f1").await.unwrap().unwrap().is_enabled());
}

#[tokio::test]
async fn test_update_replaces_whole_feature() {
	let store = InMemoryFeatureStore::new();
	store
		.add(feature("f1").with_group("g").with_permission("admin"))
		.await
		.unwrap();

	store.update(feature("f1").with_enabled(true)).await.unwrap();

	let got = store.get("f1").await.unwrap().unwrap();
	assert!(got.is_enabled());
	assert_eq!(got.group(), None);
	assert!(got.permissions().is_empty());
}

#[tokio::test]
async fn test_permissions() {
	let store = InMemoryFeatureStore::new();
	store.add(feature("f1")).await.unwrap();

	store.grant_permission("f1", "admin").await.unwrap();
	store.grant_permission("f1", "admin").await.unwrap();
	store.grant_permission("f1", "beta").await.unwrap();
	let got = store.get("f1").await.unwrap().unwrap();
	assert_eq!(
		got.permissions().iter().map(String::as_str).collect::<Vec<_>>(),
		["admin", "beta"]
	);

	store.revoke_permission("f1", "admin").await.unwrap();
	store.revoke_permission("f1", "unknown").await.unwrap();
	let got = store.get("f1").await.unwrap().unwrap();
	assert_eq!(got.permissions().len(), 1);
	assert!(got.permissions().contains("beta"));
}

#[tokio::test]
async fn test_group_scenario() {
	let store = InMemoryFeatureStore::with_features([
		feature("a").with_group("g"),
		feature("b").with_group("g"),
		feature("c"),
	])
	.unwrap();

	store.enable_group("g").await.unwrap();
	assert!(store.get("a").await.unwrap().unwrap().is_enabled());
	assert!(store.get("b").await.unwrap().unwrap().is_enabled());
	assert!(!store.get("c").await.unwrap().unwrap().is_enabled());

	store.disable_group("g").await.unwrap();
	assert!(!store.get("a").await.unwrap().unwrap().is_enabled());
	assert!(!store.get("b").await.unwrap().unwrap().is_enabled());

	// Unknown group is a no-op.
	store.enable_group("nobody").await.unwrap();
	assert!(!store.get("c").await.unwrap().unwrap().is_enabled());
}

#[tokio::test]
async fn test_group_membership() {
	let store = InMemoryFeatureStore::with_features([feature("a"), feature("b")]).unwrap();
	assert!(store.list_groups().await.unwrap().is_empty());

	store.add_to_group("a", "beta").await.unwrap();
	store.add_to_group("b", "internal").await.unwrap();
	assert!(store.exists_group("beta").await.unwrap());
	assert_eq!(
		store.list_groups().await.unwrap().into_iter().collect::<Vec<_>>(),
		["beta", "internal"]
	);

	let members = store.read_group("beta").await.unwrap();
	assert_eq!(members.len(), 1);
	assert!(members.contains_key("a"));

	store.remove_from_group("a").await.unwrap();
	store.remove_from_group("a").await.unwrap();
	assert!(!store.exists_group("beta").await.unwrap());
	assert_eq!(store.get("a").await.unwrap().unwrap().group(), None);
}

#[tokio::test]
async fn test_get_all_and_clear() {
	let store = InMemoryFeatureStore::with_features([feature("a"), feature("b")]).unwrap();

	let all = store.get_all().await.unwrap();
	assert_eq!(all.len(), 2);
	assert_eq!(all["a"].uid(), "a");

	store.clear().await.unwrap();
	assert_eq!(store.count().await.unwrap(), 0);
	assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_returned_values_are_snapshots() {
	let store = InMemoryFeatureStore::new();
	store.add(feature("f1")).await.unwrap();

	let before = store.get("f1").await.unwrap().unwrap();
	store.toggle("f1").await.unwrap();

	assert!(!before.is_enabled());
	assert!(store.get("f1").await.unwrap().unwrap().is_enabled());
}
