/* demos/basic.rs */

use flipswitch::codec::{Json, decode_feature, encode_feature};
use flipswitch::strategy::{CLIENT_KEY, ClientFilterStrategy, PonderationStrategy, USER_KEY};
use flipswitch::{
	ExecutionContext, Feature, FeatureStore, FlagEngine, InMemoryFeatureStore, LogLevel,
	Property, PropertyStoreExt,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	// 1. Seed a store
	let store = InMemoryFeatureStore::with_features([
		Feature::new("dark-mode")?.with_enabled(true),
		Feature::new("beta-dashboard")?
			.with_enabled(true)
			.with_group("beta")
			.with_strategy(ClientFilterStrategy::new(["acme"])?),
		Feature::new("new-search")?
			.with_enabled(true)
			.with_strategy(PonderationStrategy::new(0.3)?),
	])?;

	// 2. Build the engine
	let engine = FlagEngine::builder()
		.feature_store(store)
		.auto_create(true)
		.build()?;

	// 3. Check features
	let acme = ExecutionContext::new()
		.with(CLIENT_KEY, "acme")
		.with(USER_KEY, "alice");
	for uid in ["dark-mode", "beta-dashboard", "new-search", "unknown"] {
		let active = engine.check(uid, Some(&acme)).await?;
		println!("{uid:>15}: {active}");
	}

	// 4. Flip a whole group
	engine.feature_store().disable_group("beta").await?;
	println!(
		"beta-dashboard after disable_group: {}",
		engine.check("beta-dashboard", Some(&acme)).await?
	);

	// 5. Typed properties
	engine
		.create_property(
			Property::builder("log_level", LogLevel::Info)
				.fixed_values(LogLevel::ALL)
				.build()?,
		)
		.await?;
	let level = engine
		.property_store()
		.update_as::<LogLevel, _>("log_level", |p| p.with_value(LogLevel::Debug))
		.await?;
	println!("log_level = {}", level.value());

	// 6. Wire form
	let feature = engine.feature("beta-dashboard").await?;
	let bytes = encode_feature(&Json, &feature)?;
	println!("{}", String::from_utf8_lossy(&bytes));
	assert_eq!(decode_feature(&Json, &bytes)?, feature);

	Ok(())
}
