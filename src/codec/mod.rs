/* src/codec/mod.rs */

//!
//! Self-describing wire form for features and properties.
//!
//! Properties carry a `type` discriminator; features carry their strategy
//! as `kind` + `params` and rebuild it through the global
//! [`StrategyRegistry`](crate::strategy::StrategyRegistry) on decode.

mod error;
#[cfg(feature = "json")]
mod json;
#[cfg(feature = "yaml")]
mod yaml;

pub use error::CodecError;
#[cfg(feature = "json")]
pub use json::Json;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::feature::{Feature, FeatureRepr};
use crate::property::AnyProperty;

/// A structured encoding.
pub trait Format: Send + Sync {
	/// List of supported extensions or identifiers.
	fn extensions(&self) -> &'static [&'static str];

	fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

	fn decode<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, CodecError>;
}

/// An enum wrapper for all compiled-in formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyFormat {
	#[cfg(feature = "json")]
	Json,
	#[cfg(feature = "yaml")]
	Yaml,
}

impl AnyFormat {
	/// Picks the format registered for `extension` (without the dot).
	pub fn from_extension(extension: &str) -> Result<Self, CodecError> {
		let all: &[AnyFormat] = &[
			#[cfg(feature = "json")]
			Self::Json,
			#[cfg(feature = "yaml")]
			Self::Yaml,
		];
		all.iter()
			.copied()
			.find(|format| {
				format
					.extensions()
					.iter()
					.any(|ext| ext.eq_ignore_ascii_case(extension))
			})
			.ok_or_else(|| CodecError::Unsupported(extension.to_string()))
	}
}

impl Format for AnyFormat {
	fn extensions(&self) -> &'static [&'static str] {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.extensions(),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.extensions(),
			#[cfg(not(any(feature = "json", feature = "yaml")))]
			_ => unreachable!(),
		}
	}

	fn encode<T: Serialize>(&self, _value: &T) -> Result<Vec<u8>, CodecError> {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.encode(_value),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.encode(_value),
			#[cfg(not(any(feature = "json", feature = "yaml")))]
			_ => unreachable!(),
		}
	}

	fn decode<T: DeserializeOwned>(&self, _input: &[u8]) -> Result<T, CodecError> {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.decode(_input),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.decode(_input),
			#[cfg(not(any(feature = "json", feature = "yaml")))]
			_ => unreachable!(),
		}
	}
}

pub fn encode_feature(format: &impl Format, feature: &Feature) -> Result<Vec<u8>, CodecError> {
	format.encode(feature)
}

/// Decodes a feature; model errors (unknown strategy kind, bad parameters,
/// mismatched property keys) surface as [`CodecError::Flag`].
pub fn decode_feature(format: &impl Format, input: &[u8]) -> Result<Feature, CodecError> {
	let repr: FeatureRepr = format.decode(input)?;
	Ok(repr.into_feature()?)
}

pub fn encode_property(format: &impl Format, property: &AnyProperty) -> Result<Vec<u8>, CodecError> {
	format.encode(property)
}

pub fn decode_property(format: &impl Format, input: &[u8]) -> Result<AnyProperty, CodecError> {
	format.decode(input)
}

/// Encodes a list of features, e.g. a store snapshot sorted by uid.
pub fn encode_features<'a>(
	format: &impl Format,
	features: impl IntoIterator<Item = &'a Feature>,
) -> Result<Vec<u8>, CodecError> {
	let mut features: Vec<&Feature> = features.into_iter().collect();
	features.sort_by(|a, b| a.uid().cmp(b.uid()));
	format.encode(&features)
}

pub fn decode_features(format: &impl Format, input: &[u8]) -> Result<Vec<Feature>, CodecError> {
	let reprs: Vec<FeatureRepr> = format.decode(input)?;
	reprs
		.into_iter()
		.map(|repr| repr.into_feature().map_err(CodecError::from))
		.collect()
}
