/* src/codec/json.rs */

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{CodecError, Format};

/// JSON wire format using `serde_json`.
pub struct Json;

impl Format for Json {
	fn extensions(&self) -> &'static [&'static str] {
		&["json"]
	}

	fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
		serde_json::to_vec_pretty(value).map_err(|e| CodecError::Encode(e.to_string()))
	}

	fn decode<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, CodecError> {
		serde_json::from_slice(input).map_err(|e| CodecError::Parse(e.to_string()))
	}
}
