/* src/codec/error.rs */

use crate::error::FlagError;

/// Errors raised while encoding or decoding the wire form.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
	/// Serializer failure.
	#[error("encode error: {0}")]
	Encode(String),

	/// Parsing error from the format implementation, including property
	/// invariant violations found while rebuilding values.
	#[error("parse error: {0}")]
	Parse(String),

	/// Format not compiled in.
	#[error("unsupported format: {0}")]
	Unsupported(String),

	/// Model error raised while rebuilding a decoded feature.
	#[error(transparent)]
	Flag(#[from] FlagError),
}
