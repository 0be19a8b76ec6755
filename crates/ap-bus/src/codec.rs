//! JSON wire codec.
//!
//! All payloads on the bus are UTF-8 JSON of the `ap-core` model types.
//! Decoding is strict on enum tags (an unknown action or gate state is an
//! error) and lenient on extra fields, so foreign publishers may add fields
//! without breaking the core.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::BusResult;

/// Serialize a wire type to JSON bytes.
pub fn encode<T: Serialize>(value: &T) -> BusResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize JSON bytes into a wire type.
///
/// Callers log and drop on failure — a malformed message never changes
/// state.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> BusResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}
