//! Envelope JSON codec

use bytes::Bytes;
use contracts::{ContractError, Envelope};

/// Encode an envelope as a JSON text payload
pub fn encode_envelope(envelope: &Envelope) -> Result<Bytes, ContractError> {
    serde_json::to_vec(envelope)
        .map(Bytes::from)
        .map_err(|e| ContractError::serialization(format!("envelope encode: {e}")))
}

/// Decode a JSON envelope (receiving side, tests and tooling)
pub fn decode_envelope(payload: &[u8]) -> Result<Envelope, ContractError> {
    serde_json::from_slice(payload)
        .map_err(|e| ContractError::serialization(format!("envelope decode: {e}")))
}
