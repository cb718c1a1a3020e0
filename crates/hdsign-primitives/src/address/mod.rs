//! Bech32 account addresses.
//!
//! An account address is the bech32 (BIP-173) encoding of
//! `RIPEMD-160(SHA-256(compressed_pubkey))` under a human-readable prefix
//! such as `cosmos` or `osmo`.

use bech32::{FromBase32, ToBase32, Variant};

use crate::ec::public_key::COMPRESSED_LEN;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of the address payload (a Hash160 digest).
pub const ADDRESS_PAYLOAD_LEN: usize = 20;

/// Encode the bech32 address of a 33-byte compressed public key.
///
/// # Arguments
/// * `pubkey` - The compressed SEC1 public key.
/// * `prefix` - The human-readable part.
///
/// # Returns
/// The lowercase bech32 string, or `InvalidAddress` for an empty or
/// otherwise unusable prefix.
pub fn bech32_address(pubkey: &[u8], prefix: &str) -> Result<String, PrimitivesError> {
    if pubkey.len() != COMPRESSED_LEN {
        return Err(PrimitivesError::InvalidKeyLength {
            expected: COMPRESSED_LEN,
            got: pubkey.len(),
        });
    }
    encode_payload(&hash160(pubkey), prefix)
}

/// Bech32-encode an arbitrary payload under `prefix`.
pub fn encode_payload(payload: &[u8], prefix: &str) -> Result<String, PrimitivesError> {
    if prefix.is_empty() {
        return Err(PrimitivesError::InvalidAddress("empty prefix".into()));
    }
    bech32::encode(prefix, payload.to_base32(), Variant::Bech32)
        .map_err(|e| PrimitivesError::InvalidAddress(e.to_string()))
}

/// Split an address into its prefix and 20-byte payload.
pub fn decode_address(address: &str) -> Result<(String, [u8; ADDRESS_PAYLOAD_LEN]), PrimitivesError> {
    let (hrp, data, variant) =
        bech32::decode(address).map_err(|e| PrimitivesError::InvalidAddress(e.to_string()))?;
    if variant != Variant::Bech32 {
        return Err(PrimitivesError::InvalidAddress(
            "expected bech32, got bech32m".into(),
        ));
    }
    let bytes = Vec::<u8>::from_base32(&data)
        .map_err(|e| PrimitivesError::InvalidAddress(e.to_string()))?;
    let payload: [u8; ADDRESS_PAYLOAD_LEN] = bytes.as_slice().try_into().map_err(|_| {
        PrimitivesError::InvalidAddress(format!(
            "payload is {} bytes, expected {}",
            bytes.len(),
            ADDRESS_PAYLOAD_LEN
        ))
    })?;
    Ok((hrp, payload))
}
