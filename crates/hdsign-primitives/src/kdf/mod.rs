//! Argon2id password-based key derivation.
//!
//! Turns a user password into a 32-byte symmetric key. Parameters are
//! expressed the way they are persisted alongside ciphertext
//! (`outputLength`, `opsLimit`, `memLimitKib`), so a stored descriptor can be
//! fed straight back into [`argon2id`].

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::PrimitivesError;

/// Length of every key this module produces.
pub const DERIVED_KEY_LEN: usize = 32;

/// Argon2 lanes. Fixed; the persisted descriptor carries no parallelism field.
const PARALLELISM: u32 = 1;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2idParams {
    /// Output length in bytes. Must be 32.
    pub output_length: u32,
    /// Number of passes (time cost).
    pub ops_limit: u32,
    /// Memory cost in KiB.
    pub mem_limit_kib: u32,
}

impl Default for Argon2idParams {
    fn default() -> Self {
        Argon2idParams {
            output_length: DERIVED_KEY_LEN as u32,
            ops_limit: 24,
            mem_limit_kib: 12 * 1024,
        }
    }
}

/// Derive a 32-byte key from `password` and `salt` with Argon2id (v1.3).
///
/// # Arguments
/// * `password` - The password bytes.
/// * `salt` - At least 8 bytes of salt.
/// * `params` - Cost parameters; `output_length` must be 32.
///
/// # Returns
/// The derived key in a buffer that is zeroed on drop.
pub fn argon2id(
    password: &[u8],
    salt: &[u8],
    params: &Argon2idParams,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, PrimitivesError> {
    if params.output_length as usize != DERIVED_KEY_LEN {
        return Err(PrimitivesError::Kdf(format!(
            "output length must be {}, got {}",
            DERIVED_KEY_LEN, params.output_length
        )));
    }
    let argon_params = Params::new(
        params.mem_limit_kib,
        params.ops_limit,
        PARALLELISM,
        Some(DERIVED_KEY_LEN),
    )
    .map_err(|e| PrimitivesError::Kdf(e.to_string()))?;
    let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut out = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    hasher
        .hash_password_into(password, salt, out.as_mut())
        .map_err(|e| PrimitivesError::Kdf(e.to_string()))?;
    Ok(out)
}
