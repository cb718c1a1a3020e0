//! Secure randomness from the operating system.
//!
//! Entropy for new mnemonics and encryption nonces is drawn here. A failing
//! OS source is reported, never papered over with a weaker generator.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::PrimitivesError;

/// Draw `n` bytes from the OS CSPRNG.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, PrimitivesError> {
    let mut out = vec![0u8; n];
    OsRng
        .try_fill_bytes(&mut out)
        .map_err(|e| PrimitivesError::RandomUnavailable(e.to_string()))?;
    Ok(out)
}

/// Draw a fixed-size array from the OS CSPRNG.
pub fn random_array<const N: usize>() -> Result<[u8; N], PrimitivesError> {
    let mut out = [0u8; N];
    OsRng
        .try_fill_bytes(&mut out)
        .map_err(|e| PrimitivesError::RandomUnavailable(e.to_string()))?;
    Ok(out)
}
