//! Authenticated symmetric encryption with XChaCha20-Poly1305.
//!
//! The nonce is not embedded in the ciphertext; callers persist it next to
//! the ciphertext (the wallet container stores it hex-encoded). The output
//! of [`SymmetricKey::encrypt`] is `ciphertext || tag`.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

use crate::random::random_array;
use crate::PrimitivesError;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Extended nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A 32-byte XChaCha20-Poly1305 key.
///
/// The key bytes are zeroed when the value is dropped.
pub struct SymmetricKey {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl SymmetricKey {
    /// Create a key from exactly 32 bytes.
    pub fn from_bytes(key: &[u8]) -> Result<Self, PrimitivesError> {
        if key.len() != KEY_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: KEY_LEN,
                got: key.len(),
            });
        }
        let mut buf = Zeroizing::new([0u8; KEY_LEN]);
        buf.copy_from_slice(key);
        Ok(SymmetricKey { key: buf })
    }

    /// Generate a random key from the OS CSPRNG.
    pub fn new_random() -> Result<Self, PrimitivesError> {
        Ok(SymmetricKey {
            key: Zeroizing::new(random_array()?),
        })
    }

    /// Draw a fresh random nonce.
    pub fn random_nonce() -> Result<[u8; NONCE_LEN], PrimitivesError> {
        random_array()
    }

    /// Encrypt `plaintext` under `nonce`.
    ///
    /// # Arguments
    /// * `plaintext` - The data to encrypt.
    /// * `nonce` - A 24-byte nonce; never reuse one under the same key.
    ///
    /// # Returns
    /// `ciphertext || tag`, 16 bytes longer than the plaintext.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
        let nonce = to_nonce(nonce)?;
        self.cipher()
            .encrypt(nonce, plaintext)
            .map_err(|e| PrimitivesError::EncryptionError(e.to_string()))
    }

    /// Decrypt and authenticate `ciphertext || tag` under `nonce`.
    ///
    /// Fails with `DecryptionError` if the key, nonce or data do not match.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
        let nonce = to_nonce(nonce)?;
        if ciphertext.len() < TAG_LEN {
            return Err(PrimitivesError::DecryptionError(
                "ciphertext shorter than tag".into(),
            ));
        }
        self.cipher()
            .decrypt(nonce, ciphertext)
            .map_err(|_| PrimitivesError::DecryptionError("authentication failed".into()))
    }

    /// The raw key bytes.
    pub fn to_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(self.key.as_ref()))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

fn to_nonce(nonce: &[u8]) -> Result<&XNonce, PrimitivesError> {
    if nonce.len() != NONCE_LEN {
        return Err(PrimitivesError::InvalidNonceLength {
            expected: NONCE_LEN,
            got: nonce.len(),
        });
    }
    Ok(XNonce::from_slice(nonce))
}
