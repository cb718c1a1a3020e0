//! Fixed-width ECDSA signature with RFC6979 deterministic nonces.
//!
//! The wire form is `r || s`, each component a 32-byte big-endian integer,
//! 64 bytes in total. Signing always yields a low-S signature. The signed
//! input is always a 32-byte digest; it is never padded or truncated here.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of one signature component in bytes.
pub const COMPONENT_LEN: usize = 32;

/// Length of a fixed-width `r || s` signature in bytes.
pub const SIGNATURE_LEN: usize = 2 * COMPONENT_LEN;

/// Length of the digest ECDSA signs over.
pub const DIGEST_LEN: usize = 32;

/// The secp256k1 curve order N.
/// N = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// An ECDSA signature with R and S components.
#[derive(Clone, Debug)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; COMPONENT_LEN],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; COMPONENT_LEN],
}

impl Signature {
    /// Create a signature from raw R and S 32-byte arrays.
    ///
    /// # Arguments
    /// * `r` - The R component (32 bytes, big-endian).
    /// * `s` - The S component (32 bytes, big-endian).
    pub fn new(r: [u8; COMPONENT_LEN], s: [u8; COMPONENT_LEN]) -> Self {
        Signature { r, s }
    }

    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; COMPONENT_LEN] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; COMPONENT_LEN] {
        &self.s
    }

    /// Parse a fixed-width `r || s` signature.
    ///
    /// # Arguments
    /// * `bytes` - Exactly 64 bytes: R followed by S.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the length is wrong or
    /// either component is zero or not below the curve order.
    pub fn from_fixed_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            )));
        }
        let mut r = [0u8; COMPONENT_LEN];
        let mut s = [0u8; COMPONENT_LEN];
        r.copy_from_slice(&bytes[..COMPONENT_LEN]);
        s.copy_from_slice(&bytes[COMPONENT_LEN..]);

        if is_zero(&r) {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is zero".to_string(),
            ));
        }
        if is_zero(&s) {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is zero".to_string(),
            ));
        }
        if !is_less_than(&r, &CURVE_ORDER) {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is >= curve.N".to_string(),
            ));
        }
        if !is_less_than(&s, &CURVE_ORDER) {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is >= curve.N".to_string(),
            ));
        }

        Ok(Signature { r, s })
    }

    /// Serialize the signature as `r || s` (64 bytes).
    pub fn to_fixed_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..COMPONENT_LEN].copy_from_slice(&self.r);
        out[COMPONENT_LEN..].copy_from_slice(&self.s);
        out
    }

    /// Borrow `hash` as a 32-byte digest, rejecting any other length.
    fn digest(hash: &[u8]) -> Result<&[u8; DIGEST_LEN], PrimitivesError> {
        hash.try_into().map_err(|_| PrimitivesError::InvalidDigestLength {
            expected: DIGEST_LEN,
            got: hash.len(),
        })
    }

    /// Sign a 32-byte digest using RFC6979 deterministic nonces.
    ///
    /// k256 only produces low-S signatures, so no normalization is needed.
    ///
    /// # Arguments
    /// * `hash` - The digest to sign. Exactly 32 bytes.
    /// * `priv_key` - The private key to sign with.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or `InvalidDigestLength` for input of any
    /// other length.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let digest = Self::digest(hash)?;
        let (k256_sig, _recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        let mut r = [0u8; COMPONENT_LEN];
        let mut s = [0u8; COMPONENT_LEN];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Ok(Signature { r, s })
    }

    /// Verify this signature against signed bytes and a public key.
    ///
    /// # Arguments
    /// * `hash` - The 32-byte digest that was signed.
    /// * `pub_key` - The public key to verify against.
    ///
    /// # Returns
    /// `true` if the signature is valid, `false` otherwise, including when
    /// `hash` is not 32 bytes.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        let k256_sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        let digest = match Self::digest(hash) {
            Ok(digest) => digest,
            Err(_) => return false,
        };
        pub_key
            .verifying_key()
            .verify_prehash(digest, &k256_sig)
            .is_ok()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.s == other.s
    }
}

impl Eq for Signature {}

/// Check if a 32-byte big-endian integer is zero.
fn is_zero(val: &[u8; 32]) -> bool {
    val.iter().all(|&b| b == 0)
}

/// Compare two 32-byte big-endian integers: a < b.
fn is_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a < b
}
