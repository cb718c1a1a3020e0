/// Unified error type for all primitives operations.
///
/// Covers errors from EC operations, mnemonic handling, key derivation,
/// password hashing, encryption, randomness and encoding.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid digest length: expected {expected}, got {got}")]
    InvalidDigestLength { expected: usize, got: usize },

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("unsupported word count: {0}")]
    InvalidWordCount(usize),

    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid nonce length: expected {expected}, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    #[error("kdf error: {0}")]
    Kdf(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("decryption error: {0}")]
    DecryptionError(String),

    #[error("random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<::bip39::Error> for PrimitivesError {
    fn from(e: ::bip39::Error) -> Self {
        PrimitivesError::InvalidMnemonic(e.to_string())
    }
}

impl From<::bip32::Error> for PrimitivesError {
    fn from(e: ::bip32::Error) -> Self {
        PrimitivesError::Derivation(e.to_string())
    }
}

impl From<k256::ecdsa::Error> for PrimitivesError {
    fn from(e: k256::ecdsa::Error) -> Self {
        PrimitivesError::InvalidPublicKey(e.to_string())
    }
}
