/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("primitives error: {0}")]
    Primitives(#[from] hdsign_primitives::PrimitivesError),
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("address not found in wallet: {0}")]
    AddressNotFound(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("unsupported prehash type: {0}")]
    UnsupportedPrehashType(String),
    #[error("unsupported secret type: {0}")]
    UnsupportedSecretType(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<base64::DecodeError> for WalletError {
    fn from(e: base64::DecodeError) -> Self {
        WalletError::InvalidEncoding(e.to_string())
    }
}
