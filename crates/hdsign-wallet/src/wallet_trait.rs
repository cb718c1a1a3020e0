//! The offline signer interface.
//!
//! What a transaction builder needs from a wallet that never touches the
//! network: the accounts it can sign for, and a signature over raw bytes.

use crate::error::WalletError;
use crate::types::{AccountData, HashFunction, StdSignature};

/// A signer that holds keys locally.
pub trait OfflineSigner {
    /// Public data for every account this signer controls.
    fn get_accounts(&self) -> Result<Vec<AccountData>, WalletError>;

    /// Sign `message` with the key behind `signer_address`.
    ///
    /// Fails with `AddressNotFound` if the signer does not control the address.
    fn sign(
        &self,
        signer_address: &str,
        message: &[u8],
        prehash: Option<HashFunction>,
    ) -> Result<StdSignature, WalletError>;
}
