/// hdsign - Single-account HD signing wallet.
///
/// Derives one secp256k1 account from a BIP-39 mnemonic, lists it, signs
/// arbitrary bytes under a chosen prehash, and snapshots the wallet's secret
/// state into a versioned encrypted container.

mod error;
pub use error::WalletError;

pub mod types;
pub mod key_deriver;
pub mod wallet_trait;
pub mod hd_wallet;

pub use hd_wallet::{Secp256k1HdWallet, DEFAULT_PREHASH};
pub use key_deriver::KeyDeriver;
pub use types::{make_default_path, Account, AccountData, Algo, HashFunction, StdSignature, WalletOptions};
pub use wallet_trait::OfflineSigner;

pub mod serializer;
pub use serializer::{execute_kdf, EncryptedContainer, KdfConfiguration, Secret};
