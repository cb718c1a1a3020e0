#![deny(missing_docs)]

//! hdsign SDK - Complete SDK.
//!
//! Re-exports the hdsign components for convenient single-crate usage.

pub use hdsign_primitives as primitives;
pub use hdsign_wallet as wallet;

pub use hdsign_wallet::{
    OfflineSigner, Secp256k1HdWallet, Secret, StdSignature, WalletError, WalletOptions,
};
