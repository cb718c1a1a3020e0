//! Seed-to-keypair derivation.
//!
//! KeyDeriver holds a BIP-39 seed and walks the BIP-32 tree to the keypair
//! for an account's algorithm and path. Only secp256k1 has a derivation
//! strategy; other algorithm tags are rejected.

use hdsign_primitives::bip32::{derive_private_key, DerivationPath};
use hdsign_primitives::bip39::{Mnemonic, SEED_LEN};
use hdsign_primitives::ec::private_key::PrivateKey;
use hdsign_primitives::ec::public_key::PublicKey;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::types::Algo;

/// A derived private/public keypair.
#[derive(Clone, Debug)]
pub struct Keypair {
    privkey: PrivateKey,
    pubkey: PublicKey,
}

impl Keypair {
    pub fn private_key(&self) -> &PrivateKey {
        &self.privkey
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pubkey
    }
}

/// Derives account keypairs from a BIP-39 seed.
pub struct KeyDeriver {
    seed: Zeroizing<[u8; SEED_LEN]>,
}

impl KeyDeriver {
    /// Derive the seed for `mnemonic` under an optional BIP-39 passphrase.
    pub fn new(mnemonic: &Mnemonic, bip39_password: &str) -> Result<Self, WalletError> {
        Ok(KeyDeriver {
            seed: mnemonic.to_seed(bip39_password)?,
        })
    }

    /// Derive the keypair for `algo` at `path`.
    pub fn derive(&self, algo: Algo, path: &DerivationPath) -> Result<Keypair, WalletError> {
        match algo {
            Algo::Secp256k1 => {
                let privkey = derive_private_key(self.seed.as_ref(), path)?;
                let pubkey = privkey.pub_key();
                Ok(Keypair { privkey, pubkey })
            }
            Algo::Ed25519 | Algo::Sr25519 => {
                Err(WalletError::UnsupportedAlgorithm(algo.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyDeriver(..)")
    }
}
