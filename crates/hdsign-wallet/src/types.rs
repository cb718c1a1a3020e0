//! Core wallet types: Algo, Account, AccountData, HashFunction, StdSignature,
//! WalletOptions.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hdsign_primitives::bip32::{ChildNumber, DerivationPath};
use hdsign_primitives::ec::public_key::{PublicKey, COMPRESSED_LEN};
use hdsign_primitives::ec::signature::{Signature, DIGEST_LEN, SIGNATURE_LEN};
use hdsign_primitives::hash::{sha256, sha512};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// BIP-44 purpose.
const BIP44_PURPOSE: u32 = 44;
/// SLIP-44 coin type for the Cosmos Hub (ATOM).
const COSMOS_COIN_TYPE: u32 = 118;

/// Address prefix used when the caller does not pick one.
pub const DEFAULT_PREFIX: &str = "cosmos";

/// Amino type tag of a secp256k1 public key.
pub const SECP256K1_PUBKEY_TYPE: &str = "tendermint/PubKeySecp256k1";

/// Build the default derivation path `m/44'/118'/0'/0/{account_index}`.
///
/// Fails if `account_index` is outside `[0, 2^31)`.
pub fn make_default_path(account_index: u32) -> Result<DerivationPath, WalletError> {
    let path = DerivationPath::new(vec![
        ChildNumber::hardened(BIP44_PURPOSE)?,
        ChildNumber::hardened(COSMOS_COIN_TYPE)?,
        ChildNumber::hardened(0)?,
        ChildNumber::normal(0)?,
        ChildNumber::normal(account_index)?,
    ])?;
    Ok(path)
}

/// Key algorithm tag carried by an account.
///
/// Only `Secp256k1` can be derived; the other tags exist so that stored
/// account records naming them are recognised and rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algo {
    #[default]
    Secp256k1,
    Ed25519,
    Sr25519,
}

impl Algo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algo::Secp256k1 => "secp256k1",
            Algo::Ed25519 => "ed25519",
            Algo::Sr25519 => "sr25519",
        }
    }
}

impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algo {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secp256k1" => Ok(Algo::Secp256k1),
            "ed25519" => Ok(Algo::Ed25519),
            "sr25519" => Ok(Algo::Sr25519),
            other => Err(WalletError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// The wallet's single account record. Immutable once the wallet is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Key algorithm.
    pub algo: Algo,
    /// Path walked from the seed to the account key.
    pub hd_path: DerivationPath,
    /// Human-readable address prefix.
    pub prefix: String,
}

/// Public view of an account, as returned by `get_accounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    /// Bech32 address.
    pub address: String,
    /// Key algorithm.
    pub algo: Algo,
    /// 33-byte compressed public key.
    pub pubkey: [u8; COMPRESSED_LEN],
}

/// Hash applied to a message before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    Sha256,
    Sha512,
}

impl HashFunction {
    /// Hash `message` with this function.
    pub fn apply(&self, message: &[u8]) -> Vec<u8> {
        match self {
            HashFunction::Sha256 => sha256(message).to_vec(),
            HashFunction::Sha512 => sha512(message).to_vec(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashFunction::Sha256 => "sha256",
            HashFunction::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashFunction {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(HashFunction::Sha256),
            "sha512" => Ok(HashFunction::Sha512),
            other => Err(WalletError::UnsupportedPrehashType(other.to_string())),
        }
    }
}

/// The 32-byte digest ECDSA signs for `message`.
///
/// A prehash digest wider than 32 bytes keeps its leftmost 32 bytes, the
/// usual ECDSA reduction for SHA-512. With no prehash the message is passed
/// through unchanged, so it must already be a 32-byte digest.
pub fn prehash_message(
    message: &[u8],
    prehash: Option<HashFunction>,
) -> Result<[u8; DIGEST_LEN], WalletError> {
    match prehash {
        Some(hash_fn) => {
            let digest = hash_fn.apply(message);
            let mut out = [0u8; DIGEST_LEN];
            out.copy_from_slice(&digest[..DIGEST_LEN]);
            Ok(out)
        }
        None => message.try_into().map_err(|_| {
            WalletError::InvalidMessage(format!(
                "unhashed message must be a {}-byte digest, got {} bytes",
                DIGEST_LEN,
                message.len()
            ))
        }),
    }
}

/// Public key half of a [`StdSignature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKeyEnvelope {
    /// Amino type tag.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Base64 of the compressed public key.
    pub value: String,
}

/// Amino `StdSignature`: base64 compressed public key plus base64 `r || s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    pub pub_key: PubKeyEnvelope,
    pub signature: String,
}

impl StdSignature {
    /// Wrap a compressed public key and a fixed-width signature.
    pub fn encode(pubkey: &[u8; COMPRESSED_LEN], signature: &[u8; SIGNATURE_LEN]) -> Self {
        StdSignature {
            pub_key: PubKeyEnvelope {
                key_type: SECP256K1_PUBKEY_TYPE.to_string(),
                value: BASE64.encode(pubkey),
            },
            signature: BASE64.encode(signature),
        }
    }

    /// Decoded 64-byte `r || s` signature.
    pub fn signature_bytes(&self) -> Result<[u8; SIGNATURE_LEN], WalletError> {
        let raw = BASE64.decode(&self.signature)?;
        raw.as_slice().try_into().map_err(|_| {
            WalletError::InvalidEncoding(format!(
                "signature is {} bytes, expected {}",
                raw.len(),
                SIGNATURE_LEN
            ))
        })
    }

    /// Decoded 33-byte compressed public key.
    pub fn pubkey_bytes(&self) -> Result<[u8; COMPRESSED_LEN], WalletError> {
        if self.pub_key.key_type != SECP256K1_PUBKEY_TYPE {
            return Err(WalletError::UnsupportedAlgorithm(self.pub_key.key_type.clone()));
        }
        let raw = BASE64.decode(&self.pub_key.value)?;
        raw.as_slice().try_into().map_err(|_| {
            WalletError::InvalidEncoding(format!(
                "public key is {} bytes, expected {}",
                raw.len(),
                COMPRESSED_LEN
            ))
        })
    }

    /// Check the signature against `message` under the given prehash.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not verify,
    /// and an error if the envelope cannot be decoded or `message` could not
    /// have been signed under `prehash`.
    pub fn verify(&self, message: &[u8], prehash: Option<HashFunction>) -> Result<bool, WalletError> {
        let pubkey = PublicKey::from_bytes(&self.pubkey_bytes()?)?;
        let sig = Signature::from_fixed_bytes(&self.signature_bytes()?)?;
        let digest = prehash_message(message, prehash)?;
        Ok(pubkey.verify(&digest, &sig))
    }
}

/// Options for building a wallet.
///
/// Deserializable so hosts can load it from a config file:
/// `{"hdPath": "m/44'/118'/0'/0/0", "prefix": "osmo", "bip39Password": ""}`.
/// Every field is optional.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletOptions {
    /// Derivation path. `None` means `make_default_path(0)`.
    #[serde(with = "optional_path")]
    pub hd_path: Option<DerivationPath>,
    /// Bech32 address prefix.
    pub prefix: String,
    /// BIP-39 passphrase fed into seed derivation.
    pub bip39_password: String,
}

impl Default for WalletOptions {
    fn default() -> Self {
        WalletOptions {
            hd_path: None,
            prefix: DEFAULT_PREFIX.to_string(),
            bip39_password: String::new(),
        }
    }
}

impl WalletOptions {
    pub fn with_hd_path(mut self, hd_path: DerivationPath) -> Self {
        self.hd_path = Some(hd_path);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_bip39_password(mut self, password: impl Into<String>) -> Self {
        self.bip39_password = password.into();
        self
    }

    /// The configured path, or the default path for account 0.
    pub fn resolved_hd_path(&self) -> Result<DerivationPath, WalletError> {
        match &self.hd_path {
            Some(path) => Ok(path.clone()),
            None => make_default_path(0),
        }
    }
}

impl fmt::Debug for WalletOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletOptions")
            .field("hd_path", &self.hd_path.as_ref().map(ToString::to_string))
            .field("prefix", &self.prefix)
            .field("bip39_password", &"<redacted>")
            .finish()
    }
}

/// Serde adapter storing a derivation path by its string form.
mod optional_path {
    use hdsign_primitives::bip32::DerivationPath;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        path: &Option<DerivationPath>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match path {
            Some(p) => serializer.serialize_some(&p.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DerivationPath>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| s.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}
