//! Encrypted wallet container.
//!
//! Serializes the wallet's secret state (mnemonic plus account records)
//! into a versioned, self-describing JSON document:
//!
//! ```json
//! { "type": "v1",
//!   "kdf": { "algorithm": "argon2id", "params": { "outputLength": 32, "opsLimit": 24, "memLimitKib": 12288 } },
//!   "encryption": { "algorithm": "xchacha20poly1305-ietf", "params": { "nonce": "<hex>" } },
//!   "value": "<base64 ciphertext>" }
//! ```
//!
//! A password KDF with a non-default salt also records `"salt": "<hex>"`
//! in `kdf.params`, so `KdfConfiguration::try_from` can rebuild the key
//! settings from the container alone.
//!
//! The encrypted value is the compact JSON
//! `{"mnemonic": "...", "accounts": [{"algo": "secp256k1", "hdPath": "m/...", "prefix": "..."}]}`.
//! A fresh nonce is drawn for every call. Only the write direction exists.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hdsign_primitives::aead::{SymmetricKey, KEY_LEN};
use hdsign_primitives::kdf::{argon2id, Argon2idParams, DERIVED_KEY_LEN};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::hd_wallet::Secp256k1HdWallet;
use crate::types::Algo;

// === Format constants ===

/// Version tag of the only container format.
pub const CONTAINER_TYPE_V1: &str = "v1";
/// KDF algorithm identifier.
pub const ARGON2ID_ALGORITHM: &str = "argon2id";
/// Cipher algorithm identifier.
pub const XCHACHA20POLY1305_ALGORITHM: &str = "xchacha20poly1305-ietf";
/// Fixed salt of the default KDF configuration.
///
/// Every container produced with a password shares this salt, so identical
/// passwords yield identical keys across wallets. Kept for format
/// compatibility.
pub const DEFAULT_KDF_SALT: &[u8; 16] = b"The hdsign salt.";

/// Secret protecting a container.
#[derive(Clone, Copy)]
pub enum Secret<'a> {
    /// Stretched with the default KDF configuration.
    Password(&'a str),
    /// Used as the cipher key as is; must be 32 bytes.
    Key(&'a [u8]),
}

impl std::fmt::Debug for Secret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Password(_) => f.write_str("Secret::Password(..)"),
            Secret::Key(k) => write!(f, "Secret::Key({} bytes)", k.len()),
        }
    }
}

/// Key of the hex salt inside a KDF descriptor's parameters.
pub const SALT_PARAM: &str = "salt";

/// Password KDF configuration.
///
/// Serializes to the container's `kdf` descriptor. A salt other than
/// [`DEFAULT_KDF_SALT`] is recorded hex-encoded under `params.salt`; a
/// descriptor without one uses the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "KdfDescriptor", try_from = "KdfDescriptor")]
pub struct KdfConfiguration {
    pub algorithm: String,
    pub params: Argon2idParams,
    pub salt: Vec<u8>,
}

fn default_salt() -> Vec<u8> {
    DEFAULT_KDF_SALT.to_vec()
}

impl Default for KdfConfiguration {
    fn default() -> Self {
        KdfConfiguration {
            algorithm: ARGON2ID_ALGORITHM.to_string(),
            params: Argon2idParams::default(),
            salt: default_salt(),
        }
    }
}

impl KdfConfiguration {
    /// The descriptor written into a container.
    pub fn descriptor(&self) -> KdfDescriptor {
        let mut params = Map::new();
        params.insert("outputLength".into(), Value::from(self.params.output_length));
        params.insert("opsLimit".into(), Value::from(self.params.ops_limit));
        params.insert("memLimitKib".into(), Value::from(self.params.mem_limit_kib));
        if self.salt.as_slice() != DEFAULT_KDF_SALT.as_slice() {
            params.insert(SALT_PARAM.into(), Value::String(hex::encode(&self.salt)));
        }
        KdfDescriptor {
            algorithm: self.algorithm.clone(),
            params,
        }
    }
}

impl From<KdfConfiguration> for KdfDescriptor {
    fn from(config: KdfConfiguration) -> Self {
        config.descriptor()
    }
}

impl TryFrom<KdfDescriptor> for KdfConfiguration {
    type Error = WalletError;

    /// Rebuild the configuration recorded in a container. Fails for the
    /// empty descriptor of a raw-key container.
    fn try_from(descriptor: KdfDescriptor) -> Result<Self, Self::Error> {
        let mut params = descriptor.params;
        let salt = match params.remove(SALT_PARAM) {
            None => default_salt(),
            Some(Value::String(encoded)) => hex::decode(&encoded)
                .map_err(|e| WalletError::InvalidEncoding(format!("kdf salt: {}", e)))?,
            Some(other) => {
                return Err(WalletError::InvalidEncoding(format!(
                    "kdf salt must be a hex string, got {}",
                    other
                )))
            }
        };
        Ok(KdfConfiguration {
            algorithm: descriptor.algorithm,
            params: serde_json::from_value(Value::Object(params))?,
            salt,
        })
    }
}

/// Derive a cipher key from `password` under `config`.
pub fn execute_kdf(
    password: &str,
    config: &KdfConfiguration,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, WalletError> {
    if config.algorithm != ARGON2ID_ALGORITHM {
        return Err(WalletError::UnsupportedAlgorithm(config.algorithm.clone()));
    }
    Ok(argon2id(password.as_bytes(), &config.salt, &config.params)?)
}

// === Container document ===

/// KDF section of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdfDescriptor {
    pub algorithm: String,
    pub params: Map<String, Value>,
}

/// Cipher parameters of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    /// Hex-encoded 24-byte nonce.
    pub nonce: String,
}

/// Cipher section of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionDescriptor {
    pub algorithm: String,
    pub params: EncryptionParams,
}

/// A `v1` encrypted wallet container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedContainer {
    #[serde(rename = "type")]
    pub container_type: String,
    pub kdf: KdfDescriptor,
    pub encryption: EncryptionDescriptor,
    /// Base64 of `ciphertext || tag`.
    pub value: String,
}

/// Plaintext record inside the container.
#[derive(Serialize)]
struct SerializedWallet<'a> {
    mnemonic: &'a str,
    accounts: Vec<SerializedAccount>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedAccount {
    algo: Algo,
    hd_path: String,
    prefix: String,
}

/// Encrypt `wallet` under a password or raw key.
pub fn save(wallet: &Secp256k1HdWallet, secret: Secret<'_>) -> Result<String, WalletError> {
    match secret {
        Secret::Password(password) => {
            let config = KdfConfiguration::default();
            let key = execute_kdf(password, &config)?;
            save_with_encryption_key(wallet, key.as_ref(), &config)
        }
        Secret::Key(key) => {
            if key.len() != KEY_LEN {
                return Err(WalletError::UnsupportedSecretType(format!(
                    "raw key must be {} bytes, got {}",
                    KEY_LEN,
                    key.len()
                )));
            }
            let kdf = KdfDescriptor {
                algorithm: ARGON2ID_ALGORITHM.to_string(),
                params: Map::new(),
            };
            encrypt_container(wallet, key, kdf)
        }
    }
}

/// Encrypt `wallet` under a key previously derived with `config`.
///
/// `config`, salt included, is recorded in the container; it is not re-run.
pub fn save_with_encryption_key(
    wallet: &Secp256k1HdWallet,
    encryption_key: &[u8],
    config: &KdfConfiguration,
) -> Result<String, WalletError> {
    encrypt_container(wallet, encryption_key, config.descriptor())
}

fn encrypt_container(
    wallet: &Secp256k1HdWallet,
    encryption_key: &[u8],
    kdf: KdfDescriptor,
) -> Result<String, WalletError> {
    let cipher_key = SymmetricKey::from_bytes(encryption_key)?;

    let record = SerializedWallet {
        mnemonic: wallet.mnemonic(),
        accounts: wallet
            .accounts()
            .iter()
            .map(|account| SerializedAccount {
                algo: account.algo,
                hd_path: account.hd_path.to_string(),
                prefix: account.prefix.clone(),
            })
            .collect(),
    };
    let plaintext = Zeroizing::new(serde_json::to_vec(&record)?);

    let nonce = SymmetricKey::random_nonce()?;
    let ciphertext = cipher_key.encrypt(&plaintext, &nonce)?;

    let container = EncryptedContainer {
        container_type: CONTAINER_TYPE_V1.to_string(),
        kdf,
        encryption: EncryptionDescriptor {
            algorithm: XCHACHA20POLY1305_ALGORITHM.to_string(),
            params: EncryptionParams {
                nonce: hex::encode(nonce),
            },
        },
        value: BASE64.encode(ciphertext),
    };
    debug!(
        kdf = %container.kdf.algorithm,
        encryption = %container.encryption.algorithm,
        "wallet serialized"
    );
    Ok(serde_json::to_string(&container)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WalletOptions;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

    fn light_config() -> KdfConfiguration {
        KdfConfiguration {
            params: Argon2idParams {
                output_length: 32,
                ops_limit: 1,
                mem_limit_kib: 64,
            },
            ..KdfConfiguration::default()
        }
    }

    fn wallet() -> Secp256k1HdWallet {
        Secp256k1HdWallet::from_mnemonic(ABANDON, WalletOptions::default().with_prefix("osmo")).unwrap()
    }

    fn open(serialized: &str, key: &[u8]) -> Value {
        let container: EncryptedContainer = serde_json::from_str(serialized).unwrap();
        let nonce = hex::decode(&container.encryption.params.nonce).unwrap();
        let ciphertext = BASE64.decode(&container.value).unwrap();
        let plaintext = SymmetricKey::from_bytes(key)
            .unwrap()
            .decrypt(&ciphertext, &nonce)
            .unwrap();
        serde_json::from_slice(&plaintext).unwrap()
    }

    #[test]
    fn test_default_kdf_configuration() {
        let config = KdfConfiguration::default();
        assert_eq!(config.algorithm, "argon2id");
        assert_eq!(config.params.output_length, 32);
        assert_eq!(config.params.ops_limit, 24);
        assert_eq!(config.params.mem_limit_kib, 12 * 1024);
        assert_eq!(config.salt, b"The hdsign salt.".to_vec());
        assert_eq!(DEFAULT_KDF_SALT.len(), 16);
    }

    #[test]
    fn test_kdf_configuration_json_default_salt_omitted() {
        let json = serde_json::to_value(KdfConfiguration::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "algorithm": "argon2id",
                "params": {"outputLength": 32, "opsLimit": 24, "memLimitKib": 12288}
            })
        );
        let back: KdfConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, KdfConfiguration::default());
    }

    #[test]
    fn test_kdf_configuration_json_custom_salt() {
        let config = KdfConfiguration {
            salt: b"per-wallet-salt-xyz".to_vec(),
            ..light_config()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["params"]["salt"], hex::encode(b"per-wallet-salt-xyz"));
        let back: KdfConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_kdf_descriptor_rejects_bad_salt_and_empty_params() {
        let mut descriptor = light_config().descriptor();
        descriptor.params.insert("salt".into(), Value::from(7));
        assert!(matches!(
            KdfConfiguration::try_from(descriptor),
            Err(WalletError::InvalidEncoding(_))
        ));

        let mut descriptor = light_config().descriptor();
        descriptor.params.insert("salt".into(), Value::from("zz"));
        assert!(KdfConfiguration::try_from(descriptor).is_err());

        let raw_key = KdfDescriptor {
            algorithm: "argon2id".into(),
            params: Map::new(),
        };
        assert!(KdfConfiguration::try_from(raw_key).is_err());
    }

    #[test]
    fn test_execute_kdf() {
        let a = execute_kdf("password", &light_config()).unwrap();
        let b = execute_kdf("password", &light_config()).unwrap();
        let c = execute_kdf("passwore", &light_config()).unwrap();
        assert_eq!(*a, *b);
        assert_ne!(*a, *c);

        let mut config = light_config();
        config.algorithm = "scrypt".into();
        assert!(matches!(
            execute_kdf("password", &config),
            Err(WalletError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_save_with_encryption_key_shape() {
        let w = wallet();
        let config = light_config();
        let key = execute_kdf("password", &config).unwrap();
        let serialized = w.save_with_encryption_key(key.as_ref(), &config).unwrap();

        let doc: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(doc["type"], "v1");
        assert_eq!(doc["kdf"]["algorithm"], "argon2id");
        assert_eq!(
            doc["kdf"]["params"],
            serde_json::json!({"outputLength": 32, "opsLimit": 1, "memLimitKib": 64})
        );
        assert_eq!(doc["encryption"]["algorithm"], "xchacha20poly1305-ietf");
        let params = doc["encryption"]["params"].as_object().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(hex::decode(params["nonce"].as_str().unwrap()).unwrap().len(), 24);

        let plaintext = open(&serialized, key.as_ref());
        assert_eq!(
            plaintext,
            serde_json::json!({
                "mnemonic": ABANDON.split_whitespace().collect::<Vec<_>>().join(" "),
                "accounts": [{"algo": "secp256k1", "hdPath": "m/44'/118'/0'/0/0", "prefix": "osmo"}]
            })
        );
    }

    #[test]
    fn test_custom_salt_recoverable_from_container() {
        let w = wallet();
        let config = KdfConfiguration {
            salt: b"per-wallet-salt-xyz".to_vec(),
            ..light_config()
        };
        let key = execute_kdf("password", &config).unwrap();
        let serialized = w.save_with_encryption_key(key.as_ref(), &config).unwrap();

        // Only the container and the password are needed to reopen it.
        let container: EncryptedContainer = serde_json::from_str(&serialized).unwrap();
        let rebuilt = KdfConfiguration::try_from(container.kdf).unwrap();
        assert_eq!(rebuilt, config);
        let rederived = execute_kdf("password", &rebuilt).unwrap();
        assert_eq!(*rederived, *key);
        assert_eq!(
            open(&serialized, rederived.as_ref())["accounts"][0]["prefix"],
            "osmo"
        );

        let default_key = execute_kdf("password", &light_config()).unwrap();
        assert_ne!(*default_key, *key);
    }

    #[test]
    fn test_save_with_raw_key() {
        let w = wallet();
        let key = [7u8; 32];
        let serialized = w.save(Secret::Key(&key)).unwrap();
        let container: EncryptedContainer = serde_json::from_str(&serialized).unwrap();
        assert_eq!(container.kdf.algorithm, "argon2id");
        assert!(container.kdf.params.is_empty());
        assert_eq!(open(&serialized, &key)["accounts"][0]["prefix"], "osmo");
    }

    #[test]
    fn test_save_with_password_uses_default_kdf() {
        let w = wallet();
        let serialized = w.save(Secret::Password("password")).unwrap();
        let container: EncryptedContainer = serde_json::from_str(&serialized).unwrap();
        assert_eq!(
            Value::Object(container.kdf.params.clone()),
            serde_json::to_value(Argon2idParams::default()).unwrap()
        );
        let rebuilt = KdfConfiguration::try_from(container.kdf).unwrap();
        assert_eq!(rebuilt, KdfConfiguration::default());
        let key = execute_kdf("password", &rebuilt).unwrap();
        assert_eq!(open(&serialized, key.as_ref())["accounts"][0]["algo"], "secp256k1");
    }

    #[test]
    fn test_raw_key_length_rejected() {
        let w = wallet();
        for len in [0, 16, 31, 33, 64] {
            let key = vec![1u8; len];
            assert!(matches!(
                w.save(Secret::Key(&key)),
                Err(WalletError::UnsupportedSecretType(_))
            ));
        }
    }

    #[test]
    fn test_nonce_fresh_per_call() {
        let w = wallet();
        let key = [9u8; 32];
        let a: EncryptedContainer = serde_json::from_str(&w.save(Secret::Key(&key)).unwrap()).unwrap();
        let b: EncryptedContainer = serde_json::from_str(&w.save(Secret::Key(&key)).unwrap()).unwrap();
        assert_ne!(a.encryption.params.nonce, b.encryption.params.nonce);
        assert_ne!(a.value, b.value);
    }

    #[test]
    fn test_wrong_key_cannot_open() {
        let w = wallet();
        let serialized = w.save(Secret::Key(&[1u8; 32])).unwrap();
        let container: EncryptedContainer = serde_json::from_str(&serialized).unwrap();
        let nonce = hex::decode(&container.encryption.params.nonce).unwrap();
        let ciphertext = BASE64.decode(&container.value).unwrap();
        assert!(SymmetricKey::from_bytes(&[2u8; 32])
            .unwrap()
            .decrypt(&ciphertext, &nonce)
            .is_err());
    }

    #[test]
    fn test_secret_debug_redacts() {
        assert!(!format!("{:?}", Secret::Password("hunter2")).contains("hunter2"));
    }
}
