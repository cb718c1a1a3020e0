//! Secp256k1HdWallet: a single-account HD wallet that signs with secp256k1.
//!
//! The keypair is derived once, at construction, from the mnemonic and the
//! account's path. The address is recomputed from the public key and the
//! account prefix on every request.

use hdsign_primitives::bip39::{Mnemonic, WordCount};
use hdsign_primitives::PrimitivesError;
use tracing::{debug, warn};

use crate::error::WalletError;
use crate::key_deriver::{KeyDeriver, Keypair};
use crate::serializer::{self, KdfConfiguration, Secret};
use crate::types::{prehash_message, Account, AccountData, Algo, HashFunction, StdSignature, WalletOptions};
use crate::wallet_trait::OfflineSigner;

/// Prehash used when a caller has no preference.
pub const DEFAULT_PREHASH: Option<HashFunction> = Some(HashFunction::Sha256);

/// A wallet holding one mnemonic and the single account derived from it.
pub struct Secp256k1HdWallet {
    mnemonic: Mnemonic,
    accounts: Vec<Account>,
    keypair: Keypair,
}

impl Secp256k1HdWallet {
    /// Restore a wallet from a mnemonic phrase.
    ///
    /// The phrase is validated before any key material is derived. The
    /// result is fully determined by the phrase and `options`.
    ///
    /// # Arguments
    /// * `phrase` - A BIP-39 English mnemonic.
    /// * `options` - Path, address prefix and BIP-39 passphrase.
    pub fn from_mnemonic(phrase: &str, options: WalletOptions) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::parse(phrase).map_err(|e| match e {
            PrimitivesError::InvalidMnemonic(msg) => WalletError::InvalidMnemonic(msg),
            other => WalletError::Primitives(other),
        })?;
        Self::from_parsed(mnemonic, options)
    }

    /// Create a wallet from a freshly generated mnemonic.
    ///
    /// # Arguments
    /// * `word_count` - 12, 15, 18, 21 or 24.
    /// * `options` - Path, address prefix and BIP-39 passphrase.
    pub fn generate(word_count: usize, options: WalletOptions) -> Result<Self, WalletError> {
        let word_count = WordCount::try_from(word_count)?;
        let mnemonic = Mnemonic::generate(word_count)?;
        Self::from_parsed(mnemonic, options)
    }

    fn from_parsed(mnemonic: Mnemonic, options: WalletOptions) -> Result<Self, WalletError> {
        let account = Account {
            algo: Algo::Secp256k1,
            hd_path: options.resolved_hd_path()?,
            prefix: options.prefix,
        };
        let keypair =
            KeyDeriver::new(&mnemonic, &options.bip39_password)?.derive(account.algo, &account.hd_path)?;

        // Rejects an unusable prefix here rather than on first use.
        let address = keypair.public_key().to_address(&account.prefix)?;
        debug!(
            hd_path = %account.hd_path,
            prefix = %account.prefix,
            address = %address,
            "wallet constructed"
        );

        Ok(Secp256k1HdWallet {
            mnemonic,
            accounts: vec![account],
            keypair,
        })
    }

    /// The mnemonic phrase. Treat as secret.
    pub fn mnemonic(&self) -> &str {
        self.mnemonic.phrase()
    }

    /// The account address, computed from the public key and prefix.
    pub fn address(&self) -> Result<String, WalletError> {
        self.address_of(self.account())
    }

    /// The account record.
    pub fn account(&self) -> &Account {
        &self.accounts[0]
    }

    /// Public data for every account in the wallet.
    pub fn get_accounts(&self) -> Result<Vec<AccountData>, WalletError> {
        self.accounts
            .iter()
            .map(|account| {
                Ok(AccountData {
                    address: self.address_of(account)?,
                    algo: account.algo,
                    pubkey: self.keypair.public_key().to_compressed(),
                })
            })
            .collect()
    }

    /// Sign `message` as `signer_address`.
    ///
    /// # Arguments
    /// * `signer_address` - Must be this wallet's address.
    /// * `message` - The bytes to sign.
    /// * `prehash` - Hash applied before signing. `None` signs the bytes as
    ///   given, which must then be a 32-byte digest.
    ///
    /// # Returns
    /// The Amino signature envelope with a 64-byte `r || s` signature, or
    /// `InvalidMessage` when an unhashed message is not 32 bytes.
    pub fn sign(
        &self,
        signer_address: &str,
        message: &[u8],
        prehash: Option<HashFunction>,
    ) -> Result<StdSignature, WalletError> {
        let mut known = false;
        for account in &self.accounts {
            if self.address_of(account)? == signer_address {
                known = true;
                break;
            }
        }
        if !known {
            warn!(address = %signer_address, "sign request for unknown address");
            return Err(WalletError::AddressNotFound(signer_address.to_string()));
        }

        let digest = prehash_message(message, prehash)?;
        let signature = self.keypair.private_key().sign(&digest)?;
        debug!(
            address = %signer_address,
            prehash = prehash.map(|h| h.as_str()).unwrap_or("none"),
            "message signed"
        );
        Ok(StdSignature::encode(
            &self.keypair.public_key().to_compressed(),
            &signature.to_fixed_bytes(),
        ))
    }

    /// Encrypt the wallet's secret state into a `v1` container.
    ///
    /// A password is stretched with Argon2id under the default KDF
    /// configuration; a raw key must be exactly 32 bytes.
    pub fn save(&self, secret: Secret<'_>) -> Result<String, WalletError> {
        serializer::save(self, secret)
    }

    /// Encrypt under a key the caller already derived with `kdf`.
    pub fn save_with_encryption_key(
        &self,
        encryption_key: &[u8],
        kdf: &KdfConfiguration,
    ) -> Result<String, WalletError> {
        serializer::save_with_encryption_key(self, encryption_key, kdf)
    }

    pub(crate) fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    fn address_of(&self, account: &Account) -> Result<String, WalletError> {
        Ok(self.keypair.public_key().to_address(&account.prefix)?)
    }
}

impl OfflineSigner for Secp256k1HdWallet {
    fn get_accounts(&self) -> Result<Vec<AccountData>, WalletError> {
        Secp256k1HdWallet::get_accounts(self)
    }

    fn sign(
        &self,
        signer_address: &str,
        message: &[u8],
        prehash: Option<HashFunction>,
    ) -> Result<StdSignature, WalletError> {
        Secp256k1HdWallet::sign(self, signer_address, message, prehash)
    }
}

impl std::fmt::Debug for Secp256k1HdWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1HdWallet")
            .field("accounts", &self.accounts)
            .field("pubkey", &self.keypair.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::make_default_path;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";
    const SPECIAL: &str = "special sign fit simple patrol salute grocery chicken wheat radar tonight ceiling";

    fn wallet(phrase: &str, account_index: u32) -> Secp256k1HdWallet {
        let options = WalletOptions::default().with_hd_path(make_default_path(account_index).unwrap());
        Secp256k1HdWallet::from_mnemonic(phrase, options).unwrap()
    }

    #[test]
    fn test_known_addresses() {
        let cases = [
            (ABANDON, 0, "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4"),
            (ABANDON, 1, "cosmos1jrkmdcwgq94uaamx6zax2luewlhf7u4kucx3kz"),
            (ABANDON, 2, "cosmos1kng7tv83qesgvv2ze7hxlw4urfrjk8vqqnpqdt"),
            (SPECIAL, 0, "cosmos1jhg0e7s6gn44tfc5k37kr04sznyhedtc9rzys5"),
            (SPECIAL, 1, "cosmos1jc26t6dp59smtkf75e784dzwmgjlhkscdp7e3m"),
            (SPECIAL, 2, "cosmos1dx6339928m4xkhz06hd358u4tve3cyesaydzgc"),
        ];
        for (phrase, index, expected) in cases {
            assert_eq!(wallet(phrase, index).address().unwrap(), expected);
        }
    }

    #[test]
    fn test_default_options_use_account_zero() {
        let w = Secp256k1HdWallet::from_mnemonic(SPECIAL, WalletOptions::default()).unwrap();
        assert_eq!(w.address().unwrap(), "cosmos1jhg0e7s6gn44tfc5k37kr04sznyhedtc9rzys5");
        assert_eq!(w.account().hd_path.to_string(), "m/44'/118'/0'/0/0");
        assert_eq!(w.account().algo, Algo::Secp256k1);
        assert_eq!(w.mnemonic(), SPECIAL);
    }

    #[test]
    fn test_prefix_option() {
        let w = Secp256k1HdWallet::from_mnemonic(SPECIAL, WalletOptions::default().with_prefix("osmo"))
            .unwrap();
        assert_eq!(w.address().unwrap(), "osmo1jhg0e7s6gn44tfc5k37kr04sznyhedtcdc35xx");
    }

    #[test]
    fn test_get_accounts() {
        let w = wallet(ABANDON, 0);
        let accounts = w.get_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].address, w.address().unwrap());
        assert_eq!(accounts[0].algo, Algo::Secp256k1);
        assert_eq!(
            hex::encode(accounts[0].pubkey),
            "024f4e2ad99c34d60b9ba6283c9431a8418af8673212961f97a77b6377fcd05b62"
        );
    }

    #[test]
    fn test_invalid_mnemonic() {
        let bad = ABANDON.replace("about", "abandon");
        assert!(matches!(
            Secp256k1HdWallet::from_mnemonic(&bad, WalletOptions::default()),
            Err(WalletError::InvalidMnemonic(_))
        ));
        assert!(matches!(
            Secp256k1HdWallet::from_mnemonic("", WalletOptions::default()),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(Secp256k1HdWallet::from_mnemonic(ABANDON, WalletOptions::default().with_prefix("")).is_err());
    }

    #[test]
    fn test_generate_word_counts() {
        for words in [12, 15, 18, 21, 24] {
            let w = Secp256k1HdWallet::generate(words, WalletOptions::default()).unwrap();
            assert_eq!(w.mnemonic().split(' ').count(), words);
            assert!(w.address().unwrap().starts_with("cosmos1"));
        }
        for words in [0, 11, 13, 25] {
            assert!(matches!(
                Secp256k1HdWallet::generate(words, WalletOptions::default()),
                Err(WalletError::Primitives(PrimitivesError::InvalidWordCount(_)))
            ));
        }
    }

    #[test]
    fn test_sign_prehash_choices() {
        let w = wallet(ABANDON, 0);
        let address = w.address().unwrap();
        let digest = hdsign_primitives::hash::sha256(b"hello");
        let cases: [(&[u8], Option<HashFunction>); 3] = [
            (&digest, None),
            (b"hello", Some(HashFunction::Sha256)),
            (b"hello", Some(HashFunction::Sha512)),
        ];
        for (message, prehash) in cases {
            let sig = w.sign(&address, message, prehash).unwrap();
            assert_eq!(sig.signature_bytes().unwrap().len(), 64);
            assert!(sig.verify(message, prehash).unwrap());
            assert_eq!(sig.pubkey_bytes().unwrap(), w.get_accounts().unwrap()[0].pubkey);
        }
    }

    #[test]
    fn test_unhashed_sign_uses_message_as_digest() {
        let w = wallet(SPECIAL, 0);
        let address = w.address().unwrap();
        let digest = hdsign_primitives::hash::sha256(b"payload");
        let unhashed = w.sign(&address, &digest, None).unwrap();
        let hashed = w.sign(&address, b"payload", Some(HashFunction::Sha256)).unwrap();
        assert_eq!(unhashed, hashed);
    }

    #[test]
    fn test_unhashed_sign_rejects_non_digest() {
        let w = wallet(SPECIAL, 0);
        let address = w.address().unwrap();

        // Same first 32 bytes, different tails.
        let alice = b"pay alice 1 from the shared treasury acct.";
        let mallory = b"pay alice 1 from the shared treasury pay mallory 1000000";
        assert_eq!(alice[..32], mallory[..32]);

        let rejected: [&[u8]; 5] = [alice, mallory, &[0x01], &[0x00, 0x01], b""];
        for message in rejected {
            assert!(matches!(
                w.sign(&address, message, None),
                Err(WalletError::InvalidMessage(_))
            ));
        }
    }

    #[test]
    fn test_sign_is_deterministic() {
        let w = wallet(SPECIAL, 0);
        let address = w.address().unwrap();
        let a = w.sign(&address, b"payload", DEFAULT_PREHASH).unwrap();
        let b = w.sign(&address, b"payload", DEFAULT_PREHASH).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prehash_choices_differ() {
        let w = wallet(SPECIAL, 0);
        let address = w.address().unwrap();
        let sha256 = w.sign(&address, b"payload", Some(HashFunction::Sha256)).unwrap();
        let sha512 = w.sign(&address, b"payload", Some(HashFunction::Sha512)).unwrap();
        assert_ne!(sha256.signature, sha512.signature);
        assert!(!sha256.verify(b"payload", Some(HashFunction::Sha512)).unwrap());
    }

    #[test]
    fn test_sign_foreign_address() {
        let w = wallet(ABANDON, 0);
        let other = wallet(ABANDON, 1).address().unwrap();
        assert!(matches!(
            w.sign(&other, b"hello", DEFAULT_PREHASH),
            Err(WalletError::AddressNotFound(a)) if a == other
        ));
    }

    #[test]
    fn test_offline_signer_dispatch() {
        let w = wallet(ABANDON, 0);
        let signer: &dyn OfflineSigner = &w;
        let accounts = signer.get_accounts().unwrap();
        let sig = signer.sign(&accounts[0].address, b"hello", DEFAULT_PREHASH).unwrap();
        assert!(sig.verify(b"hello", DEFAULT_PREHASH).unwrap());
    }

    #[test]
    fn test_debug_hides_mnemonic() {
        let w = wallet(ABANDON, 0);
        assert!(!format!("{:?}", w).contains("abandon"));
    }

    #[test]
    fn test_wallet_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Secp256k1HdWallet>();
    }
}
