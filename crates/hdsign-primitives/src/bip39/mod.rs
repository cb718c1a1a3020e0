//! BIP-39 mnemonic generation and seed derivation.
//!
//! Provides mnemonic phrase generation from entropy, validation,
//! and PBKDF2-based seed derivation for HD wallet compatibility.
//! The phrase is held in a zeroizing buffer and wiped on drop.

use std::fmt;

use ::bip39::Language;
use zeroize::Zeroizing;

use crate::random::random_bytes;
use crate::PrimitivesError;

/// Length of a BIP-39 seed in bytes.
pub const SEED_LEN: usize = 64;

/// Supported mnemonic lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordCount {
    Words12,
    Words15,
    Words18,
    Words21,
    Words24,
}

impl WordCount {
    /// Number of words in the phrase.
    pub fn words(self) -> usize {
        match self {
            WordCount::Words12 => 12,
            WordCount::Words15 => 15,
            WordCount::Words18 => 18,
            WordCount::Words21 => 21,
            WordCount::Words24 => 24,
        }
    }

    /// Entropy length in bytes implied by the word count.
    ///
    /// Each word carries 11 bits; one bit in 33 is checksum, so the entropy
    /// is `4 * floor(11 * words / 33)` bytes.
    pub fn entropy_len(self) -> usize {
        4 * ((11 * self.words()) / 33)
    }
}

impl TryFrom<usize> for WordCount {
    type Error = PrimitivesError;

    fn try_from(words: usize) -> Result<Self, Self::Error> {
        match words {
            12 => Ok(WordCount::Words12),
            15 => Ok(WordCount::Words15),
            18 => Ok(WordCount::Words18),
            21 => Ok(WordCount::Words21),
            24 => Ok(WordCount::Words24),
            other => Err(PrimitivesError::InvalidWordCount(other)),
        }
    }
}

/// A validated English BIP-39 mnemonic.
#[derive(Clone)]
pub struct Mnemonic {
    phrase: Zeroizing<String>,
}

impl Mnemonic {
    /// Parse and validate a mnemonic phrase.
    ///
    /// Whitespace is normalized to single spaces and the phrase is lowercased
    /// before validation. Fails with `InvalidMnemonic` on unknown words,
    /// wrong length, or a bad checksum.
    pub fn parse(phrase: &str) -> Result<Self, PrimitivesError> {
        let normalized = Zeroizing::new(
            phrase
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" "),
        );
        let parsed = ::bip39::Mnemonic::parse_in_normalized(Language::English, &normalized)?;
        Ok(Mnemonic {
            phrase: Zeroizing::new(parsed.to_string()),
        })
    }

    /// Encode raw entropy (16, 20, 24, 28 or 32 bytes) as a mnemonic.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, PrimitivesError> {
        let parsed = ::bip39::Mnemonic::from_entropy_in(Language::English, entropy)?;
        Ok(Mnemonic {
            phrase: Zeroizing::new(parsed.to_string()),
        })
    }

    /// Generate a new mnemonic from OS randomness.
    pub fn generate(word_count: WordCount) -> Result<Self, PrimitivesError> {
        let entropy = random_bytes(word_count.entropy_len())?;
        Self::from_entropy(&entropy)
    }

    /// The space-separated phrase. Treat as secret.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Number of words in the phrase.
    pub fn word_count(&self) -> usize {
        self.phrase.split(' ').count()
    }

    /// Derive the 64-byte seed (PBKDF2-HMAC-SHA512, 2048 rounds).
    ///
    /// # Arguments
    /// * `password` - The optional BIP-39 passphrase; empty for none.
    pub fn to_seed(&self, password: &str) -> Result<Zeroizing<[u8; SEED_LEN]>, PrimitivesError> {
        let parsed = ::bip39::Mnemonic::parse_in_normalized(Language::English, &self.phrase)?;
        Ok(Zeroizing::new(parsed.to_seed_normalized(password)))
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &self.word_count())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Mnemonic {
    fn eq(&self, other: &Self) -> bool {
        *self.phrase == *other.phrase
    }
}

impl Eq for Mnemonic {}
