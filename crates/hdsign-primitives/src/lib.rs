/// hdsign - Cryptographic primitives, hashing, and encodings.
///
/// This crate provides the building blocks the hdsign wallet consumes
/// through narrow interfaces:
/// - Hash functions (SHA-256, SHA-512, RIPEMD-160, Hash160)
/// - secp256k1 private keys, public keys and fixed-width ECDSA signatures
/// - BIP-39 mnemonic codec and seed derivation
/// - BIP-32 derivation paths and the key-tree walk
/// - Bech32 account addresses
/// - Argon2id password key derivation
/// - XChaCha20-Poly1305 authenticated encryption
/// - OS-backed secure randomness

pub mod hash;
pub mod ec;
pub mod bip39;
pub mod bip32;
pub mod address;
pub mod kdf;
pub mod aead;
pub mod random;

mod error;
pub use error::PrimitivesError;
