//! BIP-32 derivation paths and the secp256k1 key-tree walk.
//!
//! A `DerivationPath` is a non-empty, ordered list of child indexes, each
//! either hardened or normal. Its canonical text form is `m/44'/118'/0'/0/0`;
//! that string is the only representation that gets persisted, so parsing
//! accepts exactly what `Display` produces (plus `h`/`H` hardened markers).

use std::fmt;
use std::str::FromStr;

use ::bip32::XPrv;

use crate::ec::PrivateKey;
use crate::PrimitivesError;

/// Offset added to hardened child indexes in the 2^32 index space.
pub const HARDENED_OFFSET: u32 = 1 << 31;

/// One step in a derivation path: an index in `[0, 2^31)` plus a hardened flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildNumber {
    index: u32,
    hardened: bool,
}

impl ChildNumber {
    /// Build a hardened index, rejecting values outside `[0, 2^31)`.
    pub fn hardened(index: u32) -> Result<Self, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidDerivationPath(format!(
                "hardened child index {} exceeds maximum",
                index
            )));
        }
        Ok(ChildNumber {
            index,
            hardened: true,
        })
    }

    /// Build a normal index, rejecting values outside `[0, 2^31)`.
    pub fn normal(index: u32) -> Result<Self, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidDerivationPath(format!(
                "normal child index {} exceeds maximum",
                index
            )));
        }
        Ok(ChildNumber {
            index,
            hardened: false,
        })
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The index without the hardened flag.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The index in the combined 2^32 space (hardened indexes offset by 2^31).
    pub fn value(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A non-empty, ordered derivation path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// Build a path from its segments; an empty list is rejected.
    pub fn new(segments: Vec<ChildNumber>) -> Result<Self, PrimitivesError> {
        if segments.is_empty() {
            return Err(PrimitivesError::InvalidDerivationPath(
                "path must contain at least one segment".into(),
            ));
        }
        Ok(DerivationPath(segments))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildNumber> {
        self.0.iter()
    }

    pub fn segments(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = std::slice::Iter<'a, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for child in &self.0 {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = s.trim().split('/');
        match components.next() {
            Some("m") => {}
            _ => {
                return Err(PrimitivesError::InvalidDerivationPath(format!(
                    "path must start with 'm': {}",
                    s
                )))
            }
        }
        let segments = components
            .map(parse_child)
            .collect::<Result<Vec<_>, _>>()?;
        DerivationPath::new(segments)
    }
}

fn parse_child(segment: &str) -> Result<ChildNumber, PrimitivesError> {
    let hardened = segment.ends_with('\'') || segment.ends_with('h') || segment.ends_with('H');
    let digits = if hardened {
        &segment[..segment.len() - 1]
    } else {
        segment
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrimitivesError::InvalidDerivationPath(format!(
            "invalid segment '{}'",
            segment
        )));
    }
    let index: u32 = digits
        .parse()
        .map_err(|_| PrimitivesError::InvalidDerivationPath(format!("invalid segment '{}'", segment)))?;
    if hardened {
        ChildNumber::hardened(index)
    } else {
        ChildNumber::normal(index)
    }
}

/// Walk the secp256k1 key tree from a seed along `path`.
///
/// # Arguments
/// * `seed` - The BIP-39 seed (16 to 64 bytes).
/// * `path` - The derivation path.
///
/// # Returns
/// The private key at the end of the path.
pub fn derive_private_key(seed: &[u8], path: &DerivationPath) -> Result<PrivateKey, PrimitivesError> {
    let bip32_path = ::bip32::DerivationPath::from_str(&path.to_string())?;
    let child = XPrv::derive_from_path(seed, &bip32_path)?;
    Ok(PrivateKey::from_signing_key(child.private_key().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let path: DerivationPath = "m/44'/118'/0'/0/7".parse().unwrap();
        assert_eq!(path.len(), 5);
        let expected = vec![
            ChildNumber::hardened(44).unwrap(),
            ChildNumber::hardened(118).unwrap(),
            ChildNumber::hardened(0).unwrap(),
            ChildNumber::normal(0).unwrap(),
            ChildNumber::normal(7).unwrap(),
        ];
        assert_eq!(path.segments(), expected.as_slice());
        assert_eq!(DerivationPath::new(expected).unwrap(), path);
        assert_eq!(path.to_string(), "m/44'/118'/0'/0/7");
    }

    #[test]
    fn test_parse_alternative_hardened_markers() {
        let a: DerivationPath = "m/44h/118H/0'".parse().unwrap();
        assert_eq!(a.to_string(), "m/44'/118'/0'");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "m",
            "m/",
            "44'/118'",
            "m//0",
            "m/x",
            "m/-1",
            "m/1''",
            "m/2147483648",
            "m/2147483648'",
            "n/0",
        ] {
            assert!(
                bad.parse::<DerivationPath>().is_err(),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_child_number_ranges() {
        assert!(ChildNumber::hardened(HARDENED_OFFSET - 1).is_ok());
        assert!(ChildNumber::normal(HARDENED_OFFSET).is_err());
        assert!(ChildNumber::hardened(HARDENED_OFFSET).is_err());
        assert_eq!(ChildNumber::hardened(1).unwrap().value(), 0x8000_0001);
        assert_eq!(ChildNumber::normal(1).unwrap().value(), 1);
        assert_eq!(ChildNumber::hardened(5).unwrap().index(), 5);
        assert!(ChildNumber::hardened(0).unwrap().is_hardened());
        assert!(!ChildNumber::normal(0).unwrap().is_hardened());
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(DerivationPath::new(vec![]).is_err());
    }

    /// BIP-32 test vector 1, chain m/0'.
    #[test]
    fn test_bip32_vector_1() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let path: DerivationPath = "m/0'".parse().unwrap();
        let key = derive_private_key(&seed, &path).unwrap();
        assert_eq!(
            hex::encode(*key.to_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
    }

    #[test]
    fn test_segment_order_matters() {
        let seed = [7u8; 64];
        let a: DerivationPath = "m/0'/1".parse().unwrap();
        let b: DerivationPath = "m/1/0'".parse().unwrap();
        let ka = derive_private_key(&seed, &a).unwrap();
        let kb = derive_private_key(&seed, &b).unwrap();
        assert_ne!(ka, kb);
    }
}
