//! Identifier codec.
//!
//! Identifiers are reduced to a 32-bit FNV-1a hash of their UTF-8 bytes as
//! soon as they reach the tree. The original text is not kept, so two names
//! that hash alike are the same identifier downstream (e.g. `costarring`
//! and `liquid`). For debug output an id is rendered as a fixed
//! six-character base-53 pseudo-name.

use std::fmt;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Base-53 alphabet: `[A-Za-z_]`.
const ALPHABET: &[u8; 53] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_";

/// Width of a pseudo-name. 53^6 > 2^32, so every id fits.
pub const PSEUDO_NAME_LEN: usize = 6;

/// 32-bit FNV-1a over the bytes of `text`.
pub fn fnv1a(text: &str) -> u32 {
    text.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Encode `value` as six base-53 digits, least significant first.
pub fn base53(value: u32) -> [u8; PSEUDO_NAME_LEN] {
    let mut out = [ALPHABET[0]; PSEUDO_NAME_LEN];
    let mut rest = value;
    for slot in out.iter_mut() {
        *slot = ALPHABET[(rest % 53) as usize];
        rest /= 53;
    }
    out
}

/// Hashed identifier id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(u32);

impl Ident {
    pub fn from_name(name: &str) -> Self {
        Self(fnv1a(name))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Six-character readable stand-in for the lost name.
    pub fn pseudo_name(self) -> String {
        base53(self.0).iter().map(|&b| char::from(b)).collect()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pseudo_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a(""), 0x811C_9DC5);
        assert_eq!(fnv1a("a"), 3_826_002_220);
        assert_eq!(fnv1a("foo"), 2_851_307_223);
    }

    #[test]
    fn test_hash_is_deterministic() {
        for name in ["x", "count", "a_very_long_identifier_name_1234"] {
            assert_eq!(Ident::from_name(name), Ident::from_name(name));
        }
        assert_ne!(Ident::from_name("x"), Ident::from_name("y"));
    }

    #[test]
    fn test_known_collision_is_indistinguishable() {
        // Distinct names, same id: the tree cannot tell them apart
        assert_eq!(Ident::from_name("costarring"), Ident::from_name("liquid"));
        assert_eq!(Ident::from_name("costarring").raw(), 0x5E4D_AA9D);
    }

    #[test]
    fn test_raw_round_trip() {
        let id = Ident::from_name("main");
        assert_eq!(Ident::from_raw(id.raw()), id);
    }

    #[test]
    fn test_base53_fixed_values() {
        assert_eq!(Ident::from_raw(0).pseudo_name(), "AAAAAA");
        assert_eq!(Ident::from_raw(u32::MAX).pseudo_name(), "pMFROK");
        assert_eq!(Ident::from_name("x").pseudo_name(), "TdXCIK");
    }

    #[test]
    fn test_pseudo_name_shape() {
        for raw in [0, 1, 52, 53, 1 << 16, 0xDEAD_BEEF, u32::MAX] {
            let name = Ident::from_raw(raw).pseudo_name();
            assert_eq!(name.len(), PSEUDO_NAME_LEN);
            assert!(name.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_'));
        }
    }

    #[test]
    fn test_distinct_ids_distinct_names() {
        assert_ne!(
            Ident::from_raw(1).pseudo_name(),
            Ident::from_raw(53).pseudo_name()
        );
    }
}
