//! Asset model: the tagged-union asset representation shared by orders,
//! settlement lines and transfer legs.
//!
//! An [`AssetType`] describes *what* is being traded (the class tag plus
//! the class-specific identifying fields); an [`Asset`] pairs a type with
//! the quantity being offered or demanded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BundleSpec, RegistryId, TokenId};

/// The bare asset-class tag.
///
/// The ordering encodes "money-ness" for fee-side selection: the chain
/// coin outranks fungible tokens, which outrank item stacks. Unique items
/// and bundles never carry the fee side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AssetClass {
    Native,
    Fungible,
    Unique,
    Stack,
    Bundle,
}

impl AssetClass {
    /// Class tag byte used by the canonical encoding.
    #[must_use]
    pub fn class_byte(self) -> u8 {
        match self {
            Self::Native => 0,
            Self::Fungible => 1,
            Self::Unique => 2,
            Self::Stack => 3,
            Self::Bundle => 4,
        }
    }

    /// Whether assets of this class must carry `value == 1`.
    #[must_use]
    pub fn is_unit_valued(self) -> bool {
        self == Self::Unique
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Fungible => write!(f, "FUNGIBLE"),
            Self::Unique => write!(f, "UNIQUE"),
            Self::Stack => write!(f, "STACK"),
            Self::Bundle => write!(f, "BUNDLE"),
        }
    }
}

/// The identifying description of a transferable thing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    /// The chain's native coin. No identifying data.
    Native,
    /// A fungible token, identified by its ledger registry.
    Fungible { registry: RegistryId },
    /// A unique item, identified by registry and token id.
    Unique { registry: RegistryId, token: TokenId },
    /// A semi-fungible item stack, identified by registry and token id.
    Stack { registry: RegistryId, token: TokenId },
    /// A composite bundle of sub-assets with per-item prices.
    Bundle(BundleSpec),
}

impl AssetType {
    #[must_use]
    pub fn class(&self) -> AssetClass {
        match self {
            Self::Native => AssetClass::Native,
            Self::Fungible { .. } => AssetClass::Fungible,
            Self::Unique { .. } => AssetClass::Unique,
            Self::Stack { .. } => AssetClass::Stack,
            Self::Bundle(_) => AssetClass::Bundle,
        }
    }

    /// The registry this asset lives in, if any.
    #[must_use]
    pub fn registry(&self) -> Option<RegistryId> {
        match self {
            Self::Native | Self::Bundle(_) => None,
            Self::Fungible { registry }
            | Self::Unique { registry, .. }
            | Self::Stack { registry, .. } => Some(*registry),
        }
    }

    /// The token id this asset names, if any.
    #[must_use]
    pub fn token(&self) -> Option<TokenId> {
        match self {
            Self::Unique { token, .. } | Self::Stack { token, .. } => Some(*token),
            _ => None,
        }
    }

    /// Canonical binary encoding: the class byte followed by the
    /// class-specific identifying fields, appended to `out`. Feeds both
    /// the order key and the order hash.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.class().class_byte());
        match self {
            Self::Native => {}
            Self::Fungible { registry } => {
                out.extend_from_slice(registry.as_bytes());
            }
            Self::Unique { registry, token } | Self::Stack { registry, token } => {
                out.extend_from_slice(registry.as_bytes());
                out.extend_from_slice(&token.0.to_le_bytes());
            }
            Self::Bundle(spec) => {
                spec.encode_into(out);
            }
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Fungible { registry } => write!(f, "FUNGIBLE({registry})"),
            Self::Unique { registry, token } => write!(f, "UNIQUE({registry}, {token})"),
            Self::Stack { registry, token } => write!(f, "STACK({registry}, {token})"),
            Self::Bundle(_) => write!(f, "BUNDLE"),
        }
    }
}

/// An asset type together with the quantity offered or demanded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub asset_type: AssetType,
    pub value: u128,
}

impl Asset {
    #[must_use]
    pub fn new(asset_type: AssetType, value: u128) -> Self {
        Self { asset_type, value }
    }

    /// Shorthand for a fungible-token amount.
    #[must_use]
    pub fn fungible(registry: RegistryId, value: u128) -> Self {
        Self::new(AssetType::Fungible { registry }, value)
    }

    /// Shorthand for a single unique item.
    #[must_use]
    pub fn unique(registry: RegistryId, token: TokenId) -> Self {
        Self::new(AssetType::Unique { registry, token }, 1)
    }

    /// Shorthand for an amount of an item stack.
    #[must_use]
    pub fn stack(registry: RegistryId, token: TokenId, supply: u128) -> Self {
        Self::new(AssetType::Stack { registry, token }, supply)
    }

    /// Shorthand for an amount of the native coin.
    #[must_use]
    pub fn native(value: u128) -> Self {
        Self::new(AssetType::Native, value)
    }

    /// Shorthand for one unit of a bundle.
    #[must_use]
    pub fn bundle(spec: BundleSpec) -> Self {
        Self::new(AssetType::Bundle(spec), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: u8) -> RegistryId {
        RegistryId([n; 32])
    }

    #[test]
    fn class_tags_are_distinct() {
        let classes = [
            AssetClass::Native,
            AssetClass::Fungible,
            AssetClass::Unique,
            AssetClass::Stack,
            AssetClass::Bundle,
        ];
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert_ne!(a.class_byte(), b.class_byte());
            }
        }
    }

    #[test]
    fn unique_is_unit_valued() {
        assert!(AssetClass::Unique.is_unit_valued());
        assert!(!AssetClass::Fungible.is_unit_valued());
    }

    #[test]
    fn asset_type_accessors() {
        let unique = AssetType::Unique {
            registry: registry(1),
            token: TokenId(42),
        };
        assert_eq!(unique.class(), AssetClass::Unique);
        assert_eq!(unique.registry(), Some(registry(1)));
        assert_eq!(unique.token(), Some(TokenId(42)));

        assert_eq!(AssetType::Native.registry(), None);
        assert_eq!(AssetType::Native.token(), None);
    }

    #[test]
    fn encoding_distinguishes_classes_with_same_fields() {
        let unique = AssetType::Unique {
            registry: registry(1),
            token: TokenId(42),
        };
        let stack = AssetType::Stack {
            registry: registry(1),
            token: TokenId(42),
        };
        let mut enc_unique = Vec::new();
        unique.encode_into(&mut enc_unique);
        let mut enc_stack = Vec::new();
        stack.encode_into(&mut enc_stack);
        assert_ne!(enc_unique, enc_stack);
    }

    #[test]
    fn shorthand_constructors() {
        let asset = Asset::unique(registry(9), TokenId(1));
        assert_eq!(asset.value, 1);
        assert_eq!(asset.asset_type.class(), AssetClass::Unique);

        let coin = Asset::native(1_000);
        assert_eq!(coin.asset_type, AssetType::Native);
        assert_eq!(coin.value, 1_000);
    }

    #[test]
    fn serde_roundtrip() {
        let asset = Asset::stack(registry(5), TokenId(77), 250);
        let json = serde_json::to_string(&asset).unwrap();
        let back: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, back);
    }
}
