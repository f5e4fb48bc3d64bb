//! Composite-asset ("bundle") model.
//!
//! A bundle groups fungible quotas, unique items, item stacks and map
//! parcels into one tradeable unit, with a parallel price distribution
//! assigning a slice of the sale price to every item. The bundle matcher
//! in `swapmesh-matchcore` expands a bundle into flat settlement lines;
//! this module only carries the data shape and its cheap helpers.

use serde::{Deserialize, Serialize};

use crate::{RegistryId, TokenId};

/// A quota of a fungible token inside a bundle, per bundle unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FungibleQuota {
    pub registry: RegistryId,
    pub value: u128,
}

/// A group of unique items from one registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueGroup {
    pub registry: RegistryId,
    pub ids: Vec<TokenId>,
}

/// A group of item stacks from one registry. `supplies[i]` is the number
/// of units of `ids[i]` included in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackGroup {
    pub registry: RegistryId,
    pub ids: Vec<TokenId>,
    pub supplies: Vec<u128>,
}

/// A square map parcel of `size × size` cells anchored at `(x, y)`.
///
/// Parcels are grid-addressed rather than id-addressed, and move through
/// the parcel registry's batch-transfer capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parcel {
    pub size: u64,
    pub x: u64,
    pub y: u64,
}

impl Parcel {
    /// Number of grid cells this parcel covers.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        self.size * self.size
    }
}

/// Per-item price arrays mirroring the bundle's four sub-collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceDistribution {
    /// One price per fungible quota.
    pub fungible: Vec<u128>,
    /// One inner vec per unique group, one price per id.
    pub unique: Vec<Vec<u128>>,
    /// One inner vec per stack group, one price per id.
    pub stack: Vec<Vec<u128>>,
    /// One price per parcel.
    pub parcel: Vec<u128>,
}

/// The encoded contents of a bundle asset.
///
/// Invariants (enforced by the bundle matcher at settlement time):
/// - `prices` mirrors the sub-collection counts exactly
/// - a bundle containing any unique item, stack or parcel has `value == 1`
/// - the distributed prices, scaled by the filled units, sum to the
///   payment delivered for the bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleSpec {
    pub fungibles: Vec<FungibleQuota>,
    pub uniques: Vec<UniqueGroup>,
    pub stacks: Vec<StackGroup>,
    pub parcels: Vec<Parcel>,
    pub prices: PriceDistribution,
}

impl BundleSpec {
    /// Whether the bundle holds anything that cannot be fractionally
    /// filled. Such bundles are restricted to `value == 1`.
    #[must_use]
    pub fn has_indivisible(&self) -> bool {
        !self.uniques.is_empty() || !self.stacks.is_empty() || !self.parcels.is_empty()
    }

    /// Whether the bundle references no sub-assets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fungibles.is_empty()
            && self.uniques.is_empty()
            && self.stacks.is_empty()
            && self.parcels.is_empty()
    }

    /// Canonical binary encoding, appended to `out`. Sub-collections are
    /// walked in the fixed settlement order: fungibles, uniques, stacks,
    /// parcels, then the price distribution.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.fungibles.len() as u64).to_le_bytes());
        for quota in &self.fungibles {
            out.extend_from_slice(quota.registry.as_bytes());
            out.extend_from_slice(&quota.value.to_le_bytes());
        }
        out.extend_from_slice(&(self.uniques.len() as u64).to_le_bytes());
        for group in &self.uniques {
            out.extend_from_slice(group.registry.as_bytes());
            out.extend_from_slice(&(group.ids.len() as u64).to_le_bytes());
            for id in &group.ids {
                out.extend_from_slice(&id.0.to_le_bytes());
            }
        }
        out.extend_from_slice(&(self.stacks.len() as u64).to_le_bytes());
        for group in &self.stacks {
            out.extend_from_slice(group.registry.as_bytes());
            out.extend_from_slice(&(group.ids.len() as u64).to_le_bytes());
            for id in &group.ids {
                out.extend_from_slice(&id.0.to_le_bytes());
            }
            for supply in &group.supplies {
                out.extend_from_slice(&supply.to_le_bytes());
            }
        }
        out.extend_from_slice(&(self.parcels.len() as u64).to_le_bytes());
        for parcel in &self.parcels {
            out.extend_from_slice(&parcel.size.to_le_bytes());
            out.extend_from_slice(&parcel.x.to_le_bytes());
            out.extend_from_slice(&parcel.y.to_le_bytes());
        }
        for price in &self.prices.fungible {
            out.extend_from_slice(&price.to_le_bytes());
        }
        for row in &self.prices.unique {
            for price in row {
                out.extend_from_slice(&price.to_le_bytes());
            }
        }
        for row in &self.prices.stack {
            for price in row {
                out.extend_from_slice(&price.to_le_bytes());
            }
        }
        for price in &self.prices.parcel {
            out.extend_from_slice(&price.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: u8) -> RegistryId {
        RegistryId([n; 32])
    }

    #[test]
    fn empty_bundle_is_empty() {
        let spec = BundleSpec::default();
        assert!(spec.is_empty());
        assert!(!spec.has_indivisible());
    }

    #[test]
    fn fungible_only_is_divisible() {
        let spec = BundleSpec {
            fungibles: vec![FungibleQuota {
                registry: registry(1),
                value: 100,
            }],
            prices: PriceDistribution {
                fungible: vec![100],
                ..PriceDistribution::default()
            },
            ..BundleSpec::default()
        };
        assert!(!spec.is_empty());
        assert!(!spec.has_indivisible());
    }

    #[test]
    fn unique_item_makes_bundle_indivisible() {
        let spec = BundleSpec {
            uniques: vec![UniqueGroup {
                registry: registry(2),
                ids: vec![TokenId(7)],
            }],
            ..BundleSpec::default()
        };
        assert!(spec.has_indivisible());
    }

    #[test]
    fn parcel_cell_count() {
        let parcel = Parcel { size: 3, x: 0, y: 0 };
        assert_eq!(parcel.cell_count(), 9);
    }

    #[test]
    fn encoding_is_content_sensitive() {
        let a = BundleSpec {
            uniques: vec![UniqueGroup {
                registry: registry(2),
                ids: vec![TokenId(7)],
            }],
            prices: PriceDistribution {
                unique: vec![vec![500]],
                ..PriceDistribution::default()
            },
            ..BundleSpec::default()
        };
        let mut b = a.clone();
        b.uniques[0].ids[0] = TokenId(8);

        let mut enc_a = Vec::new();
        a.encode_into(&mut enc_a);
        let mut enc_b = Vec::new();
        b.encode_into(&mut enc_b);
        assert_ne!(enc_a, enc_b);

        let mut enc_a2 = Vec::new();
        a.encode_into(&mut enc_a2);
        assert_eq!(enc_a, enc_a2);
    }

    #[test]
    fn serde_roundtrip() {
        let spec = BundleSpec {
            stacks: vec![StackGroup {
                registry: registry(3),
                ids: vec![TokenId(1), TokenId(2)],
                supplies: vec![10, 20],
            }],
            parcels: vec![Parcel { size: 6, x: 12, y: 18 }],
            prices: PriceDistribution {
                stack: vec![vec![5, 6]],
                parcel: vec![1000],
                ..PriceDistribution::default()
            },
            ..BundleSpec::default()
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: BundleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}
