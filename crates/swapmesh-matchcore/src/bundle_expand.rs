//! Bundle expansion into flat settlement lines.
//!
//! A bundle is expanded exactly once, before fee and royalty computation,
//! into one line per transferable unit — fungible quotas first, then
//! unique items, item stacks and finally map parcels. Parcels are grouped
//! into a single batch line because the parcel registry moves
//! grid-addressed batches rather than individual ids; the caller-visible
//! effect is the same: ownership moves, fee and royalty apply.

use swapmesh_types::{BundleSpec, ExchangeError, Parcel, RegistryId, Result, TokenId};

/// One transferable unit emitted by bundle expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubAsset {
    Fungible { registry: RegistryId, value: u128 },
    Unique { registry: RegistryId, token: TokenId },
    Stack {
        registry: RegistryId,
        token: TokenId,
        supply: u128,
    },
    /// All of the bundle's parcels, moved through the parcel registry's
    /// batch-transfer capability.
    ParcelBatch { parcels: Vec<Parcel> },
}

impl SubAsset {
    /// The registry whose royalty schedule applies to this line, if any.
    #[must_use]
    pub fn registry(&self) -> Option<RegistryId> {
        match self {
            Self::Fungible { registry, .. }
            | Self::Unique { registry, .. }
            | Self::Stack { registry, .. } => Some(*registry),
            Self::ParcelBatch { .. } => None,
        }
    }

    /// The token id whose royalty schedule applies to this line, if any.
    #[must_use]
    pub fn token(&self) -> Option<TokenId> {
        match self {
            Self::Unique { token, .. } | Self::Stack { token, .. } => Some(*token),
            _ => None,
        }
    }
}

/// One settlement line: a sub-asset and its slice of the sale price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLine {
    pub sub_asset: SubAsset,
    pub unit_price: u128,
}

/// Expand a bundle into settlement lines.
///
/// `filled_units` is the number of bundle units moved by this match;
/// fungible quotas and their prices are scaled by it. `payment` is the
/// amount actually delivered for those units — the scaled price total
/// must equal it exactly.
///
/// # Errors
/// - `BundleShapeMismatch` when the price distribution does not mirror
///   the sub-collections, or the bundle is empty
/// - `UnitValueRequired` when an indivisible bundle is filled with
///   `filled_units != 1`
/// - `BundlePriceMismatch` when the distributed prices do not sum to
///   `payment`
pub fn expand_bundle(
    spec: &BundleSpec,
    filled_units: u128,
    payment: u128,
) -> Result<Vec<SettlementLine>> {
    validate_shape(spec)?;
    if spec.has_indivisible() && filled_units != 1 {
        return Err(ExchangeError::UnitValueRequired(filled_units));
    }

    let mut lines = Vec::new();
    let mut distributed: u128 = 0;

    for (quota, price) in spec.fungibles.iter().zip(&spec.prices.fungible) {
        let value = quota
            .value
            .checked_mul(filled_units)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        let scaled_price = price
            .checked_mul(filled_units)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        distributed = distributed
            .checked_add(scaled_price)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        lines.push(SettlementLine {
            sub_asset: SubAsset::Fungible {
                registry: quota.registry,
                value,
            },
            unit_price: scaled_price,
        });
    }

    for (group, prices) in spec.uniques.iter().zip(&spec.prices.unique) {
        for (token, price) in group.ids.iter().zip(prices) {
            distributed = distributed
                .checked_add(*price)
                .ok_or(ExchangeError::ArithmeticOverflow)?;
            lines.push(SettlementLine {
                sub_asset: SubAsset::Unique {
                    registry: group.registry,
                    token: *token,
                },
                unit_price: *price,
            });
        }
    }

    for (group, prices) in spec.stacks.iter().zip(&spec.prices.stack) {
        for ((token, supply), price) in group.ids.iter().zip(&group.supplies).zip(prices) {
            distributed = distributed
                .checked_add(*price)
                .ok_or(ExchangeError::ArithmeticOverflow)?;
            lines.push(SettlementLine {
                sub_asset: SubAsset::Stack {
                    registry: group.registry,
                    token: *token,
                    supply: *supply,
                },
                unit_price: *price,
            });
        }
    }

    if !spec.parcels.is_empty() {
        let mut parcel_price: u128 = 0;
        for price in &spec.prices.parcel {
            parcel_price = parcel_price
                .checked_add(*price)
                .ok_or(ExchangeError::ArithmeticOverflow)?;
        }
        distributed = distributed
            .checked_add(parcel_price)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        lines.push(SettlementLine {
            sub_asset: SubAsset::ParcelBatch {
                parcels: spec.parcels.clone(),
            },
            unit_price: parcel_price,
        });
    }

    if distributed != payment {
        return Err(ExchangeError::BundlePriceMismatch {
            distributed,
            payment,
        });
    }
    Ok(lines)
}

/// Total of the bundle's distributed prices, scaled by `filled_units`.
///
/// Used when a bundle changes hands with no payment side (barter): the
/// expansion is then checked against the bundle's own declared total.
pub fn distributed_total(spec: &BundleSpec, filled_units: u128) -> Result<u128> {
    validate_shape(spec)?;
    if spec.has_indivisible() && filled_units != 1 {
        return Err(ExchangeError::UnitValueRequired(filled_units));
    }
    let mut total: u128 = 0;
    for price in &spec.prices.fungible {
        let scaled = price
            .checked_mul(filled_units)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        total = total
            .checked_add(scaled)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
    }
    let flat = spec
        .prices
        .unique
        .iter()
        .chain(&spec.prices.stack)
        .flatten()
        .chain(&spec.prices.parcel);
    for price in flat {
        total = total
            .checked_add(*price)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
    }
    Ok(total)
}

/// Check that the price distribution mirrors the sub-collection counts.
pub fn validate_shape(spec: &BundleSpec) -> Result<()> {
    if spec.is_empty() {
        return Err(shape_err("bundle references no sub-assets"));
    }
    if spec.prices.fungible.len() != spec.fungibles.len() {
        return Err(shape_err("fungible price count"));
    }
    if spec.prices.unique.len() != spec.uniques.len() {
        return Err(shape_err("unique price group count"));
    }
    for (group, prices) in spec.uniques.iter().zip(&spec.prices.unique) {
        if prices.len() != group.ids.len() {
            return Err(shape_err("unique price count within group"));
        }
    }
    if spec.prices.stack.len() != spec.stacks.len() {
        return Err(shape_err("stack price group count"));
    }
    for (group, prices) in spec.stacks.iter().zip(&spec.prices.stack) {
        if group.supplies.len() != group.ids.len() {
            return Err(shape_err("stack supply count"));
        }
        if prices.len() != group.ids.len() {
            return Err(shape_err("stack price count within group"));
        }
    }
    if spec.prices.parcel.len() != spec.parcels.len() {
        return Err(shape_err("parcel price count"));
    }
    for parcel in &spec.parcels {
        if parcel.size == 0 {
            return Err(shape_err("parcel size must be at least 1"));
        }
    }
    Ok(())
}

fn shape_err(reason: &str) -> ExchangeError {
    ExchangeError::BundleShapeMismatch {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapmesh_types::{FungibleQuota, PriceDistribution, StackGroup, UniqueGroup};

    fn registry(n: u8) -> RegistryId {
        RegistryId([n; 32])
    }

    fn mixed_bundle() -> BundleSpec {
        BundleSpec {
            fungibles: vec![FungibleQuota {
                registry: registry(1),
                value: 100,
            }],
            uniques: vec![UniqueGroup {
                registry: registry(2),
                ids: vec![TokenId(1), TokenId(2)],
            }],
            stacks: vec![StackGroup {
                registry: registry(3),
                ids: vec![TokenId(9)],
                supplies: vec![25],
            }],
            parcels: vec![
                Parcel { size: 1, x: 4, y: 4 },
                Parcel { size: 3, x: 9, y: 0 },
            ],
            prices: PriceDistribution {
                fungible: vec![50],
                unique: vec![vec![200, 300]],
                stack: vec![vec![150]],
                parcel: vec![100, 200],
            },
        }
    }

    #[test]
    fn expands_in_fixed_order() {
        let spec = mixed_bundle();
        let lines = expand_bundle(&spec, 1, 1_000).unwrap();
        assert_eq!(lines.len(), 5);
        assert!(matches!(lines[0].sub_asset, SubAsset::Fungible { .. }));
        assert!(matches!(lines[1].sub_asset, SubAsset::Unique { .. }));
        assert!(matches!(lines[2].sub_asset, SubAsset::Unique { .. }));
        assert!(matches!(lines[3].sub_asset, SubAsset::Stack { .. }));
        assert!(matches!(lines[4].sub_asset, SubAsset::ParcelBatch { .. }));
        assert_eq!(lines[4].unit_price, 300, "parcel prices are summed");
    }

    #[test]
    fn price_total_must_equal_payment() {
        let spec = mixed_bundle();
        let err = expand_bundle(&spec, 1, 999).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::BundlePriceMismatch {
                distributed: 1_000,
                payment: 999,
            }
        ));
    }

    #[test]
    fn indivisible_bundle_rejects_fractional_fill() {
        let spec = mixed_bundle();
        let err = expand_bundle(&spec, 2, 2_000).unwrap_err();
        assert!(matches!(err, ExchangeError::UnitValueRequired(2)));
    }

    #[test]
    fn fungible_only_bundle_scales_with_fill() {
        let spec = BundleSpec {
            fungibles: vec![FungibleQuota {
                registry: registry(1),
                value: 100,
            }],
            prices: PriceDistribution {
                fungible: vec![40],
                ..PriceDistribution::default()
            },
            ..BundleSpec::default()
        };
        let lines = expand_bundle(&spec, 3, 120).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].sub_asset,
            SubAsset::Fungible {
                registry: registry(1),
                value: 300,
            }
        );
        assert_eq!(lines[0].unit_price, 120);
    }

    #[test]
    fn shape_mismatch_detected() {
        let mut spec = mixed_bundle();
        spec.prices.unique[0].pop();
        assert!(matches!(
            expand_bundle(&spec, 1, 700),
            Err(ExchangeError::BundleShapeMismatch { .. })
        ));

        let mut spec = mixed_bundle();
        spec.stacks[0].supplies.clear();
        assert!(matches!(
            expand_bundle(&spec, 1, 1_000),
            Err(ExchangeError::BundleShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_bundle_rejected() {
        let err = expand_bundle(&BundleSpec::default(), 1, 0).unwrap_err();
        assert!(matches!(err, ExchangeError::BundleShapeMismatch { .. }));
    }

    #[test]
    fn zero_sized_parcel_rejected() {
        let mut spec = mixed_bundle();
        spec.parcels[0].size = 0;
        assert!(matches!(
            expand_bundle(&spec, 1, 1_000),
            Err(ExchangeError::BundleShapeMismatch { .. })
        ));
    }

    #[test]
    fn distributed_total_matches_expansion() {
        let spec = mixed_bundle();
        assert_eq!(distributed_total(&spec, 1).unwrap(), 1_000);
        assert!(expand_bundle(&spec, 1, 1_000).is_ok());

        let fungible_only = BundleSpec {
            fungibles: vec![FungibleQuota {
                registry: registry(1),
                value: 100,
            }],
            prices: PriceDistribution {
                fungible: vec![40],
                ..PriceDistribution::default()
            },
            ..BundleSpec::default()
        };
        assert_eq!(distributed_total(&fungible_only, 3).unwrap(), 120);
    }

    #[test]
    fn sub_asset_royalty_identity() {
        let spec = mixed_bundle();
        let lines = expand_bundle(&spec, 1, 1_000).unwrap();
        assert_eq!(lines[1].sub_asset.registry(), Some(registry(2)));
        assert_eq!(lines[1].sub_asset.token(), Some(TokenId(1)));
        assert_eq!(lines[0].sub_asset.token(), None);
        assert_eq!(lines[4].sub_asset.registry(), None);
    }
}
