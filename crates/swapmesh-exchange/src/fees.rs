//! Protocol-fee and royalty splitting of a payment.
//!
//! Deductions are taken out of the proceeds, never added on top: the payer
//! always parts with the face amount, and the counterparty receives what
//! remains after every royalty receiver and the fee receiver are paid.
//! Conservation holds by construction:
//! `face == net + fee + ∑royalties` exactly.

use swapmesh_types::{
    Address, ExchangeError, ProtocolFeeConfig, RegistryId, Result, TokenId, constants,
    royalty::check_schedule,
};
use swapmesh_validator::{Role, RoleService};

use crate::bridge::RoyaltySource;

/// The identity and price slice of one sold line, as seen by the fee and
/// royalty phases. Plain sales produce a single line; bundle sales produce
/// one per settlement line.
#[derive(Debug, Clone, Copy)]
pub struct LinePricing {
    /// Registry of the sold line, when it has one.
    pub registry: Option<RegistryId>,
    /// Token id of the sold line; royalties only apply to id-addressed
    /// assets.
    pub token: Option<TokenId>,
    pub price: u128,
}

/// How one payment is split between the counterparty, the fee receiver
/// and royalty receivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentSplit {
    pub fee: u128,
    pub royalties: Vec<(Address, u128)>,
    pub net: u128,
}

/// `value · bps / 10_000`, floored.
pub fn bps_share(value: u128, bps: u32) -> Result<u128> {
    let product = value
        .checked_mul(u128::from(bps))
        .ok_or(ExchangeError::ArithmeticOverflow)?;
    Ok(product / constants::BASIS_POINTS_DENOMINATOR)
}

/// Split a payment across its sold lines.
///
/// Sellers holding [`Role::FeeExempt`] skip both phases entirely. For
/// everyone else, each line pays its royalty schedule (capped at 5000 bps
/// per schedule) and the protocol fee at the primary rate iff the seller
/// is a registered primary-market seller for that line's registry.
///
/// # Errors
/// - `RoyaltiesTooHigh` when any line's schedule exceeds the cap
pub fn split_payment(
    roles: &RoleService,
    fees: &ProtocolFeeConfig,
    royalties: &dyn RoyaltySource,
    seller: Address,
    lines: &[LinePricing],
    total_payment: u128,
) -> Result<PaymentSplit> {
    if roles.has_role(seller, Role::FeeExempt) {
        return Ok(PaymentSplit {
            fee: 0,
            royalties: Vec::new(),
            net: total_payment,
        });
    }

    let mut fee: u128 = 0;
    let mut royalty_total: u128 = 0;
    let mut payouts: Vec<(Address, u128)> = Vec::new();

    for line in lines {
        if let (Some(registry), Some(token)) = (line.registry, line.token) {
            let schedule = royalties.royalties(registry, token);
            check_schedule(&schedule)?;
            for part in &schedule {
                let amount = bps_share(line.price, u32::from(part.basis_points))?;
                if amount > 0 {
                    royalty_total = royalty_total
                        .checked_add(amount)
                        .ok_or(ExchangeError::ArithmeticOverflow)?;
                    payouts.push((part.receiver, amount));
                }
            }
        }

        let primary_sale = line
            .registry
            .is_some_and(|registry| roles.is_primary_seller(seller, registry));
        let line_fee = bps_share(line.price, u32::from(fees.rate(primary_sale)))?;
        fee = fee
            .checked_add(line_fee)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
    }

    let net = total_payment
        .checked_sub(fee)
        .and_then(|rest| rest.checked_sub(royalty_total))
        .ok_or_else(|| {
            ExchangeError::Internal("deductions exceed the payment face amount".into())
        })?;

    Ok(PaymentSplit {
        fee,
        royalties: payouts,
        net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MapRoyaltySource;
    use swapmesh_types::RoyaltyPart;

    fn addr(n: u8) -> Address {
        Address([n; 32])
    }

    fn registry(n: u8) -> RegistryId {
        RegistryId([n; 32])
    }

    fn fee_config() -> ProtocolFeeConfig {
        ProtocolFeeConfig {
            primary_bps: 250,
            secondary_bps: 500,
            receiver: addr(99),
        }
    }

    #[test]
    fn bps_share_floors() {
        assert_eq!(bps_share(10_000, 250).unwrap(), 250);
        assert_eq!(bps_share(999, 100).unwrap(), 9);
        assert_eq!(bps_share(0, 5_000).unwrap(), 0);
    }

    #[test]
    fn royalty_and_secondary_fee_composition() {
        let roles = RoleService::new();
        let mut source = MapRoyaltySource::new();
        let reg = registry(1);
        source.set_royalties(
            reg,
            TokenId(1),
            vec![RoyaltyPart {
                receiver: addr(7),
                basis_points: 1_000,
            }],
        );

        let lines = [LinePricing {
            registry: Some(reg),
            token: Some(TokenId(1)),
            price: 4_000_000_000,
        }];
        let split =
            split_payment(&roles, &fee_config(), &source, addr(1), &lines, 4_000_000_000).unwrap();

        assert_eq!(split.fee, 200_000_000, "500 bps secondary");
        assert_eq!(split.royalties, vec![(addr(7), 400_000_000)]);
        assert_eq!(split.net, 3_400_000_000);
        assert_eq!(
            split.net + split.fee + 400_000_000,
            4_000_000_000,
            "conservation to the unit"
        );
    }

    #[test]
    fn primary_seller_pays_primary_rate() {
        let mut roles = RoleService::new();
        let source = MapRoyaltySource::new();
        let reg = registry(1);
        let seller = addr(1);
        roles.grant_primary_seller(seller, reg);

        let lines = [LinePricing {
            registry: Some(reg),
            token: Some(TokenId(1)),
            price: 4_000_000_000,
        }];
        let split =
            split_payment(&roles, &fee_config(), &source, seller, &lines, 4_000_000_000).unwrap();
        assert_eq!(split.fee, 100_000_000, "250 bps primary");
        assert_eq!(split.net, 3_900_000_000);
    }

    #[test]
    fn fee_exempt_seller_skips_both_phases() {
        let mut roles = RoleService::new();
        let mut source = MapRoyaltySource::new();
        let reg = registry(1);
        let seller = addr(1);
        roles.grant(seller, Role::FeeExempt);
        source.set_royalties(
            reg,
            TokenId(1),
            vec![RoyaltyPart {
                receiver: addr(7),
                basis_points: 1_000,
            }],
        );

        let lines = [LinePricing {
            registry: Some(reg),
            token: Some(TokenId(1)),
            price: 1_000,
        }];
        let split = split_payment(&roles, &fee_config(), &source, seller, &lines, 1_000).unwrap();
        assert_eq!(split, PaymentSplit {
            fee: 0,
            royalties: Vec::new(),
            net: 1_000,
        });
    }

    #[test]
    fn over_cap_schedule_rejected() {
        let roles = RoleService::new();
        let mut source = MapRoyaltySource::new();
        let reg = registry(1);
        source.set_royalties(
            reg,
            TokenId(1),
            vec![
                RoyaltyPart {
                    receiver: addr(7),
                    basis_points: 4_000,
                },
                RoyaltyPart {
                    receiver: addr(8),
                    basis_points: 1_500,
                },
            ],
        );

        let lines = [LinePricing {
            registry: Some(reg),
            token: Some(TokenId(1)),
            price: 1_000,
        }];
        let err =
            split_payment(&roles, &fee_config(), &source, addr(1), &lines, 1_000).unwrap_err();
        assert!(matches!(err, ExchangeError::RoyaltiesTooHigh(5_500)));
    }

    #[test]
    fn token_less_lines_pay_no_royalties() {
        let roles = RoleService::new();
        let source = MapRoyaltySource::new();
        let lines = [LinePricing {
            registry: Some(registry(1)),
            token: None,
            price: 10_000,
        }];
        let split = split_payment(&roles, &fee_config(), &source, addr(1), &lines, 10_000).unwrap();
        assert!(split.royalties.is_empty());
        assert_eq!(split.fee, 500);
        assert_eq!(split.net, 9_500);
    }

    #[test]
    fn multi_line_split_sums_per_line() {
        let roles = RoleService::new();
        let mut source = MapRoyaltySource::new();
        let reg = registry(1);
        source.set_royalties(
            reg,
            TokenId(1),
            vec![RoyaltyPart {
                receiver: addr(7),
                basis_points: 2_000,
            }],
        );

        let lines = [
            LinePricing {
                registry: Some(reg),
                token: Some(TokenId(1)),
                price: 6_000,
            },
            LinePricing {
                registry: Some(reg),
                token: None,
                price: 4_000,
            },
        ];
        let split = split_payment(&roles, &fee_config(), &source, addr(1), &lines, 10_000).unwrap();
        assert_eq!(split.royalties, vec![(addr(7), 1_200)]);
        assert_eq!(split.fee, 500, "500 bps across both lines");
        assert_eq!(split.net, 8_300);
    }
}
