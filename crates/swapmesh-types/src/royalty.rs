//! Royalty and protocol-fee types.
//!
//! Royalty schedules are consumed at settlement time; how they are
//! registered per asset is an external concern. The engine enforces the
//! 50% cap when paying out, never at registration.

use serde::{Deserialize, Serialize};

use crate::{Address, ExchangeError, Result, constants};

/// One receiver's slice of a royalty schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoyaltyPart {
    pub receiver: Address,
    /// 1 basis point = 0.01%.
    pub basis_points: u16,
}

/// Sum of a schedule's basis points.
#[must_use]
pub fn schedule_total_bps(schedule: &[RoyaltyPart]) -> u32 {
    schedule
        .iter()
        .map(|part| u32::from(part.basis_points))
        .sum()
}

/// Reject schedules beyond the 50% cap.
pub fn check_schedule(schedule: &[RoyaltyPart]) -> Result<()> {
    let total = schedule_total_bps(schedule);
    if total > constants::ROYALTY_CAP_BPS {
        return Err(ExchangeError::RoyaltiesTooHigh(total));
    }
    Ok(())
}

/// Protocol fee rates and their receiver.
///
/// The primary rate applies when the seller is a registered primary-market
/// seller for the sold asset's registry, the secondary rate otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolFeeConfig {
    pub primary_bps: u16,
    pub secondary_bps: u16,
    pub receiver: Address,
}

impl ProtocolFeeConfig {
    #[must_use]
    pub fn rate(&self, primary_sale: bool) -> u16 {
        if primary_sale {
            self.primary_bps
        } else {
            self.secondary_bps
        }
    }
}

impl Default for ProtocolFeeConfig {
    fn default() -> Self {
        Self {
            primary_bps: constants::DEFAULT_PRIMARY_FEE_BPS,
            secondary_bps: constants::DEFAULT_SECONDARY_FEE_BPS,
            receiver: Address::ZERO,
        }
    }
}
