//! Match records emitted by the settlement engine.
//!
//! One record per settled order pair, in caller order. Records are the
//! engine's audit trail: replaying the same batch reproduces the same
//! deterministic [`MatchId`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, MatchId, Order, OrderKey};

/// The two amounts moved by one match.
///
/// `left_value` is the amount of the left order's make asset delivered to
/// the right side; `right_value` is the amount of the left order's take
/// asset (the right order's make asset) delivered to the left side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillPair {
    pub left_value: u128,
    pub right_value: u128,
}

/// The immutable record of one settled order pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Deterministic record id.
    pub id: MatchId,
    /// The effective sender that submitted the batch.
    pub caller: Address,
    pub left_key: OrderKey,
    pub right_key: OrderKey,
    pub left_order: Order,
    pub right_order: Order,
    /// Amounts moved on each side.
    pub fill: FillPair,
    /// Face amount deducted from the paying side (0 when neither side is
    /// payment-like).
    pub total_paid: u128,
    /// Net amount delivered to the counterparty after fee and royalties.
    pub total_received: u128,
    pub executed_at: DateTime<Utc>,
}

impl std::fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Match[{}] {} x {}: {} / {}",
            self.id, self.left_key, self.right_key, self.fill.left_value, self.fill.right_value,
        )
    }
}
