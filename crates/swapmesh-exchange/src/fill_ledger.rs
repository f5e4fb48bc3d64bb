//! The fill ledger: cumulative take-side consumption per order key.
//!
//! Entries are created on first partial match and only ever driven toward
//! the order's declared take value — or set to the cancellation sentinel.
//! They are never deleted: a fully-consumed or cancelled key rejects every
//! further match attempt identically.

use std::collections::HashMap;

use swapmesh_types::{ExchangeError, OrderKey, Result, constants};

/// Persistent `OrderKey → u128` fill map.
#[derive(Debug, Default, Clone)]
pub struct FillLedger {
    fills: HashMap<OrderKey, u128>,
}

impl FillLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative fill for a key. Unknown keys read as zero.
    #[must_use]
    pub fn fills(&self, key: &OrderKey) -> u128 {
        self.fills.get(key).copied().unwrap_or(0)
    }

    /// Whether the key carries the cancellation sentinel.
    #[must_use]
    pub fn is_cancelled(&self, key: &OrderKey) -> bool {
        self.fills(key) == constants::CANCELLED_FILL
    }

    /// Increment a key's cumulative fill. Returns the new total.
    ///
    /// # Errors
    /// - `NothingToFill` when the key is cancelled
    /// - `ArithmeticOverflow` when the increment would wrap
    pub fn commit(&mut self, key: OrderKey, delta: u128) -> Result<u128> {
        let current = self.fills(&key);
        if current == constants::CANCELLED_FILL {
            return Err(ExchangeError::NothingToFill(key));
        }
        let next = current
            .checked_add(delta)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        self.fills.insert(key, next);
        Ok(next)
    }

    /// Set the cancellation sentinel. Irreversible.
    pub fn cancel(&mut self, key: OrderKey) {
        self.fills.insert(key, constants::CANCELLED_FILL);
    }

    /// Restore a key to a previously-read value. Used only by the batch
    /// rollback path; never exposed outside the engine.
    pub(crate) fn restore(&mut self, key: OrderKey, value: u128) {
        self.fills.insert(key, value);
    }

    /// Number of keys with a ledger entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fills.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}
