//! Supply conservation checks.
//!
//! Settlement only moves balances between accounts; it never creates or
//! destroys them. This tracker records what was minted into each fungible
//! registry and verifies the identity `∑balances == ∑minted` against the
//! bridge after settlement — a mathematical invariant, not a code path:
//! no settlement bug can violate it without the check firing.

use std::collections::HashMap;

use swapmesh_types::{ExchangeError, RegistryId, Result};

/// Tracks minted totals per fungible registry.
#[derive(Debug, Default, Clone)]
pub struct SupplyConservation {
    minted: HashMap<RegistryId, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an amount minted into a registry.
    pub fn record_mint(&mut self, registry: RegistryId, amount: u128) {
        *self.minted.entry(registry).or_default() += amount;
    }

    /// Expected total supply for a registry.
    #[must_use]
    pub fn expected_total(&self, registry: RegistryId) -> u128 {
        self.minted.get(&registry).copied().unwrap_or(0)
    }

    /// Verify the conservation identity against an observed total.
    pub fn verify(&self, registry: RegistryId, actual: u128) -> Result<()> {
        let expected = self.expected_total(registry);
        if expected != actual {
            return Err(ExchangeError::Internal(format!(
                "supply invariant violated for {registry}: expected {expected}, actual {actual}",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(n: u8) -> RegistryId {
        RegistryId([n; 32])
    }

    #[test]
    fn conservation_holds_for_minted_amounts() {
        let mut tracker = SupplyConservation::new();
        tracker.record_mint(registry(1), 100);
        tracker.record_mint(registry(1), 50);
        assert_eq!(tracker.expected_total(registry(1)), 150);
        assert!(tracker.verify(registry(1), 150).is_ok());
    }

    #[test]
    fn detects_created_supply() {
        let mut tracker = SupplyConservation::new();
        tracker.record_mint(registry(1), 100);
        assert!(tracker.verify(registry(1), 101).is_err());
    }

    #[test]
    fn detects_destroyed_supply() {
        let mut tracker = SupplyConservation::new();
        tracker.record_mint(registry(1), 100);
        assert!(tracker.verify(registry(1), 99).is_err());
    }

    #[test]
    fn registries_are_independent() {
        let mut tracker = SupplyConservation::new();
        tracker.record_mint(registry(1), 100);
        assert!(tracker.verify(registry(2), 0).is_ok());
    }
}
