//! Asset-class matching and fee-side selection.
//!
//! Given two asset-type declarations from opposing orders, decide whether
//! they describe the same transferable thing. The predicate is pure and
//! symmetric: `match_types(a, b)` and `match_types(b, a)` succeed or fail
//! identically. Bundles are matched by identity of their encoded contents
//! here; decomposition into constituents happens downstream in the
//! settlement engine.

use std::collections::BTreeSet;

use swapmesh_types::{AssetClass, AssetType, ExchangeError, Result};

/// Matches opposing asset-type declarations.
///
/// Classes can be unregistered at runtime, after which any order naming
/// them fails with `InvalidAssetClass`. All classes are registered by
/// default.
#[derive(Debug, Clone)]
pub struct AssetMatcher {
    registered: BTreeSet<AssetClass>,
}

impl AssetMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registered: BTreeSet::from([
                AssetClass::Native,
                AssetClass::Fungible,
                AssetClass::Unique,
                AssetClass::Stack,
                AssetClass::Bundle,
            ]),
        }
    }

    /// Remove a class from the registered set.
    pub fn unregister_class(&mut self, class: AssetClass) {
        self.registered.remove(&class);
    }

    /// Re-register a class.
    pub fn register_class(&mut self, class: AssetClass) {
        self.registered.insert(class);
    }

    #[must_use]
    pub fn is_registered(&self, class: AssetClass) -> bool {
        self.registered.contains(&class)
    }

    /// Decide whether `left` and `right` describe the same transferable
    /// thing and return the canonical matched type.
    ///
    /// # Errors
    /// - `InvalidAssetClass` when either class is not registered
    /// - `AssetMismatch` when classes or identifying data differ
    pub fn match_types(&self, left: &AssetType, right: &AssetType) -> Result<AssetType> {
        self.check_registered(left.class())?;
        self.check_registered(right.class())?;

        if left == right {
            return Ok(left.clone());
        }
        Err(ExchangeError::AssetMismatch)
    }

    fn check_registered(&self, class: AssetClass) -> Result<()> {
        if self.is_registered(class) {
            return Ok(());
        }
        Err(ExchangeError::InvalidAssetClass {
            reason: format!("{class} is not a registered asset class"),
        })
    }
}

impl Default for AssetMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Which matched side carries the fee and royalty deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSide {
    /// The left order's make asset is the payment.
    Left,
    /// The right order's make asset is the payment.
    Right,
    /// Neither side is payment-like; no deductions apply.
    None,
}

/// Select the payment side of a match.
///
/// The more money-like make asset pays: native coin first, then fungible
/// tokens, then item stacks, with the left side winning ties. Unique items
/// and bundles never carry the fee side.
#[must_use]
pub fn fee_side(left_make: AssetClass, right_make: AssetClass) -> FeeSide {
    for class in [AssetClass::Native, AssetClass::Fungible, AssetClass::Stack] {
        if left_make == class {
            return FeeSide::Left;
        }
        if right_make == class {
            return FeeSide::Right;
        }
    }
    FeeSide::None
}
