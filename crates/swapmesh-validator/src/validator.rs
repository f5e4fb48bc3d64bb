//! Order validation: time windows, the zero-salt rule, signature dispatch
//! and the optional fungible allow-list.
//!
//! Validation is side-effect free. It is a pure precondition check invoked
//! by the settlement engine before any fill arithmetic, using the
//! caller-supplied current time.

use chrono::{DateTime, Utc};
use swapmesh_types::{Address, AssetType, ExchangeError, Order, Result};

use crate::roles::RoleService;
use crate::signer::SignerRegistry;

/// Validates orders presented to the settlement engine.
#[derive(Debug, Default, Clone)]
pub struct OrderValidator {
    signers: SignerRegistry,
}

impl OrderValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_signers(signers: SignerRegistry) -> Self {
        Self { signers }
    }

    /// The signer registry, for delegated-verifier registration.
    pub fn signers_mut(&mut self) -> &mut SignerRegistry {
        &mut self.signers
    }

    /// Validate an order against its signature and the effective sender.
    ///
    /// Checks run in a fixed order: time window, zero-salt rule, then
    /// signer dispatch. When the effective sender is the maker itself the
    /// signature check is skipped entirely — the sender is
    /// self-authorizing.
    ///
    /// # Errors
    /// - `OrderNotStarted` / `OrderExpired` when outside the time window
    /// - `NotMaker` when a zero-salt order is submitted by anyone else
    /// - `SignatureInvalid` when signer dispatch rejects the signature
    pub fn validate(
        &self,
        order: &Order,
        signature: &[u8],
        effective_sender: Address,
        now: DateTime<Utc>,
    ) -> Result<()> {
        Self::check_window(order, now)?;

        if order.salt == 0 {
            if effective_sender == order.maker {
                return Ok(());
            }
            return Err(ExchangeError::NotMaker);
        }

        if effective_sender == order.maker {
            return Ok(());
        }
        self.signers.verify(order.maker, &order.hash(), signature)
    }

    /// Enforce the fungible allow-list when globally enabled: every
    /// fungible make/take registry must be approved in the role service.
    ///
    /// # Errors
    /// Returns `NotWhitelisted` naming the offending registry.
    pub fn check_allow_list(
        &self,
        order: &Order,
        roles: &RoleService,
        enabled: bool,
    ) -> Result<()> {
        if !enabled {
            return Ok(());
        }
        for asset in [&order.make_asset, &order.take_asset] {
            if let AssetType::Fungible { registry } = &asset.asset_type {
                if !roles.is_fungible_approved(*registry) {
                    tracing::warn!("rejecting order: registry {registry} not whitelisted");
                    return Err(ExchangeError::NotWhitelisted(*registry));
                }
            }
        }
        Ok(())
    }

    fn check_window(order: &Order, now: DateTime<Utc>) -> Result<()> {
        let now = u64::try_from(now.timestamp()).unwrap_or(0);
        if order.start != 0 && now < order.start {
            return Err(ExchangeError::OrderNotStarted);
        }
        if order.end != 0 && now > order.end {
            return Err(ExchangeError::OrderExpired);
        }
        Ok(())
    }
}
