//! Engine configuration.
//!
//! All mutable admin state lives in one versioned record. Every setter
//! bumps `version`, and the engine reads a single consistent snapshot per
//! call — no admin mutation can be half-observed by an in-flight batch.

use serde::{Deserialize, Serialize};

use crate::{ProtocolFeeConfig, RegistryId, constants};

/// The single versioned admin configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Protocol fee rates and receiver.
    pub fees: ProtocolFeeConfig,
    /// Maximum order pairs per `match_orders` call.
    pub match_orders_limit: usize,
    /// The registry that resolves grid-addressed parcel transfers.
    pub parcel_registry: RegistryId,
    /// When set, all matching is rejected with `Paused`.
    pub paused: bool,
    /// When set, fungible-token registries must be on the allow-list.
    pub whitelist_enabled: bool,
    /// Bumped by every admin mutation.
    pub version: u64,
}

impl ExchangeConfig {
    /// Record an admin mutation.
    pub fn bump(&mut self) {
        self.version += 1;
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            fees: ProtocolFeeConfig::default(),
            match_orders_limit: constants::DEFAULT_MATCH_ORDERS_LIMIT,
            parcel_registry: RegistryId([0u8; 32]),
            paused: false,
            whitelist_enabled: false,
            version: 0,
        }
    }
}
