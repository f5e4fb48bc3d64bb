//! External transfer capabilities.
//!
//! The engine never holds custody: assets stay in participants' accounts
//! until the moment of settlement, when the engine hands a complete,
//! ordered list of transfer legs to an [`AssetBridge`]. The bridge
//! contract is all-or-none — a failed leg leaves no balance changed.
//!
//! Callees are treated as adversarial: the engine commits its own
//! bookkeeping before calling [`AssetBridge::execute`] and never branches
//! on bridge state after the call returns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use swapmesh_types::{
    Address, ExchangeError, Parcel, RegistryId, Result, RoyaltyPart, TokenId,
};

/// What one transfer leg moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegKind {
    Native {
        value: u128,
    },
    Fungible {
        registry: RegistryId,
        value: u128,
    },
    Unique {
        registry: RegistryId,
        token: TokenId,
    },
    Stack {
        registry: RegistryId,
        token: TokenId,
        supply: u128,
    },
    /// Grid-addressed parcels moved through the parcel registry's
    /// batch-transfer capability.
    ParcelBatch {
        registry: RegistryId,
        parcels: Vec<Parcel>,
    },
}

/// One ownership movement between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub from: Address,
    pub to: Address,
    pub kind: LegKind,
}

/// The external asset registries, seen as one transfer capability.
///
/// `execute` must apply every leg in order, or none of them.
pub trait AssetBridge {
    fn execute(&mut self, legs: &[TransferLeg]) -> Result<()>;
}

/// The consumed royalty schedule per asset. How schedules are registered
/// is out of scope; the engine only reads them.
pub trait RoyaltySource {
    fn royalties(&self, registry: RegistryId, token: TokenId) -> Vec<RoyaltyPart>;
}

/// In-memory royalty schedule store.
#[derive(Debug, Default, Clone)]
pub struct MapRoyaltySource {
    schedules: HashMap<(RegistryId, TokenId), Vec<RoyaltyPart>>,
}

impl MapRoyaltySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schedule for one asset. The 50% cap is deliberately not
    /// enforced here — only at settlement time.
    pub fn set_royalties(
        &mut self,
        registry: RegistryId,
        token: TokenId,
        schedule: Vec<RoyaltyPart>,
    ) {
        self.schedules.insert((registry, token), schedule);
    }
}

impl RoyaltySource for MapRoyaltySource {
    fn royalties(&self, registry: RegistryId, token: TokenId) -> Vec<RoyaltyPart> {
        self.schedules
            .get(&(registry, token))
            .cloned()
            .unwrap_or_default()
    }
}

/// Reference bridge implementation backing all integration tests: native
/// and fungible balances, unique-item owners, stack balances and a
/// grid-addressed parcel map.
///
/// Atomicity is by construction: the whole leg sequence is applied to a
/// scratch copy which replaces the live state only when every leg
/// succeeds.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBridge {
    native: HashMap<Address, u128>,
    fungible: HashMap<(RegistryId, Address), u128>,
    unique_owners: HashMap<(RegistryId, TokenId), Address>,
    stacks: HashMap<(RegistryId, TokenId, Address), u128>,
    parcel_cells: HashMap<(RegistryId, u64, u64), Address>,
}

impl InMemoryBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ──────────────────── seeding ────────────────────

    pub fn mint_native(&mut self, owner: Address, value: u128) {
        *self.native.entry(owner).or_default() += value;
    }

    pub fn mint_fungible(&mut self, registry: RegistryId, owner: Address, value: u128) {
        *self.fungible.entry((registry, owner)).or_default() += value;
    }

    pub fn mint_unique(&mut self, registry: RegistryId, token: TokenId, owner: Address) {
        self.unique_owners.insert((registry, token), owner);
    }

    pub fn mint_stack(
        &mut self,
        registry: RegistryId,
        token: TokenId,
        owner: Address,
        supply: u128,
    ) {
        *self.stacks.entry((registry, token, owner)).or_default() += supply;
    }

    /// Assign every cell of a `size × size` parcel to `owner`.
    pub fn mint_parcel(&mut self, registry: RegistryId, parcel: Parcel, owner: Address) {
        for dx in 0..parcel.size {
            for dy in 0..parcel.size {
                self.parcel_cells
                    .insert((registry, parcel.x + dx, parcel.y + dy), owner);
            }
        }
    }

    // ──────────────────── reads ────────────────────

    #[must_use]
    pub fn native_balance(&self, owner: Address) -> u128 {
        self.native.get(&owner).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn fungible_balance(&self, registry: RegistryId, owner: Address) -> u128 {
        self.fungible.get(&(registry, owner)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn owner_of(&self, registry: RegistryId, token: TokenId) -> Option<Address> {
        self.unique_owners.get(&(registry, token)).copied()
    }

    #[must_use]
    pub fn stack_balance(&self, registry: RegistryId, token: TokenId, owner: Address) -> u128 {
        self.stacks
            .get(&(registry, token, owner))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn parcel_cell_owner(&self, registry: RegistryId, x: u64, y: u64) -> Option<Address> {
        self.parcel_cells.get(&(registry, x, y)).copied()
    }

    /// Sum of all holders' balances for a fungible registry. Used by the
    /// conservation checks.
    #[must_use]
    pub fn total_fungible_supply(&self, registry: RegistryId) -> u128 {
        self.fungible
            .iter()
            .filter(|((r, _), _)| *r == registry)
            .map(|(_, v)| v)
            .sum()
    }

    // ──────────────────── transfer ────────────────────

    fn apply(&mut self, leg: &TransferLeg) -> Result<()> {
        match &leg.kind {
            LegKind::Native { value } => {
                Self::debit(self.native.entry(leg.from).or_default(), *value)?;
                Self::credit(self.native.entry(leg.to).or_default(), *value)?;
            }
            LegKind::Fungible { registry, value } => {
                Self::debit(
                    self.fungible.entry((*registry, leg.from)).or_default(),
                    *value,
                )?;
                Self::credit(
                    self.fungible.entry((*registry, leg.to)).or_default(),
                    *value,
                )?;
            }
            LegKind::Unique { registry, token } => {
                let owner = self.unique_owners.get_mut(&(*registry, *token));
                match owner {
                    Some(owner) if *owner == leg.from => *owner = leg.to,
                    _ => return Err(ExchangeError::NotAssetOwner),
                }
            }
            LegKind::Stack {
                registry,
                token,
                supply,
            } => {
                Self::debit(
                    self.stacks.entry((*registry, *token, leg.from)).or_default(),
                    *supply,
                )?;
                Self::credit(
                    self.stacks.entry((*registry, *token, leg.to)).or_default(),
                    *supply,
                )?;
            }
            LegKind::ParcelBatch { registry, parcels } => {
                for parcel in parcels {
                    for dx in 0..parcel.size {
                        for dy in 0..parcel.size {
                            let cell = (*registry, parcel.x + dx, parcel.y + dy);
                            match self.parcel_cells.get_mut(&cell) {
                                Some(owner) if *owner == leg.from => *owner = leg.to,
                                _ => return Err(ExchangeError::NotAssetOwner),
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn debit(balance: &mut u128, value: u128) -> Result<()> {
        if *balance < value {
            return Err(ExchangeError::InsufficientAssets {
                needed: value,
                available: *balance,
            });
        }
        *balance -= value;
        Ok(())
    }

    fn credit(balance: &mut u128, value: u128) -> Result<()> {
        *balance = balance
            .checked_add(value)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl AssetBridge for InMemoryBridge {
    fn execute(&mut self, legs: &[TransferLeg]) -> Result<()> {
        let mut scratch = self.clone();
        for leg in legs {
            scratch.apply(leg)?;
        }
        *self = scratch;
        Ok(())
    }
}
