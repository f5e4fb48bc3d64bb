//! # swapmesh-exchange
//!
//! The stateful settlement engine of the SwapMesh workspace.
//!
//! ## Architecture
//!
//! [`Exchange`] orchestrates a batch of signed order pairs through a
//! strict plan → commit → execute pipeline:
//!
//! 1. Validate both orders of every pair (`swapmesh-validator`)
//! 2. Match asset types and compute proportional fills
//!    (`swapmesh-matchcore`)
//! 3. Split each payment into royalties, protocol fee and net proceeds
//! 4. Commit fill-ledger bookkeeping, then hand the complete leg list to
//!    the external [`AssetBridge`] in one all-or-none call
//!
//! Any failure anywhere reverts the whole call: no asset moves and no
//! fill-ledger entry changes on any error path.

pub mod bridge;
pub mod conservation;
pub mod engine;
pub mod fees;
pub mod fill_ledger;

pub use bridge::{
    AssetBridge, InMemoryBridge, LegKind, MapRoyaltySource, RoyaltySource, TransferLeg,
};
pub use conservation::SupplyConservation;
pub use engine::Exchange;
pub use fees::{LinePricing, PaymentSplit, bps_share, split_payment};
pub use fill_ledger::FillLedger;
