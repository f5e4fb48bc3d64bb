//! # swapmesh-types
//!
//! Shared types, errors, and configuration for the **SwapMesh** exchange
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`RegistryId`], [`TokenId`], [`OrderKey`], [`OrderHash`], [`MatchId`]
//! - **Asset model**: [`Asset`], [`AssetType`], [`AssetClass`]
//! - **Bundle model**: [`BundleSpec`], [`PriceDistribution`], [`Parcel`]
//! - **Order model**: [`Order`], [`OrderPair`] and the dual content hashes
//! - **Royalty / fee model**: [`RoyaltyPart`], [`ProtocolFeeConfig`]
//! - **Match records**: [`MatchRecord`], [`FillPair`]
//! - **Configuration**: [`ExchangeConfig`]
//! - **Errors**: [`ExchangeError`] with `SM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod asset;
pub mod bundle;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod record;
pub mod royalty;

// Re-export all primary types at crate root for ergonomic imports:
//   use swapmesh_types::{Order, Asset, AssetType, ExchangeError, ...};

pub use asset::*;
pub use bundle::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use record::*;
pub use royalty::*;

// Constants are accessed via `swapmesh_types::constants::FOO`
// (not re-exported to avoid name collisions).
