//! Error types for the SwapMesh exchange engine.
//!
//! All errors use the `SM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input / shape errors
//! - 2xx: Authorization errors
//! - 3xx: State errors
//! - 4xx: Asset-compatibility errors
//! - 5xx: Arithmetic errors
//! - 6xx: Policy errors
//! - 7xx: Transfer errors
//! - 9xx: General / internal errors
//!
//! Every failure is synchronous and reverts the whole call: no asset moves
//! and no fill-ledger entry changes on any error path.

use thiserror::Error;

use crate::{Address, OrderKey, RegistryId};

/// Central error enum for all SwapMesh operations.
#[derive(Debug, Error)]
pub enum ExchangeError {
    // =================================================================
    // Input / Shape Errors (1xx)
    // =================================================================
    /// A match batch must contain at least one order pair.
    #[error("SM_ERR_100: empty match batch")]
    EmptyBatch,

    /// The batch exceeds the configured match limit.
    #[error("SM_ERR_101: too many matches: {submitted} exceeds limit {limit}")]
    TooManyMatches { submitted: usize, limit: usize },

    /// A bundle's price distribution does not mirror its sub-collections.
    #[error("SM_ERR_102: bundle shape mismatch: {reason}")]
    BundleShapeMismatch { reason: String },

    /// A zero address was supplied where one is disallowed.
    #[error("SM_ERR_103: zero address not allowed for {field}")]
    ZeroAddress { field: &'static str },

    /// An admin limit was set to an unusable value.
    #[error("SM_ERR_104: invalid limit: {0}")]
    InvalidLimit(usize),

    /// The order key supplied for cancellation does not match the order.
    #[error("SM_ERR_105: supplied order key does not match the order")]
    InvalidOrderHash,

    /// Zero-salt orders cannot be cancelled through the fill ledger.
    #[error("SM_ERR_106: zero-salt order cannot be cancelled")]
    ZeroSalt,

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The subject does not hold the required role.
    #[error("SM_ERR_200: {subject} is missing required role {role}")]
    MissingRole { subject: Address, role: String },

    /// The effective sender is not the order's maker.
    #[error("SM_ERR_201: maker is not the transaction sender")]
    NotMaker,

    /// Signature verification failed for the order's maker.
    #[error("SM_ERR_202: order signature verification failed")]
    SignatureInvalid,

    /// A fungible-token registry is not on the allow-list.
    #[error("SM_ERR_203: registry {0} is not whitelisted")]
    NotWhitelisted(RegistryId),

    /// An order's taker restriction excludes the counter-order's maker.
    #[error("SM_ERR_204: taker restriction does not match counter-order maker")]
    TakerMismatch,

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// The exchange is paused.
    #[error("SM_ERR_300: exchange is paused")]
    Paused,

    /// The order is fully filled or cancelled.
    #[error("SM_ERR_301: nothing to fill for order {0}")]
    NothingToFill(OrderKey),

    /// The order's start time is in the future.
    #[error("SM_ERR_302: order has not started yet")]
    OrderNotStarted,

    /// The order's end time has passed.
    #[error("SM_ERR_303: order has expired")]
    OrderExpired,

    // =================================================================
    // Asset-Compatibility Errors (4xx)
    // =================================================================
    /// The two orders' assets do not describe the same transferable thing.
    #[error("SM_ERR_400: assets don't match")]
    AssetMismatch,

    /// An asset class is unknown or not registered with the matcher.
    #[error("SM_ERR_401: invalid asset class: {reason}")]
    InvalidAssetClass { reason: String },

    /// A unique item (or an indivisible bundle) must carry value 1.
    #[error("SM_ERR_402: indivisible asset must have value 1, got {0}")]
    UnitValueRequired(u128),

    /// A bundle's distributed prices do not add up to the payment.
    #[error("SM_ERR_403: bundle prices sum to {distributed}, payment is {payment}")]
    BundlePriceMismatch { distributed: u128, payment: u128 },

    // =================================================================
    // Arithmetic Errors (5xx)
    // =================================================================
    /// A fill computation divided by zero.
    #[error("SM_ERR_500: division by zero in fill computation")]
    DivisionByZero,

    /// Integer truncation exceeded the dust tolerance.
    #[error("SM_ERR_501: rounding error beyond tolerance")]
    RoundingError,

    /// The computed fill would exceed a side's declared value.
    #[error("SM_ERR_502: unable to fill: computed {computed} exceeds remaining {remaining}")]
    UnableToFill { computed: u128, remaining: u128 },

    /// An amount computation overflowed.
    #[error("SM_ERR_503: arithmetic overflow")]
    ArithmeticOverflow,

    // =================================================================
    // Policy Errors (6xx)
    // =================================================================
    /// The royalty schedule exceeds the 50% cap.
    #[error("SM_ERR_600: royalties total {0} bps exceeds the 5000 bps cap")]
    RoyaltiesTooHigh(u32),

    /// A protocol fee rate must stay below 50%.
    #[error("SM_ERR_601: protocol fee {0} bps must be below 5000")]
    FeeTooHigh(u16),

    // =================================================================
    // Transfer Errors (7xx)
    // =================================================================
    /// A transfer leg was rejected by the asset bridge.
    #[error("SM_ERR_700: transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The payer does not hold enough of the transferred asset.
    #[error("SM_ERR_701: insufficient assets: need {needed}, have {available}")]
    InsufficientAssets { needed: u128, available: u128 },

    /// The sender does not own the transferred item.
    #[error("SM_ERR_702: account does not own the transferred item")]
    NotAssetOwner,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SM_ERR_900: internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ExchangeError>;
