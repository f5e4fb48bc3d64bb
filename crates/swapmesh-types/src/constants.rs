//! System-wide constants for the SwapMesh exchange engine.

/// Basis-point denominator: 10,000 bps = 100%.
pub const BASIS_POINTS_DENOMINATOR: u128 = 10_000;

/// Royalty schedules beyond this total are rejected at settlement time.
pub const ROYALTY_CAP_BPS: u32 = 5_000;

/// Protocol fee rates must stay strictly below this bound.
pub const MAX_FEE_BPS: u16 = 5_000;

/// Default protocol fee for primary-market sales (2.5%).
pub const DEFAULT_PRIMARY_FEE_BPS: u16 = 250;

/// Default protocol fee for secondary sales (5%).
pub const DEFAULT_SECONDARY_FEE_BPS: u16 = 500;

/// Default maximum order pairs per `match_orders` call.
pub const DEFAULT_MATCH_ORDERS_LIMIT: usize = 50;

/// Fill-ledger value marking a cancelled order.
pub const CANCELLED_FILL: u128 = u128::MAX;

/// Relative truncation beyond 1/this fraction fails fill computation
/// (dust-value guard: 1000 = 0.1%).
pub const ROUNDING_TOLERANCE_DIVISOR: u128 = 1_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SwapMesh";
