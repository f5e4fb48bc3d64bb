//! Proportional partial-fill arithmetic.
//!
//! Pure integer math over the two orders' declared values and their
//! cumulative fills. The match always fills the side whose remaining make
//! cannot cover the other's remaining take completely, and the other side
//! proportionally — a right order may ask for less than the left order's
//! remaining take-ask and receive a proportionally smaller make-amount,
//! never more than it declared.
//!
//! Fills are tracked on the **take side** of each order: `FillPair::
//! right_value` accrues to the left order's key, `FillPair::left_value`
//! to the right order's key.

use swapmesh_types::{ExchangeError, FillPair, Order, Result, constants};

/// `floor(value · numerator / denominator)` with overflow, zero-division
/// and dust guards.
///
/// # Errors
/// - `DivisionByZero` when `denominator == 0`
/// - `ArithmeticOverflow` when the product exceeds `u128`
/// - `RoundingError` when the truncated remainder exceeds the relative
///   tolerance (0.1% of the exact product)
pub fn partial_floor(value: u128, numerator: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(ExchangeError::DivisionByZero);
    }
    let product = value
        .checked_mul(numerator)
        .ok_or(ExchangeError::ArithmeticOverflow)?;
    let quotient = product / denominator;
    let remainder = product % denominator;
    if remainder == 0 {
        return Ok(quotient);
    }
    let scaled = remainder
        .checked_mul(constants::ROUNDING_TOLERANCE_DIVISOR)
        .ok_or(ExchangeError::ArithmeticOverflow)?;
    if scaled >= product {
        return Err(ExchangeError::RoundingError);
    }
    Ok(quotient)
}

/// Remaining `(make, take)` amounts of an order given its cumulative fill.
///
/// The take side shrinks linearly; the make side is scaled proportionally.
pub fn remaining(order: &Order, fill: u128) -> Result<(u128, u128)> {
    let take_remaining = order
        .take_asset
        .value
        .checked_sub(fill)
        .ok_or(ExchangeError::ArithmeticOverflow)?;
    let make_remaining = partial_floor(
        order.make_asset.value,
        take_remaining,
        order.take_asset.value,
    )?;
    Ok((make_remaining, take_remaining))
}

/// Compute the amounts moved by matching `left` against `right`, given
/// both orders' cumulative fills.
///
/// # Errors
/// - `DivisionByZero` when either order declares a zero take value
/// - `UnableToFill` when the implied amount exceeds a side's remaining make
/// - `RoundingError` when truncation exceeds the dust tolerance
pub fn fill_order(
    left: &Order,
    right: &Order,
    left_fill: u128,
    right_fill: u128,
) -> Result<FillPair> {
    let (left_make, left_take) = remaining(left, left_fill)?;
    let (right_make, right_take) = remaining(right, right_fill)?;

    let pair = if right_take > left_make {
        fill_left(left_make, left_take, right_make, right_take)?
    } else {
        fill_right(left_make, left_take, right_make, right_take)?
    };
    tracing::trace!(
        "fill computed: left_value={} right_value={}",
        pair.left_value,
        pair.right_value
    );
    Ok(pair)
}

/// The left order is the limiting side and is filled completely at its own
/// declared rate; the right order's rate must cover the left's full ask.
fn fill_left(
    left_make: u128,
    left_take: u128,
    right_make: u128,
    right_take: u128,
) -> Result<FillPair> {
    let implied_take = partial_floor(left_take, right_take, right_make)?;
    if implied_take > left_make {
        return Err(ExchangeError::UnableToFill {
            computed: implied_take,
            remaining: left_make,
        });
    }
    Ok(FillPair {
        left_value: left_make,
        right_value: left_take,
    })
}

/// The right order's take is fully satisfiable; the right side pays at the
/// left order's rate, never more than its declared make.
fn fill_right(
    left_make: u128,
    left_take: u128,
    right_make: u128,
    right_take: u128,
) -> Result<FillPair> {
    let maker_value = partial_floor(right_take, left_take, left_make)?;
    if maker_value > right_make {
        return Err(ExchangeError::UnableToFill {
            computed: maker_value,
            remaining: right_make,
        });
    }
    Ok(FillPair {
        left_value: right_take,
        right_value: maker_value,
    })
}
