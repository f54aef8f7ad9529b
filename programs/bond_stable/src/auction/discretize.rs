//! # Price Discretizer
//!
//! Bids are revealed with an arbitrary fixed-point price, but the board only
//! stores prices that sit on a grid. The grid step grows with the magnitude
//! of the price so that relative precision stays roughly constant:
//!
//! ```text
//!   raw price m (8 decimals)        step (price units)
//!   ─────────────────────────────   ──────────────────
//!   m <  5·10^8   (P < 5)           0.001
//!   m <  5·10^9   (P < 50)          0.01
//!   m <  5·10^10  (P < 500)         0.1
//!   m <  5·10^11  (P < 5,000)       1
//!   m <  5·10^12                    10
//!   m <  5·10^13                    100
//!   m <  5·10^14                    1,000
//!   m >= 5·10^14                    10,000
//! ```
//!
//! Round-down is the default. Round-up is only used when the admissible
//! window's lower bound is computed, so a clamped price never falls back
//! outside the window.

use anchor_lang::prelude::*;

use super::AuctionError;

/// One price unit with 8 fractional digits.
pub const PRICE_UNIT: u64 = 100_000_000;

/// `(exclusive upper band bound, grid step)`, both in raw 8-decimal units.
const BANDS: [(u64, u64); 7] = [
    (500_000_000, 100_000),
    (5_000_000_000, 1_000_000),
    (50_000_000_000, 10_000_000),
    (500_000_000_000, 100_000_000),
    (5_000_000_000_000, 1_000_000_000),
    (50_000_000_000_000, 10_000_000_000),
    (500_000_000_000_000, 100_000_000_000),
];

/// Step of the top band (prices at or above 5·10^14 raw).
const TOP_STEP: u64 = 1_000_000_000_000;

/// Rounding direction used when snapping a price to the grid
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Rounding {
    #[default]
    Down,
    Up,
}

/// Magnitude-adaptive price grid
pub struct Discretizer;

impl Discretizer {
    /// Grid step that applies at `price`
    pub fn step_at(price: u64) -> u64 {
        BANDS
            .iter()
            .find(|(bound, _)| price < *bound)
            .map(|(_, step)| *step)
            .unwrap_or(TOP_STEP)
    }

    /// Snap `price` onto the grid.
    ///
    /// # Example
    /// ```ignore
    /// // 49.999999 -> 49.99
    /// let p = Discretizer::discretize(4_999_999_900, Rounding::Down)?;
    /// assert_eq!(p, 4_999_000_000);
    /// ```
    pub fn discretize(price: u64, rounding: Rounding) -> Result<u64> {
        let step = Self::step_at(price);
        let rem = price % step;
        if rem == 0 {
            return Ok(price);
        }

        match rounding {
            Rounding::Down => Ok(price - rem),
            Rounding::Up => price
                .checked_add(step - rem)
                .ok_or_else(|| error!(AuctionError::MathOverflow)),
        }
    }

    /// One band coarser than the step `discretize` uses at `max_price`.
    ///
    /// Only used to size how many distinct levels a board must hold under a
    /// given price ceiling; settlement never uses it.
    pub fn grid_step(max_price: u64) -> u64 {
        Self::step_at(max_price).saturating_mul(10)
    }

    /// Number of coarse grid levels between `lower` and `upper` (inclusive)
    pub fn max_price_levels(lower: u64, upper: u64) -> u64 {
        if upper < lower {
            return 0;
        }
        (upper - lower) / Self::grid_step(upper) + 1
    }
}
