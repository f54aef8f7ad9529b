//! # Restart Schedule
//!
//! Every round bounds the legal bid price to a window around the claim's
//! strike-equivalent price (strike × lambda). The half-width of the window is
//! the round's β:
//!
//! ```text
//!   round   1    2    3    4    5    6    7    8    9+
//!   β      10%  20%  30%  40%  50%  60%  70%  80%  90%
//!
//!   lower = discretize(center · (1 − β), Up)
//!   upper = discretize(center · (1 + β), Down)
//! ```
//!
//! β saturates at round 9, so the window never exceeds ±100% and the lower
//! bound never reaches zero.

use anchor_lang::prelude::*;

use super::{AuctionError, Discretizer, Rounding};

/// Basis-point denominator
pub const BPS: u64 = 10_000;

/// Round at which β stops widening
pub const SATURATION_ROUND: u16 = 9;

/// β per round in basis points, index 0 is round 1
pub const BETA_SCHEDULE_BPS: [u64; SATURATION_ROUND as usize] =
    [1_000, 2_000, 3_000, 4_000, 5_000, 6_000, 7_000, 8_000, 9_000];

/// Legal `[lower, upper]` bid price range of one round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceWindow {
    pub lower: u64,
    pub upper: u64,
}

impl PriceWindow {
    pub fn contains(&self, price: u64) -> bool {
        price >= self.lower && price <= self.upper
    }

}

/// β for a 1-based round number
pub fn beta_bps(round: u16) -> u64 {
    let idx = round.clamp(1, SATURATION_ROUND) as usize - 1;
    BETA_SCHEDULE_BPS[idx]
}

/// Window for `restart_count` (0 for the first round)
pub fn price_window(center: u64, restart_count: u16) -> Result<PriceWindow> {
    let round = restart_count.saturating_add(1);
    let delta = (center as u128)
        .checked_mul(beta_bps(round) as u128)
        .ok_or(AuctionError::MathOverflow)?
        / BPS as u128;
    let delta = u64::try_from(delta).map_err(|_| error!(AuctionError::MathOverflow))?;

    let lower_raw = center.checked_sub(delta).ok_or(AuctionError::MathOverflow)?;
    let upper_raw = center.checked_add(delta).ok_or(AuctionError::MathOverflow)?;

    let lower = Discretizer::discretize(lower_raw, Rounding::Up)?;
    let upper = Discretizer::discretize(upper_raw, Rounding::Down)?;
    require!(lower > 0 && lower <= upper, AuctionError::InvalidWindow);

    Ok(PriceWindow { lower, upper })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::PRICE_UNIT;

    #[test]
    fn test_beta_saturates() {
        assert_eq!(beta_bps(0), 1_000);
        assert_eq!(beta_bps(1), 1_000);
        assert_eq!(beta_bps(9), 9_000);
        assert_eq!(beta_bps(10), 9_000);
        assert_eq!(beta_bps(u16::MAX), 9_000);
    }

    #[test]
    fn test_first_round_window() {
        let w = price_window(100 * PRICE_UNIT, 0).unwrap();
        assert_eq!(w.lower, 90 * PRICE_UNIT);
        assert_eq!(w.upper, 110 * PRICE_UNIT);
        assert!(w.contains(100 * PRICE_UNIT));
        assert!(!w.contains(89 * PRICE_UNIT));
    }

    #[test]
    fn test_windows_widen_until_saturation() {
        let center = 97 * PRICE_UNIT + 12_345_678;
        let mut prev = price_window(center, 0).unwrap();
        for restart in 1..SATURATION_ROUND {
            let next = price_window(center, restart).unwrap();
            assert!(next.lower < prev.lower, "restart {restart}");
            assert!(next.upper > prev.upper, "restart {restart}");
            prev = next;
        }
        // round 10 and beyond reuse round 9's window
        assert_eq!(price_window(center, SATURATION_ROUND).unwrap(), prev);
        assert_eq!(price_window(center, 200).unwrap(), prev);
        assert!(prev.lower > 0);
    }

    #[test]
    fn test_bounds_stay_inside_raw_window() {
        let center = 3 * PRICE_UNIT + 33_333_333;
        let w = price_window(center, 2).unwrap();
        let delta = center * 3_000 / BPS;
        assert!(w.lower >= center - delta);
        assert!(w.upper <= center + delta);
    }
}
