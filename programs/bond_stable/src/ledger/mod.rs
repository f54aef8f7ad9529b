//! # Lambda / Pool Accounting
//!
//! Global bookkeeping between locked collateral and stablecoin supply:
//!
//! ```text
//!   lambda = total_supply / total_locked_value
//!
//!   lock     value = amount × strike        minted = value × λ
//!            pooled = minted × reserve_ratio  obtained = minted − pooled
//!   unlock   unlocked = burn / (strike × λ)
//!   finalize value −= claim locked value     supply −= auction proceeds
//!   return   back = clamp(avg × locked − obtained, 0, pooled)
//! ```
//!
//! Every mutation of `LambdaState` is one paired `(value_delta, supply_delta)`
//! call that recomputes lambda, so supply ≈ value × λ holds up to rounding
//! after every instruction.

pub mod lambda;
pub mod pool;

pub use lambda::*;
pub use pool::*;

use anchor_lang::prelude::*;

#[error_code(offset = 6100)]
pub enum LedgerError {
    #[msg("An auction is open or pending for this claim")]
    AuctionInProgress,
    #[msg("Claim has matured and can no longer be locked")]
    ClaimMatured,
    #[msg("Amount too small")]
    AmountTooSmall,
    #[msg("Not enough collateral locked")]
    InsufficientLocked,
    #[msg("Generation has not been settled by an auction")]
    GenerationNotSettled,
    #[msg("Pool does not belong to this claim generation")]
    InvalidPool,
    #[msg("Pool was already returned")]
    PoolAlreadyReturned,
    #[msg("Arithmetic overflow")]
    MathOverflow,
}

/// `floor(a × b / c)` in u128
pub(crate) fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    require!(c > 0, LedgerError::MathOverflow);
    let v = (a as u128)
        .checked_mul(b as u128)
        .ok_or(LedgerError::MathOverflow)?
        / c as u128;
    u64::try_from(v).map_err(|_| error!(LedgerError::MathOverflow))
}
