//! # Auction Settlement Engine
//!
//! Pure algorithms behind the sealed-bid liquidation auction. Nothing in this
//! module touches accounts or tokens; instruction handlers load the state,
//! call in here and then move funds according to the returned outcome.
//!
//! ```text
//!   bid (commit) ──▶ reveal ──▶ sort_price ──▶ compute_end_info ──▶ bill ──▶ close
//!        │              │            │                 │              │         │
//!   commit.rs      discretize.rs  clearing.rs     clearing.rs    billing.rs  lifecycle.rs
//!                  board insert
//! ```
//!
//! The price window of every round comes from `schedule.rs`.

pub mod billing;
pub mod clearing;
pub mod commit;
pub mod discretize;
pub mod lifecycle;
pub mod schedule;

#[cfg(test)]
mod tests;

pub use billing::*;
pub use clearing::*;
pub use commit::*;
pub use discretize::*;
pub use lifecycle::*;
pub use schedule::*;

use anchor_lang::prelude::*;

/// Errors raised by the auction engine
#[error_code]
pub enum AuctionError {
    // --- window violations ---
    #[msg("Operation is outside the legal phase window")]
    WindowClosed,
    #[msg("The auction has not reached this phase yet")]
    NotReady,

    // --- resource caps ---
    #[msg("Too many distinct price levels on the board")]
    TooManyPriceLevels,
    #[msg("Too many bids at this price level")]
    TooManyBidsAtPrice,
    #[msg("Too many commitments for this bidder")]
    TooManyCommitments,

    // --- integrity ---
    #[msg("Revealed bid does not match any commitment")]
    SecretMismatch,
    #[msg("No unsettled commitment for this secret")]
    SecretNotFound,
    #[msg("Commitment already exists")]
    DuplicateSecret,
    #[msg("Price list is not the board's strictly descending key set")]
    InvalidOrdering,
    #[msg("Settlement claim does not match the board")]
    InvalidClaim,
    #[msg("Revealed amount exceeds the escrowed amount")]
    AmountExceedsEscrow,
    #[msg("Revealed price is below the round's lower bound")]
    PriceOutOfWindow,
    #[msg("Bid amount must be positive")]
    ZeroAmount,
    #[msg("Memo exceeds maximum length")]
    MemoTooLong,
    #[msg("Nothing to settle for this bidder")]
    NothingToSettle,

    // --- lifecycle ---
    #[msg("An auction is already open for this claim")]
    AlreadyOpen,
    #[msg("Nothing is locked against this claim")]
    NothingToSell,
    #[msg("Claim has not matured")]
    NotMatured,
    #[msg("Price window collapsed")]
    InvalidWindow,

    // --- idempotency ---
    #[msg("Already done")]
    AlreadyDone,

    #[msg("Arithmetic overflow")]
    MathOverflow,
}

/// `ceil(amount × price / PRICE_UNIT)`, the stablecoin value of `amount`
/// claim units at `price`.
pub fn value_at(amount: u64, price: u64) -> Result<u64> {
    let product = (amount as u128)
        .checked_mul(price as u128)
        .ok_or(AuctionError::MathOverflow)?;
    let unit = PRICE_UNIT as u128;
    let value = product
        .checked_add(unit - 1)
        .ok_or(AuctionError::MathOverflow)?
        / unit;
    u64::try_from(value).map_err(|_| error!(AuctionError::MathOverflow))
}
