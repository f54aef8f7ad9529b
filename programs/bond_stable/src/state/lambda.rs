//! Global Exchange Rate State
//!
//! `lambda = total_supply / total_locked_value`, the number of stablecoin
//! units one USD of locked collateral backs.

use anchor_lang::prelude::*;

/// Process-wide lambda ledger (singleton PDA)
///
/// Seeds: ["lambda"]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct LambdaState {
    /// USD value (8 decimals) of every claim currently locked
    pub total_locked_value: u64,

    /// Stablecoin supply accounted against that value
    pub total_supply: u64,

    /// Current exchange rate, 8 decimals
    pub lambda: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl LambdaState {
    pub const SEED: &'static [u8] = b"lambda";
}
