//! Claim (Bond) State
//!
//! The registry entry of one safety-tranche bond plus the collateral
//! currently locked against it. The claim ID is the bond's token mint.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

/// Locked-claim account
///
/// Seeds: ["claim", claim_mint]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct ClaimState {
    /// Bond token mint, doubles as the claim ID
    pub claim_mint: Pubkey,

    /// Strike price in USD, 8 decimals
    pub strike_price: u64,

    /// Unix timestamp at which the bond matures
    pub maturity: i64,

    /// Opaque payoff curve reference from the bond registry
    pub payoff_curve_id: u64,

    /// Claim units locked in the vault
    pub total_locked: u64,

    /// USD value credited to `LambdaState` for `total_locked`
    pub locked_value: u64,

    /// Bumped every time an auction finalizes; pools are keyed to it
    pub generation: u32,

    /// A round is running for this claim
    pub auction_open: bool,

    /// The last round undersold and the next one has not been opened yet
    pub pending_restart: bool,

    /// Restart count the next round will carry
    pub next_restart: u16,

    /// Amount the pending restart will offer
    pub pending_amount: u64,

    /// Strike × lambda fixed when the generation's first round opened
    pub strike_equivalent_price: u64,

    /// Whether the running generation was started by the risk predicate
    pub emergency: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl ClaimState {
    pub const SEED: &'static [u8] = b"claim";
    pub const VAULT_SEED: &'static [u8] = b"claim_vault";

    /// Lock/unlock are frozen from the first round until finalization
    pub fn in_auction(&self) -> bool {
        self.auction_open || self.pending_restart
    }

    /// Pool ID of the current generation
    pub fn current_pool_id(&self) -> [u8; 32] {
        pool_id(&self.claim_mint, self.generation)
    }
}

/// Pool ID of `(claim, generation)`
pub fn pool_id(claim_mint: &Pubkey, generation: u32) -> [u8; 32] {
    keccak::hashv(&[claim_mint.as_ref(), &generation.to_le_bytes()]).0
}

/// Per-generation settlement record, the input of the pool true-up
///
/// Seeds: ["generation", claim_mint, generation]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Generation {
    pub claim: Pubkey,

    pub generation: u32,

    /// Amount offered by the first round
    pub total_offered: u64,

    /// Σ rewarded over every round ("total unlocked amount")
    pub total_sold: u64,

    /// Σ stablecoin paid over every round ("total burned stablecoin")
    pub total_paid: u64,

    pub finalized: bool,

    /// `total_paid / total_sold`, 8 decimals, set on finalization
    pub settled_average_price: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl Generation {
    pub const SEED: &'static [u8] = b"generation";
}
