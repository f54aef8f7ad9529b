//! Minter Pool State

use anchor_lang::prelude::*;

/// A minter's reserved-plus-obtained record against one claim generation
///
/// Seeds: ["pool", minter, claim_mint, generation]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Pool {
    pub minter: Pubkey,

    /// keccak(claim_mint, generation)
    pub pool_id: [u8; 32],

    pub claim: Pubkey,

    pub generation: u32,

    /// Claim units this minter has locked in the generation
    pub locked_amount: u64,

    /// Stablecoin held back in the reserve vault against auction shortfall
    pub pooled_amount: u64,

    /// Stablecoin handed to the minter
    pub obtained_amount: u64,

    /// Stablecoin the minter burned unlocking from this pool
    pub burned_amount: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl Pool {
    pub const SEED: &'static [u8] = b"pool";

    pub fn is_empty(&self) -> bool {
        self.locked_amount == 0 && self.pooled_amount == 0 && self.obtained_amount == 0
    }
}
