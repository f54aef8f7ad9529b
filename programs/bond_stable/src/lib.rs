//! # Bond Stable: a stablecoin backed by locked bond claims
//!
//! Minters lock bond tokens at their strike value and receive stablecoin
//! scaled by lambda, the ratio of stablecoin supply to locked value. Part of
//! each mint is held back in a pool against auction shortfall.
//!
//! ## Liquidation
//!
//! At maturity (or on an oracle emergency) the locked claims are sold in a
//! sealed-bid, discriminatory-price auction:
//!
//! 1. Bidders commit `keccak(auction_id, price, amount, nonce)` with escrow
//! 2. Reveals fill a capped price board
//! 3. Anyone sorts prices and computes the clearing point
//! 4. Each bidder bills itself and receives its claim units
//! 5. Undersold rounds restart with a wider price window
//!
//! Proceeds are burned. Lambda absorbs the difference between proceeds and
//! the locked value, and minters true up their pools at the settled average.

use anchor_lang::prelude::*;

pub mod auction;
pub mod instructions;
pub mod ledger;
pub mod state;

pub use auction::BidPosition;
pub use instructions::*;
pub use state::ConfigParams;

declare_id!("2pQ3FJ9diVLZNpob7L9aQtup7ELN4AJ6veERKH8gd592");

#[program]
pub mod bond_stable {
    use super::*;

    /// Create config, lambda ledger, stablecoin mint and protocol vaults
    pub fn initialize(ctx: Context<Initialize>, params: ConfigParams) -> Result<()> {
        ctx.accounts.initialize(params, &ctx.bumps)
    }

    pub fn update_config(ctx: Context<UpdateConfig>, params: ConfigParams) -> Result<()> {
        ctx.accounts.update_config(params)
    }

    /// Make a bond token lockable
    pub fn register_claim(
        ctx: Context<RegisterClaim>,
        strike_price: u64,
        maturity: i64,
        payoff_curve_id: u64,
    ) -> Result<()> {
        ctx.accounts
            .register_claim(strike_price, maturity, payoff_curve_id, &ctx.bumps)
    }

    /// Lock claim units and mint stablecoin
    pub fn lock(ctx: Context<LockCollateral>, amount: u64) -> Result<()> {
        ctx.accounts.lock(amount, &ctx.bumps)
    }

    /// Burn stablecoin and withdraw claim units
    pub fn unlock(ctx: Context<UnlockCollateral>, burn_amount: u64) -> Result<()> {
        ctx.accounts.unlock(burn_amount)
    }

    /// Open a liquidation round
    pub fn start_auction(ctx: Context<StartAuction>, emergency: bool) -> Result<()> {
        ctx.accounts.start_auction(emergency, &ctx.bumps)
    }

    /// Commit a sealed bid with escrow
    pub fn bid(
        ctx: Context<PlaceBid>,
        secret_hash: [u8; 32],
        claimed_amount: u64,
        memo: String,
    ) -> Result<()> {
        ctx.accounts
            .bid(secret_hash, claimed_amount, memo, &ctx.bumps)
    }

    /// Open a sealed bid onto the price board
    pub fn reveal(ctx: Context<RevealBid>, price: u64, amount: u64, nonce: [u8; 32]) -> Result<()> {
        ctx.accounts.reveal(price, amount, nonce)
    }

    pub fn sort_price(ctx: Context<SortPrice>, prices: Vec<u64>) -> Result<()> {
        ctx.accounts.sort_price(prices)
    }

    pub fn compute_end_info(ctx: Context<ComputeEndInfo>) -> Result<()> {
        ctx.accounts.compute_end_info()
    }

    /// Settle one bidder. `None` takes the single-charge path.
    pub fn bill(
        ctx: Context<BillBidder>,
        my_lowest_price: Option<u64>,
        win_bids: Vec<BidPosition>,
        lose_bids: Vec<BidPosition>,
    ) -> Result<()> {
        ctx.accounts.bill(my_lowest_price, win_bids, lose_bids)
    }

    /// Restart an undersold round or finalize the generation
    pub fn close_auction(ctx: Context<CloseAuction>) -> Result<()> {
        ctx.accounts.close_auction()
    }

    pub fn claim_unrevealed(ctx: Context<ClaimUnrevealed>, secret_hash: [u8; 32]) -> Result<()> {
        ctx.accounts.claim_unrevealed(secret_hash)
    }

    /// True up the caller's pools of settled generations.
    /// Remaining accounts: `(pool, generation)` per entry of `pool_ids`.
    pub fn return_locked_pool<'info>(
        ctx: Context<'_, '_, 'info, 'info, ReturnLockedPool<'info>>,
        pool_ids: Vec<[u8; 32]>,
    ) -> Result<()> {
        ctx.accounts
            .return_locked_pool(pool_ids, ctx.remaining_accounts)
    }
}
