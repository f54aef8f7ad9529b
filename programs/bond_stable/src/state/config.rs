//! Global Protocol Configuration
//!
//! Protocol-wide settings shared by every claim and auction.

use anchor_lang::prelude::*;

use crate::state::PriceBoard;

/// Global configuration account (singleton PDA)
///
/// Seeds: ["config"]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Config {
    /// Protocol administrator, registers claims and tunes parameters
    pub admin: Pubkey,

    /// Signer that attests the risk predicate fired for a claim.
    /// Emergency auctions can only be started by this key.
    pub oracle: Pubkey,

    /// Stablecoin mint (mint authority = this config PDA)
    pub stable_mint: Pubkey,

    /// Share of every mint retained in the minter's pool, in basis points
    pub reserve_ratio_bps: u16,

    /// Commit window of a regular (maturity) auction, seconds
    pub bid_period: i64,

    /// Commit window of an emergency auction, seconds
    pub emergency_bid_period: i64,

    /// Reveal window, seconds
    pub reveal_period: i64,

    /// Sort/settle window before a round may be closed, seconds
    pub settle_period: i64,

    /// Cap on distinct price levels per board
    pub max_price_levels: u16,

    /// Cap on revealed bids per price level
    pub max_entries_per_price: u16,

    /// PDA bump seed
    pub bump: u8,

    /// Whether locking and bidding are paused
    pub paused: bool,
}

impl Config {
    pub const SEED: &'static [u8] = b"config";
    pub const STABLE_MINT_SEED: &'static [u8] = b"stable_mint";
    pub const AUCTION_VAULT_SEED: &'static [u8] = b"auction_vault";
    pub const RESERVE_VAULT_SEED: &'static [u8] = b"reserve_vault";

    /// Stablecoin decimals, same fixed point as prices
    pub const STABLE_DECIMALS: u8 = 8;

    /// Upper bound on the reserve ratio (50%)
    pub const MAX_RESERVE_RATIO_BPS: u16 = 5_000;

    pub fn apply(&mut self, params: &ConfigParams) {
        self.oracle = params.oracle;
        self.reserve_ratio_bps = params.reserve_ratio_bps;
        self.bid_period = params.bid_period;
        self.emergency_bid_period = params.emergency_bid_period;
        self.reveal_period = params.reveal_period;
        self.settle_period = params.settle_period;
        self.max_price_levels = params.max_price_levels;
        self.max_entries_per_price = params.max_entries_per_price;
        self.paused = params.paused;
    }
}

/// Tunable parameters passed to `initialize` and `update_config`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfigParams {
    pub oracle: Pubkey,
    pub reserve_ratio_bps: u16,
    pub bid_period: i64,
    pub emergency_bid_period: i64,
    pub reveal_period: i64,
    pub settle_period: i64,
    pub max_price_levels: u16,
    pub max_entries_per_price: u16,
    pub paused: bool,
}

impl ConfigParams {
    pub fn validate(&self) -> Result<()> {
        require!(
            self.reserve_ratio_bps <= Config::MAX_RESERVE_RATIO_BPS,
            ConfigError::ReserveRatioTooHigh
        );
        require!(
            self.bid_period > 0
                && self.emergency_bid_period > 0
                && self.emergency_bid_period <= self.bid_period
                && self.reveal_period > 0
                && self.settle_period > 0,
            ConfigError::InvalidPeriod
        );
        require!(
            self.max_price_levels > 0
                && self.max_price_levels as usize <= PriceBoard::MAX_PRICE_LEVELS,
            ConfigError::InvalidCap
        );
        require!(
            self.max_entries_per_price > 0
                && self.max_entries_per_price as usize <= PriceBoard::MAX_ENTRIES_PER_PRICE,
            ConfigError::InvalidCap
        );
        Ok(())
    }
}

impl Default for ConfigParams {
    fn default() -> Self {
        Self {
            oracle: Pubkey::default(),
            reserve_ratio_bps: 1_000,
            bid_period: 86_400,
            emergency_bid_period: 3_600,
            reveal_period: 86_400,
            settle_period: 86_400,
            max_price_levels: PriceBoard::MAX_PRICE_LEVELS as u16,
            max_entries_per_price: PriceBoard::MAX_ENTRIES_PER_PRICE as u16,
            paused: false,
        }
    }
}

#[error_code(offset = 6200)]
pub enum ConfigError {
    #[msg("Reserve ratio cannot exceed 50%")]
    ReserveRatioTooHigh,
    #[msg("Auction periods must be positive and the emergency bid period no longer than the regular one")]
    InvalidPeriod,
    #[msg("Board capacity caps out of range")]
    InvalidCap,
    #[msg("Signer is not authorized for this operation")]
    Unauthorized,
    #[msg("Protocol is paused")]
    ProtocolPaused,
    #[msg("Invalid claim parameters")]
    InvalidClaimParams,
}
