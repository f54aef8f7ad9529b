//! Admin parameter updates

use anchor_lang::prelude::*;

use crate::state::{Config, ConfigError, ConfigParams};

/// Event emitted when the admin changes protocol parameters
#[event]
pub struct ConfigUpdated {
    pub admin: Pubkey,
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

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        constraint = admin.key() == config.admin @ ConfigError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,
}

impl<'info> UpdateConfig<'info> {
    /// Replace every tunable at once; running rounds keep their own copies
    pub fn update_config(&mut self, params: ConfigParams) -> Result<()> {
        params.validate()?;
        self.config.apply(&params);

        emit!(ConfigUpdated {
            admin: self.admin.key(),
            oracle: params.oracle,
            reserve_ratio_bps: params.reserve_ratio_bps,
            bid_period: params.bid_period,
            emergency_bid_period: params.emergency_bid_period,
            reveal_period: params.reveal_period,
            settle_period: params.settle_period,
            max_price_levels: params.max_price_levels,
            max_entries_per_price: params.max_entries_per_price,
            paused: params.paused,
        });

        msg!("Config updated, paused: {}", params.paused);
        Ok(())
    }
}
