//! Protocol Initialization
//!
//! Creates the global configuration, the lambda ledger, the stablecoin mint
//! and the two program-owned stablecoin vaults:
//! - `auction_vault` holds bidder escrow and auction proceeds
//! - `reserve_vault` holds the pooled share of every mint

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::state::{Config, ConfigParams, LambdaState};

/// Accounts required for protocol initialization
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Protocol administrator (becomes the admin)
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Global configuration account (created)
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [Config::SEED],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Global lambda ledger (created)
    #[account(
        init,
        payer = admin,
        space = 8 + LambdaState::INIT_SPACE,
        seeds = [LambdaState::SEED],
        bump,
    )]
    pub lambda_state: Account<'info, LambdaState>,

    /// Stablecoin mint, minted only by the config PDA
    #[account(
        init,
        payer = admin,
        mint::decimals = Config::STABLE_DECIMALS,
        mint::authority = config,
        seeds = [Config::STABLE_MINT_SEED],
        bump,
    )]
    pub stable_mint: InterfaceAccount<'info, Mint>,

    /// Escrow and proceeds vault
    #[account(
        init,
        payer = admin,
        token::mint = stable_mint,
        token::authority = config,
        seeds = [Config::AUCTION_VAULT_SEED],
        bump,
    )]
    pub auction_vault: InterfaceAccount<'info, TokenAccount>,

    /// Pooled reserve vault
    #[account(
        init,
        payer = admin,
        token::mint = stable_mint,
        token::authority = config,
        seeds = [Config::RESERVE_VAULT_SEED],
        bump,
    )]
    pub reserve_vault: InterfaceAccount<'info, TokenAccount>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Initialize<'info> {
    pub fn initialize(&mut self, params: ConfigParams, bumps: &InitializeBumps) -> Result<()> {
        params.validate()?;

        let mut config = Config {
            admin: self.admin.key(),
            stable_mint: self.stable_mint.key(),
            bump: bumps.config,
            ..Default::default()
        };
        config.apply(&params);
        self.config.set_inner(config);
        self.lambda_state.init(bumps.lambda_state);

        msg!("Protocol initialized!");
        msg!("Admin: {}", self.admin.key());
        msg!("Oracle: {}", params.oracle);
        msg!("Stablecoin: {}", self.stable_mint.key());
        msg!("Reserve ratio: {} bps", params.reserve_ratio_bps);

        Ok(())
    }
}
