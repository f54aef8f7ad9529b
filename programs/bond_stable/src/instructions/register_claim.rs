//! Claim Registration
//!
//! The admin registers a bond token as lockable collateral. The token mint
//! is the claim ID; strike, maturity and payoff curve come from the bond
//! registry and are stored as given.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::state::{ClaimState, Config, ConfigError};

/// Event emitted when a claim becomes lockable
#[event]
pub struct ClaimRegistered {
    pub claim_mint: Pubkey,
    pub strike_price: u64,
    pub maturity: i64,
    pub payoff_curve_id: u64,
}

#[derive(Accounts)]
pub struct RegisterClaim<'info> {
    #[account(
        mut,
        constraint = admin.key() == config.admin @ ConfigError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    /// Bond token mint
    pub claim_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = admin,
        space = 8 + ClaimState::INIT_SPACE,
        seeds = [ClaimState::SEED, claim_mint.key().as_ref()],
        bump,
    )]
    pub claim_state: Account<'info, ClaimState>,

    /// Vault holding every locked unit of this claim
    #[account(
        init,
        payer = admin,
        token::mint = claim_mint,
        token::authority = config,
        seeds = [ClaimState::VAULT_SEED, claim_mint.key().as_ref()],
        bump,
    )]
    pub claim_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> RegisterClaim<'info> {
    pub fn register_claim(
        &mut self,
        strike_price: u64,
        maturity: i64,
        payoff_curve_id: u64,
        bumps: &RegisterClaimBumps,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        require!(
            strike_price > 0 && maturity > now,
            ConfigError::InvalidClaimParams
        );
        // claim units share the 8-decimal fixed point of prices
        require!(
            self.claim_mint.decimals == Config::STABLE_DECIMALS,
            ConfigError::InvalidClaimParams
        );

        self.claim_state.set_inner(ClaimState {
            claim_mint: self.claim_mint.key(),
            strike_price,
            maturity,
            payoff_curve_id,
            bump: bumps.claim_state,
            ..Default::default()
        });

        emit!(ClaimRegistered {
            claim_mint: self.claim_mint.key(),
            strike_price,
            maturity,
            payoff_curve_id,
        });

        msg!("Claim registered: {}", self.claim_mint.key());
        msg!("Strike: {}, maturity: {}", strike_price, maturity);
        Ok(())
    }
}
