//! Collateral Locking (mint)
//!
//! A minter deposits claim units and receives stablecoin worth
//! `amount × strike × λ`. The reserve share of that amount is minted into
//! the reserve vault and credited to the minter's pool for this generation.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{
        mint_to, transfer_checked, Mint, MintTo, TokenAccount, TokenInterface, TransferChecked,
    },
};

use crate::ledger::Collateral;
use crate::state::{ClaimState, Config, ConfigError, LambdaState, Pool};

/// Event emitted when collateral is locked
#[event]
pub struct CollateralLocked {
    pub claim_mint: Pubkey,
    pub minter: Pubkey,
    pub generation: u32,
    pub amount: u64,
    pub value: u64,
    pub obtained: u64,
    pub pooled: u64,
}

#[derive(Accounts)]
pub struct LockCollateral<'info> {
    #[account(mut)]
    pub minter: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [LambdaState::SEED],
        bump = lambda_state.bump,
    )]
    pub lambda_state: Account<'info, LambdaState>,

    #[account(
        mut,
        seeds = [ClaimState::SEED, claim_mint.key().as_ref()],
        bump = claim_state.bump,
    )]
    pub claim_state: Account<'info, ClaimState>,

    pub claim_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        address = config.stable_mint,
    )]
    pub stable_mint: InterfaceAccount<'info, Mint>,

    /// Minter's pool for the claim's current generation
    #[account(
        init_if_needed,
        payer = minter,
        space = 8 + Pool::INIT_SPACE,
        seeds = [
            Pool::SEED,
            minter.key().as_ref(),
            claim_mint.key().as_ref(),
            claim_state.generation.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        associated_token::mint = claim_mint,
        associated_token::authority = minter,
    )]
    pub minter_claim: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = minter,
        associated_token::mint = stable_mint,
        associated_token::authority = minter,
    )]
    pub minter_stable: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [ClaimState::VAULT_SEED, claim_mint.key().as_ref()],
        bump,
    )]
    pub claim_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [Config::RESERVE_VAULT_SEED],
        bump,
    )]
    pub reserve_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> LockCollateral<'info> {
    pub fn lock(&mut self, amount: u64, bumps: &LockCollateralBumps) -> Result<()> {
        require!(!self.config.paused, ConfigError::ProtocolPaused);
        let now = Clock::get()?.unix_timestamp;

        let out = Collateral::lock(
            &mut self.claim_state,
            &mut self.pool,
            &mut self.lambda_state,
            self.minter.key(),
            self.config.reserve_ratio_bps,
            amount,
            now,
        )?;
        self.pool.bump = bumps.pool;

        transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.minter_claim.to_account_info(),
                    mint: self.claim_mint.to_account_info(),
                    to: self.claim_vault.to_account_info(),
                    authority: self.minter.to_account_info(),
                },
            ),
            amount,
            self.claim_mint.decimals,
        )?;

        let config_seeds = &[Config::SEED, &[self.config.bump]];
        let signer_seeds = &[&config_seeds[..]];

        mint_to(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                MintTo {
                    mint: self.stable_mint.to_account_info(),
                    to: self.minter_stable.to_account_info(),
                    authority: self.config.to_account_info(),
                },
                signer_seeds,
            ),
            out.obtained,
        )?;

        if out.pooled > 0 {
            mint_to(
                CpiContext::new_with_signer(
                    self.token_program.to_account_info(),
                    MintTo {
                        mint: self.stable_mint.to_account_info(),
                        to: self.reserve_vault.to_account_info(),
                        authority: self.config.to_account_info(),
                    },
                    signer_seeds,
                ),
                out.pooled,
            )?;
        }

        emit!(CollateralLocked {
            claim_mint: self.claim_mint.key(),
            minter: self.minter.key(),
            generation: self.claim_state.generation,
            amount,
            value: out.value,
            obtained: out.obtained,
            pooled: out.pooled,
        });
        emit!(out.lambda.event());

        msg!("Locked {} units, minted {} (pooled {})", amount, out.minted, out.pooled);
        Ok(())
    }
}
