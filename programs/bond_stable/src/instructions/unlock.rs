//! Collateral Unlocking (redeem)
//!
//! Any stablecoin holder burns `burn_amount` and receives the claim units it
//! backs at the current lambda. A holder that also minted against this
//! generation passes its pool and gets the matching reserve share back.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{
        burn, transfer_checked, Burn, Mint, TokenAccount, TokenInterface, TransferChecked,
    },
};

use crate::ledger::Collateral;
use crate::state::{ClaimState, Config, LambdaState, Pool};

/// Event emitted when collateral is unlocked
#[event]
pub struct CollateralUnlocked {
    pub claim_mint: Pubkey,
    pub holder: Pubkey,
    pub burned: u64,
    pub unlocked: u64,
    pub value: u64,
    pub pooled_release: u64,
}

#[derive(Accounts)]
pub struct UnlockCollateral<'info> {
    #[account(mut)]
    pub holder: Signer<'info>,

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

    /// Holder's own pool for the current generation, if any
    #[account(
        mut,
        seeds = [
            Pool::SEED,
            holder.key().as_ref(),
            claim_mint.key().as_ref(),
            claim_state.generation.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub pool: Option<Account<'info, Pool>>,

    #[account(
        mut,
        associated_token::mint = stable_mint,
        associated_token::authority = holder,
    )]
    pub holder_stable: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = holder,
        associated_token::mint = claim_mint,
        associated_token::authority = holder,
    )]
    pub holder_claim: InterfaceAccount<'info, TokenAccount>,

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

impl<'info> UnlockCollateral<'info> {
    pub fn unlock(&mut self, burn_amount: u64) -> Result<()> {
        let out = Collateral::unlock(
            &mut self.claim_state,
            self.pool.as_deref_mut(),
            &mut self.lambda_state,
            burn_amount,
        )?;

        burn(
            CpiContext::new(
                self.token_program.to_account_info(),
                Burn {
                    mint: self.stable_mint.to_account_info(),
                    from: self.holder_stable.to_account_info(),
                    authority: self.holder.to_account_info(),
                },
            ),
            burn_amount,
        )?;

        let config_seeds = &[Config::SEED, &[self.config.bump]];
        let signer_seeds = &[&config_seeds[..]];

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.claim_vault.to_account_info(),
                    mint: self.claim_mint.to_account_info(),
                    to: self.holder_claim.to_account_info(),
                    authority: self.config.to_account_info(),
                },
                signer_seeds,
            ),
            out.unlocked,
            self.claim_mint.decimals,
        )?;

        if out.pooled_release > 0 {
            transfer_checked(
                CpiContext::new_with_signer(
                    self.token_program.to_account_info(),
                    TransferChecked {
                        from: self.reserve_vault.to_account_info(),
                        mint: self.stable_mint.to_account_info(),
                        to: self.holder_stable.to_account_info(),
                        authority: self.config.to_account_info(),
                    },
                    signer_seeds,
                ),
                out.pooled_release,
                self.stable_mint.decimals,
            )?;
        }

        emit!(CollateralUnlocked {
            claim_mint: self.claim_mint.key(),
            holder: self.holder.key(),
            burned: burn_amount,
            unlocked: out.unlocked,
            value: out.value_delta,
            pooled_release: out.pooled_release,
        });
        emit!(out.lambda.event());

        msg!("Unlocked {} units for {} burned", out.unlocked, burn_amount);
        Ok(())
    }
}
