//! Pool Return
//!
//! After a generation settles, each minter trues up its pools:
//!
//! ```text
//!   back    = clamp(average_price × locked − obtained, 0, pooled)
//!   forfeit = pooled − back   (burned, lowers supply)
//! ```
//!
//! Pools are passed as `remaining_accounts` in `(pool, generation)` pairs,
//! one pair per entry of `pool_ids`.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{
        burn, transfer_checked, Burn, Mint, TokenAccount, TokenInterface, TransferChecked,
    },
};

use crate::ledger::{Collateral, LambdaChange, LedgerError};
use crate::state::{pool_id, Config, Generation, LambdaState, Pool};

/// Upper bound on pools per call
pub const MAX_POOLS_PER_RETURN: usize = 8;

/// Event emitted per returned pool
#[event]
pub struct PoolReturned {
    pub pool_id: [u8; 32],
    pub minter: Pubkey,
    pub back: u64,
    pub forfeit: u64,
    pub settled_average_price: u64,
}

#[derive(Accounts)]
pub struct ReturnLockedPool<'info> {
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
        address = config.stable_mint,
    )]
    pub stable_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        payer = minter,
        associated_token::mint = stable_mint,
        associated_token::authority = minter,
    )]
    pub minter_stable: InterfaceAccount<'info, TokenAccount>,

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

impl<'info> ReturnLockedPool<'info> {
    pub fn return_locked_pool(
        &mut self,
        pool_ids: Vec<[u8; 32]>,
        remaining_accounts: &'info [AccountInfo<'info>],
    ) -> Result<()> {
        require!(
            !pool_ids.is_empty() && pool_ids.len() <= MAX_POOLS_PER_RETURN,
            LedgerError::InvalidPool
        );
        require!(
            remaining_accounts.len() == pool_ids.len() * 2,
            LedgerError::InvalidPool
        );

        let mut total_back: u64 = 0;
        let mut total_forfeit: u64 = 0;
        let mut last_change: Option<LambdaChange> = None;

        for (id, pair) in pool_ids.iter().zip(remaining_accounts.chunks(2)) {
            require!(pair[0].is_writable, LedgerError::InvalidPool);
            let mut pool: Account<'info, Pool> = Account::try_from(&pair[0])?;
            let generation: Account<'info, Generation> = Account::try_from(&pair[1])?;

            // both accounts must be the PDAs of this minter's pool id
            let (expected_pool, _) = Pubkey::find_program_address(
                &[
                    Pool::SEED,
                    self.minter.key().as_ref(),
                    pool.claim.as_ref(),
                    pool.generation.to_le_bytes().as_ref(),
                ],
                &crate::ID,
            );
            let (expected_generation, _) = Pubkey::find_program_address(
                &[
                    Generation::SEED,
                    generation.claim.as_ref(),
                    generation.generation.to_le_bytes().as_ref(),
                ],
                &crate::ID,
            );
            require_keys_eq!(expected_pool, pool.key(), LedgerError::InvalidPool);
            require_keys_eq!(expected_generation, generation.key(), LedgerError::InvalidPool);
            require!(
                pool.pool_id == *id && pool_id(&generation.claim, generation.generation) == *id,
                LedgerError::InvalidPool
            );

            let out = Collateral::return_pool(&mut pool, &generation, &mut self.lambda_state)?;
            pool.exit(&crate::ID)?;

            total_back = total_back
                .checked_add(out.back)
                .ok_or(LedgerError::MathOverflow)?;
            total_forfeit = total_forfeit
                .checked_add(out.forfeit)
                .ok_or(LedgerError::MathOverflow)?;
            if out.lambda.is_some() {
                last_change = out.lambda;
            }

            emit!(PoolReturned {
                pool_id: *id,
                minter: self.minter.key(),
                back: out.back,
                forfeit: out.forfeit,
                settled_average_price: generation.settled_average_price,
            });
        }

        let config_seeds = &[Config::SEED, &[self.config.bump]];
        let signer_seeds = &[&config_seeds[..]];

        if total_back > 0 {
            transfer_checked(
                CpiContext::new_with_signer(
                    self.token_program.to_account_info(),
                    TransferChecked {
                        from: self.reserve_vault.to_account_info(),
                        mint: self.stable_mint.to_account_info(),
                        to: self.minter_stable.to_account_info(),
                        authority: self.config.to_account_info(),
                    },
                    signer_seeds,
                ),
                total_back,
                self.stable_mint.decimals,
            )?;
        }

        if total_forfeit > 0 {
            burn(
                CpiContext::new_with_signer(
                    self.token_program.to_account_info(),
                    Burn {
                        mint: self.stable_mint.to_account_info(),
                        from: self.reserve_vault.to_account_info(),
                        authority: self.config.to_account_info(),
                    },
                    signer_seeds,
                ),
                total_forfeit,
            )?;
        }

        if let Some(change) = last_change {
            emit!(change.event());
        }

        msg!("Returned {} pools: back {}, burned {}", pool_ids.len(), total_back, total_forfeit);
        Ok(())
    }
}
