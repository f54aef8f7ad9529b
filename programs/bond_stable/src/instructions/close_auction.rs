//! Round Close
//!
//! An undersold round hands its remainder to a restart. A sold-out round
//! settles the generation: the proceeds are burned, lambda absorbs the gap
//! between proceeds and locked value, and pools become returnable.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{burn, Burn, Mint, TokenAccount, TokenInterface};

use crate::auction::{CloseOutcome, Lifecycle};
use crate::state::{Auction, AuctionStatus, ClaimState, Config, Generation, LambdaState};

/// Event emitted when a round closes
#[event]
pub struct AuctionClosed {
    pub auction_id: [u8; 32],
    pub status: AuctionStatus,
    pub rewarded_amount: u64,
    pub remaining_amount: u64,
    pub total_paid: u64,
    pub lambda_at_close: u64,
}

#[derive(Accounts)]
pub struct CloseAuction<'info> {
    pub caller: Signer<'info>,

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
        seeds = [ClaimState::SEED, auction.claim.as_ref()],
        bump = claim_state.bump,
    )]
    pub claim_state: Account<'info, ClaimState>,

    #[account(
        mut,
        seeds = [
            Auction::SEED,
            auction.claim.as_ref(),
            auction.generation.to_le_bytes().as_ref(),
            auction.restart_count.to_le_bytes().as_ref(),
        ],
        bump = auction.bump,
    )]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        mut,
        seeds = [
            Generation::SEED,
            auction.claim.as_ref(),
            auction.generation.to_le_bytes().as_ref(),
        ],
        bump = generation.bump,
    )]
    pub generation: Account<'info, Generation>,

    #[account(
        mut,
        address = config.stable_mint,
    )]
    pub stable_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [Config::AUCTION_VAULT_SEED],
        bump,
    )]
    pub auction_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> CloseAuction<'info> {
    pub fn close_auction(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        let outcome = Lifecycle::close(
            &mut self.auction,
            &mut self.claim_state,
            &mut self.generation,
            &mut self.lambda_state,
            now,
        )?;

        let remaining_amount = match outcome {
            CloseOutcome::Restarted { remaining } => {
                msg!("Round undersold, {} left for round {}", remaining, self.claim_state.next_restart);
                remaining
            }
            CloseOutcome::Finalized {
                burn: proceeds,
                settled_average_price,
                lambda,
            } => {
                if proceeds > 0 {
                    let config_seeds = &[Config::SEED, &[self.config.bump]];
                    let signer_seeds = &[&config_seeds[..]];
                    burn(
                        CpiContext::new_with_signer(
                            self.token_program.to_account_info(),
                            Burn {
                                mint: self.stable_mint.to_account_info(),
                                from: self.auction_vault.to_account_info(),
                                authority: self.config.to_account_info(),
                            },
                            signer_seeds,
                        ),
                        proceeds,
                    )?;
                }
                emit!(lambda.event());
                msg!("Generation settled at average price {}", settled_average_price);
                msg!("Lambda: {} -> {}", lambda.old_lambda, lambda.new_lambda);
                0
            }
        };

        emit!(AuctionClosed {
            auction_id: self.auction.auction_id,
            status: self.auction.status,
            rewarded_amount: self.auction.rewarded_amount,
            remaining_amount,
            total_paid: self.auction.total_paid,
            lambda_at_close: self.auction.lambda_at_close,
        });

        Ok(())
    }
}
