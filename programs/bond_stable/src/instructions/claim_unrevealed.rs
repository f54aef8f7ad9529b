//! Unrevealed bid settlement
//!
//! A sealed bid that was never opened cannot win. Once its round is closed
//! the commitment is settled exactly once: a fixed share of the escrow is
//! burned out of supply and the rest goes back to the bidder.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    burn, transfer_checked, Burn, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::auction::CommitReveal;
use crate::state::{Auction, BidderLedger, Config, LambdaState};

/// Event emitted when an unrevealed commitment is settled
#[event]
pub struct UnrevealedSettled {
    pub auction_id: [u8; 32],
    pub bidder: Pubkey,
    pub secret_hash: [u8; 32],
    pub refund: u64,
    pub withheld: u64,
    pub lambda_at_close: u64,
}

#[derive(Accounts)]
pub struct ClaimUnrevealed<'info> {
    pub bidder: Signer<'info>,

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

    pub auction: Box<Account<'info, Auction>>,

    #[account(
        mut,
        seeds = [BidderLedger::SEED, auction.key().as_ref(), bidder.key().as_ref()],
        bump = bidder_ledger.bump,
    )]
    pub bidder_ledger: Account<'info, BidderLedger>,

    #[account(
        mut,
        address = config.stable_mint,
    )]
    pub stable_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        associated_token::mint = stable_mint,
        associated_token::authority = bidder,
    )]
    pub bidder_stable: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [Config::AUCTION_VAULT_SEED],
        bump,
    )]
    pub auction_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> ClaimUnrevealed<'info> {
    pub fn claim_unrevealed(&mut self, secret_hash: [u8; 32]) -> Result<()> {
        let out = CommitReveal::settle_unrevealed(
            &self.auction,
            &mut self.bidder_ledger,
            &mut self.lambda_state,
            &secret_hash,
        )?;

        let config_seeds = &[Config::SEED, &[self.config.bump]];
        let signer_seeds = &[&config_seeds[..]];

        if out.refund > 0 {
            transfer_checked(
                CpiContext::new_with_signer(
                    self.token_program.to_account_info(),
                    TransferChecked {
                        from: self.auction_vault.to_account_info(),
                        mint: self.stable_mint.to_account_info(),
                        to: self.bidder_stable.to_account_info(),
                        authority: self.config.to_account_info(),
                    },
                    signer_seeds,
                ),
                out.refund,
                self.stable_mint.decimals,
            )?;
        }

        if out.withheld > 0 {
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
                out.withheld,
            )?;
        }

        emit!(UnrevealedSettled {
            auction_id: self.auction.auction_id,
            bidder: self.bidder.key(),
            secret_hash,
            refund: out.refund,
            withheld: out.withheld,
            lambda_at_close: self.auction.lambda_at_close,
        });
        if let Some(change) = out.lambda {
            emit!(change.event());
        }

        msg!("Unrevealed bid settled: refund {}, burned {}", out.refund, out.withheld);
        Ok(())
    }
}
