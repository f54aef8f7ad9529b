//! Sealed Bid (commit)
//!
//! The bidder submits only `keccak(auction_id ‖ price ‖ amount ‖ nonce)` and
//! the largest amount it might reveal. Escrow for that amount at the round's
//! upper price moves into the auction vault.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::auction::CommitReveal;
use crate::state::{Auction, BidderLedger, Config, ConfigError};

/// Event emitted for every sealed bid
#[event]
pub struct BidCommitted {
    pub auction_id: [u8; 32],
    pub bidder: Pubkey,
    pub secret_hash: [u8; 32],
    pub escrow: u64,
    pub memo: String,
}

#[derive(Accounts)]
pub struct PlaceBid<'info> {
    #[account(mut)]
    pub bidder: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    pub auction: Box<Account<'info, Auction>>,

    #[account(
        init_if_needed,
        payer = bidder,
        space = 8 + BidderLedger::INIT_SPACE,
        seeds = [BidderLedger::SEED, auction.key().as_ref(), bidder.key().as_ref()],
        bump,
    )]
    pub bidder_ledger: Account<'info, BidderLedger>,

    #[account(address = config.stable_mint)]
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
    pub system_program: Program<'info, System>,
}

impl<'info> PlaceBid<'info> {
    pub fn bid(
        &mut self,
        secret_hash: [u8; 32],
        claimed_amount: u64,
        memo: String,
        bumps: &PlaceBidBumps,
    ) -> Result<()> {
        require!(!self.config.paused, ConfigError::ProtocolPaused);
        let now = Clock::get()?.unix_timestamp;

        if self.bidder_ledger.auction == Pubkey::default() {
            self.bidder_ledger.auction = self.auction.key();
            self.bidder_ledger.bidder = self.bidder.key();
            self.bidder_ledger.bump = bumps.bidder_ledger;
        }

        let escrow = CommitReveal::commit(
            &self.auction,
            &mut self.bidder_ledger,
            secret_hash,
            claimed_amount,
            &memo,
            now,
        )?;

        transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.bidder_stable.to_account_info(),
                    mint: self.stable_mint.to_account_info(),
                    to: self.auction_vault.to_account_info(),
                    authority: self.bidder.to_account_info(),
                },
            ),
            escrow,
            self.stable_mint.decimals,
        )?;

        emit!(BidCommitted {
            auction_id: self.auction.auction_id,
            bidder: self.bidder.key(),
            secret_hash,
            escrow,
            memo,
        });

        Ok(())
    }
}
