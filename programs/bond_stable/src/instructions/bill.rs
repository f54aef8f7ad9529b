//! Bidder Settlement
//!
//! Each bidder bills itself after the end point is known. The engine checks
//! the self-reported partition against the board, keeps the charge in the
//! auction vault, refunds the rest of the escrow and delivers the won claim
//! units.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

use crate::auction::{BidPosition, Billing};
use crate::state::{Auction, BidderLedger, ClaimState, Config, PriceBoard};

/// Event emitted when a bidder settles
#[event]
pub struct BidBilled {
    pub auction_id: [u8; 32],
    pub bidder: Pubkey,
    pub win_amount: u64,
    pub charge: u64,
    pub refund: u64,
    pub forfeited: bool,
}

#[derive(Accounts)]
pub struct BillBidder<'info> {
    #[account(mut)]
    pub bidder: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        seeds = [PriceBoard::SEED, auction.key().as_ref()],
        bump = board.bump,
    )]
    pub board: Box<Account<'info, PriceBoard>>,

    #[account(
        mut,
        seeds = [BidderLedger::SEED, auction.key().as_ref(), bidder.key().as_ref()],
        bump = bidder_ledger.bump,
    )]
    pub bidder_ledger: Account<'info, BidderLedger>,

    #[account(address = auction.claim)]
    pub claim_mint: InterfaceAccount<'info, Mint>,

    #[account(address = config.stable_mint)]
    pub stable_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        associated_token::mint = stable_mint,
        associated_token::authority = bidder,
    )]
    pub bidder_stable: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = bidder,
        associated_token::mint = claim_mint,
        associated_token::authority = bidder,
    )]
    pub bidder_claim: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [Config::AUCTION_VAULT_SEED],
        bump,
    )]
    pub auction_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [ClaimState::VAULT_SEED, claim_mint.key().as_ref()],
        bump,
    )]
    pub claim_vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> BillBidder<'info> {
    pub fn bill(
        &mut self,
        my_lowest_price: Option<u64>,
        win_bids: Vec<BidPosition>,
        lose_bids: Vec<BidPosition>,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        let out = Billing::bill(
            &mut self.auction,
            &self.board,
            &mut self.bidder_ledger,
            my_lowest_price,
            &win_bids,
            &lose_bids,
            now,
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

        if out.win_amount > 0 {
            transfer_checked(
                CpiContext::new_with_signer(
                    self.token_program.to_account_info(),
                    TransferChecked {
                        from: self.claim_vault.to_account_info(),
                        mint: self.claim_mint.to_account_info(),
                        to: self.bidder_claim.to_account_info(),
                        authority: self.config.to_account_info(),
                    },
                    signer_seeds,
                ),
                out.win_amount,
                self.claim_mint.decimals,
            )?;
        }

        emit!(BidBilled {
            auction_id: self.auction.auction_id,
            bidder: self.bidder.key(),
            win_amount: out.win_amount,
            charge: out.charge,
            refund: out.refund,
            forfeited: out.forfeited,
        });

        if out.forfeited {
            msg!("Billed after close, escrow refunded");
        } else {
            msg!("Won {} for {}, refunded {}", out.win_amount, out.charge, out.refund);
        }
        Ok(())
    }
}
