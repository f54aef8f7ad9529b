//! Bid Reveal
//!
//! Opens a sealed bid during the reveal window and appends it to the price
//! board at its discretized price.

use anchor_lang::prelude::*;

use crate::auction::CommitReveal;
use crate::state::{Auction, BidderLedger, PriceBoard};

/// Event emitted when a revealed bid lands on the board
#[event]
pub struct BidInserted {
    pub auction_id: [u8; 32],
    pub bidder: Pubkey,
    pub price: u64,
    pub board_index: u16,
    pub amount: u64,
    /// The revealed price exceeded the window and was clamped
    pub clamped: bool,
}

#[derive(Accounts)]
pub struct RevealBid<'info> {
    pub bidder: Signer<'info>,

    #[account(mut)]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        mut,
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
}

impl<'info> RevealBid<'info> {
    pub fn reveal(&mut self, price: u64, amount: u64, nonce: [u8; 32]) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        let revealed = CommitReveal::reveal(
            &mut self.auction,
            &mut self.board,
            &mut self.bidder_ledger,
            price,
            amount,
            nonce,
            now,
        )?;

        emit!(BidInserted {
            auction_id: self.auction.auction_id,
            bidder: self.bidder.key(),
            price: revealed.position.price,
            board_index: revealed.position.board_index,
            amount: revealed.amount,
            clamped: revealed.clamped,
        });

        Ok(())
    }
}
