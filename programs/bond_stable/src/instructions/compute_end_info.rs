//! End point computation
//!
//! Freezes the clearing point of a sorted board. Billing opens afterwards.

use anchor_lang::prelude::*;

use crate::auction::Clearing;
use crate::state::{Auction, PriceBoard};

/// Event emitted once per round with its clearing point
#[event]
pub struct AuctionResult {
    pub auction_id: [u8; 32],
    pub auction_amount: u64,
    pub end_price: u64,
    pub price_index: u16,
    pub board_index: u16,
    pub lose_amount: u64,
    pub winner_amount_at_end_price: u64,
    pub sold_amount: u64,
}

#[derive(Accounts)]
pub struct ComputeEndInfo<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        seeds = [PriceBoard::SEED, auction.key().as_ref()],
        bump = board.bump,
    )]
    pub board: Box<Account<'info, PriceBoard>>,
}

impl<'info> ComputeEndInfo<'info> {
    pub fn compute_end_info(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let end = Clearing::finalize_winner_amount(&mut self.auction, &self.board, now)?;

        emit!(AuctionResult {
            auction_id: self.auction.auction_id,
            auction_amount: self.auction.auction_amount,
            end_price: end.end_price,
            price_index: end.price_index,
            board_index: end.board_index,
            lose_amount: end.lose_amount,
            winner_amount_at_end_price: end.winner_amount_at_end_price,
            sold_amount: end.sold_amount,
        });

        msg!("End price: {}, sold {}", end.end_price, end.sold_amount);
        Ok(())
    }
}
