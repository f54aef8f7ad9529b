//! Board sort
//!
//! Anyone may submit the board's prices in descending order once the reveal
//! window is over. The list is verified, not trusted.

use anchor_lang::prelude::*;

use crate::auction::Clearing;
use crate::state::{Auction, PriceBoard};

#[derive(Accounts)]
pub struct SortPrice<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        mut,
        seeds = [PriceBoard::SEED, auction.key().as_ref()],
        bump = board.bump,
    )]
    pub board: Box<Account<'info, PriceBoard>>,
}

impl<'info> SortPrice<'info> {
    pub fn sort_price(&mut self, prices: Vec<u64>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        Clearing::sort_price(&mut self.auction, &mut self.board, &prices, now)?;

        msg!("Board sorted: {} price levels", prices.len());
        Ok(())
    }
}
