//! # Clearing Point
//!
//! Walk the sorted board from the highest price down, filling bids in
//! reveal order until the offered amount is used up:
//!
//! ```text
//!   rest = auction_amount
//!   for tier in tiers (descending):
//!       for bid in tier (reveal order):
//!           if rest <= bid.amount:
//!               bid wins `rest`, loses `bid.amount - rest`   ← end point
//!               stop
//!           bid wins in full, rest -= bid.amount
//!   board exhausted → undersold, every bid wins in full
//! ```
//!
//! Everything strictly before the end point wins in full, everything after
//! it loses, and the straddling bid is split for its bidder alone.

use anchor_lang::prelude::*;

use super::AuctionError;
use crate::state::{Auction, AuctionPhase, EndInfo, PriceBoard, PriceTier};

pub struct Clearing;

impl Clearing {
    /// Clearing point of `tiers` (already descending) for `auction_amount`
    pub fn compute_end_info(tiers: &[PriceTier], auction_amount: u64) -> Result<EndInfo> {
        let mut rest = auction_amount;
        let mut sold: u64 = 0;
        let mut last = EndInfo::default();

        for (price_index, tier) in tiers.iter().enumerate() {
            let mut winner_amount_at_end_price: u64 = 0;
            for (board_index, bid) in tier.entries.iter().enumerate() {
                if rest <= bid.amount {
                    winner_amount_at_end_price = winner_amount_at_end_price
                        .checked_add(rest)
                        .ok_or(AuctionError::MathOverflow)?;
                    sold = sold.checked_add(rest).ok_or(AuctionError::MathOverflow)?;
                    return Ok(EndInfo {
                        price_index: price_index as u16,
                        board_index: board_index as u16,
                        lose_amount: bid.amount - rest,
                        winner_amount_at_end_price,
                        end_price: tier.price,
                        sold_amount: sold,
                    });
                }
                winner_amount_at_end_price = winner_amount_at_end_price
                    .checked_add(bid.amount)
                    .ok_or(AuctionError::MathOverflow)?;
                sold = sold.checked_add(bid.amount).ok_or(AuctionError::MathOverflow)?;
                rest -= bid.amount;

                last = EndInfo {
                    price_index: price_index as u16,
                    board_index: board_index as u16,
                    lose_amount: 0,
                    winner_amount_at_end_price,
                    end_price: tier.price,
                    sold_amount: sold,
                };
            }
        }

        // undersold: the end point is the last bid on the board
        Ok(last)
    }

    /// Filled part of the bid at `(price_index, board_index)` with `amount`
    pub fn win_amount(end: &EndInfo, price_index: usize, board_index: usize, amount: u64) -> u64 {
        if end.sold_amount == 0 {
            return 0;
        }
        let end_pos = (end.price_index as usize, end.board_index as usize);
        match (price_index, board_index).cmp(&end_pos) {
            std::cmp::Ordering::Less => amount,
            std::cmp::Ordering::Equal => amount.saturating_sub(end.lose_amount),
            std::cmp::Ordering::Greater => 0,
        }
    }

    /// Verify the caller's descending price list and reorder the board
    pub fn sort_price(
        auction: &mut Auction,
        board: &mut PriceBoard,
        prices: &[u64],
        now: i64,
    ) -> Result<()> {
        match auction.phase(now) {
            AuctionPhase::Bidding | AuctionPhase::Reveal => return err!(AuctionError::NotReady),
            AuctionPhase::Sorting => {}
            AuctionPhase::Closed => return err!(AuctionError::WindowClosed),
            _ => return err!(AuctionError::AlreadyDone),
        }

        board.apply_sort(prices)?;
        auction.done_sort_price = true;
        Ok(())
    }

    /// Compute and freeze the round's end point
    pub fn finalize_winner_amount(
        auction: &mut Auction,
        board: &PriceBoard,
        now: i64,
    ) -> Result<EndInfo> {
        match auction.phase(now) {
            AuctionPhase::Clearing => {}
            AuctionPhase::Settling => return err!(AuctionError::AlreadyDone),
            AuctionPhase::Closed => return err!(AuctionError::WindowClosed),
            _ => return err!(AuctionError::NotReady),
        }
        require!(board.sorted, AuctionError::NotReady);

        let end = Self::compute_end_info(&board.tiers, auction.auction_amount)?;
        auction.end_info = end;
        auction.done_finalize_winner_amount = true;
        Ok(end)
    }
}
