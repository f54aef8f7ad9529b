//! # Settlement & Billing
//!
//! Bidders settle themselves. Each one reports which of its board positions
//! won and which lost, plus the lowest price at which it still wins. The
//! engine never applies that report as given: it recomputes the bidder's
//! true allocation from the board and the end point and rejects any
//! divergence.
//!
//! ```text
//!   charge = Σ ceil(win_portion × price)      over listed winning positions
//!          + ceil(remainder × my_lowest_price) for winning volume left unlisted
//!
//!   refund = revealed escrow − charge
//! ```
//!
//! Only winners at exactly `my_lowest_price` may be left unlisted, so the
//! remainder is always priced at its own bid price. A bidder that reports
//! nothing (`my_lowest_price = None`) takes the lazy path: its whole win is
//! charged at its highest winning price.

use anchor_lang::prelude::*;

use super::{value_at, AuctionError, Clearing};
use crate::state::{Auction, AuctionPhase, BidderLedger, EndInfo, PriceBoard};

/// A position on the board as reported by a bidder
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct BidPosition {
    pub price: u64,
    pub board_index: u16,
}

/// Allocation of one bidder, recomputed from the board
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Claim units won
    pub win_amount: u64,
    /// Stablecoin owed for them
    pub charge: u64,
}

/// What a `bill` call settles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BillOutcome {
    pub win_amount: u64,
    pub charge: u64,
    pub refund: u64,
    /// Billed after the round closed, the win was forfeited
    pub forfeited: bool,
}

pub struct Billing;

impl Billing {
    /// Check a bidder's self-reported partition against the board
    pub fn verify_lowest_price(
        board: &PriceBoard,
        end: &EndInfo,
        bidder: &Pubkey,
        my_lowest_price: u64,
        win_bids: &[BidPosition],
        lose_bids: &[BidPosition],
    ) -> Result<Allocation> {
        let mut seen: Vec<(usize, usize)> = Vec::with_capacity(win_bids.len() + lose_bids.len());
        let mut explained: u64 = 0;
        let mut charge: u64 = 0;

        for pos in win_bids {
            let (price_index, amount) = Self::owned_entry(board, bidder, pos, &mut seen)?;
            let portion = Clearing::win_amount(end, price_index, pos.board_index as usize, amount);
            require!(portion > 0, AuctionError::InvalidClaim);

            explained = explained.checked_add(portion).ok_or(AuctionError::MathOverflow)?;
            charge = charge
                .checked_add(value_at(portion, pos.price)?)
                .ok_or(AuctionError::MathOverflow)?;
        }

        for pos in lose_bids {
            let (price_index, amount) = Self::owned_entry(board, bidder, pos, &mut seen)?;
            let portion = Clearing::win_amount(end, price_index, pos.board_index as usize, amount);
            require!(portion == 0, AuctionError::InvalidClaim);
        }

        let mut true_win: u64 = 0;
        let mut lowest: Option<u64> = None;
        for (price_index, board_index, entry) in board.entries_of(bidder) {
            let price = board.tiers[price_index].price;
            let portion = Clearing::win_amount(end, price_index, board_index, entry.amount);
            if portion > 0 {
                true_win = true_win.checked_add(portion).ok_or(AuctionError::MathOverflow)?;
                lowest = Some(lowest.map_or(price, |l| l.min(price)));
            }
            if !seen.contains(&(price_index, board_index)) {
                // only winners at the reported lowest price may stay unlisted
                require!(
                    portion > 0 && price == my_lowest_price,
                    AuctionError::InvalidClaim
                );
            }
        }
        require!(
            my_lowest_price == lowest.unwrap_or(0),
            AuctionError::InvalidClaim
        );

        let remainder = true_win - explained;
        charge = charge
            .checked_add(value_at(remainder, my_lowest_price)?)
            .ok_or(AuctionError::MathOverflow)?;

        Ok(Allocation {
            win_amount: true_win,
            charge,
        })
    }

    /// Uniform-price fallback for a bidder that reports nothing
    pub fn lazy_allocation(board: &PriceBoard, end: &EndInfo, bidder: &Pubkey) -> Result<Allocation> {
        let mut win_amount: u64 = 0;
        let mut highest: u64 = 0;
        for (price_index, board_index, entry) in board.entries_of(bidder) {
            let portion = Clearing::win_amount(end, price_index, board_index, entry.amount);
            if portion > 0 {
                win_amount = win_amount.checked_add(portion).ok_or(AuctionError::MathOverflow)?;
                highest = highest.max(board.tiers[price_index].price);
            }
        }
        Ok(Allocation {
            win_amount,
            charge: value_at(win_amount, highest)?,
        })
    }

    /// Settle one bidder of `auction`
    pub fn bill(
        auction: &mut Auction,
        board: &PriceBoard,
        ledger: &mut BidderLedger,
        my_lowest_price: Option<u64>,
        win_bids: &[BidPosition],
        lose_bids: &[BidPosition],
        now: i64,
    ) -> Result<BillOutcome> {
        require!(!ledger.billed, AuctionError::AlreadyDone);
        require!(ledger.revealed_amount > 0, AuctionError::NothingToSettle);

        match auction.phase(now) {
            AuctionPhase::Settling => {}
            AuctionPhase::Closed => {
                ledger.billed = true;
                return Ok(BillOutcome {
                    refund: ledger.revealed_escrow,
                    forfeited: true,
                    ..Default::default()
                });
            }
            _ => return err!(AuctionError::NotReady),
        }

        let end = auction.end_info;
        let allocation = match my_lowest_price {
            Some(price) => Self::verify_lowest_price(
                board,
                &end,
                &ledger.bidder,
                price,
                win_bids,
                lose_bids,
            )?,
            None => Self::lazy_allocation(board, &end, &ledger.bidder)?,
        };

        let refund = ledger
            .revealed_escrow
            .checked_sub(allocation.charge)
            .ok_or(AuctionError::MathOverflow)?;
        let rewarded = auction
            .rewarded_amount
            .checked_add(allocation.win_amount)
            .ok_or(AuctionError::MathOverflow)?;
        require!(rewarded <= auction.auction_amount, AuctionError::InvalidClaim);

        auction.rewarded_amount = rewarded;
        auction.total_paid = auction
            .total_paid
            .checked_add(allocation.charge)
            .ok_or(AuctionError::MathOverflow)?;
        ledger.billed = true;

        Ok(BillOutcome {
            win_amount: allocation.win_amount,
            charge: allocation.charge,
            refund,
            forfeited: false,
        })
    }

    /// Resolve a reported position to `(price_index, amount)`, checking it
    /// belongs to `bidder` and was not reported before
    fn owned_entry(
        board: &PriceBoard,
        bidder: &Pubkey,
        pos: &BidPosition,
        seen: &mut Vec<(usize, usize)>,
    ) -> Result<(usize, u64)> {
        let (price_index, entry) = board
            .entry(pos.price, pos.board_index)
            .ok_or(AuctionError::InvalidClaim)?;
        require_keys_eq!(entry.bidder, *bidder, AuctionError::InvalidClaim);

        let key = (price_index, pos.board_index as usize);
        require!(!seen.contains(&key), AuctionError::InvalidClaim);
        seen.push(key);
        Ok((price_index, entry.amount))
    }
}
