//! Auction Round State
//!
//! One account per round. A restart never mutates the previous round; it
//! opens a new account with `restart_count + 1`.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

use crate::state::BoardCaps;

/// Auction round account
///
/// Seeds: ["auction", claim_mint, generation, restart_count]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Auction {
    /// keccak(claim_mint, generation, restart_count)
    pub auction_id: [u8; 32],

    /// Claim mint being liquidated
    pub claim: Pubkey,

    pub generation: u32,

    /// 0 for the first round of a generation
    pub restart_count: u16,

    /// Started by the risk predicate rather than maturity
    pub emergency: bool,

    pub started_at: i64,

    /// Commits are accepted strictly before this time
    pub bid_deadline: i64,

    /// Reveals are accepted in `[bid_deadline, reveal_deadline)`
    pub reveal_deadline: i64,

    /// The round may be closed from this time on
    pub closing_time: i64,

    /// Strike × lambda, the center of every round's window
    pub strike_equivalent_price: u64,

    pub lower_price: u64,
    pub upper_price: u64,

    pub max_price_levels: u16,
    pub max_entries_per_price: u16,

    /// Claim units offered in this round
    pub auction_amount: u64,

    /// Claim units handed to billed winners
    pub rewarded_amount: u64,

    /// Claim units revealed on the board
    pub total_bid_amount: u64,

    /// Stablecoin charged to billed winners
    pub total_paid: u64,

    pub done_sort_price: bool,
    pub done_finalize_winner_amount: bool,

    pub end_info: EndInfo,

    pub status: AuctionStatus,

    /// Lambda in force when the round closed
    pub lambda_at_close: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl Auction {
    pub const SEED: &'static [u8] = b"auction";

    pub fn phase(&self, now: i64) -> AuctionPhase {
        if self.status != AuctionStatus::Open {
            AuctionPhase::Closed
        } else if now < self.bid_deadline {
            AuctionPhase::Bidding
        } else if now < self.reveal_deadline {
            AuctionPhase::Reveal
        } else if !self.done_sort_price {
            AuctionPhase::Sorting
        } else if !self.done_finalize_winner_amount {
            AuctionPhase::Clearing
        } else {
            AuctionPhase::Settling
        }
    }

    pub fn board_caps(&self) -> BoardCaps {
        BoardCaps::new(self.max_price_levels, self.max_entries_per_price)
    }

    pub fn is_closed(&self) -> bool {
        self.status != AuctionStatus::Open
    }
}

/// Auction ID of `(claim, generation, restart_count)`
pub fn auction_id(claim_mint: &Pubkey, generation: u32, restart_count: u16) -> [u8; 32] {
    keccak::hashv(&[
        claim_mint.as_ref(),
        &generation.to_le_bytes(),
        &restart_count.to_le_bytes(),
    ])
    .0
}

/// Persistent status of a round
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum AuctionStatus {
    #[default]
    Open,
    /// Closed undersold; the remainder goes to the next round
    Restarted,
    /// Closed fully sold
    Finalized,
}

/// Phase derived from the clock and the done-flags
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuctionPhase {
    Bidding,
    Reveal,
    /// Waiting for `sort_price`
    Sorting,
    /// Waiting for `compute_end_info`
    Clearing,
    /// Winners are billing
    Settling,
    Closed,
}

/// Clearing point of a round, computed once
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct EndInfo {
    /// Index of the clearing tier in the descending board
    pub price_index: u16,

    /// Index of the straddling bid inside the clearing tier
    pub board_index: u16,

    /// Unfilled part of the straddling bid
    pub lose_amount: u64,

    /// Filled amount of the clearing tier
    pub winner_amount_at_end_price: u64,

    /// Price of the clearing tier (0 on an empty board)
    pub end_price: u64,

    /// Total filled amount; below the offered amount when undersold
    pub sold_amount: u64,
}
