//! Price Board
//!
//! Per-auction storage of revealed bids. Each distinct discretized price owns
//! an append-only list of `(bidder, amount)` entries; the position inside
//! that list (the board index) is the reveal order and decides who is filled
//! first at the clearing price.
//!
//! ```text
//!   tiers (descending after sort_price)
//!   ┌──────────┬──────────────────────────────────┐
//!   │ 10.50    │ [A:3] [C:1]                       │
//!   │ 10.00    │ [B:4] [A:2] [D:7]                 │
//!   │  9.80    │ [E:5]                             │
//!   └──────────┴──────────────────────────────────┘
//! ```
//!
//! Both dimensions are capped. Growth of this account is the resource an
//! attacker would exhaust, so every append re-checks the caps first.

use anchor_lang::prelude::*;

use crate::auction::AuctionError;

/// Revealed bid amount at one price
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct BoardEntry {
    pub bidder: Pubkey,
    pub amount: u64,
}

/// All revealed bids at one discretized price
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct PriceTier {
    pub price: u64,
    #[max_len(10)]
    pub entries: Vec<BoardEntry>,
}

/// Board account of one auction round
///
/// Seeds: ["board", auction]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct PriceBoard {
    pub auction: Pubkey,

    /// Set once `sort_price` reordered the tiers
    pub sorted: bool,

    #[max_len(20)]
    pub tiers: Vec<PriceTier>,

    /// PDA bump seed
    pub bump: u8,
}

/// Caps applied to one board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardCaps {
    pub max_price_levels: usize,
    pub max_entries_per_price: usize,
}

impl BoardCaps {
    /// Round caps never exceed the account's capacity
    pub fn new(max_price_levels: u16, max_entries_per_price: u16) -> Self {
        Self {
            max_price_levels: (max_price_levels as usize).min(PriceBoard::MAX_PRICE_LEVELS),
            max_entries_per_price: (max_entries_per_price as usize)
                .min(PriceBoard::MAX_ENTRIES_PER_PRICE),
        }
    }
}

/// Where a revealed bid landed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardPosition {
    pub price: u64,
    pub board_index: u16,
}

impl PriceBoard {
    pub const SEED: &'static [u8] = b"board";

    /// Account capacity, must match the `max_len` attributes above
    pub const MAX_PRICE_LEVELS: usize = 20;
    pub const MAX_ENTRIES_PER_PRICE: usize = 10;

    pub fn tier_index(&self, price: u64) -> Option<usize> {
        self.tiers.iter().position(|t| t.price == price)
    }

    /// Append a bid at `price`. Nothing is written when a cap would be hit.
    pub fn insert(
        &mut self,
        caps: BoardCaps,
        price: u64,
        bidder: Pubkey,
        amount: u64,
    ) -> Result<BoardPosition> {
        require!(!self.sorted, AuctionError::WindowClosed);
        let entry = BoardEntry { bidder, amount };

        match self.tier_index(price) {
            Some(idx) => {
                let tier = &mut self.tiers[idx];
                require!(
                    tier.entries.len() < caps.max_entries_per_price,
                    AuctionError::TooManyBidsAtPrice
                );
                tier.entries.push(entry);
                Ok(BoardPosition {
                    price,
                    board_index: (tier.entries.len() - 1) as u16,
                })
            }
            None => {
                require!(
                    self.tiers.len() < caps.max_price_levels,
                    AuctionError::TooManyPriceLevels
                );
                require!(caps.max_entries_per_price > 0, AuctionError::TooManyBidsAtPrice);
                self.tiers.push(PriceTier {
                    price,
                    entries: vec![entry],
                });
                Ok(BoardPosition {
                    price,
                    board_index: 0,
                })
            }
        }
    }

    /// Reorder the tiers to the caller-supplied descending price list.
    ///
    /// The list must be exactly the board's key set in strictly descending
    /// order. Sorting is left to the caller; checking it here is linear in
    /// the list length plus one lookup per price.
    pub fn apply_sort(&mut self, prices: &[u64]) -> Result<()> {
        require!(!self.sorted, AuctionError::AlreadyDone);
        require!(prices.len() == self.tiers.len(), AuctionError::InvalidOrdering);
        require!(
            prices.windows(2).all(|w| w[0] > w[1]),
            AuctionError::InvalidOrdering
        );

        let mut indices = Vec::with_capacity(prices.len());
        for price in prices {
            let idx = self.tier_index(*price).ok_or(AuctionError::InvalidOrdering)?;
            indices.push(idx);
        }

        let mut unsorted: Vec<Option<PriceTier>> =
            std::mem::take(&mut self.tiers).into_iter().map(Some).collect();
        self.tiers = indices
            .into_iter()
            .filter_map(|idx| unsorted[idx].take())
            .collect();
        self.sorted = true;
        Ok(())
    }

    /// Entry at `(price, board_index)` together with the tier's index
    pub fn entry(&self, price: u64, board_index: u16) -> Option<(usize, &BoardEntry)> {
        let idx = self.tier_index(price)?;
        self.tiers[idx]
            .entries
            .get(board_index as usize)
            .map(|e| (idx, e))
    }

    /// Every entry of `bidder` as `(price_index, board_index, entry)`
    pub fn entries_of<'a>(
        &'a self,
        bidder: &'a Pubkey,
    ) -> impl Iterator<Item = (usize, usize, &'a BoardEntry)> + 'a {
        self.tiers.iter().enumerate().flat_map(move |(pi, tier)| {
            tier.entries
                .iter()
                .enumerate()
                .filter(move |(_, e)| e.bidder == *bidder)
                .map(move |(bi, e)| (pi, bi, e))
        })
    }
}

#[cfg(test)]
impl PriceBoard {
    pub fn total_amount(&self) -> u64 {
        self.tiers
            .iter()
            .flat_map(|t| t.entries.iter())
            .map(|e| e.amount)
            .sum()
    }

    pub fn price_levels(&self) -> usize {
        self.tiers.len()
    }
}
