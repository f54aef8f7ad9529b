//! Bidder Ledger
//!
//! Commitments and escrow of one bidder in one auction round. The price and
//! amount of a commitment stay hidden until the bidder reveals them.

use anchor_lang::prelude::*;

/// Per-bidder, per-round account
///
/// Seeds: ["bidder", auction, bidder]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct BidderLedger {
    pub auction: Pubkey,

    pub bidder: Pubkey,

    #[max_len(8)]
    pub commitments: Vec<Commitment>,

    /// Σ amount of revealed commitments
    pub revealed_amount: u64,

    /// Σ escrow of revealed commitments, refunded less the charge on billing
    pub revealed_escrow: u64,

    pub billed: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl BidderLedger {
    pub const SEED: &'static [u8] = b"bidder";

    pub const MAX_COMMITMENTS: usize = 8;

    pub fn find(&self, secret_hash: &[u8; 32]) -> Option<usize> {
        self.commitments
            .iter()
            .position(|c| c.secret_hash == *secret_hash)
    }
}

/// Sealed bid
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct Commitment {
    /// keccak(auction_id ‖ price ‖ amount ‖ nonce)
    pub secret_hash: [u8; 32],

    /// Largest amount the reveal may carry
    pub max_amount: u64,

    /// Stablecoin pulled at commit, sized at the round's upper price
    pub escrow: u64,

    pub status: BidStatus,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum BidStatus {
    #[default]
    Pending,
    Revealed,
    SettledUnrevealed,
}
