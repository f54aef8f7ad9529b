//! # Commit-Reveal Bid Store
//!
//! ```text
//!   commit:  secret_hash = keccak(auction_id ‖ price ‖ amount ‖ nonce)
//!            escrow      = ceil(claimed_amount × upper_price)
//!
//!   reveal:  keccak(auction_id ‖ price ‖ amount ‖ nonce) must equal a
//!            pending commitment, then the bid goes on the board at
//!            discretize(price)
//! ```
//!
//! Nothing about price or amount is observable before the reveal. A
//! commitment that is never revealed keeps its escrow until the round
//! closes. It is then settled exactly once against the lambda recorded at
//! close: `UNREVEALED_PENALTY_BPS` of the escrow is withheld and leaves the
//! supply, the rest is refunded.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

use super::{value_at, AuctionError, Discretizer, Rounding, BPS};
use crate::ledger::LambdaChange;
use crate::state::{
    Auction, AuctionPhase, BidStatus, BidderLedger, BoardPosition, Commitment, LambdaState,
    PriceBoard,
};

/// Longest memo accepted with a commitment, bytes
pub const MAX_MEMO_LEN: usize = 64;

/// Share of an unrevealed escrow that is withheld and burned (10%)
pub const UNREVEALED_PENALTY_BPS: u64 = 1_000;

/// Hash a bidder commits to
pub fn bid_secret_hash(auction_id: &[u8; 32], price: u64, amount: u64, nonce: &[u8; 32]) -> [u8; 32] {
    keccak::hashv(&[
        auction_id.as_ref(),
        &price.to_le_bytes(),
        &amount.to_le_bytes(),
        nonce.as_ref(),
    ])
    .0
}

/// Outcome of a successful reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Revealed {
    pub position: BoardPosition,
    pub amount: u64,
    /// The price was above the window and got clamped to its upper bound
    pub clamped: bool,
}

/// Outcome of settling a never-revealed commitment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnrevealedSettlement {
    pub escrow: u64,
    pub refund: u64,
    /// Burned from the auction vault
    pub withheld: u64,
    pub lambda: Option<LambdaChange>,
}

pub struct CommitReveal;

impl CommitReveal {
    /// Record a sealed bid and return the escrow to pull from the bidder
    pub fn commit(
        auction: &Auction,
        ledger: &mut BidderLedger,
        secret_hash: [u8; 32],
        claimed_amount: u64,
        memo: &str,
        now: i64,
    ) -> Result<u64> {
        require!(
            auction.phase(now) == AuctionPhase::Bidding,
            AuctionError::WindowClosed
        );
        require!(claimed_amount > 0, AuctionError::ZeroAmount);
        require!(memo.len() <= MAX_MEMO_LEN, AuctionError::MemoTooLong);
        require!(
            ledger.find(&secret_hash).is_none(),
            AuctionError::DuplicateSecret
        );
        require!(
            ledger.commitments.len() < BidderLedger::MAX_COMMITMENTS,
            AuctionError::TooManyCommitments
        );

        let escrow = value_at(claimed_amount, auction.upper_price)?;
        ledger.commitments.push(Commitment {
            secret_hash,
            max_amount: claimed_amount,
            escrow,
            status: BidStatus::Pending,
        });
        Ok(escrow)
    }

    /// Verify a reveal against the stored commitments and insert the bid
    pub fn reveal(
        auction: &mut Auction,
        board: &mut PriceBoard,
        ledger: &mut BidderLedger,
        price: u64,
        amount: u64,
        nonce: [u8; 32],
        now: i64,
    ) -> Result<Revealed> {
        require!(
            auction.phase(now) == AuctionPhase::Reveal,
            AuctionError::WindowClosed
        );

        let secret_hash = bid_secret_hash(&auction.auction_id, price, amount, &nonce);
        let idx = ledger
            .find(&secret_hash)
            .ok_or(AuctionError::SecretMismatch)?;
        let commitment = ledger.commitments[idx];
        require!(
            commitment.status == BidStatus::Pending,
            AuctionError::AlreadyDone
        );
        require!(amount > 0, AuctionError::ZeroAmount);
        require!(
            amount <= commitment.max_amount,
            AuctionError::AmountExceedsEscrow
        );

        let gridded = Discretizer::discretize(price, Rounding::Down)?;
        require!(gridded >= auction.lower_price, AuctionError::PriceOutOfWindow);
        let clamped = gridded > auction.upper_price;
        let board_price = gridded.min(auction.upper_price);

        let revealed_amount = ledger
            .revealed_amount
            .checked_add(amount)
            .ok_or(AuctionError::MathOverflow)?;
        let revealed_escrow = ledger
            .revealed_escrow
            .checked_add(commitment.escrow)
            .ok_or(AuctionError::MathOverflow)?;
        let total_bid_amount = auction
            .total_bid_amount
            .checked_add(amount)
            .ok_or(AuctionError::MathOverflow)?;

        // the board checks its caps before writing anything
        let position = board.insert(auction.board_caps(), board_price, ledger.bidder, amount)?;

        ledger.commitments[idx].status = BidStatus::Revealed;
        ledger.revealed_amount = revealed_amount;
        ledger.revealed_escrow = revealed_escrow;
        auction.total_bid_amount = total_bid_amount;

        Ok(Revealed {
            position,
            amount,
            clamped,
        })
    }

    /// Settle a never-revealed commitment once the round is closed
    pub fn settle_unrevealed(
        auction: &Auction,
        ledger: &mut BidderLedger,
        lambda: &mut LambdaState,
        secret_hash: &[u8; 32],
    ) -> Result<UnrevealedSettlement> {
        require!(
            auction.is_closed() && auction.lambda_at_close > 0,
            AuctionError::NotReady
        );
        let idx = ledger
            .find(secret_hash)
            .filter(|i| ledger.commitments[*i].status == BidStatus::Pending)
            .ok_or(AuctionError::SecretNotFound)?;

        let escrow = ledger.commitments[idx].escrow;
        let withheld = unrevealed_penalty(escrow)?;
        let change = if withheld > 0 {
            Some(lambda.decrease(0, withheld)?)
        } else {
            None
        };

        ledger.commitments[idx].status = BidStatus::SettledUnrevealed;
        Ok(UnrevealedSettlement {
            escrow,
            refund: escrow - withheld,
            withheld,
            lambda: change,
        })
    }
}

/// `ceil(escrow × UNREVEALED_PENALTY_BPS / BPS)`, never above the escrow
pub fn unrevealed_penalty(escrow: u64) -> Result<u64> {
    let share = (escrow as u128)
        .checked_mul(UNREVEALED_PENALTY_BPS as u128)
        .ok_or(AuctionError::MathOverflow)?
        .checked_add(BPS as u128 - 1)
        .ok_or(AuctionError::MathOverflow)?
        / BPS as u128;
    Ok(u64::try_from(share)
        .map_err(|_| error!(AuctionError::MathOverflow))?
        .min(escrow))
}
