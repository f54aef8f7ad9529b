//! Auction Start
//!
//! Opens the next round for a claim. The first round of a generation is
//! triggered either by maturity (anyone, once `now >= maturity`) or by the
//! risk predicate (the configured oracle, at any time). A pending restart
//! can be opened by anyone.

use anchor_lang::prelude::*;

use crate::auction::Lifecycle;
use crate::state::{Auction, ClaimState, Config, Generation, LambdaState, PriceBoard};

/// Event emitted when a round opens
#[event]
pub struct AuctionStarted {
    pub auction_id: [u8; 32],
    pub claim_mint: Pubkey,
    pub generation: u32,
    pub restart_count: u16,
    pub emergency: bool,
    pub auction_amount: u64,
    pub strike_equivalent_price: u64,
    pub lower_price: u64,
    pub upper_price: u64,
    pub bid_deadline: i64,
    pub reveal_deadline: i64,
    pub closing_time: i64,
}

#[derive(Accounts)]
pub struct StartAuction<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [LambdaState::SEED],
        bump = lambda_state.bump,
    )]
    pub lambda_state: Account<'info, LambdaState>,

    #[account(
        mut,
        seeds = [ClaimState::SEED, claim_state.claim_mint.as_ref()],
        bump = claim_state.bump,
    )]
    pub claim_state: Account<'info, ClaimState>,

    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + Generation::INIT_SPACE,
        seeds = [
            Generation::SEED,
            claim_state.claim_mint.as_ref(),
            claim_state.generation.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub generation: Account<'info, Generation>,

    #[account(
        init,
        payer = caller,
        space = 8 + Auction::INIT_SPACE,
        seeds = [
            Auction::SEED,
            claim_state.claim_mint.as_ref(),
            claim_state.generation.to_le_bytes().as_ref(),
            claim_state.next_restart.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub auction: Box<Account<'info, Auction>>,

    #[account(
        init,
        payer = caller,
        space = 8 + PriceBoard::INIT_SPACE,
        seeds = [PriceBoard::SEED, auction.key().as_ref()],
        bump,
    )]
    pub board: Box<Account<'info, PriceBoard>>,

    pub system_program: Program<'info, System>,
}

impl<'info> StartAuction<'info> {
    pub fn start_auction(&mut self, emergency: bool, bumps: &StartAuctionBumps) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let caller_is_oracle = self.caller.key() == self.config.oracle;

        let plan = Lifecycle::plan_round(
            &self.claim_state,
            &self.lambda_state,
            emergency,
            caller_is_oracle,
            now,
        )?;
        Lifecycle::open_round(
            &mut self.auction,
            &mut self.claim_state,
            &mut self.generation,
            &self.config,
            &plan,
            now,
        )?;
        self.auction.bump = bumps.auction;
        self.generation.bump = bumps.generation;
        self.board.auction = self.auction.key();
        self.board.bump = bumps.board;

        let auction = &self.auction;
        emit!(AuctionStarted {
            auction_id: auction.auction_id,
            claim_mint: auction.claim,
            generation: auction.generation,
            restart_count: auction.restart_count,
            emergency: auction.emergency,
            auction_amount: auction.auction_amount,
            strike_equivalent_price: auction.strike_equivalent_price,
            lower_price: auction.lower_price,
            upper_price: auction.upper_price,
            bid_deadline: auction.bid_deadline,
            reveal_deadline: auction.reveal_deadline,
            closing_time: auction.closing_time,
        });

        msg!(
            "Auction started: round {} of generation {}, amount {}",
            auction.restart_count,
            auction.generation,
            auction.auction_amount
        );
        msg!("Window: [{}, {}]", auction.lower_price, auction.upper_price);
        Ok(())
    }
}
