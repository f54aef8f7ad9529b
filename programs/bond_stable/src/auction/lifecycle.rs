//! # Round Lifecycle
//!
//! ```text
//!   start_auction ──▶ round 0 ──close──▶ Finalized ──▶ generation + 1
//!                        │
//!                        └─ undersold ──▶ Restarted ──start_auction──▶ round 1 (wider window)
//!                                                                        ...
//! ```
//!
//! A generation's first round offers everything locked against the claim
//! and fixes the window center (strike × lambda). Each restart offers only
//! what the previous round left unsold, around the same center, with the
//! next β of the schedule.

use anchor_lang::prelude::*;

use super::{price_window, AuctionError, Discretizer, PriceWindow, PRICE_UNIT};
use crate::ledger::{mul_div, LambdaChange};
use crate::state::{
    auction_id, Auction, AuctionStatus, ClaimState, Config, ConfigError, Generation, LambdaState,
};

/// Parameters of the next round of a claim
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundPlan {
    pub restart_count: u16,
    pub auction_amount: u64,
    pub center: u64,
    pub window: PriceWindow,
    pub emergency: bool,
    /// First round of a generation
    pub fresh: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Undersold, `remaining` moves to the next round
    Restarted { remaining: u64 },
    /// Fully sold, `burn` stablecoin of proceeds leave circulation
    Finalized {
        burn: u64,
        settled_average_price: u64,
        lambda: LambdaChange,
    },
}

pub struct Lifecycle;

impl Lifecycle {
    /// Decide whether and how the next round of `claim` may open
    pub fn plan_round(
        claim: &ClaimState,
        lambda: &LambdaState,
        emergency: bool,
        caller_is_oracle: bool,
        now: i64,
    ) -> Result<RoundPlan> {
        require!(!claim.auction_open, AuctionError::AlreadyOpen);

        let plan = if claim.pending_restart {
            RoundPlan {
                restart_count: claim.next_restart,
                auction_amount: claim.pending_amount,
                center: claim.strike_equivalent_price,
                window: price_window(claim.strike_equivalent_price, claim.next_restart)?,
                emergency: claim.emergency,
                fresh: false,
            }
        } else {
            if emergency {
                require!(caller_is_oracle, ConfigError::Unauthorized);
            } else {
                require!(now >= claim.maturity, AuctionError::NotMatured);
            }
            require!(claim.total_locked > 0, AuctionError::NothingToSell);

            let center = mul_div(claim.strike_price, lambda.lambda, PRICE_UNIT)?;
            RoundPlan {
                restart_count: 0,
                auction_amount: claim.total_locked,
                center,
                window: price_window(center, 0)?,
                emergency,
                fresh: true,
            }
        };
        require!(plan.auction_amount > 0, AuctionError::NothingToSell);
        Ok(plan)
    }

    /// Initialize `auction` from `plan` and mark the claim as auctioning
    pub fn open_round(
        auction: &mut Auction,
        claim: &mut ClaimState,
        generation: &mut Generation,
        config: &Config,
        plan: &RoundPlan,
        now: i64,
    ) -> Result<()> {
        let bid_period = if plan.emergency {
            config.emergency_bid_period
        } else {
            config.bid_period
        };
        let bid_deadline = now.checked_add(bid_period).ok_or(AuctionError::MathOverflow)?;
        let reveal_deadline = bid_deadline
            .checked_add(config.reveal_period)
            .ok_or(AuctionError::MathOverflow)?;
        let closing_time = reveal_deadline
            .checked_add(config.settle_period)
            .ok_or(AuctionError::MathOverflow)?;

        let grid_levels = Discretizer::max_price_levels(plan.window.lower, plan.window.upper);
        let max_price_levels = (config.max_price_levels as u64).min(grid_levels) as u16;

        auction.auction_id = auction_id(&claim.claim_mint, claim.generation, plan.restart_count);
        auction.claim = claim.claim_mint;
        auction.generation = claim.generation;
        auction.restart_count = plan.restart_count;
        auction.emergency = plan.emergency;
        auction.started_at = now;
        auction.bid_deadline = bid_deadline;
        auction.reveal_deadline = reveal_deadline;
        auction.closing_time = closing_time;
        auction.strike_equivalent_price = plan.center;
        auction.lower_price = plan.window.lower;
        auction.upper_price = plan.window.upper;
        auction.max_price_levels = max_price_levels;
        auction.max_entries_per_price = config.max_entries_per_price;
        auction.auction_amount = plan.auction_amount;
        auction.status = AuctionStatus::Open;

        if plan.fresh {
            generation.claim = claim.claim_mint;
            generation.generation = claim.generation;
            generation.total_offered = plan.auction_amount;
            claim.strike_equivalent_price = plan.center;
            claim.emergency = plan.emergency;
        }
        claim.auction_open = true;
        claim.pending_restart = false;
        claim.pending_amount = 0;
        Ok(())
    }

    /// Close a round: restart the remainder or settle the generation
    pub fn close(
        auction: &mut Auction,
        claim: &mut ClaimState,
        generation: &mut Generation,
        lambda: &mut LambdaState,
        now: i64,
    ) -> Result<CloseOutcome> {
        require!(auction.status == AuctionStatus::Open, AuctionError::AlreadyDone);
        let fully_billed = auction.done_finalize_winner_amount
            && auction.rewarded_amount == auction.end_info.sold_amount;
        require!(
            now >= auction.closing_time || fully_billed,
            AuctionError::NotReady
        );

        // everything fallible runs before the first write
        let total_sold = generation
            .total_sold
            .checked_add(auction.rewarded_amount)
            .ok_or(AuctionError::MathOverflow)?;
        let total_paid = generation
            .total_paid
            .checked_add(auction.total_paid)
            .ok_or(AuctionError::MathOverflow)?;

        if auction.rewarded_amount < auction.auction_amount {
            let remaining = auction.auction_amount - auction.rewarded_amount;
            let next_restart = auction
                .restart_count
                .checked_add(1)
                .ok_or(AuctionError::MathOverflow)?;

            auction.lambda_at_close = lambda.lambda;
            auction.status = AuctionStatus::Restarted;
            generation.total_sold = total_sold;
            generation.total_paid = total_paid;
            claim.auction_open = false;
            claim.pending_restart = true;
            claim.next_restart = next_restart;
            claim.pending_amount = remaining;
            return Ok(CloseOutcome::Restarted { remaining });
        }

        let settled_average_price = mul_div(total_paid, PRICE_UNIT, total_sold)?;
        let next_generation = claim
            .generation
            .checked_add(1)
            .ok_or(AuctionError::MathOverflow)?;
        let lambda_at_close = lambda.lambda;
        let change = lambda.decrease(claim.locked_value, total_paid)?;

        auction.lambda_at_close = lambda_at_close;
        auction.status = AuctionStatus::Finalized;
        generation.total_sold = total_sold;
        generation.total_paid = total_paid;
        generation.settled_average_price = settled_average_price;
        generation.finalized = true;

        claim.auction_open = false;
        claim.total_locked = 0;
        claim.locked_value = 0;
        claim.generation = next_generation;
        claim.pending_restart = false;
        claim.next_restart = 0;
        claim.pending_amount = 0;
        claim.strike_equivalent_price = 0;
        claim.emergency = false;

        Ok(CloseOutcome::Finalized {
            burn: total_paid,
            settled_average_price,
            lambda: change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;

    const P: u64 = PRICE_UNIT;

    fn claim() -> ClaimState {
        ClaimState {
            claim_mint: Pubkey::new_unique(),
            strike_price: 100 * P,
            maturity: 1_000,
            total_locked: 10 * P,
            locked_value: 1_000 * P,
            ..Default::default()
        }
    }

    fn lambda() -> LambdaState {
        LambdaState {
            total_locked_value: 1_000 * P,
            total_supply: 1_000 * P,
            lambda: P,
            bump: 0,
        }
    }

    fn config() -> Config {
        Config {
            bid_period: 100,
            emergency_bid_period: 10,
            reveal_period: 100,
            settle_period: 100,
            max_price_levels: 20,
            max_entries_per_price: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_guards() {
        let c = claim();
        let l = lambda();
        assert_eq!(
            Lifecycle::plan_round(&c, &l, false, false, 999).unwrap_err(),
            AuctionError::NotMatured.into()
        );
        assert_eq!(
            Lifecycle::plan_round(&c, &l, true, false, 0).unwrap_err(),
            ConfigError::Unauthorized.into()
        );

        let mut empty = claim();
        empty.total_locked = 0;
        assert_eq!(
            Lifecycle::plan_round(&empty, &l, false, false, 1_000).unwrap_err(),
            AuctionError::NothingToSell.into()
        );

        let mut open = claim();
        open.auction_open = true;
        assert_eq!(
            Lifecycle::plan_round(&open, &l, false, false, 1_000).unwrap_err(),
            AuctionError::AlreadyOpen.into()
        );
    }

    #[test]
    fn test_open_first_round() {
        let mut c = claim();
        let mut gen = Generation::default();
        let mut a = Auction::default();
        let plan = Lifecycle::plan_round(&c, &lambda(), true, true, 50).unwrap();
        assert!(plan.fresh);
        assert_eq!(plan.center, 100 * P);
        assert_eq!(plan.window, PriceWindow { lower: 90 * P, upper: 110 * P });

        Lifecycle::open_round(&mut a, &mut c, &mut gen, &config(), &plan, 50).unwrap();
        assert_eq!(a.bid_deadline, 60);
        assert_eq!(a.reveal_deadline, 160);
        assert_eq!(a.closing_time, 260);
        assert_eq!(a.auction_amount, 10 * P);
        // 90..110 on a 1.0 grid
        assert_eq!(a.max_price_levels, 20);
        assert!(c.auction_open && c.in_auction());
        assert_eq!(gen.total_offered, 10 * P);
        assert_eq!(c.strike_equivalent_price, 100 * P);
    }

    #[test]
    fn test_close_waits_for_deadline_or_full_billing() {
        let mut c = claim();
        let mut gen = Generation::default();
        let mut a = Auction::default();
        let mut l = lambda();
        let plan = Lifecycle::plan_round(&c, &l, false, false, 1_000).unwrap();
        Lifecycle::open_round(&mut a, &mut c, &mut gen, &config(), &plan, 1_000).unwrap();

        assert_eq!(
            Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, 1_250).unwrap_err(),
            AuctionError::NotReady.into()
        );

        a.done_sort_price = true;
        a.done_finalize_winner_amount = true;
        a.end_info.sold_amount = 4 * P;
        a.rewarded_amount = 4 * P;
        a.total_paid = 400 * P;
        let out = Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, 1_250).unwrap();
        assert_eq!(out, CloseOutcome::Restarted { remaining: 6 * P });
        assert_eq!(a.status, AuctionStatus::Restarted);
        assert!(c.pending_restart && !c.auction_open);
        assert_eq!(c.next_restart, 1);
        assert_eq!(gen.total_sold, 4 * P);

        assert_eq!(
            Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, 2_000).unwrap_err(),
            AuctionError::AlreadyDone.into()
        );
    }

    #[test]
    fn test_restart_plan_reuses_center_and_widens() {
        let mut c = claim();
        c.pending_restart = true;
        c.next_restart = 2;
        c.pending_amount = 3 * P;
        c.strike_equivalent_price = 100 * P;
        c.emergency = true;

        // anyone may open a pending restart, even before maturity
        let plan = Lifecycle::plan_round(&c, &lambda(), false, false, 0).unwrap();
        assert!(!plan.fresh);
        assert!(plan.emergency);
        assert_eq!(plan.restart_count, 2);
        assert_eq!(plan.auction_amount, 3 * P);
        assert_eq!(plan.window, PriceWindow { lower: 70 * P, upper: 130 * P });
    }

    #[test]
    fn test_finalize_settles_generation() {
        let mut c = claim();
        let mut gen = Generation::default();
        let mut a = Auction::default();
        let mut l = lambda();
        let plan = Lifecycle::plan_round(&c, &l, false, false, 1_000).unwrap();
        Lifecycle::open_round(&mut a, &mut c, &mut gen, &config(), &plan, 1_000).unwrap();

        a.rewarded_amount = 10 * P;
        a.total_paid = 950 * P;
        let closing_time = a.closing_time;
        let out = Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, closing_time).unwrap();
        match out {
            CloseOutcome::Finalized {
                burn,
                settled_average_price,
                ..
            } => {
                assert_eq!(burn, 950 * P);
                assert_eq!(settled_average_price, 95 * P);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(gen.finalized);
        assert_eq!(c.generation, 1);
        assert_eq!(c.total_locked, 0);
        assert!(!c.in_auction());
        assert_eq!(l.total_locked_value, 0);
        assert_eq!(l.total_supply, 50 * P);
        assert_eq!(a.lambda_at_close, P);
    }

    fn open_restart(next_restart: u16) -> (Auction, ClaimState, Generation) {
        let mut c = claim();
        c.pending_restart = true;
        c.next_restart = next_restart;
        c.pending_amount = 2 * P;
        c.strike_equivalent_price = 100 * P;
        let mut gen = Generation::default();
        let mut a = Auction::default();
        let plan = Lifecycle::plan_round(&c, &lambda(), false, false, 0).unwrap();
        Lifecycle::open_round(&mut a, &mut c, &mut gen, &config(), &plan, 0).unwrap();
        a.rewarded_amount = P;
        a.total_paid = 100 * P;
        (a, c, gen)
    }

    #[test]
    fn test_restart_counter_passes_255() {
        let (mut a, mut c, mut gen) = open_restart(255);
        let mut l = lambda();
        let closing_time = a.closing_time;
        let out = Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, closing_time + 10).unwrap();
        assert_eq!(out, CloseOutcome::Restarted { remaining: P });
        assert_eq!(c.next_restart, 256);
        assert!(a.is_closed() && !c.auction_open);
    }

    #[test]
    fn test_failed_close_leaves_state_untouched() {
        // restart counter at its ceiling
        let (mut a, mut c, mut gen) = open_restart(u16::MAX);
        let mut l = lambda();
        let closing_time = a.closing_time;
        assert_eq!(
            Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, closing_time + 10).unwrap_err(),
            AuctionError::MathOverflow.into()
        );
        assert_eq!(a.status, AuctionStatus::Open);
        assert_eq!(a.lambda_at_close, 0);
        assert!(c.auction_open && !c.pending_restart);
        assert_eq!((gen.total_sold, gen.total_paid), (0, 0));

        // proceeds above the recorded supply on finalization
        let mut c = claim();
        let mut gen = Generation::default();
        let mut a = Auction::default();
        let mut l = lambda();
        let plan = Lifecycle::plan_round(&c, &l, false, false, 1_000).unwrap();
        Lifecycle::open_round(&mut a, &mut c, &mut gen, &config(), &plan, 1_000).unwrap();
        a.rewarded_amount = 10 * P;
        a.total_paid = 1_001 * P;
        let closing_time = a.closing_time;
        assert_eq!(
            Lifecycle::close(&mut a, &mut c, &mut gen, &mut l, closing_time).unwrap_err(),
            LedgerError::MathOverflow.into()
        );
        assert_eq!(a.status, AuctionStatus::Open);
        assert!(!gen.finalized);
        assert_eq!(gen.total_sold, 0);
        assert_eq!(c.generation, 0);
        assert_eq!(c.total_locked, 10 * P);
        assert_eq!((l.total_locked_value, l.total_supply), (1_000 * P, 1_000 * P));
    }
}
