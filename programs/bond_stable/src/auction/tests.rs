//! Whole-auction scenarios over the pure state machine

use anchor_lang::prelude::*;

use super::*;
use crate::ledger::Collateral;
use crate::state::{
    Auction, AuctionStatus, BidStatus, BidderLedger, ClaimState, Config, Generation, LambdaState,
    Pool, PriceBoard,
};

const P: u64 = PRICE_UNIT;

struct Market {
    config: Config,
    lambda: LambdaState,
    claim: ClaimState,
    generation: Generation,
}

impl Market {
    fn new() -> Self {
        let mut lambda = LambdaState::default();
        lambda.init(0);
        Self {
            config: Config {
                reserve_ratio_bps: 1_000,
                bid_period: 100,
                emergency_bid_period: 10,
                reveal_period: 100,
                settle_period: 100,
                max_price_levels: 20,
                max_entries_per_price: 10,
                ..Default::default()
            },
            lambda,
            claim: ClaimState {
                claim_mint: Pubkey::new_unique(),
                strike_price: 100 * P,
                maturity: 1_000,
                ..Default::default()
            },
            generation: Generation::default(),
        }
    }

    fn start(&mut self, now: i64) -> Auction {
        let plan = Lifecycle::plan_round(&self.claim, &self.lambda, false, false, now).unwrap();
        let mut auction = Auction::default();
        Lifecycle::open_round(
            &mut auction,
            &mut self.claim,
            &mut self.generation,
            &self.config,
            &plan,
            now,
        )
        .unwrap();
        auction
    }

    fn close(&mut self, auction: &mut Auction, now: i64) -> CloseOutcome {
        Lifecycle::close(
            auction,
            &mut self.claim,
            &mut self.generation,
            &mut self.lambda,
            now,
        )
        .unwrap()
    }
}

struct Bidder {
    ledger: BidderLedger,
    price: u64,
    amount: u64,
    nonce: [u8; 32],
}

impl Bidder {
    fn new(price: u64, amount: u64, seed: u8) -> Self {
        Self {
            ledger: BidderLedger {
                bidder: Pubkey::new_unique(),
                ..Default::default()
            },
            price,
            amount,
            nonce: [seed; 32],
        }
    }

    fn key(&self) -> Pubkey {
        self.ledger.bidder
    }

    fn hash(&self, auction: &Auction) -> [u8; 32] {
        bid_secret_hash(&auction.auction_id, self.price, self.amount, &self.nonce)
    }

    fn commit(&mut self, auction: &Auction, now: i64) -> u64 {
        let hash = self.hash(auction);
        CommitReveal::commit(auction, &mut self.ledger, hash, self.amount, "", now).unwrap()
    }

    fn reveal(&mut self, auction: &mut Auction, board: &mut PriceBoard, now: i64) -> Revealed {
        CommitReveal::reveal(
            auction,
            board,
            &mut self.ledger,
            self.price,
            self.amount,
            self.nonce,
            now,
        )
        .unwrap()
    }
}

fn sorted_prices(board: &PriceBoard) -> Vec<u64> {
    let mut prices: Vec<u64> = board.tiers.iter().map(|t| t.price).collect();
    prices.sort_unstable_by(|a, b| b.cmp(a));
    prices
}

#[test]
fn test_generation_sells_out_over_two_rounds() {
    let mut m = Market::new();
    let mut pool = Pool::default();
    let minter = Pubkey::new_unique();

    let locked = Collateral::lock(
        &mut m.claim,
        &mut pool,
        &mut m.lambda,
        minter,
        m.config.reserve_ratio_bps,
        10 * P,
        10,
    )
    .unwrap();
    assert_eq!((locked.pooled, locked.obtained), (100 * P, 900 * P));
    // stablecoin minted against other claims funds the bidders
    m.lambda.increase(1_000 * P, 1_000 * P).unwrap();
    assert!(m.lambda.is_conserved());

    // round 0: [90, 110], three bidders take 9 of 10, one never reveals
    let mut auction = m.start(1_000);
    let mut board = PriceBoard::default();
    assert_eq!((auction.lower_price, auction.upper_price), (90 * P, 110 * P));

    let mut a = Bidder::new(105 * P, 4 * P, 1);
    let mut b = Bidder::new(100 * P, 3 * P, 2);
    let mut c = Bidder::new(95 * P, 2 * P, 3);
    let mut d = Bidder::new(108 * P, 5 * P, 4);
    assert_eq!(a.commit(&auction, 1_010), 440 * P);
    b.commit(&auction, 1_020);
    c.commit(&auction, 1_030);
    let d_escrow = d.commit(&auction, 1_040);

    for bidder in [&mut a, &mut b, &mut c] {
        bidder.reveal(&mut auction, &mut board, 1_150);
    }
    assert_eq!(auction.total_bid_amount, 9 * P);

    let prices = sorted_prices(&board);
    Clearing::sort_price(&mut auction, &mut board, &prices, 1_200).unwrap();
    let end = Clearing::finalize_winner_amount(&mut auction, &board, 1_200).unwrap();
    assert_eq!(end.sold_amount, 9 * P);
    assert_eq!(end.end_price, 95 * P);

    let bill_a = Billing::bill(&mut auction, &board, &mut a.ledger, None, &[], &[], 1_210).unwrap();
    assert_eq!((bill_a.win_amount, bill_a.charge, bill_a.refund), (4 * P, 420 * P, 20 * P));

    let bill_b = Billing::bill(&mut auction, &board, &mut b.ledger, Some(100 * P), &[], &[], 1_210)
        .unwrap();
    assert_eq!(bill_b.charge, 300 * P);

    let c_win = [BidPosition {
        price: 95 * P,
        board_index: 0,
    }];
    let bill_c = Billing::bill(&mut auction, &board, &mut c.ledger, Some(95 * P), &c_win, &[], 1_210)
        .unwrap();
    assert_eq!(bill_c.charge, 190 * P);

    // every winning unit billed: the round may close before its deadline
    let out = m.close(&mut auction, 1_220);
    assert_eq!(out, CloseOutcome::Restarted { remaining: P });
    let d_hash = d.hash(&auction);
    let settled =
        CommitReveal::settle_unrevealed(&auction, &mut d.ledger, &mut m.lambda, &d_hash).unwrap();
    assert_eq!(d_escrow, 550 * P);
    assert_eq!((settled.refund, settled.withheld), (495 * P, 55 * P));
    assert_eq!(d.ledger.commitments[0].status, BidStatus::SettledUnrevealed);
    assert_eq!(m.lambda.total_supply, 1_945 * P);

    // round 1: wider window around the same center, one unit left
    let mut round1 = m.start(1_230);
    let mut board1 = PriceBoard::default();
    assert_eq!(round1.restart_count, 1);
    assert_eq!(round1.auction_amount, P);
    assert!(round1.lower_price < auction.lower_price && round1.upper_price > auction.upper_price);

    let mut e = Bidder::new(85 * P, 2 * P, 5);
    e.commit(&round1, 1_240);
    e.reveal(&mut round1, &mut board1, 1_340);
    Clearing::sort_price(&mut round1, &mut board1, &[85 * P], 1_430).unwrap();
    Clearing::finalize_winner_amount(&mut round1, &board1, 1_430).unwrap();
    let bill_e = Billing::bill(&mut round1, &board1, &mut e.ledger, Some(85 * P), &[], &[], 1_440)
        .unwrap();
    assert_eq!((bill_e.win_amount, bill_e.charge), (P, 85 * P));

    let out = m.close(&mut round1, 1_450);
    let CloseOutcome::Finalized {
        burn,
        settled_average_price,
        ..
    } = out
    else {
        panic!("expected finalization, got {out:?}");
    };
    assert_eq!(burn, 995 * P);
    assert_eq!(settled_average_price, 995 * P / 10);
    assert_eq!(
        auction.rewarded_amount + round1.rewarded_amount,
        m.generation.total_offered
    );
    assert_eq!(round1.status, AuctionStatus::Finalized);

    // proceeds fell 5 short of the locked value, the reserve covers it
    let returned = Collateral::return_pool(&mut pool, &m.generation, &mut m.lambda).unwrap();
    assert_eq!(returned.back, 95 * P);
    assert_eq!(returned.forfeit, 5 * P);

    // the other claims stay, backed by what burning left in circulation
    assert_eq!(m.lambda.total_locked_value, 1_000 * P);
    assert_eq!(m.lambda.total_supply, 945 * P);
    assert_eq!(m.lambda.lambda, 94_500_000);
    assert!(m.lambda.is_conserved());
}

#[test]
fn test_restarts_widen_until_sold_out() {
    let mut m = Market::new();
    let mut pool = Pool::default();
    Collateral::lock(
        &mut m.claim,
        &mut pool,
        &mut m.lambda,
        Pubkey::new_unique(),
        0,
        10 * P,
        10,
    )
    .unwrap();

    let mut now = 1_000;
    let mut rewarded = 0;
    let mut last_width = 0;
    for round in 0..12u16 {
        let mut auction = m.start(now);
        let width = auction.upper_price - auction.lower_price;
        if round < SATURATION_ROUND {
            assert!(width > last_width, "round {round} did not widen");
        } else {
            assert_eq!(width, last_width);
        }
        last_width = width;

        // half a unit sells per round at the floor, the last round takes the rest
        let mut board = PriceBoard::default();
        let amount = if round == 11 { auction.auction_amount } else { P / 2 };
        let mut bidder = Bidder::new(auction.lower_price, amount, round as u8);
        bidder.commit(&auction, now);
        now = auction.bid_deadline;
        bidder.reveal(&mut auction, &mut board, now);
        now = auction.reveal_deadline;
        let prices = sorted_prices(&board);
        Clearing::sort_price(&mut auction, &mut board, &prices, now).unwrap();
        Clearing::finalize_winner_amount(&mut auction, &board, now).unwrap();
        Billing::bill(&mut auction, &board, &mut bidder.ledger, None, &[], &[], now).unwrap();
        rewarded += auction.rewarded_amount;

        match m.close(&mut auction, now) {
            CloseOutcome::Restarted { remaining } => {
                assert!(round < 11);
                assert_eq!(remaining, 10 * P - rewarded);
            }
            CloseOutcome::Finalized { .. } => {
                assert_eq!(round, 11);
                break;
            }
        }
        now += 1;
    }
    assert_eq!(rewarded, 10 * P);
    assert_eq!(m.generation.total_sold, 10 * P);
    assert!(m.generation.finalized);
}

#[test]
fn test_expired_round_restarts_everything_and_forfeits_late_bills() {
    let mut m = Market::new();
    let mut pool = Pool::default();
    Collateral::lock(
        &mut m.claim,
        &mut pool,
        &mut m.lambda,
        Pubkey::new_unique(),
        0,
        P,
        10,
    )
    .unwrap();

    let mut auction = m.start(1_000);
    let mut board = PriceBoard::default();
    let mut late = Bidder::new(100 * P, P, 9);
    let escrow = late.commit(&auction, 1_000);
    late.reveal(&mut auction, &mut board, 1_100);
    Clearing::sort_price(&mut auction, &mut board, &[100 * P], 1_200).unwrap();
    Clearing::finalize_winner_amount(&mut auction, &board, 1_200).unwrap();

    // nobody billed before the deadline
    let closing_time = auction.closing_time;
    let out = m.close(&mut auction, closing_time);
    assert_eq!(out, CloseOutcome::Restarted { remaining: P });

    let bill = Billing::bill(&mut auction, &board, &mut late.ledger, None, &[], &[], 1_400).unwrap();
    assert!(bill.forfeited);
    assert_eq!(bill.refund, escrow);
    assert_eq!(auction.rewarded_amount, 0);
}

#[test]
fn test_board_caps_hold_across_reveals() {
    let mut m = Market::new();
    m.config.max_price_levels = 2;
    m.config.max_entries_per_price = 1;
    let mut pool = Pool::default();
    Collateral::lock(
        &mut m.claim,
        &mut pool,
        &mut m.lambda,
        Pubkey::new_unique(),
        0,
        10 * P,
        10,
    )
    .unwrap();

    let mut auction = m.start(1_000);
    let mut board = PriceBoard::default();
    let mut bidders = vec![
        Bidder::new(100 * P, P, 1),
        Bidder::new(101 * P, P, 2),
        Bidder::new(102 * P, P, 3),
        Bidder::new(100 * P, P, 4),
    ];
    for bidder in bidders.iter_mut() {
        bidder.commit(&auction, 1_000);
    }

    bidders[0].reveal(&mut auction, &mut board, 1_100);
    bidders[1].reveal(&mut auction, &mut board, 1_100);
    let snapshot = board.tiers.clone();

    let (third, fourth) = bidders.split_at_mut(3);
    let err = CommitReveal::reveal(
        &mut auction,
        &mut board,
        &mut third[2].ledger,
        102 * P,
        P,
        [3; 32],
        1_100,
    )
    .unwrap_err();
    assert_eq!(err, AuctionError::TooManyPriceLevels.into());

    let err = CommitReveal::reveal(
        &mut auction,
        &mut board,
        &mut fourth[0].ledger,
        100 * P,
        P,
        [4; 32],
        1_100,
    )
    .unwrap_err();
    assert_eq!(err, AuctionError::TooManyBidsAtPrice.into());

    assert_eq!(board.tiers, snapshot);
    assert_eq!(auction.total_bid_amount, 2 * P);
    assert_eq!(third[2].ledger.commitments[0].status, BidStatus::Pending);
    assert!(board.entries_of(&fourth[0].key()).next().is_none());
}
