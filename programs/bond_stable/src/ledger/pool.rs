//! Collateral locking and minter pools
//!
//! A minter's pool tracks, per claim generation, how much it locked and how
//! the minted stablecoin was split between the reserve (`pooled`) and the
//! minter (`obtained`). After the generation's auction finalizes the pool is
//! trued up against the realized average price.

use anchor_lang::prelude::*;

use super::{mul_div, LambdaChange, LedgerError};
use crate::auction::{BPS, PRICE_UNIT};
use crate::state::{ClaimState, Generation, LambdaState, Pool};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockOutcome {
    /// USD value credited, 8 decimals
    pub value: u64,
    pub minted: u64,
    pub pooled: u64,
    pub obtained: u64,
    pub lambda: LambdaChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockOutcome {
    /// Claim units released to the holder
    pub unlocked: u64,
    pub value_delta: u64,
    /// Reserve stablecoin handed back from the holder's own pool
    pub pooled_release: u64,
    pub lambda: LambdaChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolReturn {
    /// Reserve stablecoin paid back to the minter
    pub back: u64,
    /// Reserve stablecoin burned to cover the shortfall
    pub forfeit: u64,
    pub lambda: Option<LambdaChange>,
}

pub struct Collateral;

impl Collateral {
    /// Lock `amount` claim units and split the minted stablecoin
    pub fn lock(
        claim: &mut ClaimState,
        pool: &mut Pool,
        lambda: &mut LambdaState,
        minter: Pubkey,
        reserve_ratio_bps: u16,
        amount: u64,
        now: i64,
    ) -> Result<LockOutcome> {
        require!(!claim.in_auction(), LedgerError::AuctionInProgress);
        require!(now < claim.maturity, LedgerError::ClaimMatured);
        require!(amount > 0, LedgerError::AmountTooSmall);

        let pool_id = claim.current_pool_id();
        if pool.pool_id == [0u8; 32] {
            pool.minter = minter;
            pool.pool_id = pool_id;
            pool.claim = claim.claim_mint;
            pool.generation = claim.generation;
        }
        require!(
            pool.pool_id == pool_id && pool.minter == minter,
            LedgerError::InvalidPool
        );

        let value = mul_div(amount, claim.strike_price, PRICE_UNIT)?;
        let minted = lambda.to_stablecoin(value)?;
        require!(minted > 0, LedgerError::AmountTooSmall);
        let pooled = mul_div(minted, reserve_ratio_bps as u64, BPS)?;
        let obtained = minted - pooled;

        pool.locked_amount = pool
            .locked_amount
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        pool.pooled_amount = pool
            .pooled_amount
            .checked_add(pooled)
            .ok_or(LedgerError::MathOverflow)?;
        pool.obtained_amount = pool
            .obtained_amount
            .checked_add(obtained)
            .ok_or(LedgerError::MathOverflow)?;

        claim.total_locked = claim
            .total_locked
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        claim.locked_value = claim
            .locked_value
            .checked_add(value)
            .ok_or(LedgerError::MathOverflow)?;

        let change = lambda.increase(value, minted)?;
        Ok(LockOutcome {
            value,
            minted,
            pooled,
            obtained,
            lambda: change,
        })
    }

    /// Burn `burn_amount` stablecoin for the claim units it backs
    pub fn unlock(
        claim: &mut ClaimState,
        pool: Option<&mut Pool>,
        lambda: &mut LambdaState,
        burn_amount: u64,
    ) -> Result<UnlockOutcome> {
        require!(!claim.in_auction(), LedgerError::AuctionInProgress);

        // burn / (strike × λ), both factors carry 8 decimals
        let rate = (claim.strike_price as u128)
            .checked_mul(lambda.lambda as u128)
            .ok_or(LedgerError::MathOverflow)?;
        require!(rate > 0, LedgerError::AmountTooSmall);
        let unlocked = (burn_amount as u128)
            .checked_mul(PRICE_UNIT as u128 * PRICE_UNIT as u128)
            .ok_or(LedgerError::MathOverflow)?
            / rate;
        let unlocked = u64::try_from(unlocked).map_err(|_| error!(LedgerError::MathOverflow))?;
        require!(unlocked > 0, LedgerError::AmountTooSmall);
        require!(unlocked <= claim.total_locked, LedgerError::InsufficientLocked);

        let value_delta = mul_div(claim.locked_value, unlocked, claim.total_locked)?;

        let mut pooled_release = 0;
        if let Some(pool) = pool {
            require!(
                pool.pool_id == claim.current_pool_id(),
                LedgerError::InvalidPool
            );
            if pool.locked_amount > 0 {
                let take = unlocked.min(pool.locked_amount);
                pooled_release = mul_div(pool.pooled_amount, take, pool.locked_amount)?;
                let obtained_release = mul_div(pool.obtained_amount, take, pool.locked_amount)?;
                pool.pooled_amount -= pooled_release;
                pool.obtained_amount -= obtained_release;
                pool.locked_amount -= take;
            }
            pool.burned_amount = pool
                .burned_amount
                .checked_add(burn_amount)
                .ok_or(LedgerError::MathOverflow)?;
        }

        claim.total_locked -= unlocked;
        claim.locked_value -= value_delta;

        let change = lambda.decrease(value_delta, burn_amount)?;
        Ok(UnlockOutcome {
            unlocked,
            value_delta,
            pooled_release,
            lambda: change,
        })
    }

    /// True up a pool of a finalized generation against its average price.
    /// The forfeit leaves supply here, so each return recomputes lambda.
    pub fn return_pool(
        pool: &mut Pool,
        generation: &Generation,
        lambda: &mut LambdaState,
    ) -> Result<PoolReturn> {
        require!(generation.finalized, LedgerError::GenerationNotSettled);
        require!(
            pool.claim == generation.claim && pool.generation == generation.generation,
            LedgerError::InvalidPool
        );
        require!(!pool.is_empty(), LedgerError::PoolAlreadyReturned);

        let entitled = mul_div(generation.settled_average_price, pool.locked_amount, PRICE_UNIT)?;
        let back = entitled
            .saturating_sub(pool.obtained_amount)
            .min(pool.pooled_amount);
        let forfeit = pool.pooled_amount - back;

        let change = if forfeit > 0 {
            Some(lambda.decrease(0, forfeit)?)
        } else {
            None
        };

        pool.locked_amount = 0;
        pool.pooled_amount = 0;
        pool.obtained_amount = 0;

        Ok(PoolReturn {
            back,
            forfeit,
            lambda: change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pool_id;

    const P: u64 = PRICE_UNIT;

    fn claim() -> ClaimState {
        ClaimState {
            claim_mint: Pubkey::new_unique(),
            strike_price: 100 * P,
            maturity: 1_000,
            ..Default::default()
        }
    }

    fn lambda() -> LambdaState {
        let mut s = LambdaState::default();
        s.init(0);
        s
    }

    #[test]
    fn test_lock_splits_minted_amount() {
        let mut c = claim();
        let mut pool = Pool::default();
        let mut l = lambda();
        let minter = Pubkey::new_unique();

        let out = Collateral::lock(&mut c, &mut pool, &mut l, minter, 1_000, 2 * P, 10).unwrap();
        assert_eq!(out.value, 200 * P);
        assert_eq!(out.minted, 200 * P);
        assert_eq!(out.pooled, 20 * P);
        assert_eq!(out.obtained, 180 * P);

        assert_eq!(pool.pool_id, pool_id(&c.claim_mint, 0));
        assert_eq!(pool.locked_amount, 2 * P);
        assert_eq!(c.total_locked, 2 * P);
        assert_eq!(c.locked_value, 200 * P);
        assert_eq!(l.total_supply, 200 * P);
        assert!(l.is_conserved());
    }

    #[test]
    fn test_lock_guards() {
        let mut c = claim();
        let mut pool = Pool::default();
        let mut l = lambda();
        let minter = Pubkey::new_unique();

        assert_eq!(
            Collateral::lock(&mut c, &mut pool, &mut l, minter, 0, P, 1_000).unwrap_err(),
            LedgerError::ClaimMatured.into()
        );
        assert_eq!(
            Collateral::lock(&mut c, &mut pool, &mut l, minter, 0, 0, 10).unwrap_err(),
            LedgerError::AmountTooSmall.into()
        );

        c.pending_restart = true;
        assert_eq!(
            Collateral::lock(&mut c, &mut pool, &mut l, minter, 0, P, 10).unwrap_err(),
            LedgerError::AuctionInProgress.into()
        );
        c.pending_restart = false;

        Collateral::lock(&mut c, &mut pool, &mut l, minter, 0, P, 10).unwrap();
        assert_eq!(
            Collateral::lock(&mut c, &mut pool, &mut l, Pubkey::new_unique(), 0, P, 10).unwrap_err(),
            LedgerError::InvalidPool.into()
        );
    }

    #[test]
    fn test_unlock_draws_down_own_pool() {
        let mut c = claim();
        let mut pool = Pool::default();
        let mut l = lambda();
        let minter = Pubkey::new_unique();
        Collateral::lock(&mut c, &mut pool, &mut l, minter, 1_000, 4 * P, 10).unwrap();

        // burning 100 at strike 100, λ = 1 releases one claim unit
        let out = Collateral::unlock(&mut c, Some(&mut pool), &mut l, 100 * P).unwrap();
        assert_eq!(out.unlocked, P);
        assert_eq!(out.value_delta, 100 * P);
        assert_eq!(out.pooled_release, 10 * P);

        assert_eq!(pool.locked_amount, 3 * P);
        assert_eq!(pool.pooled_amount, 30 * P);
        assert_eq!(pool.obtained_amount, 270 * P);
        assert_eq!(pool.burned_amount, 100 * P);
        assert_eq!(c.total_locked, 3 * P);
        assert_eq!(l.total_supply, 300 * P);
        assert!(l.is_conserved());
    }

    #[test]
    fn test_unlock_limits() {
        let mut c = claim();
        let mut pool = Pool::default();
        let mut l = lambda();
        Collateral::lock(&mut c, &mut pool, &mut l, Pubkey::new_unique(), 0, P, 10).unwrap();

        assert_eq!(
            Collateral::unlock(&mut c, None, &mut l, 1).unwrap_err(),
            LedgerError::AmountTooSmall.into()
        );
        assert_eq!(
            Collateral::unlock(&mut c, None, &mut l, 101 * P).unwrap_err(),
            LedgerError::InsufficientLocked.into()
        );

        // a holder without a pool unlocks too
        let out = Collateral::unlock(&mut c, None, &mut l, 100 * P).unwrap();
        assert_eq!(out.unlocked, P);
        assert_eq!(out.pooled_release, 0);
        assert_eq!(c.total_locked, 0);
        assert_eq!(c.locked_value, 0);
    }

    fn settled(claim: &ClaimState, average: u64) -> Generation {
        Generation {
            claim: claim.claim_mint,
            generation: claim.generation,
            finalized: true,
            settled_average_price: average,
            ..Default::default()
        }
    }

    #[test]
    fn test_return_pool_shortfall_and_surplus() {
        let minter = Pubkey::new_unique();
        for (average, back) in [(100 * P, 20 * P), (95 * P, 10 * P), (80 * P, 0), (120 * P, 20 * P)] {
            let mut c = claim();
            let mut pool = Pool::default();
            let mut l = lambda();
            // 2 units at strike 100: obtained 180, pooled 20
            Collateral::lock(&mut c, &mut pool, &mut l, minter, 1_000, 2 * P, 10).unwrap();

            let gen = settled(&c, average);
            let out = Collateral::return_pool(&mut pool, &gen, &mut l).unwrap();
            assert_eq!(out.back, back, "average {average}");
            assert_eq!(out.forfeit, 20 * P - back);
            assert_eq!(out.lambda.is_some(), out.forfeit > 0);
            assert!(pool.is_empty());

            assert_eq!(
                Collateral::return_pool(&mut pool, &gen, &mut l).unwrap_err(),
                LedgerError::PoolAlreadyReturned.into()
            );
        }
    }

    #[test]
    fn test_return_pool_guards() {
        let mut c = claim();
        let mut pool = Pool::default();
        let mut l = lambda();
        Collateral::lock(&mut c, &mut pool, &mut l, Pubkey::new_unique(), 1_000, P, 10).unwrap();

        let mut gen = settled(&c, 100 * P);
        gen.finalized = false;
        assert_eq!(
            Collateral::return_pool(&mut pool, &gen, &mut l).unwrap_err(),
            LedgerError::GenerationNotSettled.into()
        );

        let mut gen = settled(&c, 100 * P);
        gen.generation = 1;
        assert_eq!(
            Collateral::return_pool(&mut pool, &gen, &mut l).unwrap_err(),
            LedgerError::InvalidPool.into()
        );
    }
}
