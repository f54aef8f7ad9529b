//! Lambda updates

use anchor_lang::prelude::*;

use super::{mul_div, LedgerError};
use crate::auction::PRICE_UNIT;
use crate::state::LambdaState;

/// Lambda before any collateral is locked (1.0)
pub const INITIAL_LAMBDA: u64 = PRICE_UNIT;

/// Emitted on every lambda recomputation
#[event]
pub struct LambdaChanged {
    pub old_lambda: u64,
    pub new_lambda: u64,
    pub total_locked_value: u64,
    pub total_supply: u64,
}

/// Result of one paired update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LambdaChange {
    pub old_lambda: u64,
    pub new_lambda: u64,
    pub total_locked_value: u64,
    pub total_supply: u64,
}

impl LambdaChange {
    pub fn event(&self) -> LambdaChanged {
        LambdaChanged {
            old_lambda: self.old_lambda,
            new_lambda: self.new_lambda,
            total_locked_value: self.total_locked_value,
            total_supply: self.total_supply,
        }
    }
}

impl LambdaState {
    pub fn init(&mut self, bump: u8) {
        self.total_locked_value = 0;
        self.total_supply = 0;
        self.lambda = INITIAL_LAMBDA;
        self.bump = bump;
    }

    /// Stablecoin backed by `value` USD at the current lambda
    pub fn to_stablecoin(&self, value: u64) -> Result<u64> {
        mul_div(value, self.lambda, PRICE_UNIT)
    }

    pub fn increase(&mut self, value_delta: u64, supply_delta: u64) -> Result<LambdaChange> {
        let value = self
            .total_locked_value
            .checked_add(value_delta)
            .ok_or(LedgerError::MathOverflow)?;
        let supply = self
            .total_supply
            .checked_add(supply_delta)
            .ok_or(LedgerError::MathOverflow)?;
        self.recompute(value, supply)
    }

    pub fn decrease(&mut self, value_delta: u64, supply_delta: u64) -> Result<LambdaChange> {
        let value = self
            .total_locked_value
            .checked_sub(value_delta)
            .ok_or(LedgerError::MathOverflow)?;
        let supply = self
            .total_supply
            .checked_sub(supply_delta)
            .ok_or(LedgerError::MathOverflow)?;
        self.recompute(value, supply)
    }

    fn recompute(&mut self, value: u64, supply: u64) -> Result<LambdaChange> {
        let lambda = if supply == 0 {
            INITIAL_LAMBDA
        } else if value > 0 {
            mul_div(supply, PRICE_UNIT, value)?
        } else {
            // supply left with nothing locked keeps the last rate
            self.lambda
        };

        let change = LambdaChange {
            old_lambda: self.lambda,
            new_lambda: lambda,
            total_locked_value: value,
            total_supply: supply,
        };
        self.total_locked_value = value;
        self.total_supply = supply;
        self.lambda = lambda;
        Ok(change)
    }
}

#[cfg(test)]
impl LambdaState {
    /// `|value × λ − supply|` stays within one rounding step
    pub fn is_conserved(&self) -> bool {
        let backed = self.total_locked_value as u128 * self.lambda as u128 / PRICE_UNIT as u128;
        let drift = backed.abs_diff(self.total_supply as u128);
        drift <= self.total_locked_value as u128 / PRICE_UNIT as u128 + 1
    }
}
