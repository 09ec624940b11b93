use crate::FastMap;
use crate::Q128;
use crate::error::{Error, PairError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use alloy_primitives::{Address, U256};

/// Positions are owned per (owner, lower tick, upper tick); a second mint
/// with the same key tops up the existing position.
pub type PositionKey = (Address, i32, i32);
pub type Positions = FastMap<PositionKey, Position>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Liquidity currently held by this position.
    pub liquidity: u128,
    /// Fee growth inside the range as of the last update, per token.
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
    /// Fees owed to the owner, collectable via `collect`.
    pub tokens_owed_0: u128,
    pub tokens_owed_1: u128,
}

// uint128 truncation of an x128-scaled fee total; overflow of owed tokens is
// accepted, owners are expected to collect long before 2^128 accrues
pub(crate) fn truncate_u128(x: U256) -> u128 {
    let limbs = x.as_limbs();
    ((limbs[1] as u128) << 64) | limbs[0] as u128
}

impl Position {
    /// Applies a liquidity delta and banks the fees accrued since the last
    /// update, based on the current fee growth inside the position's range.
    ///
    /// A zero-delta update is a "poke": it refreshes owed fees but requires
    /// the position to hold liquidity.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(), Error> {
        let liquidity_next = if liquidity_delta == 0 {
            if self.liquidity == 0 {
                return Err(PairError::NoPositionLiquidity.into());
            }
            self.liquidity
        } else {
            if liquidity_delta < 0 && liquidity_delta.unsigned_abs() > self.liquidity {
                return Err(PairError::BurnExceedsPosition.into());
            }
            add_delta(self.liquidity, liquidity_delta)?
        };

        // growth deltas wrap; only the difference since the last snapshot is
        // meaningful
        let tokens_owed_0 = mul_div(
            fee_growth_inside_0_x128.wrapping_sub(self.fee_growth_inside_0_last_x128),
            U256::from(self.liquidity),
            Q128,
        )?;
        let tokens_owed_1 = mul_div(
            fee_growth_inside_1_x128.wrapping_sub(self.fee_growth_inside_1_last_x128),
            U256::from(self.liquidity),
            Q128,
        )?;

        if liquidity_delta != 0 {
            self.liquidity = liquidity_next;
        }
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;

        if !tokens_owed_0.is_zero() || !tokens_owed_1.is_zero() {
            self.tokens_owed_0 = self.tokens_owed_0.wrapping_add(truncate_u128(tokens_owed_0));
            self.tokens_owed_1 = self.tokens_owed_1.wrapping_add(truncate_u128(tokens_owed_1));
        }

        Ok(())
    }
}
