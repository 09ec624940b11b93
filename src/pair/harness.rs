//! Test double for the pair's foreign surface: a token ledger that only
//! tracks the pair's own balances, pays callbacks from an unlimited wallet
//! and can be told to underpay or to attempt reentrancy.

use crate::error::Error;
use crate::pair::pair::{Pair, PairHost};
use alloy_primitives::{Address, I256, U256, address};

pub(crate) const OWNER: Address = address!("0x00000000000000000000000000000000000000aa");
pub(crate) const LP: Address = address!("0x0000000000000000000000000000000000000001");
pub(crate) const TRADER: Address = address!("0x0000000000000000000000000000000000000002");
pub(crate) const TOKEN0: Address = address!("0x0000000000000000000000000000000000000010");
pub(crate) const TOKEN1: Address = address!("0x0000000000000000000000000000000000000020");

#[derive(Default)]
pub(crate) struct Host {
    pub balance0: U256,
    pub balance1: U256,

    /// Shortfalls applied to what the callbacks pay in.
    pub shortchange0: U256,
    pub shortchange1: U256,

    /// Amounts the flash callback returns on top of the fees.
    pub flash_repay0: U256,
    pub flash_repay1: U256,

    /// Have the swap callback try to re-enter `swap` and query `observe`,
    /// recording what happened.
    pub reenter_on_swap: bool,
    pub reentry_outcome: Option<Result<(I256, I256), Error>>,
    pub observe_outcome: Option<Result<(Vec<i64>, Vec<U256>), Error>>,
}

impl Host {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl PairHost for Host {
    fn balance0(&self) -> U256 {
        self.balance0
    }

    fn balance1(&self) -> U256 {
        self.balance1
    }

    fn transfer0(&mut self, _to: Address, amount: U256) -> Result<(), Error> {
        self.balance0 = self
            .balance0
            .checked_sub(amount)
            .ok_or(crate::error::StateError::InsufficientReserves)?;
        Ok(())
    }

    fn transfer1(&mut self, _to: Address, amount: U256) -> Result<(), Error> {
        self.balance1 = self
            .balance1
            .checked_sub(amount)
            .ok_or(crate::error::StateError::InsufficientReserves)?;
        Ok(())
    }

    fn mint_callback(
        &mut self,
        _pair: &mut Pair,
        amount0_owed: U256,
        amount1_owed: U256,
        _data: &[u8],
    ) -> Result<(), Error> {
        self.balance0 += amount0_owed.saturating_sub(self.shortchange0);
        self.balance1 += amount1_owed.saturating_sub(self.shortchange1);
        Ok(())
    }

    fn swap_callback(
        &mut self,
        pair: &mut Pair,
        amount0_delta: I256,
        amount1_delta: I256,
        _data: &[u8],
    ) -> Result<(), Error> {
        if self.reenter_on_swap {
            self.reenter_on_swap = false;
            self.observe_outcome = Some(pair.observe(1000, &[0]));
            let limit = pair.slot0.sqrt_price_x96 - U256::ONE;
            self.reentry_outcome = Some(pair.swap(
                self,
                TRADER,
                true,
                I256::ONE,
                limit,
                1000,
                &[],
            ));
        }

        if amount0_delta > I256::ZERO {
            self.balance0 += amount0_delta.into_raw().saturating_sub(self.shortchange0);
        }
        if amount1_delta > I256::ZERO {
            self.balance1 += amount1_delta.into_raw().saturating_sub(self.shortchange1);
        }
        Ok(())
    }

    fn flash_callback(
        &mut self,
        _pair: &mut Pair,
        fee0: U256,
        fee1: U256,
        _data: &[u8],
    ) -> Result<(), Error> {
        self.balance0 += (self.flash_repay0 + fee0).saturating_sub(self.shortchange0);
        self.balance1 += (self.flash_repay1 + fee1).saturating_sub(self.shortchange1);
        Ok(())
    }
}

/// Fresh pair on the 0.3% / spacing-60 tier.
pub(crate) fn medium_fee_pair() -> Pair {
    Pair::new(TOKEN0, TOKEN1, OWNER, 3000, 60)
}

/// Full-range boundary ticks for spacing 60.
pub(crate) const MIN_TICK_60: i32 = -887220;
pub(crate) const MAX_TICK_60: i32 = 887220;
