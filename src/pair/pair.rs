use crate::FastMap;
use crate::Q128;
use crate::error::{Error, MathError, PairError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::swap_math::PIPS;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use crate::math::tick_bitmap::flip_tick;
use crate::pair::oracle::Observations;
use crate::pair::position::{Position, PositionKey, Positions, truncate_u128};
use crate::pair::tick::{self, Ticks, tick_spacing_to_max_liquidity_per_tick};
use alloy_primitives::{Address, I256, U256};

/// Hot state of the pair, read once per operation and persisted at the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot0 {
    /// Current sqrt price, Q64.96. Zero until `initialize`.
    pub sqrt_price_x96: U256,
    /// Largest tick whose sqrt ratio is at most `sqrt_price_x96`.
    pub tick: i32,
    /// Ring slot of the most recent oracle checkpoint.
    pub observation_index: u16,
    /// Number of populated (or placeholder-reachable) ring slots.
    pub observation_cardinality: u16,
    /// Allocated ring length the write pointer will grow into.
    pub observation_cardinality_next: u16,
    /// Protocol fee fractions, token0 in the low nibble and token1 in the
    /// high nibble; each is 0 or an inverse fraction 1/4..1/10.
    pub fee_protocol: u8,
    /// Reentrancy flag; false while a mutating operation is in flight.
    pub unlocked: bool,
}

/// Protocol's share of collected fees, claimable by the owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolFees {
    pub token0: u128,
    pub token1: u128,
}

/// Foreign surface the pair calls out to: token balances and transfers of
/// its own holdings, and the payment callbacks.
///
/// Callbacks receive the pair back mutably so they can legitimately read it
/// (queries are allowed mid-operation) or illegitimately attempt to
/// re-enter it, which fails against the lock. The callback must leave the
/// pair's balances topped up by the owed amounts before returning; the pair
/// verifies the delta afterwards.
pub trait PairHost {
    /// Pair's current balance of token0.
    fn balance0(&self) -> U256;
    /// Pair's current balance of token1.
    fn balance1(&self) -> U256;
    /// Transfers `amount` of token0 out of the pair.
    fn transfer0(&mut self, to: Address, amount: U256) -> Result<(), Error>;
    /// Transfers `amount` of token1 out of the pair.
    fn transfer1(&mut self, to: Address, amount: U256) -> Result<(), Error>;

    fn mint_callback(
        &mut self,
        pair: &mut Pair,
        amount0_owed: U256,
        amount1_owed: U256,
        data: &[u8],
    ) -> Result<(), Error>;

    fn swap_callback(
        &mut self,
        pair: &mut Pair,
        amount0_delta: I256,
        amount1_delta: I256,
        data: &[u8],
    ) -> Result<(), Error>;

    fn flash_callback(
        &mut self,
        pair: &mut Pair,
        fee0: U256,
        fee1: U256,
        data: &[u8],
    ) -> Result<(), Error>;
}

pub(crate) struct ModifyPositionParams {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity_delta: i128,
}

/// A single two-token concentrated-liquidity market.
///
/// The host serializes operations: a mutating call runs to completion
/// (including its callback) before the next begins, and a call that returns
/// an error is expected to be rolled back wholesale by the host, e.g. by
/// discarding a pre-call clone.
#[derive(Clone, Debug)]
pub struct Pair {
    pub token0: Address,
    pub token1: Address,
    /// Account allowed to set and collect protocol fees.
    pub owner: Address,
    /// Swap fee in hundredths of a basis point.
    pub fee_pips: u32,
    pub tick_spacing: i32,
    pub max_liquidity_per_tick: u128,

    pub slot0: Slot0,
    /// Liquidity of all positions whose range covers the current tick.
    pub liquidity: u128,
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub protocol_fees: ProtocolFees,

    pub ticks: Ticks,
    pub bitmap: FastMap<i16, U256>,
    pub positions: Positions,
    pub observations: Observations,
}

/// Canonical `(token0, token1)` ordering by numeric address value.
pub fn sort_tokens(token0: Address, token1: Address) -> (Address, Address) {
    if token0 < token1 {
        (token0, token1)
    } else {
        (token1, token0)
    }
}

impl Pair {
    pub fn new(
        token0: Address,
        token1: Address,
        owner: Address,
        fee_pips: u32,
        tick_spacing: i32,
    ) -> Self {
        let (token0, token1) = sort_tokens(token0, token1);

        Self {
            token0,
            token1,
            owner,
            fee_pips,
            tick_spacing,
            max_liquidity_per_tick: tick_spacing_to_max_liquidity_per_tick(tick_spacing),
            slot0: Slot0::default(),
            liquidity: 0,
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
            protocol_fees: ProtocolFees::default(),
            ticks: Ticks::default(),
            bitmap: FastMap::default(),
            positions: Positions::default(),
            observations: Observations::default(),
        }
    }

    pub(crate) fn lock(&mut self) -> Result<(), Error> {
        if !self.slot0.unlocked {
            return Err(PairError::Locked.into());
        }
        self.slot0.unlocked = false;
        Ok(())
    }

    pub(crate) fn unlock(&mut self) {
        self.slot0.unlocked = true;
    }

    pub(crate) fn check_ticks(tick_lower: i32, tick_upper: i32) -> Result<(), Error> {
        if tick_lower >= tick_upper {
            return Err(PairError::TickOrder.into());
        }
        if tick_lower < MIN_TICK {
            return Err(PairError::TickLowerBound.into());
        }
        if tick_upper > MAX_TICK {
            return Err(PairError::TickUpperBound.into());
        }
        Ok(())
    }

    /// Sets the starting price and seeds the oracle. Callable once; the
    /// pair stays locked against every mutating operation until this runs.
    pub fn initialize(&mut self, sqrt_price_x96: U256, time: u32) -> Result<(), Error> {
        if !self.slot0.sqrt_price_x96.is_zero() {
            return Err(PairError::AlreadyInitialized.into());
        }
        if sqrt_price_x96 < MIN_SQRT_RATIO {
            return Err(PairError::PriceTooLow.into());
        }
        if sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(PairError::PriceTooHigh.into());
        }

        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        let (cardinality, cardinality_next) = self.observations.initialize(time);

        self.slot0 = Slot0 {
            sqrt_price_x96,
            tick,
            observation_index: 0,
            observation_cardinality: cardinality,
            observation_cardinality_next: cardinality_next,
            fee_protocol: 0,
            unlocked: true,
        };

        tracing::debug!(
            target: "clamm_pair",
            event = "initialize",
            sqrt_price = %sqrt_price_x96,
            tick,
        );
        Ok(())
    }

    /// Adds `amount` liquidity to `(recipient, tick_lower, tick_upper)`,
    /// pulling the owed token amounts through the mint callback and
    /// verifying the balances actually grew by them.
    pub fn mint<H: PairHost>(
        &mut self,
        host: &mut H,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        time: u32,
        data: &[u8],
    ) -> Result<(U256, U256), Error> {
        self.lock()?;

        if amount == 0 {
            self.unlock();
            return Err(PairError::AmountSpecifiedZero.into());
        }
        // deltas are signed 128-bit, which also caps a single mint
        let liquidity_delta = i128::try_from(amount).map_err(|_| MathError::Overflow)?;

        let (amount0_int, amount1_int) = self.modify_position(
            ModifyPositionParams {
                owner: recipient,
                tick_lower,
                tick_upper,
                liquidity_delta,
            },
            time,
        )?;

        let amount0 = amount0_int.into_raw();
        let amount1 = amount1_int.into_raw();

        let balance0_before = if amount0.is_zero() {
            U256::ZERO
        } else {
            host.balance0()
        };
        let balance1_before = if amount1.is_zero() {
            U256::ZERO
        } else {
            host.balance1()
        };

        host.mint_callback(self, amount0, amount1, data)?;

        if !amount0.is_zero() && host.balance0() < balance0_before + amount0 {
            return Err(PairError::MintUnderpaid0.into());
        }
        if !amount1.is_zero() && host.balance1() < balance1_before + amount1 {
            return Err(PairError::MintUnderpaid1.into());
        }

        tracing::debug!(
            target: "clamm_pair",
            event = "mint",
            owner = %recipient,
            tick_lower,
            tick_upper,
            amount,
            amount0 = %amount0,
            amount1 = %amount1,
        );
        self.unlock();
        Ok((amount0, amount1))
    }

    /// Removes `amount` liquidity from the caller's position and credits
    /// the freed token amounts (plus any accrued fees) to `tokens_owed`.
    /// A zero-amount burn is a poke that just refreshes the fee snapshot.
    pub fn burn(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        time: u32,
    ) -> Result<(U256, U256), Error> {
        self.lock()?;

        let liquidity_delta = i128::try_from(amount).map_err(|_| MathError::Overflow)?;
        let (amount0_int, amount1_int) = self.modify_position(
            ModifyPositionParams {
                owner,
                tick_lower,
                tick_upper,
                liquidity_delta: -liquidity_delta,
            },
            time,
        )?;

        let amount0 = (-amount0_int).into_raw();
        let amount1 = (-amount1_int).into_raw();

        if !amount0.is_zero() || !amount1.is_zero() {
            let position = self
                .positions
                .entry((owner, tick_lower, tick_upper))
                .or_default();
            // owed balances truncate and wrap like the fee accrual does;
            // owners collect long before 2^128 accumulates
            position.tokens_owed_0 = position.tokens_owed_0.wrapping_add(truncate_u128(amount0));
            position.tokens_owed_1 = position.tokens_owed_1.wrapping_add(truncate_u128(amount1));
        }

        tracing::debug!(
            target: "clamm_pair",
            event = "burn",
            owner = %owner,
            tick_lower,
            tick_upper,
            amount,
            amount0 = %amount0,
            amount1 = %amount1,
        );
        self.unlock();
        Ok((amount0, amount1))
    }

    /// Pays out owed tokens from a position, up to the requested caps.
    pub fn collect<H: PairHost>(
        &mut self,
        host: &mut H,
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount_0_requested: u128,
        amount_1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        self.lock()?;

        let key: PositionKey = (owner, tick_lower, tick_upper);
        let (amount0, amount1) = match self.positions.get_mut(&key) {
            None => (0, 0),
            Some(position) => {
                let amount0 = amount_0_requested.min(position.tokens_owed_0);
                let amount1 = amount_1_requested.min(position.tokens_owed_1);
                position.tokens_owed_0 -= amount0;
                position.tokens_owed_1 -= amount1;
                (amount0, amount1)
            }
        };

        if amount0 > 0 {
            host.transfer0(recipient, U256::from(amount0))?;
        }
        if amount1 > 0 {
            host.transfer1(recipient, U256::from(amount1))?;
        }

        tracing::debug!(
            target: "clamm_pair",
            event = "collect",
            owner = %owner,
            recipient = %recipient,
            tick_lower,
            tick_upper,
            amount0,
            amount1,
        );
        self.unlock();
        Ok((amount0, amount1))
    }

    /// Lends out both tokens for the duration of the callback; the callback
    /// must return the principal plus the swap fee on each borrowed amount.
    /// Paid fees are split with the protocol and fed to the fee growth
    /// accumulators.
    pub fn flash<H: PairHost>(
        &mut self,
        host: &mut H,
        recipient: Address,
        amount0: U256,
        amount1: U256,
        data: &[u8],
    ) -> Result<(), Error> {
        self.lock()?;

        let liquidity = self.liquidity;
        if liquidity == 0 {
            self.unlock();
            return Err(crate::error::StateError::LiquidityIsZero.into());
        }

        let fee0 = mul_div_rounding_up(amount0, U256::from(self.fee_pips), U256::from(PIPS))?;
        let fee1 = mul_div_rounding_up(amount1, U256::from(self.fee_pips), U256::from(PIPS))?;
        let balance0_before = host.balance0();
        let balance1_before = host.balance1();

        if !amount0.is_zero() {
            host.transfer0(recipient, amount0)?;
        }
        if !amount1.is_zero() {
            host.transfer1(recipient, amount1)?;
        }

        host.flash_callback(self, fee0, fee1, data)?;

        let balance0_after = host.balance0();
        let balance1_after = host.balance1();

        if balance0_before + fee0 > balance0_after {
            return Err(PairError::FlashUnderpaid0.into());
        }
        if balance1_before + fee1 > balance1_after {
            return Err(PairError::FlashUnderpaid1.into());
        }

        // anything paid beyond the principal counts as fees
        let paid0 = balance0_after - balance0_before;
        let paid1 = balance1_after - balance1_before;

        if !paid0.is_zero() {
            let fee_protocol_0 = self.slot0.fee_protocol % 16;
            let delta = if fee_protocol_0 == 0 {
                U256::ZERO
            } else {
                paid0 / U256::from(fee_protocol_0)
            };
            self.protocol_fees.token0 = self
                .protocol_fees
                .token0
                .wrapping_add(u128::try_from(delta).map_err(|_| MathError::Overflow)?);
            self.fee_growth_global_0_x128 = self
                .fee_growth_global_0_x128
                .wrapping_add(mul_div(paid0 - delta, Q128, U256::from(liquidity))?);
        }
        if !paid1.is_zero() {
            let fee_protocol_1 = self.slot0.fee_protocol >> 4;
            let delta = if fee_protocol_1 == 0 {
                U256::ZERO
            } else {
                paid1 / U256::from(fee_protocol_1)
            };
            self.protocol_fees.token1 = self
                .protocol_fees
                .token1
                .wrapping_add(u128::try_from(delta).map_err(|_| MathError::Overflow)?);
            self.fee_growth_global_1_x128 = self
                .fee_growth_global_1_x128
                .wrapping_add(mul_div(paid1 - delta, Q128, U256::from(liquidity))?);
        }

        tracing::debug!(
            target: "clamm_pair",
            event = "flash",
            recipient = %recipient,
            amount0 = %amount0,
            amount1 = %amount1,
            paid0 = %paid0,
            paid1 = %paid1,
        );
        self.unlock();
        Ok(())
    }

    /// Point-in-time oracle query; permitted even while the pair is locked.
    pub fn observe(
        &self,
        time: u32,
        seconds_agos: &[u32],
    ) -> Result<(Vec<i64>, Vec<U256>), Error> {
        self.observations.observe(
            time,
            seconds_agos,
            self.slot0.tick,
            self.slot0.observation_index,
            self.liquidity,
            self.slot0.observation_cardinality,
        )
    }

    /// Grows the oracle ring allocation. No-op when `target` does not
    /// exceed the current allocation.
    pub fn increase_observation_cardinality_next(&mut self, target: u16) -> Result<(), Error> {
        self.lock()?;

        let previous = self.slot0.observation_cardinality_next;
        let updated = self.observations.grow(previous, target)?;
        self.slot0.observation_cardinality_next = updated;

        if previous != updated {
            tracing::debug!(
                target: "clamm_pair",
                event = "increase_observation_cardinality_next",
                previous,
                updated,
            );
        }
        self.unlock();
        Ok(())
    }

    /// Sets the protocol's cut of swap fees per token: zero, or an inverse
    /// fraction between 1/4 and 1/10. Owner only.
    pub fn set_fee_protocol(
        &mut self,
        caller: Address,
        fee_protocol_0: u8,
        fee_protocol_1: u8,
    ) -> Result<(), Error> {
        self.lock()?;
        if caller != self.owner {
            self.unlock();
            return Err(PairError::NotOwner.into());
        }
        let valid = |fp: u8| fp == 0 || (4..=10).contains(&fp);
        if !valid(fee_protocol_0) || !valid(fee_protocol_1) {
            self.unlock();
            return Err(PairError::ProtocolFeeOutOfRange.into());
        }

        let old = self.slot0.fee_protocol;
        self.slot0.fee_protocol = fee_protocol_0 + (fee_protocol_1 << 4);

        tracing::debug!(
            target: "clamm_pair",
            event = "set_fee_protocol",
            old,
            new = self.slot0.fee_protocol,
        );
        self.unlock();
        Ok(())
    }

    /// Pays accumulated protocol fees out to `recipient`, up to the
    /// requested caps. Owner only.
    pub fn collect_protocol<H: PairHost>(
        &mut self,
        host: &mut H,
        caller: Address,
        recipient: Address,
        amount_0_requested: u128,
        amount_1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        self.lock()?;
        if caller != self.owner {
            self.unlock();
            return Err(PairError::NotOwner.into());
        }

        let amount0 = amount_0_requested.min(self.protocol_fees.token0);
        let amount1 = amount_1_requested.min(self.protocol_fees.token1);

        if amount0 > 0 {
            self.protocol_fees.token0 -= amount0;
            host.transfer0(recipient, U256::from(amount0))?;
        }
        if amount1 > 0 {
            self.protocol_fees.token1 -= amount1;
            host.transfer1(recipient, U256::from(amount1))?;
        }

        tracing::debug!(
            target: "clamm_pair",
            event = "collect_protocol",
            recipient = %recipient,
            amount0,
            amount1,
        );
        self.unlock();
        Ok((amount0, amount1))
    }

    /// Cumulative tick, seconds-per-liquidity and seconds spent inside a
    /// tick range, derived from the per-tick "outside" accumulators. Both
    /// boundary ticks must be initialized.
    pub fn snapshot_cumulatives_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        time: u32,
    ) -> Result<(i64, U256, u32), Error> {
        Self::check_ticks(tick_lower, tick_upper)?;

        let (lower, upper) = match (self.ticks.get(&tick_lower), self.ticks.get(&tick_upper)) {
            (Some(lower), Some(upper)) if lower.initialized && upper.initialized => (lower, upper),
            _ => return Err(crate::error::StateError::TickOutOfBounds.into()),
        };

        let tick_current = self.slot0.tick;

        if tick_current < tick_lower {
            Ok((
                lower
                    .tick_cumulative_outside
                    .wrapping_sub(upper.tick_cumulative_outside),
                lower
                    .seconds_per_liquidity_outside_x128
                    .wrapping_sub(upper.seconds_per_liquidity_outside_x128),
                lower.seconds_outside.wrapping_sub(upper.seconds_outside),
            ))
        } else if tick_current < tick_upper {
            let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                self.observations.observe_single(
                    time,
                    0,
                    tick_current,
                    self.slot0.observation_index,
                    self.liquidity,
                    self.slot0.observation_cardinality,
                )?;
            Ok((
                tick_cumulative
                    .wrapping_sub(lower.tick_cumulative_outside)
                    .wrapping_sub(upper.tick_cumulative_outside),
                seconds_per_liquidity_cumulative_x128
                    .wrapping_sub(lower.seconds_per_liquidity_outside_x128)
                    .wrapping_sub(upper.seconds_per_liquidity_outside_x128),
                time.wrapping_sub(lower.seconds_outside)
                    .wrapping_sub(upper.seconds_outside),
            ))
        } else {
            Ok((
                upper
                    .tick_cumulative_outside
                    .wrapping_sub(lower.tick_cumulative_outside),
                upper
                    .seconds_per_liquidity_outside_x128
                    .wrapping_sub(lower.seconds_per_liquidity_outside_x128),
                upper.seconds_outside.wrapping_sub(lower.seconds_outside),
            ))
        }
    }

    /// Applies a liquidity change to a position and reports the signed
    /// token amounts it implies at the current price (positive amounts are
    /// owed to the pair).
    pub(crate) fn modify_position(
        &mut self,
        params: ModifyPositionParams,
        time: u32,
    ) -> Result<(I256, I256), Error> {
        Self::check_ticks(params.tick_lower, params.tick_upper)?;

        self.update_position(
            params.owner,
            params.tick_lower,
            params.tick_upper,
            params.liquidity_delta,
            time,
        )?;

        let mut amount0 = I256::ZERO;
        let mut amount1 = I256::ZERO;

        if params.liquidity_delta != 0 {
            if self.slot0.tick < params.tick_lower {
                // range entirely above the price: held in token0 only
                amount0 = get_amount_0_delta(
                    get_sqrt_ratio_at_tick(params.tick_lower)?,
                    get_sqrt_ratio_at_tick(params.tick_upper)?,
                    params.liquidity_delta,
                )?;
            } else if self.slot0.tick < params.tick_upper {
                // the range is live: active liquidity changes, which is an
                // oracle-visible event
                let liquidity_before = self.liquidity;

                (
                    self.slot0.observation_index,
                    self.slot0.observation_cardinality,
                ) = self.observations.write(
                    self.slot0.observation_index,
                    time,
                    self.slot0.tick,
                    liquidity_before,
                    self.slot0.observation_cardinality,
                    self.slot0.observation_cardinality_next,
                );

                amount0 = get_amount_0_delta(
                    self.slot0.sqrt_price_x96,
                    get_sqrt_ratio_at_tick(params.tick_upper)?,
                    params.liquidity_delta,
                )?;
                amount1 = get_amount_1_delta(
                    get_sqrt_ratio_at_tick(params.tick_lower)?,
                    self.slot0.sqrt_price_x96,
                    params.liquidity_delta,
                )?;

                self.liquidity = add_delta(liquidity_before, params.liquidity_delta)?;
            } else {
                // range entirely below the price: held in token1 only
                amount1 = get_amount_1_delta(
                    get_sqrt_ratio_at_tick(params.tick_lower)?,
                    get_sqrt_ratio_at_tick(params.tick_upper)?,
                    params.liquidity_delta,
                )?;
            }
        }

        Ok((amount0, amount1))
    }

    /// Updates the boundary ticks, the bitmap and the position record for a
    /// liquidity change, attributing fees accrued since the position's last
    /// snapshot.
    fn update_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
        time: u32,
    ) -> Result<(), Error> {
        let tick_current = self.slot0.tick;
        let fee_growth_global_0_x128 = self.fee_growth_global_0_x128;
        let fee_growth_global_1_x128 = self.fee_growth_global_1_x128;

        let mut flipped_lower = false;
        let mut flipped_upper = false;

        if liquidity_delta != 0 {
            let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                self.observations.observe_single(
                    time,
                    0,
                    tick_current,
                    self.slot0.observation_index,
                    self.liquidity,
                    self.slot0.observation_cardinality,
                )?;

            flipped_lower = tick::update(
                &mut self.ticks,
                tick_lower,
                tick_current,
                liquidity_delta,
                fee_growth_global_0_x128,
                fee_growth_global_1_x128,
                seconds_per_liquidity_cumulative_x128,
                tick_cumulative,
                time,
                false,
                self.max_liquidity_per_tick,
            )?;
            flipped_upper = tick::update(
                &mut self.ticks,
                tick_upper,
                tick_current,
                liquidity_delta,
                fee_growth_global_0_x128,
                fee_growth_global_1_x128,
                seconds_per_liquidity_cumulative_x128,
                tick_cumulative,
                time,
                true,
                self.max_liquidity_per_tick,
            )?;

            if flipped_lower {
                flip_tick(&mut self.bitmap, tick_lower, self.tick_spacing)?;
            }
            if flipped_upper {
                flip_tick(&mut self.bitmap, tick_upper, self.tick_spacing)?;
            }
        }

        let (fee_growth_inside_0_x128, fee_growth_inside_1_x128) = tick::get_fee_growth_inside(
            &self.ticks,
            tick_lower,
            tick_upper,
            tick_current,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
        );

        self.positions
            .entry((owner, tick_lower, tick_upper))
            .or_default()
            .update(
                liquidity_delta,
                fee_growth_inside_0_x128,
                fee_growth_inside_1_x128,
            )?;

        // burning the last liquidity referencing a tick retires it
        if liquidity_delta < 0 {
            if flipped_lower {
                tick::clear(&mut self.ticks, tick_lower);
            }
            if flipped_upper {
                tick::clear(&mut self.ticks, tick_upper);
            }
        }

        Ok(())
    }

    /// Read access for a position record.
    pub fn position(&self, owner: Address, tick_lower: i32, tick_upper: i32) -> Option<&Position> {
        self.positions.get(&(owner, tick_lower, tick_upper))
    }

    /// Read access for a tick's bookkeeping entry.
    pub fn tick(&self, tick: i32) -> Option<&tick::TickInfo> {
        self.ticks.get(&tick)
    }
}
