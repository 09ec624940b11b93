use crate::error::{Error, MathError, PairError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_bitmap::next_initialized_tick_within_one_word;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use crate::Q128;
use crate::pair::pair::{Pair, PairHost};
use crate::pair::tick;
use alloy_primitives::{Address, I256, U256};

/// Values fixed for the whole swap, read once up front.
struct SwapCache {
    /// Protocol fee fraction for the input token of this direction.
    fee_protocol: u8,
    /// Active liquidity before the swap; oracle writes use the pre-swap
    /// values.
    liquidity_start: u128,
    block_timestamp: u32,
    /// Current accumulator values, computed lazily before the first
    /// initialized-tick crossing and reused for every later one.
    tick_cumulative: i64,
    seconds_per_liquidity_cumulative_x128: U256,
    computed_latest_observation: bool,
}

/// Running state of the swap, committed to the pair when the loop ends.
struct SwapState {
    /// Input (exact-in) or output (exact-out) amount still to be swapped.
    amount_specified_remaining: I256,
    /// The opposite amount accumulated so far.
    amount_calculated: I256,
    sqrt_price_x96: U256,
    tick: i32,
    /// Fee growth of the input token; written back globally at the end.
    fee_growth_global_x128: U256,
    /// Input-token fees diverted to the protocol during this swap.
    protocol_fee: u128,
    liquidity: u128,
}

#[derive(Default)]
struct StepComputations {
    sqrt_price_start_x96: U256,
    tick_next: i32,
    initialized: bool,
    sqrt_price_next_x96: U256,
    amount_in: U256,
    amount_out: U256,
    fee_amount: U256,
}

impl Pair {
    /// Swaps token0 for token1 (`zero_for_one`) or the reverse. A positive
    /// `amount_specified` is an exact input, a negative one an exact
    /// output. The price will not move past `sqrt_price_limit_x96`.
    ///
    /// The output is transferred to `recipient` before the swap callback
    /// runs; the callback must pay the input side in, and the pair checks
    /// its balance actually grew by the owed amount.
    ///
    /// Returns the signed `(amount0, amount1)` deltas from the pair's
    /// perspective (positive amounts were taken in).
    #[allow(clippy::too_many_arguments)]
    pub fn swap<H: PairHost>(
        &mut self,
        host: &mut H,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: I256,
        sqrt_price_limit_x96: U256,
        time: u32,
        data: &[u8],
    ) -> Result<(I256, I256), Error> {
        if amount_specified.is_zero() {
            return Err(PairError::AmountSpecifiedZero.into());
        }

        let slot0_start = self.slot0;

        if !slot0_start.unlocked {
            return Err(PairError::Locked.into());
        }
        let limit_in_range = if zero_for_one {
            sqrt_price_limit_x96 < slot0_start.sqrt_price_x96
                && sqrt_price_limit_x96 > MIN_SQRT_RATIO
        } else {
            sqrt_price_limit_x96 > slot0_start.sqrt_price_x96
                && sqrt_price_limit_x96 < MAX_SQRT_RATIO
        };
        if !limit_in_range {
            return Err(PairError::PriceLimitOutOfRange.into());
        }

        self.slot0.unlocked = false;

        let mut cache = SwapCache {
            liquidity_start: self.liquidity,
            block_timestamp: time,
            fee_protocol: if zero_for_one {
                slot0_start.fee_protocol % 16
            } else {
                slot0_start.fee_protocol >> 4
            },
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: U256::ZERO,
            computed_latest_observation: false,
        };

        let exact_input = amount_specified > I256::ZERO;

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: slot0_start.sqrt_price_x96,
            tick: slot0_start.tick,
            fee_growth_global_x128: if zero_for_one {
                self.fee_growth_global_0_x128
            } else {
                self.fee_growth_global_1_x128
            },
            protocol_fee: 0,
            liquidity: cache.liquidity_start,
        };

        while !state.amount_specified_remaining.is_zero()
            && state.sqrt_price_x96 != sqrt_price_limit_x96
        {
            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..Default::default()
            };

            (step.tick_next, step.initialized) = next_initialized_tick_within_one_word(
                &self.bitmap,
                state.tick,
                self.tick_spacing,
                zero_for_one,
            )?;

            // the bitmap is unaware of the usable range
            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);

            step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

            // swap up to the nearer of the next initialized tick and the
            // caller's limit
            let sqrt_price_target_x96 = if zero_for_one {
                step.sqrt_price_next_x96.max(sqrt_price_limit_x96)
            } else {
                step.sqrt_price_next_x96.min(sqrt_price_limit_x96)
            };

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                sqrt_price_target_x96,
                state.liquidity,
                state.amount_specified_remaining,
                self.fee_pips,
            )?;

            if exact_input {
                state.amount_specified_remaining -=
                    I256::from_raw(step.amount_in + step.fee_amount);
                state.amount_calculated -= I256::from_raw(step.amount_out);
            } else {
                state.amount_specified_remaining += I256::from_raw(step.amount_out);
                state.amount_calculated += I256::from_raw(step.amount_in + step.fee_amount);
            }

            if cache.fee_protocol > 0 {
                let delta = step.fee_amount / U256::from(cache.fee_protocol);
                step.fee_amount -= delta;
                state.protocol_fee = state
                    .protocol_fee
                    .wrapping_add(u128::try_from(delta).map_err(|_| MathError::Overflow)?);
            }

            // fees accrue per unit of liquidity; in a gap with none they are
            // simply kept by the pair
            if state.liquidity > 0 {
                state.fee_growth_global_x128 = state.fee_growth_global_x128.wrapping_add(mul_div(
                    step.fee_amount,
                    Q128,
                    U256::from(state.liquidity),
                )?);
            }

            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                // reached the next tick; cross it if it is initialized
                if step.initialized {
                    if !cache.computed_latest_observation {
                        (
                            cache.tick_cumulative,
                            cache.seconds_per_liquidity_cumulative_x128,
                        ) = self.observations.observe_single(
                            cache.block_timestamp,
                            0,
                            slot0_start.tick,
                            slot0_start.observation_index,
                            cache.liquidity_start,
                            slot0_start.observation_cardinality,
                        )?;
                        cache.computed_latest_observation = true;
                    }

                    let mut liquidity_net = tick::cross(
                        &mut self.ticks,
                        step.tick_next,
                        if zero_for_one {
                            state.fee_growth_global_x128
                        } else {
                            self.fee_growth_global_0_x128
                        },
                        if zero_for_one {
                            self.fee_growth_global_1_x128
                        } else {
                            state.fee_growth_global_x128
                        },
                        cache.seconds_per_liquidity_cumulative_x128,
                        cache.tick_cumulative,
                        cache.block_timestamp,
                    );

                    if zero_for_one {
                        liquidity_net = -liquidity_net;
                    }
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                }

                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };

                // pinned against the end of the usable range with amount
                // still open and no limit hit
                if (step.tick_next == MIN_TICK || step.tick_next == MAX_TICK)
                    && !state.amount_specified_remaining.is_zero()
                    && state.sqrt_price_x96 != sqrt_price_limit_x96
                {
                    return Err(PairError::TickRangeBoundary.into());
                }
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
            }
        }

        // one oracle checkpoint per swap that moved the tick, stamped with
        // the pre-swap values
        if state.tick != slot0_start.tick {
            let (observation_index, observation_cardinality) = self.observations.write(
                slot0_start.observation_index,
                cache.block_timestamp,
                slot0_start.tick,
                cache.liquidity_start,
                slot0_start.observation_cardinality,
                slot0_start.observation_cardinality_next,
            );
            self.slot0.observation_index = observation_index;
            self.slot0.observation_cardinality = observation_cardinality;
        }
        self.slot0.sqrt_price_x96 = state.sqrt_price_x96;
        self.slot0.tick = state.tick;

        if cache.liquidity_start != state.liquidity {
            self.liquidity = state.liquidity;
        }

        if zero_for_one {
            self.fee_growth_global_0_x128 = state.fee_growth_global_x128;
            if state.protocol_fee > 0 {
                self.protocol_fees.token0 =
                    self.protocol_fees.token0.wrapping_add(state.protocol_fee);
            }
        } else {
            self.fee_growth_global_1_x128 = state.fee_growth_global_x128;
            if state.protocol_fee > 0 {
                self.protocol_fees.token1 =
                    self.protocol_fees.token1.wrapping_add(state.protocol_fee);
            }
        }

        let (amount0, amount1) = if zero_for_one == exact_input {
            (
                amount_specified - state.amount_specified_remaining,
                state.amount_calculated,
            )
        } else {
            (
                state.amount_calculated,
                amount_specified - state.amount_specified_remaining,
            )
        };

        // pay the output out, then pull the input through the callback
        if zero_for_one {
            if amount1 < I256::ZERO {
                host.transfer1(recipient, (-amount1).into_raw())?;
            }
            let balance0_before = host.balance0();
            host.swap_callback(self, amount0, amount1, data)?;
            if host.balance0() < balance0_before + amount0.into_raw() {
                return Err(PairError::InputUnderpaid.into());
            }
        } else {
            if amount0 < I256::ZERO {
                host.transfer0(recipient, (-amount0).into_raw())?;
            }
            let balance1_before = host.balance1();
            host.swap_callback(self, amount0, amount1, data)?;
            if host.balance1() < balance1_before + amount1.into_raw() {
                return Err(PairError::InputUnderpaid.into());
            }
        }

        tracing::debug!(
            target: "clamm_pair",
            event = "swap",
            recipient = %recipient,
            zero_for_one,
            amount0 = %amount0,
            amount1 = %amount1,
            sqrt_price = %state.sqrt_price_x96,
            liquidity = state.liquidity,
            tick = state.tick,
        );
        self.slot0.unlocked = true;
        Ok((amount0, amount1))
    }
}
