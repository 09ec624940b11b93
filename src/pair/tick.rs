use crate::FastMap;
use crate::error::{Error, MathError, PairError};
use crate::math::liquidity_math::add_delta;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use alloy_primitives::U256;

/// Sparse tick table: only ticks referenced by at least one position carry
/// an entry.
pub type Ticks = FastMap<i32, TickInfo>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickInfo {
    /// Total position liquidity referencing this tick.
    pub liquidity_gross: u128,
    /// Net liquidity added when the tick is crossed left to right.
    pub liquidity_net: i128,
    /// Fee growth on the _other_ side of this tick relative to the current
    /// tick. Only meaningful relative to a particular crossing history.
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
    /// Cumulative tick value on the other side of this tick.
    pub tick_cumulative_outside: i64,
    /// Seconds per unit of liquidity on the other side of this tick.
    pub seconds_per_liquidity_outside_x128: U256,
    /// Seconds spent on the other side of this tick.
    pub seconds_outside: u32,
    /// Equivalent to `liquidity_gross != 0`; kept explicit so a cleared and
    /// a never-touched tick read the same.
    pub initialized: bool,
}

/// Cap on `liquidity_gross` per tick so that the summed liquidity of a full
/// sweep across every usable tick cannot overflow a u128.
pub fn tick_spacing_to_max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

/// Applies a liquidity delta at `tick` for one side of a position, creating
/// the entry on first use. Returns whether the tick flipped between
/// initialized and uninitialized.
///
/// A tick initialized at or below the current tick snapshots the running
/// global accumulators as its "outside" values; above it they start at zero.
/// Either way `get_fee_growth_inside` reduces to the correct difference.
#[allow(clippy::too_many_arguments)]
pub fn update(
    ticks: &mut Ticks,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
    seconds_per_liquidity_cumulative_x128: U256,
    tick_cumulative: i64,
    time: u32,
    upper: bool,
    max_liquidity: u128,
) -> Result<bool, Error> {
    let info = ticks.entry(tick).or_default();

    let liquidity_gross_before = info.liquidity_gross;
    let liquidity_gross_after = add_delta(liquidity_gross_before, liquidity_delta)?;

    if liquidity_gross_after > max_liquidity {
        return Err(PairError::TickLiquidityOverflow.into());
    }

    let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

    if liquidity_gross_before == 0 {
        // growth that predates the tick is attributed below it
        if tick <= tick_current {
            info.fee_growth_outside_0_x128 = fee_growth_global_0_x128;
            info.fee_growth_outside_1_x128 = fee_growth_global_1_x128;
            info.seconds_per_liquidity_outside_x128 = seconds_per_liquidity_cumulative_x128;
            info.tick_cumulative_outside = tick_cumulative;
            info.seconds_outside = time;
        }
        info.initialized = true;
    }

    info.liquidity_gross = liquidity_gross_after;

    // a lower tick adds liquidity when crossed rightward, an upper tick
    // removes it
    info.liquidity_net = if upper {
        info.liquidity_net.checked_sub(liquidity_delta)
    } else {
        info.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(MathError::Overflow)?;

    Ok(flipped)
}

/// Flips every "outside" accumulator of `tick` as the price sweeps through
/// it, and returns the net liquidity to apply. Called exactly once per
/// crossing; all subtractions wrap by design.
pub fn cross(
    ticks: &mut Ticks,
    tick: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
    seconds_per_liquidity_cumulative_x128: U256,
    tick_cumulative: i64,
    time: u32,
) -> i128 {
    let info = ticks.entry(tick).or_default();

    info.fee_growth_outside_0_x128 =
        fee_growth_global_0_x128.wrapping_sub(info.fee_growth_outside_0_x128);
    info.fee_growth_outside_1_x128 =
        fee_growth_global_1_x128.wrapping_sub(info.fee_growth_outside_1_x128);
    info.seconds_per_liquidity_outside_x128 = seconds_per_liquidity_cumulative_x128
        .wrapping_sub(info.seconds_per_liquidity_outside_x128);
    info.tick_cumulative_outside = tick_cumulative.wrapping_sub(info.tick_cumulative_outside);
    info.seconds_outside = time.wrapping_sub(info.seconds_outside);

    info.liquidity_net
}

/// Drops the entry for `tick` once nothing references it.
pub fn clear(ticks: &mut Ticks, tick: i32) {
    ticks.remove(&tick);
}

/// All-time fee growth per unit of liquidity inside `[tick_lower,
/// tick_upper]`, i.e. the global accumulator minus the growth outside each
/// boundary on the side away from `tick_current`. Wrapping subtraction is
/// intended; positions only ever consume differences of this value.
pub fn get_fee_growth_inside(
    ticks: &Ticks,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let lower = ticks.get(&tick_lower).cloned().unwrap_or_default();
    let upper = ticks.get(&tick_upper).cloned().unwrap_or_default();

    let (fee_growth_below_0_x128, fee_growth_below_1_x128) = if tick_current >= tick_lower {
        (
            lower.fee_growth_outside_0_x128,
            lower.fee_growth_outside_1_x128,
        )
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(lower.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(lower.fee_growth_outside_1_x128),
        )
    };

    let (fee_growth_above_0_x128, fee_growth_above_1_x128) = if tick_current < tick_upper {
        (
            upper.fee_growth_outside_0_x128,
            upper.fee_growth_outside_1_x128,
        )
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(upper.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    };

    (
        fee_growth_global_0_x128
            .wrapping_sub(fee_growth_below_0_x128)
            .wrapping_sub(fee_growth_above_0_x128),
        fee_growth_global_1_x128
            .wrapping_sub(fee_growth_below_1_x128)
            .wrapping_sub(fee_growth_above_1_x128),
    )
}
