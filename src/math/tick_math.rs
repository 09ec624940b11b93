use crate::error::StateError;
use crate::{U256_127, U256_128};
use alloy_primitives::{I256, U256};

/// Lowest tick for which `1.0001^tick` is representable in Q64.96.
pub const MIN_TICK: i32 = -887272;
/// Highest usable tick; the negation of [`MIN_TICK`].
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`; valid sqrt prices are strictly below.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

// 128.128 fixed-point constants for the log_1.0001 conversion below.
const SQRT_10001: I256 = I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
const TICK_LOW: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
const TICK_HIGH: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

/// Q64.96 sqrt price at a tick index, i.e. `sqrt(1.0001^tick) * 2^96`,
/// accurate to within 1 ulp over the whole tick range.
///
/// The product chain multiplies one precomputed 128.128 factor per set bit
/// of `|tick|`, then inverts for positive ticks.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    macro_rules! apply_factor {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> 128;
            }
        };
    }

    apply_factor!(2, 6459403834229662010, 18444899583751176498);
    apply_factor!(4, 17226890335427755468, 18443055278223354162);
    apply_factor!(8, 2032852871939366096, 18439367220385604838);
    apply_factor!(16, 14545316742740207172, 18431993317065449817);
    apply_factor!(32, 5129152022828963008, 18417254355718160513);
    apply_factor!(64, 4894419605888772193, 18387811781193591352);
    apply_factor!(128, 1280255884321894483, 18329067761203520168);
    apply_factor!(256, 15924666964335305636, 18212142134806087854);
    apply_factor!(512, 8010504389359918676, 17980523815641551639);
    apply_factor!(1024, 10668036004952895731, 17526086738831147013);
    apply_factor!(2048, 4878133418470705625, 16651378430235024244);
    apply_factor!(4096, 9537173718739605541, 15030750278693429944);
    apply_factor!(8192, 9972618978014552549, 12247334978882834399);
    apply_factor!(16384, 10428997489610666743, 8131365268884726200);
    apply_factor!(32768, 9305304367709015974, 3584323654723342297);
    apply_factor!(65536, 14301143598189091785, 696457651847595233);
    apply_factor!(131072, 7393154844743099908, 26294789957452057);
    apply_factor!(262144, 2209338891292245656, 37481735321082);
    apply_factor!(524288, 10518117631919034274, 76158723);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // 128.128 -> 64.96, rounding up so the boundary invariant
    // sqrt_ratio_at_tick(t) <= p < sqrt_ratio_at_tick(t + 1) holds.
    let round = (ratio.as_limbs()[0] & 0xFFFF_FFFF != 0) as u64;
    Ok((ratio >> 32) + U256::from(round))
}

const MASK_128: U256 = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);
const MASK_64: U256 = U256::from_limbs([u64::MAX, 0, 0, 0]);
const MASK_32: U256 = U256::from_limbs([u32::MAX as u64, 0, 0, 0]);
const MASK_16: U256 = U256::from_limbs([u16::MAX as u64, 0, 0, 0]);

#[inline(always)]
fn most_significant_bit_shifted(mut r: U256) -> u32 {
    let mut msb: u32 = 0;

    if r > MASK_128 {
        msb |= 128;
        r >>= 128;
    }
    if r > MASK_64 {
        msb |= 64;
        r >>= 64;
    }
    if r > MASK_32 {
        msb |= 32;
        r >>= 32;
    }
    if r > MASK_16 {
        msb |= 16;
        r >>= 16;
    }
    if r > U256::from(255u64) {
        msb |= 8;
        r >>= 8;
    }
    if r > U256::from(15u64) {
        msb |= 4;
        r >>= 4;
    }
    if r > U256::from(3u64) {
        msb |= 2;
        r >>= 2;
    }
    if r > U256::ONE {
        msb |= 1;
    }

    msb
}

/// Largest tick whose sqrt ratio is at most `sqrt_price_x96`.
///
/// Extracts the integer part of log2 from the leading bit, refines fourteen
/// fractional bits by repeated squaring, rescales to log base sqrt(1.0001)
/// and then picks between the two candidate ticks the error bound allows.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, StateError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x96 << 32;
    let msb = most_significant_bit_shifted(ratio);

    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: I256 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << 64;

    macro_rules! log2_fraction_bit {
        ($shift:expr) => {{
            r = r.overflowing_mul(r).0 >> U256_127;
            let f = r >> 128;
            log_2 |= I256::from_raw(f << $shift);
            r >>= f;
        }};
    }

    log2_fraction_bit!(63);
    log2_fraction_bit!(62);
    log2_fraction_bit!(61);
    log2_fraction_bit!(60);
    log2_fraction_bit!(59);
    log2_fraction_bit!(58);
    log2_fraction_bit!(57);
    log2_fraction_bit!(56);
    log2_fraction_bit!(55);
    log2_fraction_bit!(54);
    log2_fraction_bit!(53);
    log2_fraction_bit!(52);
    log2_fraction_bit!(51);
    log2_fraction_bit!(50);

    let log_sqrt10001 = log_2.wrapping_mul(SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW) >> 128usize).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH) >> 128usize).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}
