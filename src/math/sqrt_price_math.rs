use crate::RESOLUTION;
use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::{
    Q96, U160_MAX,
    error::{Error, MathError, StateError},
};
use alloy_primitives::{I256, U256};

/// Next sqrt price after moving `amount` of token0 into (`add`) or out of
/// (`!add`) the pair at constant liquidity. Rounds up, so the price never
/// understates what the trader owes.
///
/// Solves `sqrt' = L * sqrt / (L +- amount * sqrt)`, falling back to the
/// algebraically equal `L / (L / sqrt +- amount)` when the product would not
/// fit in 256 bits.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if amount.is_zero() {
        return Ok(sqrt_p_x96);
    }

    let numerator1: U256 = U256::from(liquidity) << RESOLUTION;
    let product: U256 = amount.wrapping_mul(sqrt_p_x96);

    if add {
        if product.wrapping_div(amount) == sqrt_p_x96 {
            let denominator = numerator1.wrapping_add(product);
            if denominator >= numerator1 {
                return mul_div_rounding_up(numerator1, sqrt_p_x96, denominator)
                    .map_err(Error::from);
            }
        }
        Ok(div_rounding_up(
            numerator1,
            (numerator1 / sqrt_p_x96) + amount,
        ))
    } else {
        // removing token0 only works while the virtual reserves cover it
        if product.wrapping_div(amount) != sqrt_p_x96 || numerator1 <= product {
            return Err(StateError::InsufficientReserves.into());
        }
        let denominator = numerator1 - product;
        mul_div_rounding_up(numerator1, sqrt_p_x96, denominator).map_err(Error::from)
    }
}

/// Next sqrt price after moving `amount` of token1 into (`add`) or out of
/// (`!add`) the pair at constant liquidity. Rounds down.
///
/// Solves `sqrt' = sqrt +- amount * 2^96 / L`.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    let liquidity = U256::from(liquidity);
    if add {
        let quotient: U256 = if amount < U160_MAX {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };

        let result = sqrt_p_x96 + quotient;
        if result < U160_MAX {
            Ok(result)
        } else {
            Err(MathError::Overflow.into())
        }
    } else {
        let quotient: U256 = if amount < U160_MAX {
            div_rounding_up(amount << RESOLUTION, liquidity)
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };

        if sqrt_p_x96 <= quotient {
            return Err(StateError::InsufficientReserves.into());
        }
        Ok(sqrt_p_x96 - quotient)
    }
}

/// Token0 amount between two sqrt prices for `liquidity`, with directed
/// rounding: `L * 2^96 * (sqrt_b - sqrt_a) / (sqrt_b * sqrt_a)`.
pub fn get_amount_0_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    if sqrt_ratio_a_x96.is_zero() {
        return Err(StateError::SqrtRatioIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_ratio_b_x96)?,
            sqrt_ratio_a_x96,
        ))
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_ratio_b_x96)? / sqrt_ratio_a_x96)
    }
}

/// Token1 amount between two sqrt prices for `liquidity`, with directed
/// rounding: `L * (sqrt_b - sqrt_a) / 2^96`.
pub fn get_amount_1_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change. Positive liquidity
/// rounds against the caller, negative rounds in the caller's favor being
/// removed.
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    if liquidity < 0 {
        Ok(-I256::from_raw(get_amount_0_delta_base(
            sqrt_ratio_a_x96,
            sqrt_ratio_b_x96,
            liquidity.unsigned_abs(),
            false,
        )?))
    } else {
        Ok(I256::from_raw(get_amount_0_delta_base(
            sqrt_ratio_a_x96,
            sqrt_ratio_b_x96,
            liquidity as u128,
            true,
        )?))
    }
}

/// Signed token1 delta for a signed liquidity change; see
/// [`get_amount_0_delta`].
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    if liquidity < 0 {
        Ok(-I256::from_raw(get_amount_1_delta_base(
            sqrt_ratio_a_x96,
            sqrt_ratio_b_x96,
            liquidity.unsigned_abs(),
            false,
        )?))
    } else {
        Ok(I256::from_raw(get_amount_1_delta_base(
            sqrt_ratio_a_x96,
            sqrt_ratio_b_x96,
            liquidity as u128,
            true,
        )?))
    }
}

/// Next sqrt price from an exact input amount, never overshooting in the
/// trade direction.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price from an exact output amount; errors when the requested
/// output cannot be produced from the virtual reserves.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_out, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::U256_1;
    use std::{
        ops::{Add, Sub},
        str::FromStr,
    };

    const SQRT_ONE: &str = "79228162514264337593543950336"; // 2^96, price 1

    #[test]
    fn next_price_from_input_preconditions() {
        assert_eq!(
            get_next_sqrt_price_from_input(U256::ZERO, 1, U256::from(1u8), false),
            Err(Error::StateError(StateError::SqrtPriceIsZero))
        );
        assert_eq!(
            get_next_sqrt_price_from_input(U256_1, 0, U256::from(1u8), true),
            Err(Error::StateError(StateError::LiquidityIsZero))
        );
    }

    #[test]
    fn next_price_from_input_zero_amount_is_identity() {
        let price = U256::from_str(SQRT_ONE).unwrap();
        for zero_for_one in [true, false] {
            assert_eq!(
                get_next_sqrt_price_from_input(price, 1e17 as u128, U256::ZERO, zero_for_one)
                    .unwrap(),
                price
            );
        }
    }

    #[test]
    fn next_price_from_input_cannot_underflow() {
        // an absurd token0 input drives the price to the floor, never past it
        let result = get_next_sqrt_price_from_input(
            U256_1,
            1,
            U256::from_str(
                "57896044618658097711785492504343953926634992332820282019728792003956564819968",
            )
            .unwrap(),
            true,
        );
        assert_eq!(result.unwrap(), U256_1);
    }

    #[test]
    fn next_price_from_input_overflow_guard() {
        let result =
            get_next_sqrt_price_from_input(U160_MAX - U256_1, 1024, U256::from(1024u64), false);
        assert!(matches!(result, Err(Error::MathError(MathError::Overflow))));
    }

    #[test]
    fn next_price_from_input_reference_values() {
        let price = U256::from_str(SQRT_ONE).unwrap();
        let tenth = U256::from_str("100000000000000000").unwrap();

        // 0.1 token1 in
        assert_eq!(
            get_next_sqrt_price_from_input(price, 1e18 as u128, tenth, false).unwrap(),
            U256::from_str("87150978765690771352898345369").unwrap()
        );
        // 0.1 token0 in
        assert_eq!(
            get_next_sqrt_price_from_input(price, 1e18 as u128, tenth, true).unwrap(),
            U256::from_str("72025602285694852357767227579").unwrap()
        );
        // amount_in > 2^96, forcing the muldiv branch
        assert_eq!(
            get_next_sqrt_price_from_input(
                price,
                1e19 as u128,
                U256::from_str("1267650600228229401496703205376").unwrap(),
                true,
            )
            .unwrap(),
            U256::from_str("624999999995069620").unwrap()
        );
        // one unit of liquidity swallows half of U256::MAX
        assert_eq!(
            get_next_sqrt_price_from_input(price, 1, U256::MAX / U256::from(2u8), true).unwrap(),
            U256_1
        );
    }

    #[test]
    fn next_price_from_output_preconditions() {
        assert_eq!(
            get_next_sqrt_price_from_output(U256::ZERO, 0, U256::from(1u8), false),
            Err(Error::StateError(StateError::SqrtPriceIsZero))
        );
        assert_eq!(
            get_next_sqrt_price_from_output(U256_1, 0, U256::from(1u8), false),
            Err(Error::StateError(StateError::LiquidityIsZero))
        );
    }

    #[test]
    fn next_price_from_output_respects_virtual_reserves() {
        // price 2^100, liquidity 1024: virtual reserves are 4 token0 and
        // 262144 token1. Requesting the reserves or more must fail.
        let price = U256::from_str("20282409603651670423947251286016").unwrap();

        for amount in [4u64, 5] {
            assert_eq!(
                get_next_sqrt_price_from_output(price, 1024, U256::from(amount), false),
                Err(Error::StateError(StateError::InsufficientReserves))
            );
        }
        for amount in [262144u64, 262145] {
            assert_eq!(
                get_next_sqrt_price_from_output(price, 1024, U256::from(amount), true),
                Err(Error::StateError(StateError::InsufficientReserves))
            );
        }

        // one below the reserve bound succeeds
        assert_eq!(
            get_next_sqrt_price_from_output(price, 1024, U256::from(262143u64), true).unwrap(),
            U256::from_str("77371252455336267181195264").unwrap()
        );
    }

    #[test]
    fn next_price_from_output_zero_amount_is_identity() {
        let price = U256::from_str(SQRT_ONE).unwrap();
        for zero_for_one in [true, false] {
            assert_eq!(
                get_next_sqrt_price_from_output(price, 1e17 as u128, U256::ZERO, zero_for_one)
                    .unwrap(),
                price
            );
        }
    }

    #[test]
    fn next_price_from_output_reference_values() {
        let price = U256::from_str(SQRT_ONE).unwrap();
        let tenth = U256::from(1e17 as u128);

        assert_eq!(
            get_next_sqrt_price_from_output(price, 1e18 as u128, tenth, false).unwrap(),
            U256::from_str("88031291682515930659493278152").unwrap()
        );
        assert_eq!(
            get_next_sqrt_price_from_output(price, 1e18 as u128, tenth, true).unwrap(),
            U256::from_str("71305346262837903834189555302").unwrap()
        );

        // impossible outputs
        assert!(matches!(
            get_next_sqrt_price_from_output(price, 1, U256::MAX, true),
            Err(Error::MathError(MathError::Overflow))
        ));
        assert_eq!(
            get_next_sqrt_price_from_output(price, 1, U256::MAX, false),
            Err(Error::StateError(StateError::InsufficientReserves))
        );
    }

    #[test]
    fn amount_0_delta_values() {
        let one = U256::from_str(SQRT_ONE).unwrap();
        let one_21 = U256::from_str("87150978765690771352898345369").unwrap(); // price 1.21

        // zero liquidity or equal prices produce nothing
        assert_eq!(
            get_amount_0_delta_base(one, one, 0, true).unwrap(),
            U256::ZERO
        );
        assert_eq!(
            get_amount_0_delta_base(one, one_21, 0, true).unwrap(),
            U256::ZERO
        );

        let up = get_amount_0_delta_base(one, one_21, 1e18 as u128, true).unwrap();
        assert_eq!(up, U256::from_str("90909090909090910").unwrap());
        let down = get_amount_0_delta_base(one, one_21, 1e18 as u128, false).unwrap();
        assert_eq!(down, up.sub(U256_1));

        // prices whose product overflows 256 bits still resolve via muldiv
        let a = U256::from_str("2787593149816327892691964784081045188247552").unwrap();
        let b = U256::from_str("22300745198530623141535718272648361505980416").unwrap();
        let up = get_amount_0_delta_base(a, b, 1e18 as u128, true).unwrap();
        let down = get_amount_0_delta_base(a, b, 1e18 as u128, false).unwrap();
        assert_eq!(up, down.add(U256_1));
    }

    #[test]
    fn amount_1_delta_values() {
        let one = U256::from_str(SQRT_ONE).unwrap();
        let one_21 = U256::from_str("87150978765690771352898345369").unwrap();

        assert_eq!(
            get_amount_1_delta_base(one, one, 0, true).unwrap(),
            U256::ZERO
        );

        let up = get_amount_1_delta_base(one, one_21, 1e18 as u128, true).unwrap();
        assert_eq!(up, U256::from_str("100000000000000000").unwrap());
        assert_eq!(
            get_amount_1_delta_base(one, one_21, 1e18 as u128, false).unwrap(),
            up.sub(U256_1)
        );
    }

    #[test]
    fn signed_deltas_flip_sign_and_rounding() {
        let one = U256::from_str(SQRT_ONE).unwrap();
        let one_21 = U256::from_str("87150978765690771352898345369").unwrap();

        let added = get_amount_0_delta(one, one_21, 1e18 as i128).unwrap();
        let removed = get_amount_0_delta(one, one_21, -(1e18 as i128)).unwrap();
        assert!(added > I256::ZERO && removed < I256::ZERO);
        // rounding always favors the pair: adding costs one more than
        // removing returns
        assert_eq!(added + removed, I256::ONE);

        let added = get_amount_1_delta(one, one_21, 1e18 as i128).unwrap();
        let removed = get_amount_1_delta(one, one_21, -(1e18 as i128)).unwrap();
        assert_eq!(added + removed, I256::ONE);
    }

    #[test]
    fn input_price_round_trips_through_amount_delta() {
        let sqrt_price =
            U256::from_str("1025574284609383690408304870162715216695788925244").unwrap();
        let liquidity = 50015962439936049619261659728067971248;
        let amount_in = U256::from(406);

        let sqrt_q =
            get_next_sqrt_price_from_input(sqrt_price, liquidity, amount_in, true).unwrap();
        assert_eq!(
            sqrt_q,
            U256::from_str("1025574284609383582644711336373707553698163132913").unwrap()
        );

        let amount_0_delta = get_amount_0_delta_base(sqrt_q, sqrt_price, liquidity, true).unwrap();
        assert_eq!(amount_0_delta, amount_in);
    }
}
