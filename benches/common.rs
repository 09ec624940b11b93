#![allow(dead_code)]

use alloy_primitives::{I256, U256};
use clamm_pair::FastMap;
use clamm_pair::math::bit_math::{least_significant_bit, most_significant_bit};
use clamm_pair::math::math_helpers::{mul_div, mul_div_rounding_up};
use clamm_pair::math::sqrt_price_math::{
    get_amount_0_delta_base, get_next_sqrt_price_from_input,
};
use clamm_pair::math::swap_math::compute_swap_step;
use clamm_pair::math::tick_bitmap::{flip_tick, next_initialized_tick_within_one_word};
use clamm_pair::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use criterion::Criterion;
use std::hint::black_box;

const SQRT_ONE: U256 = U256::from_limbs([0, 4294967296, 0, 0]); // 2^96

pub fn bench_tick_math(c: &mut Criterion) {
    c.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| {
            for tick in [-887272, -123456, -60, 0, 60, 123456, 887272] {
                black_box(get_sqrt_ratio_at_tick(black_box(tick)).unwrap());
            }
        })
    });

    let ratios: Vec<U256> = [-887272, -123456, -60, 0, 60, 123456, 887271]
        .into_iter()
        .map(|tick| get_sqrt_ratio_at_tick(tick).unwrap())
        .collect();
    c.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| {
            for ratio in &ratios {
                black_box(get_tick_at_sqrt_ratio(black_box(*ratio)).unwrap());
            }
        })
    });
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    c.bench_function("get_next_sqrt_price_from_input", |b| {
        b.iter(|| {
            black_box(
                get_next_sqrt_price_from_input(
                    black_box(SQRT_ONE),
                    black_box(2e18 as u128),
                    black_box(U256::from(1e15 as u64)),
                    black_box(true),
                )
                .unwrap(),
            )
        })
    });

    let upper = get_sqrt_ratio_at_tick(60).unwrap();
    c.bench_function("get_amount_0_delta", |b| {
        b.iter(|| {
            black_box(
                get_amount_0_delta_base(
                    black_box(SQRT_ONE),
                    black_box(upper),
                    black_box(2e18 as u128),
                    black_box(true),
                )
                .unwrap(),
            )
        })
    });
}

pub fn bench_swap_math(c: &mut Criterion) {
    let target = get_sqrt_ratio_at_tick(-60).unwrap();
    c.bench_function("compute_swap_step", |b| {
        b.iter(|| {
            black_box(
                compute_swap_step(
                    black_box(SQRT_ONE),
                    black_box(target),
                    black_box(2e18 as u128),
                    black_box(I256::from_raw(U256::from(1e15 as u64))),
                    black_box(3000),
                )
                .unwrap(),
            )
        })
    });
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let a = U256::from_limbs([0, 0, 1, 0]); // 2^128
    let b_small = U256::from(987654321u64);
    let denominator = U256::from_limbs([0, 87, 3, 0]);

    c.bench_function("mul_div", |bench| {
        bench.iter(|| {
            black_box(mul_div(black_box(a), black_box(b_small), black_box(denominator)).unwrap())
        })
    });
    c.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| {
            black_box(
                mul_div_rounding_up(black_box(a), black_box(b_small), black_box(denominator))
                    .unwrap(),
            )
        })
    });
}

pub fn bench_tick_bitmap(c: &mut Criterion) {
    let mut bitmap: FastMap<i16, U256> = FastMap::default();
    for tick in [-887220, -840, -60, 60, 840, 887220] {
        flip_tick(&mut bitmap, tick, 60).unwrap();
    }

    c.bench_function("next_initialized_tick_within_one_word", |b| {
        b.iter(|| {
            black_box(
                next_initialized_tick_within_one_word(
                    black_box(&bitmap),
                    black_box(0),
                    black_box(60),
                    black_box(true),
                )
                .unwrap(),
            )
        })
    });
}

pub fn bench_bit_math(c: &mut Criterion) {
    let value = U256::from_limbs([1, 0, 1 << 17, 0]);
    c.bench_function("most_significant_bit", |b| {
        b.iter(|| black_box(most_significant_bit(black_box(value)).unwrap()))
    });
    c.bench_function("least_significant_bit", |b| {
        b.iter(|| black_box(least_significant_bit(black_box(value)).unwrap()))
    });
}
