use alloy_primitives::U256;

pub mod error;
mod hash;
pub mod math;
pub mod pair;

pub use hash::FastMap;
pub use pair::pair::{Pair, PairHost, ProtocolFees, Slot0};

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

/// 2^160, the exclusive upper bound of the sqrt-price domain.
const U160_MAX: U256 = U256::from_limbs([0, 0, 4294967296, 0]);

/// Number of fractional bits in the Q64.96 sqrt-price encoding.
pub const RESOLUTION: u8 = 96;

/// 2^96, the Q64.96 scale factor.
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);

/// 2^128, the scale of the per-liquidity fee-growth accumulators.
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
