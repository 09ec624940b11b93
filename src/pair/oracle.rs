use crate::error::{Error, PairError};
use alloy_primitives::U256;

/// One checkpoint of the time-weighted accumulators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    /// Timestamp of the checkpoint, seconds mod 2^32.
    pub block_timestamp: u32,
    /// Running sum of `tick * elapsed_seconds`; wraps as a signed value.
    pub tick_cumulative: i64,
    /// Running sum of `elapsed_seconds * 2^128 / max(liquidity, 1)`.
    pub seconds_per_liquidity_cumulative_x128: U256,
    /// False for slots pre-allocated by `grow` that were never written.
    pub initialized: bool,
}

impl Observation {
    /// Rolls the accumulators forward from this checkpoint to `time` under
    /// a constant tick and liquidity. This is also how counterfactual
    /// observations are synthesized for times after the newest checkpoint.
    pub fn transform(&self, time: u32, tick: i32, liquidity: u128) -> Observation {
        let delta = time.wrapping_sub(self.block_timestamp);
        let liquidity = if liquidity > 0 { liquidity } else { 1 };
        Observation {
            block_timestamp: time,
            tick_cumulative: self
                .tick_cumulative
                .wrapping_add(tick as i64 * delta as i64),
            seconds_per_liquidity_cumulative_x128: self
                .seconds_per_liquidity_cumulative_x128
                .wrapping_add((U256::from(delta) << 128) / U256::from(liquidity)),
            initialized: true,
        }
    }
}

/// Ring of observations. The backing vector is grown up front by `grow`;
/// `cardinality` (live length) and `cardinality_next` (allocated length)
/// are owned by the pair's slot0 and passed in per call.
#[derive(Clone, Debug, Default)]
pub struct Observations(pub Vec<Observation>);

impl Observations {
    /// Seeds slot zero at pair initialization and returns the starting
    /// `(cardinality, cardinality_next)`.
    pub fn initialize(&mut self, time: u32) -> (u16, u16) {
        self.0.clear();
        self.0.push(Observation {
            block_timestamp: time,
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: U256::ZERO,
            initialized: true,
        });
        (1, 1)
    }

    /// Pre-allocates ring slots up to `next`. The placeholder timestamp
    /// keeps the slot distinguishable from a genuine write; `cardinality`
    /// itself only advances once the ring wraps into the new region.
    pub fn grow(&mut self, current: u16, next: u16) -> Result<u16, Error> {
        if current == 0 {
            return Err(PairError::OracleUninitialized.into());
        }
        if next <= current {
            return Ok(current);
        }
        for _ in current..next {
            self.0.push(Observation {
                block_timestamp: 1,
                ..Default::default()
            });
        }
        Ok(next)
    }

    /// Appends a checkpoint for `time`, overwriting the oldest slot once
    /// the ring is full. Writing twice in the same second is a no-op.
    /// Returns the updated `(index, cardinality)`.
    pub fn write(
        &mut self,
        index: u16,
        time: u32,
        tick: i32,
        liquidity: u128,
        cardinality: u16,
        cardinality_next: u16,
    ) -> (u16, u16) {
        let last = self.0[index as usize];

        if last.block_timestamp == time {
            return (index, cardinality);
        }

        // promote the allocation once the write pointer reaches the seam
        let cardinality_updated = if cardinality_next > cardinality && index == cardinality - 1 {
            cardinality_next
        } else {
            cardinality
        };

        let index_updated = (index + 1) % cardinality_updated;
        self.0[index_updated as usize] = last.transform(time, tick, liquidity);
        (index_updated, cardinality_updated)
    }

    /// Timestamp comparison in the mod-2^32 ordering anchored at `time`:
    /// values logically in the future of `time` are shifted back a full
    /// wrap before comparing.
    fn lte(time: u32, a: u32, b: u32) -> bool {
        if a <= time && b <= time {
            return a <= b;
        }
        let a_adjusted = if a > time { a as u64 } else { a as u64 + (1u64 << 32) };
        let b_adjusted = if b > time { b as u64 } else { b as u64 + (1u64 << 32) };
        a_adjusted <= b_adjusted
    }

    /// Finds the checkpoints straddling `target` in the logically ordered
    /// ring. Uninitialized probes mean the populated segment has not
    /// reached that far; the search moves up past them.
    fn binary_search(
        &self,
        time: u32,
        target: u32,
        index: u16,
        cardinality: u16,
    ) -> (Observation, Observation) {
        let cardinality = cardinality as u32;
        let mut l = (index as u32 + 1) % cardinality; // oldest slot
        let mut r = l + cardinality - 1; // newest slot

        loop {
            let i = (l + r) / 2;

            let before_or_at = self.0[(i % cardinality) as usize];
            if !before_or_at.initialized {
                l = i + 1;
                continue;
            }

            let at_or_after = self.0[((i + 1) % cardinality) as usize];

            let target_at_or_after = Self::lte(time, before_or_at.block_timestamp, target);
            if target_at_or_after && Self::lte(time, target, at_or_after.block_timestamp) {
                return (before_or_at, at_or_after);
            }

            if !target_at_or_after {
                r = i - 1;
            } else {
                l = i + 1;
            }
        }
    }

    /// Resolves the pair of observations around `target`, synthesizing a
    /// counterfactual right bound when `target` is newer than the newest
    /// checkpoint. Fails with `OLD` when `target` predates the ring.
    fn get_surrounding_observations(
        &self,
        time: u32,
        target: u32,
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(Observation, Observation), Error> {
        let mut before_or_at = self.0[index as usize];

        if Self::lte(time, before_or_at.block_timestamp, target) {
            if before_or_at.block_timestamp == target {
                // exact hit on the newest checkpoint; no right bound needed
                return Ok((before_or_at, Observation::default()));
            }
            return Ok((before_or_at, before_or_at.transform(target, tick, liquidity)));
        }

        // rewind to the oldest checkpoint
        before_or_at = self.0[((index + 1) % cardinality) as usize];
        if !before_or_at.initialized {
            before_or_at = self.0[0];
        }

        if !Self::lte(time, before_or_at.block_timestamp, target) {
            return Err(PairError::StaleOracleTarget.into());
        }

        Ok(self.binary_search(time, target, index, cardinality))
    }

    /// Accumulator values as of `seconds_ago` before `time`. Zero seconds
    /// ago reads the newest checkpoint rolled forward to now; older targets
    /// interpolate linearly between the straddling checkpoints.
    pub fn observe_single(
        &self,
        time: u32,
        seconds_ago: u32,
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(i64, U256), Error> {
        if cardinality == 0 {
            return Err(PairError::OracleUninitialized.into());
        }

        if seconds_ago == 0 {
            let mut last = self.0[index as usize];
            if last.block_timestamp != time {
                last = last.transform(time, tick, liquidity);
            }
            return Ok((
                last.tick_cumulative,
                last.seconds_per_liquidity_cumulative_x128,
            ));
        }

        let target = time.wrapping_sub(seconds_ago);

        let (before_or_at, at_or_after) =
            self.get_surrounding_observations(time, target, tick, index, liquidity, cardinality)?;

        if target == before_or_at.block_timestamp {
            Ok((
                before_or_at.tick_cumulative,
                before_or_at.seconds_per_liquidity_cumulative_x128,
            ))
        } else if target == at_or_after.block_timestamp {
            Ok((
                at_or_after.tick_cumulative,
                at_or_after.seconds_per_liquidity_cumulative_x128,
            ))
        } else {
            // strictly between: interpolate both accumulators linearly
            let observation_time_delta = at_or_after
                .block_timestamp
                .wrapping_sub(before_or_at.block_timestamp);
            let target_delta = target.wrapping_sub(before_or_at.block_timestamp);

            let tick_cumulative = before_or_at.tick_cumulative.wrapping_add(
                at_or_after
                    .tick_cumulative
                    .wrapping_sub(before_or_at.tick_cumulative)
                    / observation_time_delta as i64
                    * target_delta as i64,
            );
            let seconds_per_liquidity_cumulative_x128 = before_or_at
                .seconds_per_liquidity_cumulative_x128
                .wrapping_add(
                    at_or_after
                        .seconds_per_liquidity_cumulative_x128
                        .wrapping_sub(before_or_at.seconds_per_liquidity_cumulative_x128)
                        * U256::from(target_delta)
                        / U256::from(observation_time_delta),
                );

            Ok((tick_cumulative, seconds_per_liquidity_cumulative_x128))
        }
    }

    /// Batch form of [`Self::observe_single`], one entry per requested age.
    pub fn observe(
        &self,
        time: u32,
        seconds_agos: &[u32],
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(Vec<i64>, Vec<U256>), Error> {
        let mut tick_cumulatives = Vec::with_capacity(seconds_agos.len());
        let mut seconds_per_liquidity_cumulatives = Vec::with_capacity(seconds_agos.len());

        for &seconds_ago in seconds_agos {
            let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                self.observe_single(time, seconds_ago, tick, index, liquidity, cardinality)?;
            tick_cumulatives.push(tick_cumulative);
            seconds_per_liquidity_cumulatives.push(seconds_per_liquidity_cumulative_x128);
        }

        Ok((tick_cumulatives, seconds_per_liquidity_cumulatives))
    }
}
