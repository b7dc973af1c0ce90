use std::time::Duration;

use tracing::warn;

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub remaining_accumulator: Duration,
    pub dropped_backlog: Duration,
}

/// Turns variable host frame times into a whole number of fixed simulation ticks.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
}

impl FixedStepClock {
    /// Zero fields in `config` fall back to usable values: 1 tick per second, the
    /// default frame cap, and one tick per frame.
    pub fn new(config: LoopConfig) -> Self {
        let ticks_per_sec = u64::from(config.target_tps.max(1));
        let max_frame_delta = if config.max_frame_delta.is_zero() {
            LoopConfig::default().max_frame_delta
        } else {
            config.max_frame_delta
        };
        Self {
            fixed_dt: Duration::from_nanos((NANOS_PER_SEC / ticks_per_sec).max(1)),
            max_frame_delta,
            max_ticks_per_frame: config.max_ticks_per_frame.max(1),
            accumulator: Duration::ZERO,
        }
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    /// Time banked toward the next tick.
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    pub fn push_frame(&mut self, frame_dt: Duration) -> StepPlan {
        let banked = self
            .accumulator
            .saturating_add(frame_dt.min(self.max_frame_delta));
        let plan = plan_sim_steps(banked, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = plan.remaining_accumulator;
        if !plan.dropped_backlog.is_zero() {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                ticks_to_run = plan.ticks_to_run,
                "sim_backlog_dropped"
            );
        }
        plan
    }
}

/// Spends `accumulator` on at most `max_ticks` ticks of `fixed_dt`.
///
/// Less than one tick of leftover time is carried. Anything more means the cap was
/// hit, and the whole leftover is dropped so the next frame starts clean.
pub fn plan_sim_steps(accumulator: Duration, fixed_dt: Duration, max_ticks: u32) -> StepPlan {
    let whole_ticks = accumulator
        .as_nanos()
        .checked_div(fixed_dt.as_nanos())
        .unwrap_or(0);
    let ticks_to_run = u32::try_from(whole_ticks)
        .unwrap_or(u32::MAX)
        .min(max_ticks);
    let leftover = accumulator.saturating_sub(fixed_dt.saturating_mul(ticks_to_run));

    if leftover < fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: leftover,
            dropped_backlog: Duration::ZERO,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: leftover,
        }
    }
}
