mod loop_runner;
mod scheduler;

pub use loop_runner::{plan_sim_steps, FixedStepClock, LoopConfig, StepPlan};
pub use scheduler::Scheduler;
