use thiserror::Error;

pub mod app;
mod config;
pub mod sim;

pub use app::{plan_sim_steps, FixedStepClock, LoopConfig, Scheduler, StepPlan};
pub use config::{ConfigError, SimConfig};
pub use sim::{
    ActorId, ActorKind, ActorSnapshot, AnimState, Facing, GameplayEvent, GameplayEventCounts,
    Intent, Session, SessionSnapshot,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("no player is spawned; reset the session first")]
    NoPlayer,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
