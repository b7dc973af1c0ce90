use std::time::Duration;

use serde::Serialize;

use super::actor::Actor;
use super::events::GameplayEvent;
use super::types::{ActorKind, AnimState, Facing};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSnapshot {
    pub id: u64,
    pub kind: ActorKind,
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    pub anim_state: AnimState,
    pub health: i32,
    pub max_health: i32,
    pub damaged: bool,
    pub in_danger: bool,
    pub alive: bool,
    pub fade_alpha: f32,
    /// Present while a step is in flight so renderers can interpolate toward the next tile.
    pub step_ends_ms: Option<u64>,
    pub attack_ends_ms: Option<u64>,
}

impl ActorSnapshot {
    pub(crate) fn from_actor(actor: &Actor) -> Self {
        Self {
            id: actor.id().0,
            kind: actor.kind(),
            x: actor.x(),
            y: actor.y(),
            facing: actor.facing(),
            anim_state: actor.anim_state(),
            health: actor.health(),
            max_health: actor.max_health(),
            damaged: actor.damaged(),
            in_danger: actor.in_danger(),
            alive: actor.is_alive(),
            fade_alpha: actor.fade_alpha(),
            step_ends_ms: actor.step_ends_at().map(duration_ms),
            attack_ends_ms: actor.attack_ends_at().map(duration_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub tick: u64,
    pub time_ms: u64,
    pub player: Option<ActorSnapshot>,
    pub enemies: Vec<ActorSnapshot>,
    pub score: u32,
    pub paused: bool,
    pub alive: bool,
    /// Set once the player enters the configured goal zone; `game_over` is set with it.
    pub won: bool,
    pub game_over: bool,
    pub current_zone: u32,
    pub zone_count: u32,
    pub events: Vec<GameplayEvent>,
}

impl SessionSnapshot {
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|enemy| enemy.alive).count()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn duration_ms(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}
