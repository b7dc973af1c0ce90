use std::time::Duration;

use tracing::{debug, info};

use crate::app::Scheduler;
use crate::config::{
    require_health, require_positive, ConfigError, SimConfig, MIN_STEP_DURATION,
};

use super::enemy::EnemyBehavior;
use super::events::{GameplayEvent, GameplayEventBus};
use super::player::PlayerBehavior;
use super::types::{derive_anim_state, ActorId, ActorKind, AnimState, Facing, MoveIntent, Vec2};

pub(crate) const DANGER_HEALTH_RATIO: f64 = 0.25;
pub(crate) const FADE_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerEvent {
    StepComplete { actor_id: ActorId },
    AttackWindowEnd { actor_id: ActorId },
    EnemyStrike { enemy_id: ActorId },
    EnemyCooldownClear { enemy_id: ActorId },
}

pub(crate) struct TickContext<'a> {
    pub(crate) config: &'a SimConfig,
    pub(crate) scheduler: &'a mut Scheduler<TimerEvent>,
    pub(crate) events: &'a mut GameplayEventBus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MoveState {
    Still,
    Stepping { facing: Facing, ends_at: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttackState {
    Ready,
    Requested,
    Active { ends_at: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Player(PlayerBehavior),
    Enemy(EnemyBehavior),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    id: ActorId,
    behavior: Behavior,
    position: Vec2,
    health: i32,
    max_health: i32,
    speed: f64,
    facing: Facing,
    move_intent: MoveIntent,
    move_state: MoveState,
    attack_state: AttackState,
    anim_state: AnimState,
    damaged: bool,
    death_handled: bool,
    fade_alpha: f32,
}

impl Actor {
    pub fn new(
        id: ActorId,
        behavior: Behavior,
        position: Vec2,
        max_health: i32,
        speed: f64,
        facing: Facing,
    ) -> Result<Self, ConfigError> {
        require_health("max_health", max_health)?;
        require_positive("speed", speed)?;
        Ok(Self {
            id,
            behavior,
            position: Vec2::new(position.x.max(0.0), position.y),
            health: max_health,
            max_health,
            speed,
            facing,
            move_intent: MoveIntent::None,
            move_state: MoveState::Still,
            attack_state: AttackState::Ready,
            anim_state: AnimState::Still,
            damaged: false,
            death_handled: false,
            fade_alpha: 1.0,
        })
    }

    pub fn player(id: ActorId, position: Vec2, config: &SimConfig) -> Result<Self, ConfigError> {
        Self::new(
            id,
            Behavior::Player(PlayerBehavior::default()),
            position,
            config.player_max_health,
            config.player_speed,
            Facing::Right,
        )
    }

    pub fn enemy(id: ActorId, position: Vec2, config: &SimConfig) -> Result<Self, ConfigError> {
        Self::new(
            id,
            Behavior::Enemy(EnemyBehavior::default()),
            position,
            config.enemy_max_health,
            config.enemy_speed,
            Facing::Left,
        )
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn kind(&self) -> ActorKind {
        match self.behavior {
            Behavior::Player(_) => ActorKind::Player,
            Behavior::Enemy(_) => ActorKind::Enemy,
        }
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn move_intent(&self) -> MoveIntent {
        self.move_intent
    }

    pub fn anim_state(&self) -> AnimState {
        self.anim_state
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.move_state, MoveState::Stepping { .. })
    }

    pub fn is_attacking(&self) -> bool {
        !matches!(self.attack_state, AttackState::Ready)
    }

    pub fn step_ends_at(&self) -> Option<Duration> {
        match self.move_state {
            MoveState::Stepping { ends_at, .. } => Some(ends_at),
            MoveState::Still => None,
        }
    }

    pub fn attack_ends_at(&self) -> Option<Duration> {
        match self.attack_state {
            AttackState::Active { ends_at } => Some(ends_at),
            AttackState::Ready | AttackState::Requested => None,
        }
    }

    pub fn damaged(&self) -> bool {
        self.damaged
    }

    pub fn fade_alpha(&self) -> f32 {
        self.fade_alpha
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn in_danger(&self) -> bool {
        f64::from(self.health) / f64::from(self.max_health) <= DANGER_HEALTH_RATIO
    }

    pub fn kills(&self) -> u32 {
        match &self.behavior {
            Behavior::Player(player) => player.kills(),
            Behavior::Enemy(_) => 0,
        }
    }

    /// `step_base / speed`, saturating at 1 ms for very fast actors and at
    /// `Duration::MAX` when the quotient is not representable.
    pub fn step_duration(&self, config: &SimConfig) -> Duration {
        Duration::try_from_secs_f64(config.step_base().as_secs_f64() / self.speed)
            .map_or(Duration::MAX, |step| step.max(MIN_STEP_DURATION))
    }

    /// Axis-aligned box check; symmetric but not transitive.
    pub fn collides_with(&self, other: &Actor, range: f64, tile_size: f64) -> bool {
        let reach = tile_size * range;
        (self.position.x - other.position.x).abs() < reach
            && (self.position.y - other.position.y).abs() < reach
    }

    pub fn set_move_intent(&mut self, intent: MoveIntent) {
        self.move_intent = intent;
    }

    /// Requests an attack window. Attacks are never queued or cancelled.
    pub fn begin_attack(&mut self) -> bool {
        if self.is_attacking() {
            return false;
        }
        self.attack_state = AttackState::Requested;
        true
    }

    pub(crate) fn hurt(&mut self, amount: i32, events: &mut GameplayEventBus) {
        self.health = self.health.saturating_sub(amount);
        self.damaged = true;
        events.emit(GameplayEvent::ActorDamaged {
            actor_id: self.id,
            amount,
        });
        debug!(
            actor = self.id.0,
            amount,
            health = self.health,
            "actor_damaged"
        );
    }

    /// Starts a step in the intended direction unless one is already in flight.
    pub(crate) fn move_step(&mut self, context: &mut TickContext<'_>) {
        if self.is_moving() {
            return;
        }
        let Some(facing) = self.move_intent.facing() else {
            self.move_state = MoveState::Still;
            return;
        };
        if !self.is_alive() {
            self.move_state = MoveState::Still;
            return;
        }
        self.facing = facing;
        let ends_at = context.scheduler.schedule_in(
            self.step_duration(context.config),
            TimerEvent::StepComplete { actor_id: self.id },
        );
        self.move_state = MoveState::Stepping { facing, ends_at };
    }

    /// Lands the in-flight step one tile over, then re-samples the move intent.
    pub(crate) fn complete_step(&mut self, context: &mut TickContext<'_>) {
        let MoveState::Stepping { facing, .. } = self.move_state else {
            return;
        };
        let next_x = self.position.x + facing.sign() * context.config.tile_size;
        self.position.x = next_x.max(0.0);
        self.move_state = MoveState::Still;
        self.move_step(context);
    }

    pub(crate) fn end_attack_window(&mut self) {
        if matches!(self.attack_state, AttackState::Active { .. }) {
            self.attack_state = AttackState::Ready;
        }
    }

    pub(crate) fn tick_state(&mut self, context: &mut TickContext<'_>) {
        if self.attack_state == AttackState::Requested {
            let ends_at = context.scheduler.schedule_in(
                context.config.attack_window(),
                TimerEvent::AttackWindowEnd { actor_id: self.id },
            );
            self.attack_state = AttackState::Active { ends_at };
        }
        self.anim_state = derive_anim_state(self.is_attacking(), self.is_moving());
        if !self.is_alive() {
            self.run_death_effect(context.events);
            self.advance_fade();
        }
    }

    /// Fires the death effect the first time it is called on a dead actor.
    pub(crate) fn run_death_effect(&mut self, events: &mut GameplayEventBus) -> bool {
        if self.is_alive() || self.death_handled {
            return false;
        }
        self.death_handled = true;
        events.emit(GameplayEvent::ActorDied { actor_id: self.id });
        info!(actor = self.id.0, kind = ?self.kind(), health = self.health, "actor_died");
        true
    }

    pub(crate) fn advance_fade(&mut self) {
        self.fade_alpha = (self.fade_alpha - FADE_STEP).max(0.0);
    }

    pub(crate) fn clear_damage_pulse(&mut self) {
        self.damaged = false;
    }

    #[cfg(test)]
    pub(crate) fn place_at(&mut self, position: Vec2) {
        self.position = Vec2::new(position.x.max(0.0), position.y);
    }
}
