use tracing::{debug, trace};

use super::actor::{Actor, Behavior, TickContext};
use super::events::GameplayEvent;
use super::types::{Intent, MoveIntent};

const PUNCH_RANGE_TILES: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerBehavior {
    kills: u32,
    attack_pending: bool,
}

impl PlayerBehavior {
    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn attack_pending(&self) -> bool {
        self.attack_pending
    }

    pub(crate) fn add_kills(&mut self, count: u32) {
        self.kills = self.kills.saturating_add(count);
    }
}

/// Applies a movement or punch intent. Intents that do not fit the current state are dropped.
pub(crate) fn process_intent(
    player: &mut Actor,
    intent: Intent,
    paused: bool,
    context: &mut TickContext<'_>,
) {
    let move_intent = match intent {
        Intent::MoveLeft => MoveIntent::Left,
        Intent::MoveRight => MoveIntent::Right,
        Intent::StopMove => {
            player.set_move_intent(MoveIntent::None);
            return;
        }
        Intent::Punch => {
            punch(player, paused, context);
            return;
        }
        Intent::TogglePause | Intent::Reset => return,
    };
    if paused || !player.is_alive() {
        trace!(intent = intent.as_token(), paused, "intent_ignored");
        return;
    }
    player.set_move_intent(move_intent);
    player.move_step(context);
}

fn punch(player: &mut Actor, paused: bool, context: &mut TickContext<'_>) {
    if paused || !player.is_alive() || player.is_attacking() {
        trace!(
            paused,
            alive = player.is_alive(),
            attacking = player.is_attacking(),
            "punch_ignored"
        );
        return;
    }
    let Behavior::Player(behavior) = player.behavior_mut() else {
        return;
    };
    behavior.attack_pending = true;
    player.begin_attack();
    context.events.emit(GameplayEvent::PunchThrown {
        actor_id: player.id(),
    });
}

/// Runs the shared actor update, then resolves a pending punch exactly once.
pub(crate) fn tick(player: &mut Actor, enemies: &mut [Actor], context: &mut TickContext<'_>) {
    player.tick_state(context);
    let attack_pending = match player.behavior_mut() {
        Behavior::Player(behavior) => std::mem::take(&mut behavior.attack_pending),
        Behavior::Enemy(_) => false,
    };
    if !attack_pending {
        return;
    }
    let tile_size = context.config.tile_size;
    let mut hits = 0u32;
    for enemy in enemies.iter_mut() {
        if player.collides_with(enemy, PUNCH_RANGE_TILES, tile_size) {
            attack(enemy, context);
            hits = hits.saturating_add(1);
        }
    }
    debug!(player = player.id().0, hits, "punch_resolved");
}

pub(crate) fn attack(enemy: &mut Actor, context: &mut TickContext<'_>) {
    enemy.hurt(context.config.player_damage, context.events);
}
