use tracing::debug;

use super::actor::{Actor, Behavior, TickContext, TimerEvent};
use super::events::GameplayEvent;
use super::types::MoveIntent;

const STRIKE_RANGE_TILES: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyBehavior {
    attack_cooldown_active: bool,
}

impl EnemyBehavior {
    pub fn attack_cooldown_active(&self) -> bool {
        self.attack_cooldown_active
    }
}

/// Pursue the player while apart; open an attack window when adjacent.
pub(crate) fn tick(enemy: &mut Actor, player: &Actor, context: &mut TickContext<'_>) {
    enemy.tick_state(context);

    let colliding = enemy.collides_with(player, STRIKE_RANGE_TILES, context.config.tile_size);
    if !enemy.is_moving() && !colliding {
        follow(enemy, player, context);
        return;
    }

    enemy.set_move_intent(MoveIntent::None);
    if !colliding || !player.is_alive() {
        return;
    }
    let enemy_id = enemy.id();
    let Behavior::Enemy(behavior) = enemy.behavior_mut() else {
        return;
    };
    if behavior.attack_cooldown_active {
        return;
    }
    behavior.attack_cooldown_active = true;
    enemy.begin_attack();
    context
        .scheduler
        .schedule_in(context.config.enemy_strike_delay(), TimerEvent::EnemyStrike { enemy_id });
    context.scheduler.schedule_in(
        context.config.enemy_attack_cooldown(),
        TimerEvent::EnemyCooldownClear { enemy_id },
    );
    context
        .events
        .emit(GameplayEvent::EnemyAttackStarted { actor_id: enemy_id });
    debug!(enemy = enemy_id.0, "enemy_attack_window_opened");
}

fn follow(enemy: &mut Actor, player: &Actor, context: &mut TickContext<'_>) {
    let direction = if player.x() < enemy.x() {
        MoveIntent::Left
    } else {
        MoveIntent::Right
    };
    enemy.set_move_intent(direction);
    enemy.move_step(context);
}

/// Delayed hit from an attack window. Lands only if the enemy is alive and still in reach.
pub(crate) fn strike(enemy: &Actor, player: &mut Actor, context: &mut TickContext<'_>) -> bool {
    if !enemy.is_alive()
        || !enemy.collides_with(player, STRIKE_RANGE_TILES, context.config.tile_size)
    {
        debug!(enemy = enemy.id().0, "enemy_strike_missed");
        return false;
    }
    attack(player, context);
    true
}

pub(crate) fn attack(player: &mut Actor, context: &mut TickContext<'_>) {
    player.hurt(context.config.enemy_damage, context.events);
}

pub(crate) fn clear_cooldown(enemy: &mut Actor) {
    if let Behavior::Enemy(behavior) = enemy.behavior_mut() {
        behavior.attack_cooldown_active = false;
    }
}
