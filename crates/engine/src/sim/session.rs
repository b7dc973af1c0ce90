use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::app::Scheduler;
use crate::config::SimConfig;
use crate::SimError;

use super::actor::{Actor, Behavior, TickContext, TimerEvent};
use super::enemy;
use super::events::{GameplayEvent, GameplayEventBus, GameplayEventCounts};
use super::player;
use super::snapshot::{duration_ms, ActorSnapshot, SessionSnapshot};
use super::types::{ActorId, Intent, MoveIntent};
use super::zone::{Zone, ZoneManager, ZoneSpawn};

/// One running game. Owns every actor, zone and pending timer; nothing here is shared.
///
/// A new session has no player and starts paused. Call [`Session::reset`] to generate
/// the first zone and spawn the player.
#[derive(Debug)]
pub struct Session {
    config: SimConfig,
    seed: u64,
    rng: ChaCha8Rng,
    scheduler: Scheduler<TimerEvent>,
    zones: ZoneManager,
    player: Option<Actor>,
    enemies: Vec<Actor>,
    fading: Vec<Actor>,
    next_actor_id: u64,
    paused: bool,
    won: bool,
    tick_count: u64,
    events: GameplayEventBus,
    snapshot: SessionSnapshot,
}

impl Session {
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        info!(seed, zone_width = config.zone_width(), "session_created");
        Ok(Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            scheduler: Scheduler::new(),
            zones: ZoneManager::default(),
            player: None,
            enemies: Vec::new(),
            fading: Vec::new(),
            next_actor_id: 0,
            paused: true,
            won: false,
            tick_count: 0,
            events: GameplayEventBus::default(),
            snapshot: SessionSnapshot {
                paused: true,
                ..SessionSnapshot::default()
            },
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player.as_ref()
    }

    /// Enemies still taking part in combat. Dying enemies are in [`Session::fading_enemies`].
    pub fn enemies(&self) -> &[Actor] {
        &self.enemies
    }

    pub fn fading_enemies(&self) -> &[Actor] {
        &self.fading
    }

    pub fn zones(&self) -> &[Zone] {
        self.zones.zones()
    }

    pub fn score(&self) -> u32 {
        self.player.as_ref().map_or(0, Actor::kills)
    }

    /// True once the player has entered `goal_zone`.
    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_game_over(&self) -> bool {
        self.won || self.player.as_ref().is_some_and(|player| !player.is_alive())
    }

    /// State as of the end of the last successful tick (or reset).
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn last_tick_event_counts(&self) -> GameplayEventCounts {
        self.events.last_tick_counts()
    }

    pub fn reset(&mut self) -> Result<(), SimError> {
        self.scheduler.clear();
        self.enemies.clear();
        self.fading.clear();
        self.zones.clear();
        self.events.clear_current_tick();
        self.won = false;

        let spawn = self
            .zones
            .add_zone(&self.config, &mut self.rng, &mut self.events);
        self.spawn_enemies(spawn)?;
        let spawn_point = self
            .zones
            .zones()
            .first()
            .map_or(self.config.player_spawn, |zone| zone.spawn_point);
        let player_id = self.alloc_actor_id();
        self.player = Some(Actor::player(player_id, spawn_point, &self.config)?);
        self.paused = false;

        info!(
            seed = self.seed,
            player = player_id.0,
            spawn_x = spawn_point.x,
            enemy_count = self.enemies.len(),
            "session_reset"
        );
        self.publish_snapshot();
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.snapshot.paused = self.paused;
        info!(paused = self.paused, "pause_toggled");
    }

    pub fn submit_intent(&mut self, intent: Intent) -> Result<(), SimError> {
        match intent {
            Intent::TogglePause => {
                self.toggle_pause();
                Ok(())
            }
            Intent::Reset => self.reset(),
            Intent::MoveLeft | Intent::MoveRight | Intent::StopMove | Intent::Punch => {
                let Some(player) = self.player.as_mut() else {
                    return Err(SimError::NoPlayer);
                };
                let mut context = TickContext {
                    config: &self.config,
                    scheduler: &mut self.scheduler,
                    events: &mut self.events,
                };
                let blocked = self.paused || self.won;
                player::process_intent(player, intent, blocked, &mut context);
                Ok(())
            }
        }
    }

    /// Advances the clock by `dt`, fires due timers, then runs one frame of updates.
    ///
    /// A paused session ignores the call entirely. On error the previous snapshot stays
    /// published.
    pub fn tick(&mut self, dt: Duration) -> Result<(), SimError> {
        if self.paused {
            trace!("tick_skipped_paused");
            return Ok(());
        }
        if self.player.is_none() {
            return Err(SimError::NoPlayer);
        }

        self.advance_clock(dt);
        self.run_frame()?;
        self.tick_count = self.tick_count.saturating_add(1);
        self.publish_snapshot();
        self.clear_damage_pulses();
        Ok(())
    }

    fn advance_clock(&mut self, dt: Duration) {
        let until = self.scheduler.now().saturating_add(dt);
        while let Some(event) = self.scheduler.pop_due(until) {
            self.dispatch_timer(event);
        }
        self.scheduler.finish_advance(until);
    }

    fn dispatch_timer(&mut self, event: TimerEvent) {
        let mut context = TickContext {
            config: &self.config,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
        };
        match event {
            TimerEvent::StepComplete { actor_id } => {
                if let Some(actor) =
                    find_actor_mut(&mut self.player, &mut self.enemies, &mut self.fading, actor_id)
                {
                    actor.complete_step(&mut context);
                }
            }
            TimerEvent::AttackWindowEnd { actor_id } => {
                if let Some(actor) =
                    find_actor_mut(&mut self.player, &mut self.enemies, &mut self.fading, actor_id)
                {
                    actor.end_attack_window();
                }
            }
            TimerEvent::EnemyStrike { enemy_id } => {
                let enemy = self.enemies.iter().find(|enemy| enemy.id() == enemy_id);
                match (enemy, self.player.as_mut()) {
                    (Some(enemy), Some(player)) => {
                        enemy::strike(enemy, player, &mut context);
                    }
                    _ => trace!(enemy = enemy_id.0, "enemy_strike_dropped"),
                }
            }
            TimerEvent::EnemyCooldownClear { enemy_id } => {
                if let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id() == enemy_id) {
                    enemy::clear_cooldown(enemy);
                }
            }
        }
    }

    fn run_frame(&mut self) -> Result<(), SimError> {
        let Some(player) = self.player.as_mut() else {
            return Err(SimError::NoPlayer);
        };
        let mut context = TickContext {
            config: &self.config,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
        };

        player::tick(player, &mut self.enemies, &mut context);

        let count_before = self.enemies.len();
        let mut index = 0;
        while index < self.enemies.len() {
            if self.enemies[index].is_alive() {
                index += 1;
                continue;
            }
            let mut dead = self.enemies.remove(index);
            dead.run_death_effect(context.events);
            self.fading.push(dead);
        }
        let killed = count_before - self.enemies.len();
        if killed > 0 {
            if let Behavior::Player(behavior) = player.behavior_mut() {
                behavior.add_kills(u32::try_from(killed).unwrap_or(u32::MAX));
            }
            info!(killed, kills = player.kills(), "enemy_killed");
        }

        for enemy in self.enemies.iter_mut() {
            enemy::tick(enemy, player, &mut context);
        }

        for dying in self.fading.iter_mut() {
            dying.advance_fade();
        }
        self.fading.retain(|dying| {
            if dying.fade_alpha() > 0.0 {
                return true;
            }
            context.events.emit(GameplayEvent::EnemyRemoved {
                actor_id: dying.id(),
            });
            debug!(enemy = dying.id().0, "enemy_removed");
            false
        });

        let player_x = player.x();
        let spawns = self
            .zones
            .progress(player_x, &self.config, &mut self.rng, &mut self.events);
        for spawn in spawns {
            self.spawn_enemies(spawn)?;
        }
        self.check_goal_zone();
        Ok(())
    }

    fn check_goal_zone(&mut self) {
        if self.won {
            return;
        }
        let Some(goal) = self.config.goal_zone else {
            return;
        };
        let entered = usize::try_from(goal)
            .ok()
            .and_then(|index| self.zones.zones().get(index))
            .is_some_and(|zone| zone.entered);
        let alive = self.player.as_ref().is_some_and(Actor::is_alive);
        if entered && alive {
            self.won = true;
            if let Some(player) = self.player.as_mut() {
                player.set_move_intent(MoveIntent::None);
            }
            info!(goal_zone = goal, score = self.score(), "goal_zone_reached");
        }
    }

    fn spawn_enemies(&mut self, spawn: ZoneSpawn) -> Result<(), SimError> {
        for position in spawn.enemy_positions {
            let id = self.alloc_actor_id();
            self.enemies.push(Actor::enemy(id, position, &self.config)?);
        }
        debug!(
            zone = spawn.zone_index,
            live_enemies = self.enemies.len(),
            "zone_wave_spawned"
        );
        Ok(())
    }

    fn alloc_actor_id(&mut self) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = self.next_actor_id.saturating_add(1);
        ActorId(id)
    }

    fn publish_snapshot(&mut self) {
        let events = self.events.finish_tick_rollover();
        let counts = self.events.last_tick_counts();
        if counts.total > 0 {
            debug!(
                tick = self.tick_count,
                total = counts.total,
                damaged = counts.actor_damaged,
                died = counts.actor_died,
                zones = counts.zone_generated,
                "tick_events"
            );
        }

        let player = self.player.as_ref();
        let alive = player.is_some_and(Actor::is_alive);
        self.snapshot = SessionSnapshot {
            tick: self.tick_count,
            time_ms: duration_ms(self.scheduler.now()),
            player: player.map(ActorSnapshot::from_actor),
            enemies: self
                .enemies
                .iter()
                .chain(self.fading.iter())
                .map(ActorSnapshot::from_actor)
                .collect(),
            score: player.map_or(0, Actor::kills),
            paused: self.paused,
            alive,
            won: self.won,
            game_over: self.won || (player.is_some() && !alive),
            current_zone: player.map_or(0, |player| {
                self.zones.zone_index_at(player.x(), &self.config)
            }),
            zone_count: self.zones.zone_count(),
            events,
        };
    }

    fn clear_damage_pulses(&mut self) {
        let actors = self
            .player
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .chain(self.fading.iter_mut());
        for actor in actors {
            actor.clear_damage_pulse();
        }
    }
}

fn find_actor_mut<'a>(
    player: &'a mut Option<Actor>,
    enemies: &'a mut [Actor],
    fading: &'a mut [Actor],
    actor_id: ActorId,
) -> Option<&'a mut Actor> {
    if let Some(player) = player.as_mut().filter(|player| player.id() == actor_id) {
        return Some(player);
    }
    enemies
        .iter_mut()
        .chain(fading.iter_mut())
        .find(|actor| actor.id() == actor_id)
}

#[cfg(test)]
impl Session {
    pub(crate) fn place_player(&mut self, position: super::types::Vec2) {
        if let Some(player) = self.player.as_mut() {
            player.place_at(position);
        }
    }

    pub(crate) fn clear_enemies(&mut self) {
        self.enemies.clear();
        self.fading.clear();
    }

    pub(crate) fn spawn_enemy_at(&mut self, position: super::types::Vec2) -> ActorId {
        let id = self.alloc_actor_id();
        let enemy = Actor::enemy(id, position, &self.config).expect("enemy from valid config");
        self.enemies.push(enemy);
        id
    }
}
