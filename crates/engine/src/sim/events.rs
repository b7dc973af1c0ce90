use serde::Serialize;

use super::types::ActorId;

/// Things that happened during one tick, for hosts that play sounds or spawn effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameplayEvent {
    PunchThrown { actor_id: ActorId },
    EnemyAttackStarted { actor_id: ActorId },
    ActorDamaged { actor_id: ActorId, amount: i32 },
    ActorDied { actor_id: ActorId },
    EnemyRemoved { actor_id: ActorId },
    ZoneGenerated { zone_index: u32, enemy_count: u32 },
    ZoneEntered { zone_index: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameplayEventKind {
    PunchThrown,
    EnemyAttackStarted,
    ActorDamaged,
    ActorDied,
    EnemyRemoved,
    ZoneGenerated,
    ZoneEntered,
}

impl GameplayEvent {
    pub fn kind(self) -> GameplayEventKind {
        match self {
            Self::PunchThrown { .. } => GameplayEventKind::PunchThrown,
            Self::EnemyAttackStarted { .. } => GameplayEventKind::EnemyAttackStarted,
            Self::ActorDamaged { .. } => GameplayEventKind::ActorDamaged,
            Self::ActorDied { .. } => GameplayEventKind::ActorDied,
            Self::EnemyRemoved { .. } => GameplayEventKind::EnemyRemoved,
            Self::ZoneGenerated { .. } => GameplayEventKind::ZoneGenerated,
            Self::ZoneEntered { .. } => GameplayEventKind::ZoneEntered,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GameplayEventCounts {
    pub total: u32,
    pub punch_thrown: u32,
    pub enemy_attack_started: u32,
    pub actor_damaged: u32,
    pub actor_died: u32,
    pub enemy_removed: u32,
    pub zone_generated: u32,
    pub zone_entered: u32,
}

impl GameplayEventCounts {
    fn record(&mut self, kind: GameplayEventKind) {
        self.total = self.total.saturating_add(1);
        match kind {
            GameplayEventKind::PunchThrown => {
                self.punch_thrown = self.punch_thrown.saturating_add(1)
            }
            GameplayEventKind::EnemyAttackStarted => {
                self.enemy_attack_started = self.enemy_attack_started.saturating_add(1)
            }
            GameplayEventKind::ActorDamaged => {
                self.actor_damaged = self.actor_damaged.saturating_add(1)
            }
            GameplayEventKind::ActorDied => self.actor_died = self.actor_died.saturating_add(1),
            GameplayEventKind::EnemyRemoved => {
                self.enemy_removed = self.enemy_removed.saturating_add(1)
            }
            GameplayEventKind::ZoneGenerated => {
                self.zone_generated = self.zone_generated.saturating_add(1)
            }
            GameplayEventKind::ZoneEntered => {
                self.zone_entered = self.zone_entered.saturating_add(1)
            }
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct GameplayEventBus {
    current_tick_events: Vec<GameplayEvent>,
    last_tick_counts: GameplayEventCounts,
}

impl GameplayEventBus {
    pub(crate) fn clear_current_tick(&mut self) {
        self.current_tick_events.clear();
    }

    pub(crate) fn emit(&mut self, event: GameplayEvent) {
        self.current_tick_events.push(event);
    }

    #[cfg(test)]
    pub(crate) fn iter_emitted_so_far(&self) -> impl Iterator<Item = &GameplayEvent> {
        self.current_tick_events.iter()
    }

    /// Closes the tick: tallies its events and hands them over, leaving the bus empty.
    pub(crate) fn finish_tick_rollover(&mut self) -> Vec<GameplayEvent> {
        let mut counts = GameplayEventCounts::default();
        for event in &self.current_tick_events {
            counts.record(event.kind());
        }
        self.last_tick_counts = counts;
        std::mem::take(&mut self.current_tick_events)
    }

    pub(crate) fn last_tick_counts(&self) -> GameplayEventCounts {
        self.last_tick_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollover_counts_events_and_empties_bus() {
        let mut bus = GameplayEventBus::default();
        bus.emit(GameplayEvent::PunchThrown {
            actor_id: ActorId(0),
        });
        bus.emit(GameplayEvent::ActorDamaged {
            actor_id: ActorId(1),
            amount: 50,
        });
        bus.emit(GameplayEvent::ActorDamaged {
            actor_id: ActorId(2),
            amount: 50,
        });

        let events = bus.finish_tick_rollover();

        assert_eq!(events.len(), 3);
        assert_eq!(bus.iter_emitted_so_far().count(), 0);
        let counts = bus.last_tick_counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.punch_thrown, 1);
        assert_eq!(counts.actor_damaged, 2);
        assert_eq!(counts.actor_died, 0);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(GameplayEvent::ZoneGenerated {
            zone_index: 2,
            enemy_count: 3,
        })
        .expect("serialize event");
        assert_eq!(
            json,
            serde_json::json!({ "type": "zone_generated", "zone_index": 2, "enemy_count": 3 })
        );
    }
}
