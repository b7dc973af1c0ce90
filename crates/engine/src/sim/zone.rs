use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SimConfig;

use super::events::{GameplayEvent, GameplayEventBus};
use super::types::Vec2;

/// One horizontal slice of the world. Zone `k` holds a wave of `k + 1` enemies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub index: u32,
    pub world_offset_x: f64,
    pub entered: bool,
    pub spawn_point: Vec2,
    pub enemy_spawn_point: Vec2,
    pub enemy_count: u32,
}

/// Enemy positions for a freshly generated zone; the session turns them into actors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ZoneSpawn {
    pub(crate) zone_index: u32,
    pub(crate) enemy_positions: Vec<Vec2>,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneManager {
    zones: Vec<Zone>,
}

impl ZoneManager {
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Always equals `zones().len()`.
    pub fn zone_count(&self) -> u32 {
        u32::try_from(self.zones.len()).unwrap_or(u32::MAX)
    }

    pub fn zone_index_at(&self, x: f64, config: &SimConfig) -> u32 {
        (x.max(0.0) / config.zone_width()).floor() as u32
    }

    pub(crate) fn clear(&mut self) {
        self.zones.clear();
    }

    pub(crate) fn add_zone<R: Rng>(
        &mut self,
        config: &SimConfig,
        rng: &mut R,
        events: &mut GameplayEventBus,
    ) -> ZoneSpawn {
        let index = self.zone_count();
        let world_offset_x = config.zone_width() * f64::from(index);
        let enemy_count = index.saturating_add(1);
        let jitter = config.spawn_jitter();

        let enemy_positions = (0..enemy_count)
            .map(|_| {
                let offset = if jitter > 0.0 {
                    rng.gen_range(-jitter..jitter)
                } else {
                    0.0
                };
                Vec2::new(
                    (config.enemy_spawn.x + world_offset_x + offset).max(0.0),
                    config.enemy_spawn.y,
                )
            })
            .collect();

        self.zones.push(Zone {
            index,
            world_offset_x,
            entered: false,
            spawn_point: Vec2::new(config.player_spawn.x + world_offset_x, config.player_spawn.y),
            enemy_spawn_point: Vec2::new(
                config.enemy_spawn.x + world_offset_x,
                config.enemy_spawn.y,
            ),
            enemy_count,
        });
        events.emit(GameplayEvent::ZoneGenerated {
            zone_index: index,
            enemy_count,
        });
        info!(zone = index, world_offset_x, enemy_count, "zone_generated");

        ZoneSpawn {
            zone_index: index,
            enemy_positions,
        }
    }

    /// Marks the zone under the player as entered and generates the one after it.
    ///
    /// Stepping moves one tile at a time, so a player can never land past the last
    /// generated zone. If it happens anyway the skipped zones are generated in order.
    pub(crate) fn progress<R: Rng>(
        &mut self,
        player_x: f64,
        config: &SimConfig,
        rng: &mut R,
        events: &mut GameplayEventBus,
    ) -> Vec<ZoneSpawn> {
        let target = self.zone_index_at(player_x, config) as usize;
        let mut spawns = Vec::new();

        if target >= self.zones.len() {
            warn!(
                player_x,
                target_zone = target,
                generated = self.zones.len(),
                "zone_skip_detected"
            );
            while self.zones.len() <= target {
                if let Some(last) = self.zones.last_mut() {
                    Self::mark_entered(last, events);
                }
                spawns.push(self.add_zone(config, rng, events));
            }
        }

        let zone = &mut self.zones[target];
        if !zone.entered && player_x > zone.world_offset_x {
            Self::mark_entered(zone, events);
            spawns.push(self.add_zone(config, rng, events));
        }
        spawns
    }

    fn mark_entered(zone: &mut Zone, events: &mut GameplayEventBus) {
        if zone.entered {
            return;
        }
        zone.entered = true;
        events.emit(GameplayEvent::ZoneEntered {
            zone_index: zone.index,
        });
        info!(zone = zone.index, "zone_entered");
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn setup() -> (ZoneManager, SimConfig, ChaCha8Rng, GameplayEventBus) {
        (
            ZoneManager::default(),
            SimConfig::default(),
            ChaCha8Rng::seed_from_u64(7),
            GameplayEventBus::default(),
        )
    }

    #[test]
    fn zone_k_spawns_k_plus_one_enemies_within_jitter() {
        let (mut zones, config, mut rng, mut events) = setup();

        for k in 0..5u32 {
            let spawn = zones.add_zone(&config, &mut rng, &mut events);
            assert_eq!(spawn.zone_index, k);
            assert_eq!(spawn.enemy_positions.len() as u32, k + 1);
            let center = config.enemy_spawn.x + config.zone_width() * f64::from(k);
            for position in &spawn.enemy_positions {
                assert!(position.x >= center - 32.0 && position.x < center + 32.0);
                assert_eq!(position.y, config.enemy_spawn.y);
            }
        }
        let offsets: Vec<f64> = zones.zones().iter().map(|zone| zone.world_offset_x).collect();
        assert_eq!(offsets, vec![0.0, 320.0, 640.0, 960.0, 1280.0]);
    }

    #[test]
    fn zero_jitter_spawns_exactly_at_spawn_point() {
        let (mut zones, mut config, mut rng, mut events) = setup();
        config.spawn_jitter_tiles = 0.0;

        let spawn = zones.add_zone(&config, &mut rng, &mut events);

        assert_eq!(spawn.enemy_positions, vec![config.enemy_spawn]);
    }

    #[test]
    fn entering_zone_generates_the_next_exactly_once() {
        let (mut zones, config, mut rng, mut events) = setup();
        zones.add_zone(&config, &mut rng, &mut events);

        assert!(zones.progress(0.0, &config, &mut rng, &mut events).is_empty());
        assert!(!zones.zones()[0].entered);

        let spawns = zones.progress(32.0, &config, &mut rng, &mut events);
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].zone_index, 1);
        assert_eq!(spawns[0].enemy_positions.len(), 2);
        assert!(zones.zones()[0].entered);

        for x in [48.0, 100.0, 319.0] {
            assert!(zones.progress(x, &config, &mut rng, &mut events).is_empty());
        }
        assert_eq!(zones.zone_count(), 2);
    }

    #[test]
    fn next_zone_only_after_previous_entered() {
        let (mut zones, config, mut rng, mut events) = setup();
        zones.add_zone(&config, &mut rng, &mut events);
        zones.progress(32.0, &config, &mut rng, &mut events);

        let spawns = zones.progress(336.0, &config, &mut rng, &mut events);

        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].zone_index, 2);
        assert!(zones.zones().iter().take(2).all(|zone| zone.entered));
        assert!(!zones.zones()[2].entered);
    }

    #[test]
    fn skipped_zones_are_generated_in_order() {
        let (mut zones, config, mut rng, mut events) = setup();
        zones.add_zone(&config, &mut rng, &mut events);

        let spawns = zones.progress(1000.0, &config, &mut rng, &mut events);

        let indices: Vec<u32> = spawns.iter().map(|spawn| spawn.zone_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        let entered: Vec<bool> = zones.zones().iter().map(|zone| zone.entered).collect();
        assert_eq!(entered, vec![true, true, true, true, false]);
    }

    #[test]
    fn zone_count_tracks_stored_zones_across_clear() {
        let (mut zones, config, mut rng, mut events) = setup();
        zones.add_zone(&config, &mut rng, &mut events);
        zones.progress(1000.0, &config, &mut rng, &mut events);
        assert_eq!(zones.zone_count() as usize, zones.zones().len());

        zones.clear();
        assert_eq!(zones.zone_count(), 0);

        let spawn = zones.add_zone(&config, &mut rng, &mut events);
        assert_eq!(spawn.zone_index, 0);
        assert_eq!(zones.zone_count(), 1);
        assert_eq!(zones.zones()[0].index, 0);
    }

    #[test]
    fn same_seed_spawns_same_wave() {
        let config = SimConfig::default();
        let mut events = GameplayEventBus::default();
        let mut first = ZoneManager::default();
        let mut second = ZoneManager::default();
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..3 {
            assert_eq!(
                first.add_zone(&config, &mut rng_a, &mut events),
                second.add_zone(&config, &mut rng_b, &mut events)
            );
        }
    }
}
