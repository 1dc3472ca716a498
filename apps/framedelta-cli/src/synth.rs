//! Deterministic synthetic matches for demos and size comparisons.

use framedelta_common::Position;
use framedelta_kernel::Observation;
use glam::DVec3;

const PRIMARIES: [&str; 5] = ["ak47", "m4a1", "awp", "mp9", "galilar"];
const SECONDARIES: [&str; 3] = ["glock", "usp_silencer", "deagle"];
const GRENADES: [&str; 3] = ["flashbang", "smokegrenade", "hegrenade"];

/// Shape of a generated match.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub seed: u64,
    pub steps: usize,
    pub players: usize,
    /// Players stay within `[-half_extent, half_extent]` on x and y.
    pub arena_half_extent: f64,
    /// Chance per step that a live player dies.
    pub death_chance: f64,
    /// Steps a dead player stays absent before respawning.
    pub respawn_delay: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 1000,
            players: 10,
            arena_half_extent: 2048.0,
            death_chance: 0.002,
            respawn_delay: 64,
        }
    }
}

struct Bot {
    key: u64,
    name: String,
    position: Position,
    heading: DVec3,
    loadout: Vec<&'static str>,
    dead_for: Option<usize>,
}

/// Iterator over the steps of a generated match.
pub struct SynthMatch {
    config: SynthConfig,
    state: u64,
    bots: Vec<Bot>,
    step: usize,
}

impl SynthMatch {
    pub fn new(config: SynthConfig) -> Self {
        let mut state = config.seed;
        let half = config.arena_half_extent;
        let bots = (0..config.players)
            .map(|i| {
                let key = 76_561_198_000_000_000 + (splitmix64(&mut state) >> 40);
                Bot {
                    key,
                    name: format!("bot-{i}"),
                    position: DVec3::new(i as f64 * 64.0 - half, 0.0, 0.0).min(DVec3::splat(half)),
                    heading: DVec3::X,
                    loadout: vec!["knife", SECONDARIES[i % SECONDARIES.len()]],
                    dead_for: None,
                }
            })
            .collect();
        Self {
            config,
            state,
            bots,
            step: 0,
        }
    }

    fn unit(&mut self) -> f64 {
        (splitmix64(&mut self.state) >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(splitmix64(&mut self.state) % items.len() as u64) as usize]
    }

    fn advance(&mut self, index: usize) {
        let half = self.config.arena_half_extent;
        let turn = self.unit();
        let buy = self.unit();
        let death = self.unit();
        let primary = self.pick(&PRIMARIES);
        let grenade = self.pick(&GRENADES);
        let config_death = self.config.death_chance;
        let delay = self.config.respawn_delay;

        let bot = &mut self.bots[index];
        if let Some(left) = bot.dead_for {
            bot.dead_for = if left == 0 { None } else { Some(left - 1) };
            if bot.dead_for.is_none() {
                bot.loadout.truncate(2);
            }
            return;
        }
        if death < config_death {
            bot.dead_for = Some(delay);
            return;
        }

        // standing still most of the time keeps some deltas empty
        if turn < 0.6 {
            return;
        }
        if turn > 0.95 {
            bot.heading = DVec3::new(bot.heading.y, -bot.heading.x, 0.0);
        }
        bot.position = (bot.position + bot.heading * 4.0).clamp(
            DVec3::new(-half, -half, -64.0),
            DVec3::new(half, half, 64.0),
        );

        if buy > 0.995 {
            if bot.loadout.len() < 3 {
                bot.loadout.push(primary);
            } else if !bot.loadout.contains(&grenade) {
                bot.loadout.push(grenade);
            } else {
                bot.loadout.retain(|item| *item != grenade);
            }
        }
    }
}

impl Iterator for SynthMatch {
    type Item = Vec<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.config.steps {
            return None;
        }
        self.step += 1;
        for index in 0..self.bots.len() {
            self.advance(index);
        }
        Some(
            self.bots
                .iter()
                .filter(|bot| bot.dead_for.is_none())
                .map(|bot| {
                    Observation::new(
                        bot.key,
                        bot.name.clone(),
                        bot.position,
                        bot.loadout.iter().copied(),
                    )
                })
                .collect(),
        )
    }
}

/// Splitmix64 step: advances `state` and returns the next output.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framedelta_kernel::{IterSource, Timeline};

    #[test]
    fn same_seed_same_match() {
        let config = SynthConfig {
            steps: 200,
            ..SynthConfig::default()
        };
        let a: Vec<_> = SynthMatch::new(config.clone()).collect();
        let b: Vec<_> = SynthMatch::new(config).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 200);
    }

    #[test]
    fn different_seeds_diverge() {
        let a: Vec<_> = SynthMatch::new(SynthConfig { seed: 1, steps: 50, ..Default::default() }).collect();
        let b: Vec<_> = SynthMatch::new(SynthConfig { seed: 2, steps: 50, ..Default::default() }).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn deaths_produce_despawns_and_respawns() {
        let config = SynthConfig {
            steps: 400,
            players: 4,
            death_chance: 0.05,
            respawn_delay: 3,
            ..SynthConfig::default()
        };
        let steps: Vec<_> = SynthMatch::new(config).collect();
        let encoded = Timeline::run(IterSource::from_steps(steps)).unwrap();
        encoded.validate().unwrap();
        let stats = encoded.stats();
        assert_eq!(stats.players, 4);
        assert!(stats.despawns > 0);
        assert!(stats.spawns > 4);
    }

    #[test]
    fn positions_stay_in_arena() {
        let config = SynthConfig {
            steps: 2000,
            arena_half_extent: 50.0,
            ..SynthConfig::default()
        };
        for step in SynthMatch::new(config) {
            for obs in step {
                assert!(obs.position.x.abs() <= 50.0, "{obs:?}");
                assert!(obs.position.y.abs() <= 50.0, "{obs:?}");
            }
        }
    }
}
