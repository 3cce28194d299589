#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits bullet firing commands for towers off cooldown.

use std::{f32::consts::PI, time::Duration};

use card_defence_core::{
    Command, SessionSnapshot, TowerId, TowerLevels, TowerTarget, TowerView, TOWER_FIRE_INTERVAL,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SPRAY_TURNS: f32 = 5.0;
const AIM_CHANCE_PER_LEVEL: f64 = 0.1;

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Cooldown between shots for a tower with the provided levels.
#[must_use]
pub fn cooldown(levels: TowerLevels) -> Duration {
    TOWER_FIRE_INTERVAL / levels.speed().max(1)
}

/// Chance that a shot homes on the priority target instead of spraying.
///
/// The value is not clamped; from aim level 10 upward every shot homes.
#[must_use]
pub fn aim_chance(levels: TowerLevels) -> f64 {
    AIM_CHANCE_PER_LEVEL * f64::from(levels.aim())
}

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug)]
pub struct TowerCombat {
    rng: ChaCha8Rng,
}

impl TowerCombat {
    /// Creates a new tower combat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits `Command::FireBullet` entries for towers whose cooldown elapsed.
    ///
    /// Each ready tower draws a spray angle uniformly from `[-5π, 5π)` and then
    /// rolls its aim chance; a successful roll swaps in the tower's entry from
    /// `targets` when one exists.
    pub fn handle(
        &mut self,
        session: SessionSnapshot,
        towers: &TowerView,
        targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if session.is_game_over() {
            return;
        }

        for tower in towers.iter() {
            let since_last = session.elapsed.saturating_sub(tower.last_fire);
            if since_last <= cooldown(tower.levels) {
                continue;
            }

            let spray = SPRAY_TURNS * PI;
            let mut angle = self.rng.gen_range(-spray..spray);
            if self.rng.gen::<f64>() < aim_chance(tower.levels) {
                if let Some(target) = find_target(targets, tower.id) {
                    angle = target.angle;
                }
            }

            out.push(Command::FireBullet {
                tower: tower.id,
                angle,
            });
        }
    }
}

fn find_target(targets: &[TowerTarget], tower: TowerId) -> Option<&TowerTarget> {
    targets.iter().find(|target| target.tower == tower)
}
