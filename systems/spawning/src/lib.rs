#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system responsible for emitting enemy spawn commands.
//!
//! Every frame that advances time gets exactly one spawn trial. The chance of
//! success grows with elapsed session time as `1 - 0.995^t`, so the opening
//! seconds are quiet and the pressure ramps up from there.

use std::time::Duration;

use card_defence_core::{Command, Event, Health, Playfield, Position, SessionSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SPAWN_DECAY_BASE: f64 = 0.995;
const HEALTH_GROWTH_BASE: f64 = 1.001;
const EDGE_MARGIN: f32 = 30.0;

/// Configuration parameters required to construct the spawning system.
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

/// Edge of the play surface an enemy enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnEdge {
    /// Enters along the left border.
    Left,
    /// Enters along the top border.
    Top,
    /// Enters just above the bottom border.
    Bottom,
    /// Enters along the right border.
    Right,
}

impl SpawnEdge {
    const ALL: [SpawnEdge; 4] = [Self::Left, Self::Top, Self::Bottom, Self::Right];

    /// Point on this edge selected by `fraction` in `[0, 1)`.
    #[must_use]
    pub fn point(self, playfield: Playfield, fraction: f32) -> Position {
        let (width, height) = (playfield.width(), playfield.height());
        match self {
            Self::Left => Position::new(0.0, fraction * (height - EDGE_MARGIN)),
            Self::Top => Position::new(fraction * width, 0.0),
            Self::Bottom => Position::new(fraction * width, height - EDGE_MARGIN),
            Self::Right => Position::new(width, fraction * (height - EDGE_MARGIN)),
        }
    }
}

/// Probability that a single spawn trial succeeds after `elapsed` session time.
#[must_use]
pub fn spawn_probability(elapsed: Duration) -> f64 {
    1.0 - SPAWN_DECAY_BASE.powf(elapsed.as_secs_f64())
}

/// Health rolled for a fresh enemy: `ceil(roll * 1.001^t)`, never below one.
#[must_use]
pub fn health_for_roll(roll: f64, elapsed: Duration) -> Health {
    let scaled = (roll * HEALTH_GROWTH_BASE.powf(elapsed.as_secs_f64())).ceil();
    let value = if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else if scaled > 0.0 {
        scaled as u32
    } else {
        0
    };
    Health::new(value)
}

/// Pure system that emits at most one spawn command per frame.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the session snapshot to emit spawn commands.
    ///
    /// `session` must be captured after the frame's tick was applied so the
    /// trial uses the updated clock.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: SessionSnapshot,
        playfield: Playfield,
        out: &mut Vec<Command>,
    ) {
        let advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !advanced {
            return;
        }

        let elapsed = session.elapsed;
        if self.rng.gen::<f64>() >= spawn_probability(elapsed) {
            return;
        }

        let edge = SpawnEdge::ALL[self.rng.gen_range(0..SpawnEdge::ALL.len())];
        let position = edge.point(playfield, self.rng.gen::<f32>());
        let health = health_for_roll(self.rng.gen::<f64>(), elapsed);
        out.push(Command::SpawnEnemy { position, health });
    }
}
