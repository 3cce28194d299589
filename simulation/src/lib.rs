#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame loop that owns the world and drives every system in a fixed order.
//!
//! One call to [`Simulation::advance`] runs a full frame: player actions,
//! the clock tick, tower fire, movement, spawning and finally collisions.

use std::time::Duration;

use card_defence_core::{CardId, Command, Event, Position, PurchaseTrack, TowerTarget};
use card_defence_system_card_dealer::{self as card_dealer, CardDealer};
use card_defence_system_collision::Collision;
use card_defence_system_movement::{self as movement, Movement};
use card_defence_system_spawning::{self as spawning, Spawning};
use card_defence_system_tower_combat::{self as tower_combat, TowerCombat};
use card_defence_system_tower_targeting::TowerTargeting;
use card_defence_world::{self as world, query, World};
use tracing::{debug, trace};

const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

const SPAWNING_STREAM: u64 = 1;
const COMBAT_STREAM: u64 = 2;
const DEALER_STREAM: u64 = 3;

/// Configuration of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    seed: u64,
    max_frame_delta: Duration,
}

impl SimulationConfig {
    /// Creates a configuration with an explicit seed and frame delta ceiling.
    #[must_use]
    pub const fn new(seed: u64, max_frame_delta: Duration) -> Self {
        Self {
            seed,
            max_frame_delta,
        }
    }

    /// Creates a configuration with the provided seed and the default ceiling.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self::new(seed, DEFAULT_MAX_FRAME_DELTA)
    }

    /// Seed every random stream is derived from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Longest delta a single frame may simulate.
    #[must_use]
    pub const fn max_frame_delta(&self) -> Duration {
        self.max_frame_delta
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

/// Discrete input collected from the player during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerAction {
    /// Buy a card from a purchase track.
    Purchase(PurchaseTrack),
    /// Release a card from the hand over the play surface.
    PlayCard {
        /// Card being dragged.
        card: CardId,
        /// Point where the card was released.
        drop: Position,
    },
    /// Start a new session.
    Restart,
}

/// Events produced while advancing a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    events: Vec<Event>,
}

impl FrameReport {
    /// Events in the order the world reported them.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Reports whether the session ended during this frame.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. }))
    }

    /// Consumes the report, yielding the events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

/// Owns the world and every system, advancing them one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    dealer: CardDealer,
    targeting: TowerTargeting,
    combat: TowerCombat,
    movement: Movement,
    spawning: Spawning,
    collision: Collision,
    max_frame_delta: Duration,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
}

impl Simulation {
    /// Creates a simulation on the default play surface.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_world(config, World::new())
    }

    /// Creates a simulation around an existing world.
    #[must_use]
    pub fn with_world(config: SimulationConfig, world: World) -> Self {
        let seed = config.seed();
        Self {
            world,
            dealer: CardDealer::new(card_dealer::Config::new(derive_seed(seed, DEALER_STREAM))),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(tower_combat::Config::new(derive_seed(
                seed,
                COMBAT_STREAM,
            ))),
            movement: Movement::new(movement::Config::default()),
            spawning: Spawning::new(spawning::Config::new(derive_seed(seed, SPAWNING_STREAM))),
            collision: Collision::new(),
            max_frame_delta: config.max_frame_delta(),
            commands: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies a single command outside the frame loop.
    ///
    /// Scripted scenarios use this to stage entities without waiting on the
    /// random streams.
    pub fn apply_command(&mut self, command: Command) -> FrameReport {
        let mut report = FrameReport::default();
        world::apply(&mut self.world, command, &mut report.events);
        report
    }

    /// Advances the simulation by one frame.
    ///
    /// `dt` is clamped to the configured ceiling. `actions` are applied in
    /// order before the clock moves.
    pub fn advance(&mut self, dt: Duration, actions: &[PlayerAction]) -> FrameReport {
        let dt = dt.min(self.max_frame_delta);
        let mut events = Vec::new();

        for action in actions {
            self.apply_action(*action, &mut events);
        }

        let first_tick_event = events.len();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let tick_events = events[first_tick_event..].to_vec();

        let playfield = query::playfield(&self.world);
        let base = playfield.center();

        let session = query::session(&self.world);
        let towers = query::tower_view(&self.world);
        self.targeting.handle(
            session,
            &towers,
            &query::enemy_view(&self.world),
            base,
            &mut self.targets,
        );
        self.combat
            .handle(session, &towers, &self.targets, &mut self.commands);
        self.flush(&mut events);

        self.movement.handle(
            &tick_events,
            &query::bullet_view(&self.world),
            &query::enemy_view(&self.world),
            base,
            &mut self.commands,
        );
        self.flush(&mut events);

        self.spawning.handle(
            &tick_events,
            query::session(&self.world),
            playfield,
            &mut self.commands,
        );
        self.flush(&mut events);

        self.collision.handle(
            &query::enemy_view(&self.world),
            &query::bullet_view(&self.world),
            playfield.base_hitbox(),
            &mut self.commands,
        );
        self.flush(&mut events);

        trace!(
            dt = ?dt,
            events = events.len(),
            elapsed = ?query::session(&self.world).elapsed,
            "frame advanced"
        );
        FrameReport { events }
    }

    fn apply_action(&mut self, action: PlayerAction, events: &mut Vec<Event>) {
        debug!(?action, "player action");
        match action {
            PlayerAction::Restart => world::apply(&mut self.world, Command::Reset, events),
            PlayerAction::Purchase(track) => {
                self.dealer.handle(&[track], &mut self.commands);
                self.flush(events);
            }
            PlayerAction::PlayCard { card, drop } => {
                world::apply(&mut self.world, Command::PlayCard { card, drop }, events);
            }
        }
    }

    fn flush(&mut self, events: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

/// Derives an independent seed for one random stream.
fn derive_seed(seed: u64, stream: u64) -> u64 {
    let mut value = seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_seeds_differ_per_stream() {
        let seeds = [
            derive_seed(7, SPAWNING_STREAM),
            derive_seed(7, COMBAT_STREAM),
            derive_seed(7, DEALER_STREAM),
        ];
        assert_ne!(seeds[0], seeds[1]);
        assert_ne!(seeds[1], seeds[2]);
        assert_ne!(seeds[0], seeds[2]);
        assert_eq!(seeds[0], derive_seed(7, SPAWNING_STREAM));
    }

    #[test]
    fn frame_delta_is_clamped() {
        let mut simulation = Simulation::new(SimulationConfig::with_seed(1));
        let report = simulation.advance(Duration::from_secs(30), &[]);
        assert_eq!(
            report.events().first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(250)
            })
        );
        assert_eq!(
            query::session(simulation.world()).elapsed,
            Duration::from_millis(250)
        );
    }
}
