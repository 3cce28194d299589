use std::time::Duration;

use card_defence_core::{
    CardAction, Command, Event, Health, Position, PurchaseError, PurchaseTrack, SessionState,
    SpriteSheet,
};
use card_defence_simulation::{FrameReport, PlayerAction, Simulation, SimulationConfig};
use card_defence_world::query;

const FRAME: Duration = Duration::from_millis(16);

fn opening_card(simulation: &Simulation) -> card_defence_core::CardId {
    query::hand_view(simulation.world())
        .iter()
        .next()
        .map(|card| card.id)
        .expect("opening card")
}

fn run_frames(simulation: &mut Simulation, frames: usize) -> Vec<FrameReport> {
    (0..frames)
        .map(|_| simulation.advance(FRAME, &[]))
        .collect()
}

#[test]
fn opening_tower_card_places_a_tower() {
    let mut simulation = Simulation::new(SimulationConfig::with_seed(1));
    let card = opening_card(&simulation);
    let report = simulation.advance(
        FRAME,
        &[PlayerAction::PlayCard {
            card,
            drop: Position::new(300.0, 200.0),
        }],
    );

    assert!(report.events().contains(&Event::CardPlayed {
        card,
        action: CardAction::Tower
    }));
    let towers = query::tower_view(simulation.world()).into_vec();
    assert_eq!(towers.len(), 1);
    assert_eq!(towers[0].position, Position::new(300.0, 200.0));
    assert!(query::hand_view(simulation.world()).is_empty());
}

#[test]
fn unaffordable_purchase_is_reported() {
    let mut simulation = Simulation::new(SimulationConfig::with_seed(1));
    let report = simulation.advance(FRAME, &[PlayerAction::Purchase(PurchaseTrack::Upgrade)]);
    assert_eq!(
        report.events().first(),
        Some(&Event::PurchaseRejected {
            track: PurchaseTrack::Upgrade,
            reason: PurchaseError::InsufficientCoins {
                price: 4,
                balance: 0
            }
        })
    );
}

#[test]
fn bullet_hitting_sturdy_enemy_pays_out_and_downgrades_sprite() {
    let mut simulation = Simulation::new(SimulationConfig::with_seed(0x51));
    let card = opening_card(&simulation);
    let _ = simulation.advance(
        Duration::ZERO,
        &[PlayerAction::PlayCard {
            card,
            drop: Position::new(100.0, 100.0),
        }],
    );
    let _ = run_frames(&mut simulation, 18);
    assert!(query::bullet_view(simulation.world()).is_empty());

    let staged = simulation.apply_command(Command::SpawnEnemy {
        position: Position::new(100.0, 100.0),
        health: Health::new(3),
    });
    let enemy = staged
        .events()
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("enemy staged");

    let report = simulation.advance(FRAME, &[]);
    let damaged = report.events().iter().any(|event| {
        matches!(
            event,
            Event::EnemyDamaged { enemy: hit, health, .. }
                if *hit == enemy && *health == Health::new(2)
        )
    });
    assert!(damaged, "expected the staged enemy to be hit: {report:?}");
    assert!(report
        .events()
        .contains(&Event::RewardGranted { coins: 1, score: 1 }));

    let snapshot = query::enemy_view(simulation.world())
        .into_vec()
        .into_iter()
        .find(|snapshot| snapshot.id == enemy)
        .expect("enemy survives");
    assert_eq!(snapshot.health, Health::new(2));
    assert_eq!(snapshot.sprite.sheet(), SpriteSheet::Biker(2));
    assert!(query::bullet_view(simulation.world()).is_empty());
    assert_eq!(query::explosion_view(simulation.world()).len(), 1);
    let economy = query::economy(simulation.world());
    assert_eq!((economy.coins, economy.score), (1, 1));
}

#[test]
fn game_over_persists_until_restart() {
    let mut simulation = Simulation::new(SimulationConfig::with_seed(9));
    let card = opening_card(&simulation);
    let _ = simulation.advance(
        FRAME,
        &[PlayerAction::PlayCard {
            card,
            drop: Position::new(100.0, 400.0),
        }],
    );
    let _ = simulation.apply_command(Command::SpawnEnemy {
        position: Position::new(480.0, 250.0),
        health: Health::new(1),
    });

    let report = simulation.advance(FRAME, &[]);
    assert!(report.game_over());

    for report in run_frames(&mut simulation, 120) {
        assert!(!report.game_over(), "game over must only be reported once");
        assert!(!report
            .events()
            .iter()
            .any(|event| matches!(event, Event::BulletFired { .. })));
    }
    let session = query::session(simulation.world());
    assert_eq!(session.state, SessionState::GameOver);
    assert!(session.elapsed > Duration::from_secs(1));
}

#[test]
fn restart_after_game_over_restores_opening_state() {
    let mut simulation = Simulation::new(SimulationConfig::with_seed(4));
    let card = opening_card(&simulation);
    let _ = simulation.advance(
        FRAME,
        &[PlayerAction::PlayCard {
            card,
            drop: Position::new(100.0, 400.0),
        }],
    );
    let _ = simulation.apply_command(Command::SpawnEnemy {
        position: Position::new(480.0, 250.0),
        health: Health::new(1),
    });
    let _ = run_frames(&mut simulation, 30);
    assert!(query::session(simulation.world()).is_game_over());

    let report = simulation.advance(FRAME, &[PlayerAction::Restart]);
    assert_eq!(report.events().first(), Some(&Event::GameReset));

    let world = simulation.world();
    let session = query::session(world);
    assert_eq!(session.state, SessionState::Running);
    assert_eq!(session.elapsed, FRAME);
    assert!(query::tower_view(world).is_empty());
    assert!(query::bullet_view(world).is_empty());
    assert_eq!(query::economy(world).score, 0);
    let hand = query::hand_view(world).into_vec();
    assert_eq!(hand.len(), 1);
    assert_eq!(hand[0].action, CardAction::Tower);
}

#[test]
fn reset_command_clears_staged_enemies() {
    let mut simulation = Simulation::new(SimulationConfig::with_seed(2));
    for x in [50.0, 900.0, 300.0] {
        let _ = simulation.apply_command(Command::SpawnEnemy {
            position: Position::new(x, 20.0),
            health: Health::new(2),
        });
    }
    let _ = simulation.apply_command(Command::Reset);
    assert!(query::enemy_view(simulation.world()).is_empty());
}
