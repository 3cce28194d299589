use std::time::Duration;

use card_defence_core::{
    CardAction, Command, EnemyId, Event, Health, Playfield, Position, SessionSnapshot,
    SessionState, TowerTarget,
};
use card_defence_system_tower_targeting::TowerTargeting;
use card_defence_world::{self as world, query, World};

fn place_tower(world: &mut World, at: Position) {
    let card = query::hand_view(world)
        .iter()
        .find(|card| card.action == CardAction::Tower)
        .map(|card| card.id)
        .expect("tower card");
    let mut events = Vec::new();
    world::apply(world, Command::PlayCard { card, drop: at }, &mut events);
}

fn spawn(world: &mut World, at: Position) -> EnemyId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            position: at,
            health: Health::new(1),
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("spawned")
}

fn targets(world: &World) -> Vec<TowerTarget> {
    let mut system = TowerTargeting::new();
    let mut out = vec![TowerTarget {
        tower: card_defence_core::TowerId::new(99),
        enemy: EnemyId::new(99),
        angle: 0.0,
    }];
    system.handle(
        query::session(world),
        &query::tower_view(world),
        &query::enemy_view(world),
        Playfield::DEFAULT.center(),
        &mut out,
    );
    out
}

#[test]
fn no_enemies_means_no_targets() {
    let mut world = World::new();
    place_tower(&mut world, Position::new(100.0, 100.0));
    assert!(targets(&world).is_empty());
}

#[test]
fn towers_focus_on_enemy_closest_to_base() {
    let mut world = World::new();
    place_tower(&mut world, Position::new(100.0, 100.0));
    let _far = spawn(&mut world, Position::new(0.0, 0.0));
    let near = spawn(&mut world, Position::new(600.0, 300.0));

    let assignments = targets(&world);
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].enemy, near);
}

#[test]
fn equidistant_enemies_resolve_to_earliest_spawn() {
    let mut world = World::new();
    place_tower(&mut world, Position::new(100.0, 100.0));
    let first = spawn(&mut world, Position::new(412.0, 260.0));
    let _second = spawn(&mut world, Position::new(612.0, 260.0));

    let assignments = targets(&world);
    assert_eq!(assignments[0].enemy, first);
}

#[test]
fn game_over_clears_assignments() {
    let mut world = World::new();
    place_tower(&mut world, Position::new(100.0, 100.0));
    let enemy = spawn(&mut world, Position::new(512.0, 260.0));
    let mut events = Vec::new();
    world::apply(&mut world, Command::BreachBase { enemy }, &mut events);

    assert!(targets(&world).is_empty());

    let mut system = TowerTargeting::new();
    let mut out = Vec::new();
    system.handle(
        SessionSnapshot {
            elapsed: Duration::ZERO,
            state: SessionState::Running,
        },
        &query::tower_view(&world),
        &query::enemy_view(&world),
        Playfield::DEFAULT.center(),
        &mut out,
    );
    assert_eq!(out.len(), 1);
}
