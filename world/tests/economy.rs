use card_defence_core::{
    CardAction, Command, Event, Health, Position, PurchaseTrack, TowerId,
};
use card_defence_world::{apply, query, World};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Step {
    Earn,
    Buy(PurchaseTrack),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Earn),
        1 => Just(Step::Buy(PurchaseTrack::Tower)),
        1 => Just(Step::Buy(PurchaseTrack::Upgrade)),
        1 => Just(Step::Buy(PurchaseTrack::PowerUp)),
    ]
}

fn world_with_tower() -> (World, TowerId) {
    let mut world = World::new();
    let mut events = Vec::new();
    let card = query::hand_view(&world)
        .iter()
        .next()
        .map(|card| card.id)
        .expect("opening card");
    apply(
        &mut world,
        Command::PlayCard {
            card,
            drop: Position::new(40.0, 40.0),
        },
        &mut events,
    );
    let tower = events
        .iter()
        .find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower placed");
    (world, tower)
}

fn earn_coin(world: &mut World, tower: TowerId) {
    let mut events = Vec::new();
    apply(
        world,
        Command::SpawnEnemy {
            position: Position::new(800.0, 100.0),
            health: Health::new(1),
        },
        &mut events,
    );
    apply(world, Command::FireBullet { tower, angle: 0.0 }, &mut events);

    let enemy = events.iter().find_map(|event| match event {
        Event::EnemySpawned { enemy, .. } => Some(*enemy),
        _ => None,
    });
    let bullet = events.iter().find_map(|event| match event {
        Event::BulletFired { bullet, .. } => Some(*bullet),
        _ => None,
    });
    if let (Some(enemy), Some(bullet)) = (enemy, bullet) {
        apply(world, Command::HitEnemy { enemy, bullet }, &mut events);
    }
}

fn action_for(track: PurchaseTrack) -> CardAction {
    match track {
        PurchaseTrack::Tower => CardAction::Tower,
        PurchaseTrack::Upgrade => CardAction::Aim,
        PurchaseTrack::PowerUp => CardAction::Erase,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_costs_never_decrease_and_purchases_are_fully_paid(
        steps in prop::collection::vec(step_strategy(), 1..60)
    ) {
        let (mut world, tower) = world_with_tower();

        for step in steps {
            let before = query::economy(&world);
            let raw_before = PurchaseTrack::ALL.map(|track| query::raw_cost(&world, track));

            match step {
                Step::Earn => {
                    earn_coin(&mut world, tower);
                    let after = query::economy(&world);
                    prop_assert_eq!(after.coins, before.coins + 1);
                    prop_assert_eq!(after.score, before.score + 1);
                }
                Step::Buy(track) => {
                    let mut events = Vec::new();
                    apply(
                        &mut world,
                        Command::PurchaseCard { track, action: action_for(track) },
                        &mut events,
                    );
                    let after = query::economy(&world);
                    if before.can_afford(track) {
                        prop_assert_eq!(after.coins, before.coins - before.price(track));
                        let grown = PurchaseTrack::ALL
                            .iter()
                            .zip(raw_before)
                            .all(|(other, raw)| *other != track || query::raw_cost(&world, track) > raw);
                        prop_assert!(grown);
                    } else {
                        prop_assert_eq!(after.coins, before.coins);
                        let rejected = matches!(events.as_slice(), [Event::PurchaseRejected { .. }]);
                        prop_assert!(rejected);
                    }
                }
            }

            for (track, raw) in PurchaseTrack::ALL.iter().zip(raw_before) {
                prop_assert!(query::raw_cost(&world, *track) >= raw);
            }
        }
    }
}

#[test]
fn hand_grows_with_each_purchase() {
    let (mut world, tower) = world_with_tower();
    for _ in 0..5 {
        earn_coin(&mut world, tower);
    }

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::PurchaseCard {
            track: PurchaseTrack::Tower,
            action: CardAction::Tower,
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::PurchaseCard {
            track: PurchaseTrack::Upgrade,
            action: CardAction::Speed,
        },
        &mut events,
    );

    let actions: Vec<CardAction> = query::hand_view(&world)
        .iter()
        .map(|card| card.action)
        .collect();
    assert_eq!(actions, vec![CardAction::Tower, CardAction::Speed]);
    assert_eq!(query::economy(&world).coins, 0);
}
