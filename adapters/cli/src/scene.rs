//! Translation between world queries and the presentation contracts.

use card_defence_core::{Position, PurchaseTrack, SpriteSheet};
use card_defence_rendering::{
    CardPresentation, Color, FrameInput, HudPresentation, PlayfieldPresentation, PriceTag, Scene,
    SpriteInstance,
};
use card_defence_simulation::PlayerAction;
use card_defence_world::{query, World};

const TERRAIN_FALLBACK: Color = Color::from_rgb_u8(96, 128, 64);

/// Builds the opening scene for the world's play surface.
pub(crate) fn initial_scene(world: &World) -> anyhow::Result<Scene> {
    let playfield = query::playfield(world);
    let presentation = PlayfieldPresentation::new(
        playfield.width(),
        playfield.height(),
        SpriteSheet::Terrain,
        TERRAIN_FALLBACK,
    )?;
    let mut scene = Scene::new(presentation);
    populate(&mut scene, world);
    Ok(scene)
}

/// Rewrites the scene from the current world state.
///
/// Towers and enemies are hidden once the session is over; bullets and
/// explosions keep animating.
pub(crate) fn populate(scene: &mut Scene, world: &World) {
    let session = query::session(world);
    let game_over = session.is_game_over();

    scene.sprites.clear();
    if !game_over {
        scene.sprites.extend(
            query::tower_view(world)
                .iter()
                .filter_map(|tower| SpriteInstance::from_animation(&tower.sprite, tower.position)),
        );
        scene.sprites.extend(
            query::enemy_view(world)
                .iter()
                .filter_map(|enemy| SpriteInstance::from_animation(&enemy.sprite, enemy.position)),
        );
    }
    scene.sprites.extend(
        query::bullet_view(world)
            .iter()
            .filter_map(|bullet| SpriteInstance::from_animation(&bullet.sprite, bullet.position)),
    );
    scene.sprites.extend(query::explosion_view(world).iter().filter_map(|explosion| {
        SpriteInstance::from_animation(&explosion.sprite, explosion.position)
    }));

    let economy = query::economy(world);
    scene.hud = HudPresentation {
        coins: economy.coins,
        score: economy.score,
        prices: PurchaseTrack::ALL
            .into_iter()
            .map(|track| PriceTag::new(track, query::raw_cost(world, track), economy.coins))
            .collect(),
        game_over,
    };

    scene.hand = query::hand_view(world)
        .iter()
        .map(|card| CardPresentation::new(card.id, card.action))
        .collect();
}

/// Converts adapter input into simulation actions: restart, purchase, then drop.
pub(crate) fn actions_from_input(input: &FrameInput) -> Vec<PlayerAction> {
    let mut actions = Vec::new();
    if input.restart {
        actions.push(PlayerAction::Restart);
    }
    if let Some(track) = input.purchase {
        actions.push(PlayerAction::Purchase(track));
    }
    if let Some(drop) = input.card_drop {
        actions.push(PlayerAction::PlayCard {
            card: drop.card,
            drop: Position::new(drop.point.x, drop.point.y),
        });
    }
    actions
}
