#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects bullet hits and base breaches.
//!
//! Enemies are scanned in spawn order and bullets in firing order. Each enemy
//! is struck by at most one bullet per frame and a bullet is consumed by the
//! first enemy it hits. The enemy's box is always the first operand of the
//! overlap predicate.

use card_defence_core::{BoundingBox, BulletId, BulletView, Command, EnemyView};

/// Collision system that reuses a scratch buffer of consumed bullets.
#[derive(Debug, Default)]
pub struct Collision {
    consumed: Vec<BulletId>,
}

impl Collision {
    /// Creates a new collision system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `HitEnemy` for the first bullet overlapping each enemy and
    /// `BreachBase` for every enemy overlapping the base hitbox.
    ///
    /// The breach test uses the enemy's position from before the hit, so an
    /// enemy destroyed on the base still ends the session.
    pub fn handle(
        &mut self,
        enemies: &EnemyView,
        bullets: &BulletView,
        base: BoundingBox,
        out: &mut Vec<Command>,
    ) {
        self.consumed.clear();

        for enemy in enemies.iter() {
            let bounds = enemy.bounds();
            let struck = bullets.iter().find(|bullet| {
                !self.consumed.contains(&bullet.id) && bounds.overlaps(&bullet.bounds())
            });
            if let Some(bullet) = struck {
                self.consumed.push(bullet.id);
                out.push(Command::HitEnemy {
                    enemy: enemy.id,
                    bullet: bullet.id,
                });
            }

            if bounds.overlaps(&base) {
                out.push(Command::BreachBase { enemy: enemy.id });
            }
        }
    }
}
