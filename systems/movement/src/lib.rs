#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that advances bullets along their heading and
//! steers enemies toward the base.

use std::time::Duration;

use card_defence_core::{
    BulletView, Command, EnemyView, Event, Health, Position, BULLET_SPEED, ENEMY_SPEED,
};

const HEALTH_SPEED_BASE: f64 = 1.5;
const HEALTH_SPEED_OFFSET: f64 = 0.5;

/// Speeds used by the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    bullet_speed: f32,
    enemy_speed: f32,
}

impl Config {
    /// Creates a configuration with explicit speeds in pixels per second.
    #[must_use]
    pub const fn new(bullet_speed: f32, enemy_speed: f32) -> Self {
        Self {
            bullet_speed,
            enemy_speed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(BULLET_SPEED, ENEMY_SPEED)
    }
}

/// Position of a bullet after travelling `distance` along `angle`.
///
/// Angle zero points toward increasing `y`.
#[must_use]
pub fn bullet_step(position: Position, angle: f32, distance: f32) -> Position {
    position.offset(angle.sin() * distance, angle.cos() * distance)
}

/// Speed multiplier applied to an enemy: `1.5^health - 0.5`.
///
/// Computed in `f64`; very sturdy enemies may still overflow to infinity,
/// which `enemy_step` absorbs.
#[must_use]
pub fn health_speed_factor(health: Health) -> f64 {
    let exponent = i32::try_from(health.get()).unwrap_or(i32::MAX);
    HEALTH_SPEED_BASE.powi(exponent) - HEALTH_SPEED_OFFSET
}

/// Position of an enemy after moving `distance` straight toward `target`.
///
/// A step that would reach or pass the target lands on it. An enemy already
/// on the target stays put.
#[must_use]
pub fn enemy_step(position: Position, target: Position, distance: f32) -> Position {
    let length = position.distance(target);
    if !length.is_normal() {
        return position;
    }
    if distance.is_nan() {
        return position;
    }
    if distance >= length {
        return target;
    }

    let scale = distance / length;
    position.offset(
        (target.x() - position.x()) * scale,
        (target.y() - position.y()) * scale,
    )
}

/// Movement system that converts elapsed time into move commands.
#[derive(Debug)]
pub struct Movement {
    bullet_speed: f32,
    enemy_speed: f32,
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            bullet_speed: config.bullet_speed,
            enemy_speed: config.enemy_speed,
        }
    }

    /// Emits one `MoveBullet` per bullet and one `MoveEnemy` per enemy for the
    /// time reported in `events`.
    pub fn handle(
        &mut self,
        events: &[Event],
        bullets: &BulletView,
        enemies: &EnemyView,
        base: Position,
        out: &mut Vec<Command>,
    ) {
        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if dt.is_zero() {
            return;
        }

        let seconds = dt.as_secs_f32();
        let bullet_distance = self.bullet_speed * seconds;
        for bullet in bullets.iter() {
            out.push(Command::MoveBullet {
                bullet: bullet.id,
                to: bullet_step(bullet.position, bullet.angle, bullet_distance),
            });
        }

        for enemy in enemies.iter() {
            let distance = f64::from(self.enemy_speed)
                * health_speed_factor(enemy.health)
                * f64::from(seconds);
            out.push(Command::MoveEnemy {
                enemy: enemy.id,
                to: enemy_step(enemy.position, base, distance as f32),
            });
        }
    }
}
