#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims every tower at the enemy closest to the base.

use std::f32::consts::{FRAC_PI_2, PI};

use card_defence_core::{
    EnemySnapshot, EnemyView, Position, SessionSnapshot, TowerTarget, TowerView,
};

/// Tower targeting system that reuses a scratch buffer between frames.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<EnemySnapshot>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes an aim solution for every tower against the priority enemy.
    ///
    /// The output buffer is cleared before populating it. Towers whose aim
    /// degenerates (enemy exactly on the tower's corner) receive no entry and
    /// fall back to spraying.
    pub fn handle(
        &mut self,
        session: SessionSnapshot,
        towers: &TowerView,
        enemies: &EnemyView,
        base: Position,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();
        if session.is_game_over() || towers.is_empty() {
            return;
        }

        self.candidates.clear();
        self.candidates.extend(enemies.iter().copied());
        let Some(priority) = nearest_to_base(&self.candidates, base) else {
            return;
        };

        for tower in towers.iter() {
            if let Some(angle) = aim_angle(tower.position, priority.position) {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: priority.id,
                    angle,
                });
            }
        }
    }
}

/// Enemy whose top-left corner is closest to `base`; the earliest spawn wins ties.
#[must_use]
pub fn nearest_to_base(enemies: &[EnemySnapshot], base: Position) -> Option<&EnemySnapshot> {
    let mut best: Option<(&EnemySnapshot, f32)> = None;
    for enemy in enemies {
        let distance = enemy.position.distance(base);
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((enemy, distance)),
        }
    }
    best.map(|(enemy, _)| enemy)
}

/// Heading from `tower` toward `enemy`, using the same `(sin, cos)` convention
/// bullets travel with: `atan(dx / dy)`, rotated half a turn when the enemy
/// sits above the tower.
///
/// An enemy level with the tower gets a sideways heading pointing at it.
/// This departs from the literal formula, whose `atan(±inf)` would send the
/// bullet directly away from the enemy. Returns `None` when both points
/// coincide.
#[must_use]
pub fn aim_angle(tower: Position, enemy: Position) -> Option<f32> {
    let dx = tower.x() - enemy.x();
    let dy = tower.y() - enemy.y();
    if dy == 0.0 {
        return match dx {
            dx if dx < 0.0 => Some(FRAC_PI_2),
            dx if dx > 0.0 => Some(-FRAC_PI_2),
            _ => None,
        };
    }

    let mut angle = (dx / dy).atan();
    if enemy.y() - tower.y() < 0.0 {
        angle += PI;
    }
    angle.is_finite().then_some(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(angle: f32) -> (f32, f32) {
        (angle.sin(), angle.cos())
    }

    fn assert_points_toward(from: Position, to: Position) {
        let angle = aim_angle(from, to).expect("angle");
        let (sx, sy) = heading(angle);
        let distance = from.distance(to);
        let expected = ((to.x() - from.x()) / distance, (to.y() - from.y()) / distance);
        assert!((sx - expected.0).abs() < 1e-5, "x heading {sx} vs {}", expected.0);
        assert!((sy - expected.1).abs() < 1e-5, "y heading {sy} vs {}", expected.1);
    }

    #[test]
    fn angle_points_toward_enemy_in_every_quadrant() {
        let tower = Position::new(100.0, 100.0);
        assert_points_toward(tower, Position::new(100.0, 300.0));
        assert_points_toward(tower, Position::new(100.0, 20.0));
        assert_points_toward(tower, Position::new(250.0, 250.0));
        assert_points_toward(tower, Position::new(10.0, 250.0));
        assert_points_toward(tower, Position::new(250.0, 30.0));
        assert_points_toward(tower, Position::new(10.0, 30.0));
    }

    #[test]
    fn level_enemy_yields_horizontal_heading() {
        assert_points_toward(Position::new(100.0, 100.0), Position::new(300.0, 100.0));
        assert_points_toward(Position::new(100.0, 100.0), Position::new(0.0, 100.0));
    }

    #[test]
    fn coinciding_points_have_no_angle() {
        let point = Position::new(40.0, 40.0);
        assert_eq!(aim_angle(point, point), None);
    }
}
