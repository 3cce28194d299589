//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use card_defence_core::{
    CardAction, Position, SpriteAnimation, SpriteSheet, TowerId, TowerLevels, TowerSnapshot,
};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Top-left corner where the tower card was dropped.
    pub(crate) position: Position,
    /// Upgrades received so far.
    pub(crate) levels: TowerLevels,
    /// Session time of the most recent shot or of the placement.
    pub(crate) last_fire: Duration,
    /// Idle animation.
    pub(crate) sprite: SpriteAnimation,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            position: self.position,
            levels: self.levels,
            last_fire: self.last_fire,
            sprite: self.sprite,
        }
    }

    /// Applies an upgrade card and swaps the sheet to the matching variant.
    pub(crate) fn upgrade(&mut self, action: CardAction) {
        self.levels = self.levels.upgraded(action);
        self.sprite.set_sheet(SpriteSheet::for_tower(self.levels));
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Places a fresh tower and returns its identifier.
    pub(crate) fn place(&mut self, position: Position, now: Duration) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = id.next();
        let levels = TowerLevels::default();
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                position,
                levels,
                last_fire: now,
                sprite: SpriteAnimation::tower(levels),
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    /// Tower closest to `point`; the earliest placed tower wins ties.
    pub(crate) fn nearest_to(&self, point: Position) -> Option<TowerId> {
        let mut best: Option<(TowerId, f32)> = None;
        for tower in self.entries.values() {
            let distance = tower.position.distance(point);
            match best {
                Some((_, closest)) if distance >= closest => {}
                _ => best = Some((tower.id, distance)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Removes every tower while keeping the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn placed_towers_receive_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.place(Position::new(10.0, 10.0), Duration::ZERO);
        let second = registry.place(Position::new(20.0, 10.0), Duration::from_secs(1));
        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(
            registry.entries.get(&second).map(|tower| tower.last_fire),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn nearest_tower_prefers_first_placed_on_ties() {
        let mut registry = TowerRegistry::new();
        let left = registry.place(Position::new(0.0, 0.0), Duration::ZERO);
        let _right = registry.place(Position::new(20.0, 0.0), Duration::ZERO);
        assert_eq!(registry.nearest_to(Position::new(10.0, 0.0)), Some(left));
    }

    #[test]
    fn nearest_tower_picks_smallest_distance() {
        let mut registry = TowerRegistry::new();
        let _far = registry.place(Position::new(0.0, 0.0), Duration::ZERO);
        let near = registry.place(Position::new(100.0, 100.0), Duration::ZERO);
        assert_eq!(registry.nearest_to(Position::new(90.0, 95.0)), Some(near));
        assert_eq!(TowerRegistry::new().nearest_to(Position::new(0.0, 0.0)), None);
    }

    #[test]
    fn clearing_keeps_identifier_counter() {
        let mut registry = TowerRegistry::new();
        let _ = registry.place(Position::new(0.0, 0.0), Duration::ZERO);
        registry.clear();
        let next = registry.place(Position::new(0.0, 0.0), Duration::ZERO);
        assert_eq!(next, TowerId::new(1));
    }

    #[test]
    fn upgrade_swaps_sprite_variant() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(Position::new(0.0, 0.0), Duration::ZERO);
        let tower = registry.get_mut(id).expect("tower");
        tower.upgrade(CardAction::Speed);
        assert_eq!(tower.levels.speed(), 2);
        assert_eq!(tower.sprite.sheet(), SpriteSheet::Tower(2));
    }
}
