#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Card Defence.

mod economy;
mod towers;

use std::time::Duration;

use card_defence_core::{
    BulletId, CardAction, CardId, CardPlayError, CardSnapshot, Command, EnemyId, Event,
    ExplosionId, Health, Playfield, Position, PurchaseError, PurchaseTrack, SessionState,
    SpriteAnimation, SpriteSheet, TowerId, ENEMY_SIZE,
};
use tracing::{debug, info};

use crate::{economy::Ledger, towers::TowerRegistry};

const OPENING_HAND: [CardAction; 1] = [CardAction::Tower];

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    position: Position,
    health: Health,
    sprite: SpriteAnimation,
}

#[derive(Clone, Debug)]
struct Bullet {
    id: BulletId,
    position: Position,
    angle: f32,
    sprite: SpriteAnimation,
}

#[derive(Clone, Debug)]
struct Explosion {
    id: ExplosionId,
    position: Position,
    sprite: SpriteAnimation,
}

/// Represents the authoritative Card Defence world state.
#[derive(Debug)]
pub struct World {
    playfield: Playfield,
    elapsed: Duration,
    state: SessionState,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    explosions: Vec<Explosion>,
    ledger: Ledger,
    hand: Vec<CardSnapshot>,
    next_enemy_id: EnemyId,
    next_bullet_id: BulletId,
    next_explosion_id: ExplosionId,
    next_card_id: CardId,
}

impl World {
    /// Creates a new world on the default play surface.
    #[must_use]
    pub fn new() -> Self {
        Self::with_playfield(Playfield::DEFAULT)
    }

    /// Creates a new world on a play surface with custom dimensions.
    #[must_use]
    pub fn with_playfield(playfield: Playfield) -> Self {
        let mut world = Self {
            playfield,
            elapsed: Duration::ZERO,
            state: SessionState::Running,
            towers: TowerRegistry::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            explosions: Vec::new(),
            ledger: Ledger::new(),
            hand: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            next_bullet_id: BulletId::new(0),
            next_explosion_id: ExplosionId::new(0),
            next_card_id: CardId::new(0),
        };
        world.deal_opening_hand();
        world
    }

    fn deal_opening_hand(&mut self) {
        for action in OPENING_HAND {
            let _ = self.deal(action);
        }
    }

    fn deal(&mut self, action: CardAction) -> CardId {
        let id = self.next_card_id;
        self.next_card_id = id.next();
        self.hand.push(CardSnapshot { id, action });
        id
    }

    fn start_explosion(&mut self, position: Position, out_events: &mut Vec<Event>) {
        let explosion = self.next_explosion_id;
        self.next_explosion_id = explosion.next();
        self.explosions.push(Explosion {
            id: explosion,
            position,
            sprite: SpriteAnimation::explosion(),
        });
        out_events.push(Event::ExplosionStarted {
            explosion,
            position,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        for tower in self.towers.iter_mut() {
            tower.sprite.update(dt);
        }
        for enemy in &mut self.enemies {
            enemy.sprite.update(dt);
        }
        for explosion in &mut self.explosions {
            explosion.sprite.update(dt);
        }

        self.explosions.retain(|explosion| {
            if explosion.sprite.is_done() {
                out_events.push(Event::ExplosionFinished {
                    explosion: explosion.id,
                });
                false
            } else {
                true
            }
        });
    }

    fn spawn_enemy(&mut self, position: Position, health: Health, out_events: &mut Vec<Event>) {
        let enemy = self.next_enemy_id;
        self.next_enemy_id = enemy.next();
        self.enemies.push(Enemy {
            id: enemy,
            position,
            health,
            sprite: SpriteAnimation::enemy(health),
        });
        out_events.push(Event::EnemySpawned {
            enemy,
            position,
            health,
        });
    }

    fn fire_bullet(&mut self, tower: TowerId, angle: f32, out_events: &mut Vec<Event>) {
        if self.state == SessionState::GameOver {
            return;
        }

        let now = self.elapsed;
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        let origin = state.snapshot().muzzle();
        state.last_fire = now;

        let bullet = self.next_bullet_id;
        self.next_bullet_id = bullet.next();
        self.bullets.push(Bullet {
            id: bullet,
            position: origin,
            angle,
            sprite: SpriteAnimation::bullet(),
        });
        out_events.push(Event::BulletFired {
            tower,
            bullet,
            origin,
            angle,
        });
    }

    fn move_bullet(&mut self, bullet: BulletId, to: Position, out_events: &mut Vec<Event>) {
        let Some(index) = self.bullets.iter().position(|entry| entry.id == bullet) else {
            return;
        };

        if self.playfield.contains_bullet(to) {
            self.bullets[index].position = to;
        } else {
            let _ = self.bullets.remove(index);
            out_events.push(Event::BulletExpired { bullet });
        }
    }

    fn move_enemy(&mut self, enemy: EnemyId, to: Position, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemies.iter().position(|entry| entry.id == enemy) else {
            return;
        };

        if to.x() + ENEMY_SIZE.width() < 0.0 {
            let _ = self.enemies.remove(index);
            out_events.push(Event::EnemyEscaped { enemy });
        } else {
            self.enemies[index].position = to;
        }
    }

    fn hit_enemy(&mut self, enemy: EnemyId, bullet: BulletId, out_events: &mut Vec<Event>) {
        let Some(enemy_index) = self.enemies.iter().position(|entry| entry.id == enemy) else {
            return;
        };
        let Some(bullet_index) = self.bullets.iter().position(|entry| entry.id == bullet) else {
            return;
        };

        let _ = self.bullets.remove(bullet_index);
        let position = self.enemies[enemy_index].position;
        match self.enemies[enemy_index].health.decrement() {
            Some(health) => {
                let target = &mut self.enemies[enemy_index];
                target.health = health;
                target.sprite.set_sheet(SpriteSheet::for_enemy(health));
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    bullet,
                    health,
                });
            }
            None => {
                let _ = self.enemies.remove(enemy_index);
                out_events.push(Event::EnemyDestroyed { enemy, bullet });
            }
        }

        self.ledger.reward_hit();
        let status = self.ledger.status();
        out_events.push(Event::RewardGranted {
            coins: status.coins,
            score: status.score,
        });
        self.start_explosion(position, out_events);
    }

    fn breach_base(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if self.state == SessionState::GameOver {
            return;
        }

        self.state = SessionState::GameOver;
        info!(enemy = enemy.get(), elapsed = ?self.elapsed, "base breached, game over");
        out_events.push(Event::GameOver { enemy });
    }

    fn purchase_card(
        &mut self,
        track: PurchaseTrack,
        action: CardAction,
        out_events: &mut Vec<Event>,
    ) {
        let charged = if track.offers(action) {
            self.ledger.charge(track)
        } else {
            Err(PurchaseError::ActionNotOffered { track, action })
        };

        match charged {
            Ok(price) => {
                let card = self.deal(action);
                debug!(?track, ?action, price, card = card.get(), "card purchased");
                out_events.push(Event::CardDrawn {
                    card,
                    action,
                    track,
                    price,
                });
            }
            Err(reason) => {
                debug!(?track, %reason, "purchase rejected");
                out_events.push(Event::PurchaseRejected { track, reason });
            }
        }
    }

    fn play_card(&mut self, card: CardId, drop: Position, out_events: &mut Vec<Event>) {
        match self.resolve_card(card, drop, out_events) {
            Ok(action) => {
                debug!(card = card.get(), ?action, x = drop.x(), y = drop.y(), "card played");
                out_events.push(Event::CardPlayed { card, action });
            }
            Err(reason) => {
                debug!(card = card.get(), %reason, "card play rejected");
                out_events.push(Event::CardPlayRejected { card, reason });
            }
        }
    }

    fn resolve_card(
        &mut self,
        card: CardId,
        drop: Position,
        out_events: &mut Vec<Event>,
    ) -> Result<CardAction, CardPlayError> {
        let index = self
            .hand
            .iter()
            .position(|entry| entry.id == card)
            .ok_or(CardPlayError::UnknownCard)?;
        if !self.playfield.contains_drop(drop) {
            return Err(CardPlayError::OutsidePlayfield);
        }

        let action = self.hand[index].action;
        match action {
            CardAction::Tower => {
                let tower = self.towers.place(drop, self.elapsed);
                out_events.push(Event::TowerPlaced {
                    tower,
                    position: drop,
                });
            }
            CardAction::Aim | CardAction::Speed => {
                let target = self
                    .towers
                    .nearest_to(drop)
                    .and_then(|id| self.towers.get_mut(id))
                    .ok_or(CardPlayError::NoTowerToUpgrade)?;
                target.upgrade(action);
                out_events.push(Event::TowerUpgraded {
                    tower: target.id,
                    levels: target.levels,
                });
            }
            CardAction::Erase => {
                let erased = std::mem::take(&mut self.enemies);
                for enemy in &erased {
                    self.start_explosion(enemy.position, out_events);
                }
                out_events.push(Event::EnemiesErased {
                    count: erased.len(),
                });
            }
        }

        let _ = self.hand.remove(index);
        Ok(action)
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.state = SessionState::Running;
        self.elapsed = Duration::ZERO;
        self.towers.clear();
        self.enemies.clear();
        self.bullets.clear();
        self.hand.clear();
        self.ledger = Ledger::new();
        self.deal_opening_hand();
        info!("session reset");
        out_events.push(Event::GameReset);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnEnemy { position, health } => {
            world.spawn_enemy(position, health, out_events);
        }
        Command::FireBullet { tower, angle } => world.fire_bullet(tower, angle, out_events),
        Command::MoveBullet { bullet, to } => world.move_bullet(bullet, to, out_events),
        Command::MoveEnemy { enemy, to } => world.move_enemy(enemy, to, out_events),
        Command::HitEnemy { enemy, bullet } => world.hit_enemy(enemy, bullet, out_events),
        Command::BreachBase { enemy } => world.breach_base(enemy, out_events),
        Command::PurchaseCard { track, action } => {
            world.purchase_card(track, action, out_events);
        }
        Command::PlayCard { card, drop } => world.play_card(card, drop, out_events),
        Command::Reset => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use card_defence_core::{
        BulletSnapshot, BulletView, EconomyStatus, EnemySnapshot, EnemyView, ExplosionSnapshot,
        ExplosionView, HandView, Playfield, PurchaseTrack, SessionSnapshot, TowerView,
    };

    use super::World;

    /// Dimensions of the play surface.
    #[must_use]
    pub fn playfield(world: &World) -> Playfield {
        world.playfield
    }

    /// Session clock and game-over flag.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            elapsed: world.elapsed,
            state: world.state,
        }
    }

    /// Coins, score and rounded prices for display.
    #[must_use]
    pub fn economy(world: &World) -> EconomyStatus {
        world.ledger.status()
    }

    /// Unrounded cost of the next purchase on `track`.
    #[must_use]
    pub fn raw_cost(world: &World, track: PurchaseTrack) -> f64 {
        world.ledger.track(track).raw()
    }

    /// Captures a read-only view of the towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    position: enemy.position,
                    health: enemy.health,
                    sprite: enemy.sprite,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the bullets in flight.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(
            world
                .bullets
                .iter()
                .map(|bullet| BulletSnapshot {
                    id: bullet.id,
                    position: bullet.position,
                    angle: bullet.angle,
                    sprite: bullet.sprite,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the explosions still playing.
    #[must_use]
    pub fn explosion_view(world: &World) -> ExplosionView {
        ExplosionView::from_snapshots(
            world
                .explosions
                .iter()
                .map(|explosion| ExplosionSnapshot {
                    id: explosion.id,
                    position: explosion.position,
                    sprite: explosion.sprite,
                })
                .collect(),
        )
    }

    /// Captures the cards waiting in the hand.
    #[must_use]
    pub fn hand_view(world: &World) -> HandView {
        HandView::from_snapshots(world.hand.clone())
    }
}
