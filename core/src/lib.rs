#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Card Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what changed. Systems read immutable views captured from the
//! world and respond exclusively with new command batches.

mod geometry;
mod sprite;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{BoundingBox, Playfield, Position, Size};
pub use sprite::{SpriteAnimation, SpriteRect, SpriteSheet, MAX_BIKER_VARIANT, MAX_TOWER_VARIANT};

/// Distance a bullet travels per second, in pixels.
pub const BULLET_SPEED: f32 = 350.0;

/// Base distance an enemy travels per second before the health multiplier.
pub const ENEMY_SPEED: f32 = 50.0;

/// Cooldown between shots of a tower with speed level 1.
pub const TOWER_FIRE_INTERVAL: Duration = Duration::from_millis(300);

/// Frame size of a tower sprite.
pub const TOWER_SIZE: Size = Size::new(38.0, 35.0);

/// Frame size of an enemy sprite, also used as its hitbox.
pub const ENEMY_SIZE: Size = Size::new(50.0, 50.0);

/// Frame size of a bullet sprite, also used as its hitbox.
pub const BULLET_SIZE: Size = Size::new(24.0, 24.0);

/// Frame size of an explosion sprite.
pub const EXPLOSION_SIZE: Size = Size::new(39.0, 39.0);

/// Exponent applied to a cost track after every purchase.
pub const COST_GROWTH_EXPONENT: f64 = 1.1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock and every animation by the provided delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Introduces a new enemy at the provided position.
    SpawnEnemy {
        /// Top-left corner of the enemy sprite.
        position: Position,
        /// Hit points assigned to the enemy.
        health: Health,
    },
    /// Requests that a tower fire a bullet along the provided heading.
    FireBullet {
        /// Tower releasing the bullet.
        tower: TowerId,
        /// Heading in radians; zero points toward increasing `y`.
        angle: f32,
    },
    /// Moves a bullet to a new position.
    MoveBullet {
        /// Bullet being moved.
        bullet: BulletId,
        /// Destination of the bullet.
        to: Position,
    },
    /// Moves an enemy to a new position.
    MoveEnemy {
        /// Enemy being moved.
        enemy: EnemyId,
        /// Destination of the enemy.
        to: Position,
    },
    /// Resolves a bullet striking an enemy.
    HitEnemy {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Bullet consumed by the hit.
        bullet: BulletId,
    },
    /// Reports that an enemy reached the base.
    BreachBase {
        /// Enemy overlapping the base hitbox.
        enemy: EnemyId,
    },
    /// Buys a card from one of the purchase tracks.
    PurchaseCard {
        /// Track being charged.
        track: PurchaseTrack,
        /// Action printed on the card, resolved when the card is dealt.
        action: CardAction,
    },
    /// Plays a card from the hand at the provided drop point.
    PlayCard {
        /// Card being played.
        card: CardId,
        /// Point on the play surface where the card was released.
        drop: Position,
    },
    /// Restores the opening state after a game over.
    Reset,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the play surface.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Top-left corner of the enemy.
        position: Position,
        /// Hit points of the enemy.
        health: Health,
    },
    /// Confirms that an enemy lost a hit point and survived.
    EnemyDamaged {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Bullet consumed by the hit.
        bullet: BulletId,
        /// Health remaining after the hit.
        health: Health,
    },
    /// Confirms that an enemy lost its last hit point.
    EnemyDestroyed {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Bullet consumed by the hit.
        bullet: BulletId,
    },
    /// Reports that an enemy left the surface through the left edge.
    EnemyEscaped {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// Confirms that a tower released a bullet.
    BulletFired {
        /// Tower that fired.
        tower: TowerId,
        /// Identifier assigned to the bullet.
        bullet: BulletId,
        /// Starting point of the bullet.
        origin: Position,
        /// Heading of the bullet in radians.
        angle: f32,
    },
    /// Reports that a bullet left the play surface.
    BulletExpired {
        /// Bullet that was removed.
        bullet: BulletId,
    },
    /// Confirms that an explosion started playing.
    ExplosionStarted {
        /// Identifier assigned to the explosion.
        explosion: ExplosionId,
        /// Top-left corner of the explosion.
        position: Position,
    },
    /// Reports that an explosion animation completed and was removed.
    ExplosionFinished {
        /// Explosion that was removed.
        explosion: ExplosionId,
    },
    /// Reports the balances after a hit paid out.
    RewardGranted {
        /// Coin balance after the reward.
        coins: u32,
        /// Score after the reward.
        score: u32,
    },
    /// Confirms that a purchased card joined the hand.
    CardDrawn {
        /// Identifier assigned to the card.
        card: CardId,
        /// Action printed on the card.
        action: CardAction,
        /// Track that was charged.
        track: PurchaseTrack,
        /// Coins deducted for the card.
        price: u32,
    },
    /// Reports that a purchase was refused.
    PurchaseRejected {
        /// Track the player tried to buy from.
        track: PurchaseTrack,
        /// Reason the purchase failed.
        reason: PurchaseError,
    },
    /// Confirms that a card was played and removed from the hand.
    CardPlayed {
        /// Card that was played.
        card: CardId,
        /// Action the card carried.
        action: CardAction,
    },
    /// Reports that a card could not be played and stays in the hand.
    CardPlayRejected {
        /// Card the player tried to play.
        card: CardId,
        /// Reason the play failed.
        reason: CardPlayError,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Top-left corner of the tower.
        position: Position,
    },
    /// Confirms that a tower received an upgrade.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Levels after the upgrade.
        levels: TowerLevels,
    },
    /// Confirms that every enemy was wiped from the surface.
    EnemiesErased {
        /// Number of enemies removed.
        count: usize,
    },
    /// Announces that an enemy reached the base and the session ended.
    GameOver {
        /// Enemy that breached the base.
        enemy: EnemyId,
    },
    /// Confirms that the session returned to its opening state.
    GameReset,
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }

            /// Returns the identifier that follows this one.
            #[must_use]
            pub const fn next(&self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }
    };
}

identifier! {
    /// Unique identifier assigned to a tower.
    TowerId
}

identifier! {
    /// Unique identifier assigned to an enemy.
    EnemyId
}

identifier! {
    /// Unique identifier assigned to a bullet.
    BulletId
}

identifier! {
    /// Unique identifier assigned to an explosion.
    ExplosionId
}

identifier! {
    /// Unique identifier assigned to a card in the hand.
    CardId
}

/// Hit points of an enemy; an enemy present in the world always has at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a health value, raising zero to the minimum of one.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self(1)
        } else {
            Self(value)
        }
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Removes one hit point, returning `None` when the enemy is destroyed.
    #[must_use]
    pub const fn decrement(self) -> Option<Self> {
        if self.0 <= 1 {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    /// Sprite variant used to draw an enemy with this health.
    #[must_use]
    pub fn biker_variant(self) -> u8 {
        u8::try_from(self.0.min(u32::from(MAX_BIKER_VARIANT))).unwrap_or(MAX_BIKER_VARIANT)
    }
}

/// Upgrade levels of a tower.
///
/// Both levels start at 1. A level that was never upgraded contributes
/// nothing to the sprite variant, so a fresh tower keeps the first artwork.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TowerLevels {
    aim_upgrades: u32,
    speed_upgrades: u32,
}

impl TowerLevels {
    /// Creates levels from the number of upgrades applied to each stat.
    #[must_use]
    pub const fn from_upgrades(aim_upgrades: u32, speed_upgrades: u32) -> Self {
        Self {
            aim_upgrades,
            speed_upgrades,
        }
    }

    /// Aim level; each level adds ten percent chance to home on a target.
    #[must_use]
    pub const fn aim(&self) -> u32 {
        self.aim_upgrades.saturating_add(1)
    }

    /// Speed level; the fire cooldown is divided by this value.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed_upgrades.saturating_add(1)
    }

    /// Returns the levels after applying the upgrade carried by `action`.
    ///
    /// Actions other than [`CardAction::Aim`] and [`CardAction::Speed`] leave
    /// the levels untouched.
    #[must_use]
    pub const fn upgraded(self, action: CardAction) -> Self {
        match action {
            CardAction::Aim => Self {
                aim_upgrades: self.aim_upgrades.saturating_add(1),
                ..self
            },
            CardAction::Speed => Self {
                speed_upgrades: self.speed_upgrades.saturating_add(1),
                ..self
            },
            CardAction::Tower | CardAction::Erase => self,
        }
    }

    /// Sprite variant used to draw a tower with these levels.
    #[must_use]
    pub fn sprite_variant(self) -> u8 {
        let visible = |upgrades: u32, level: u32| if upgrades == 0 { 0 } else { level };
        let total = visible(self.aim_upgrades, self.aim())
            .saturating_add(visible(self.speed_upgrades, self.speed()));
        let capped = total.clamp(1, u32::from(MAX_TOWER_VARIANT));
        u8::try_from(capped).unwrap_or(MAX_TOWER_VARIANT)
    }
}

/// Placeable action printed on a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardAction {
    /// Places a new tower at the drop point.
    Tower,
    /// Raises the aim level of the tower nearest the drop point.
    Aim,
    /// Raises the speed level of the tower nearest the drop point.
    Speed,
    /// Destroys every enemy on the surface without paying out.
    Erase,
}

impl CardAction {
    /// Caption printed on the card.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tower => "Tower",
            Self::Aim => "Aim",
            Self::Speed => "Speed",
            Self::Erase => "Erase",
        }
    }
}

/// Independent price tracks the player can buy from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseTrack {
    /// Deals [`CardAction::Tower`] cards.
    Tower,
    /// Deals [`CardAction::Aim`] or [`CardAction::Speed`] cards.
    Upgrade,
    /// Deals [`CardAction::Erase`] cards.
    PowerUp,
}

impl PurchaseTrack {
    /// Every track in display order.
    pub const ALL: [PurchaseTrack; 3] = [Self::Tower, Self::Upgrade, Self::PowerUp];

    /// Raw cost of the first purchase.
    #[must_use]
    pub const fn initial_cost(self) -> f64 {
        match self {
            Self::Tower => 1.0,
            Self::Upgrade => 4.0,
            Self::PowerUp => 10.0,
        }
    }

    /// Amount added to the raw cost before the growth exponent is applied.
    #[must_use]
    pub const fn increment(self) -> f64 {
        match self {
            Self::Tower | Self::Upgrade => 3.0,
            Self::PowerUp => 4.0,
        }
    }

    /// Raw cost following a purchase made at `cost`.
    #[must_use]
    pub fn next_cost(self, cost: f64) -> f64 {
        (cost + self.increment()).powf(COST_GROWTH_EXPONENT)
    }

    /// Reports whether the track deals cards carrying `action`.
    #[must_use]
    pub const fn offers(self, action: CardAction) -> bool {
        matches!(
            (self, action),
            (Self::Tower, CardAction::Tower)
                | (Self::Upgrade, CardAction::Aim | CardAction::Speed)
                | (Self::PowerUp, CardAction::Erase)
        )
    }

    /// Short prefix shown on the purchase button.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tower => "T",
            Self::Upgrade => "U",
            Self::PowerUp => "P",
        }
    }
}

/// Reasons a purchase request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PurchaseError {
    /// The balance does not cover the rounded cost.
    #[error("purchase requires {price} coins but only {balance} are available")]
    InsufficientCoins {
        /// Rounded cost of the purchase.
        price: u32,
        /// Coins available at the time of the request.
        balance: u32,
    },
    /// The requested action is not dealt by the track.
    #[error("{action:?} cards are not sold on the {track:?} track")]
    ActionNotOffered {
        /// Track the player tried to buy from.
        track: PurchaseTrack,
        /// Action that was requested.
        action: CardAction,
    },
}

/// Reasons a card may fail to play; the card stays in the hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum CardPlayError {
    /// No card with the provided identifier is in the hand.
    #[error("card is not in the hand")]
    UnknownCard,
    /// The card was released outside the play surface.
    #[error("card was dropped outside the play surface")]
    OutsidePlayfield,
    /// An upgrade was played while no tower stands on the surface.
    #[error("no tower is available to upgrade")]
    NoTowerToUpgrade,
}

/// Whether the session is still being played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Enemies are advancing and towers are firing.
    #[default]
    Running,
    /// An enemy reached the base; only a reset leaves this state.
    GameOver,
}

/// Clock and state of the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Simulated time elapsed since the session started.
    pub elapsed: Duration,
    /// Whether the session is still running.
    pub state: SessionState,
}

impl SessionSnapshot {
    /// Reports whether the session ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }
}

/// Read-only economy values exposed to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EconomyStatus {
    /// Coins available for purchases.
    pub coins: u32,
    /// Enemy hits scored during the session.
    pub score: u32,
    /// Rounded price of a tower card.
    pub tower_price: u32,
    /// Rounded price of an upgrade card.
    pub upgrade_price: u32,
    /// Rounded price of a power-up card.
    pub power_up_price: u32,
}

impl EconomyStatus {
    /// Rounded price of the next purchase on `track`.
    #[must_use]
    pub const fn price(&self, track: PurchaseTrack) -> u32 {
        match track {
            PurchaseTrack::Tower => self.tower_price,
            PurchaseTrack::Upgrade => self.upgrade_price,
            PurchaseTrack::PowerUp => self.power_up_price,
        }
    }

    /// Reports whether the balance covers the next purchase on `track`.
    #[must_use]
    pub const fn can_afford(&self, track: PurchaseTrack) -> bool {
        self.coins >= self.price(track)
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Top-left corner of the tower.
    pub position: Position,
    /// Aim and speed levels.
    pub levels: TowerLevels,
    /// Session time of the most recent shot or of the placement.
    pub last_fire: Duration,
    /// Animation state of the tower.
    pub sprite: SpriteAnimation,
}

impl TowerSnapshot {
    /// Point bullets are released from.
    #[must_use]
    pub fn muzzle(&self) -> Position {
        let (dx, dy) = self.sprite.frame_size().half();
        self.position.offset(dx, dy)
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Top-left corner of the enemy.
    pub position: Position,
    /// Remaining hit points.
    pub health: Health,
    /// Animation state of the enemy.
    pub sprite: SpriteAnimation,
}

impl EnemySnapshot {
    /// Hitbox covering the enemy sprite.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_origin_and_size(self.position, ENEMY_SIZE)
    }
}

/// Immutable representation of a single bullet used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier allocated to the bullet by the world.
    pub id: BulletId,
    /// Top-left corner of the bullet.
    pub position: Position,
    /// Heading in radians.
    pub angle: f32,
    /// Sprite of the bullet.
    pub sprite: SpriteAnimation,
}

impl BulletSnapshot {
    /// Hitbox covering the bullet sprite.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_origin_and_size(self.position, BULLET_SIZE)
    }
}

/// Immutable representation of a single explosion used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionSnapshot {
    /// Identifier allocated to the explosion by the world.
    pub id: ExplosionId,
    /// Top-left corner of the explosion.
    pub position: Position,
    /// Animation state of the explosion.
    pub sprite: SpriteAnimation,
}

/// Card waiting in the hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Identifier allocated to the card by the world.
    pub id: CardId,
    /// Action the card performs when played.
    pub action: CardAction,
}

macro_rules! snapshot_view {
    ($(#[$meta:meta])* $view:ident, $snapshot:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $view {
            snapshots: Vec<$snapshot>,
        }

        impl $view {
            /// Creates a new view from the provided snapshots.
            #[must_use]
            pub fn from_snapshots(mut snapshots: Vec<$snapshot>) -> Self {
                snapshots.sort_by_key(|snapshot| snapshot.id);
                Self { snapshots }
            }

            /// Iterator over the captured snapshots in identifier order.
            pub fn iter(&self) -> impl Iterator<Item = &$snapshot> {
                self.snapshots.iter()
            }

            /// Number of captured snapshots.
            #[must_use]
            pub fn len(&self) -> usize {
                self.snapshots.len()
            }

            /// Reports whether the view holds no snapshots.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.snapshots.is_empty()
            }

            /// Consumes the view, yielding the underlying snapshots.
            #[must_use]
            pub fn into_vec(self) -> Vec<$snapshot> {
                self.snapshots
            }
        }
    };
}

snapshot_view! {
    /// Read-only snapshot describing all towers, in placement order.
    TowerView, TowerSnapshot
}

snapshot_view! {
    /// Read-only snapshot describing all enemies, in spawn order.
    EnemyView, EnemySnapshot
}

snapshot_view! {
    /// Read-only snapshot describing all bullets, in firing order.
    BulletView, BulletSnapshot
}

snapshot_view! {
    /// Read-only snapshot describing all explosions, in start order.
    ExplosionView, ExplosionSnapshot
}

snapshot_view! {
    /// Read-only snapshot of the cards waiting in the hand, in deal order.
    HandView, CardSnapshot
}

/// Aim solution computed for a tower against the current priority target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower the solution belongs to.
    pub tower: TowerId,
    /// Enemy being aimed at.
    pub enemy: EnemyId,
    /// Heading in radians that points the bullet at the enemy.
    pub angle: f32,
}
