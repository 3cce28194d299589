//! Sprite sheets and the animation clock that drives frame selection.
//!
//! The clock is pure data: adapters read [`SpriteAnimation::source_rect`] to
//! blit the current frame and never advance it themselves.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Health, Position, Size, TowerLevels};

const TOWER_FRAMES: [u16; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
const ENEMY_FRAMES: [u16; 2] = [0, 1];
const EXPLOSION_FRAMES: [u16; 13] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

const TOWER_ANIMATION_SPEED: f32 = 8.0;
const ENEMY_ANIMATION_SPEED: f32 = 5.0;
const EXPLOSION_ANIMATION_SPEED: f32 = 16.0;

/// Highest tower sheet variant shipped with the game.
pub const MAX_TOWER_VARIANT: u8 = 5;

/// Highest enemy sheet variant shipped with the game.
pub const MAX_BIKER_VARIANT: u8 = 3;

/// Image assets that sprites are cut from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpriteSheet {
    /// Tower strip; the variant grows with accumulated upgrades.
    Tower(u8),
    /// Enemy strip; the variant mirrors remaining health.
    Biker(u8),
    /// Single-frame bullet.
    Bullet,
    /// Shared effects sheet hosting the explosion strip.
    Effects,
    /// Repeating ground texture.
    Terrain,
}

impl SpriteSheet {
    /// Every sheet the game may reference.
    pub const ALL: [SpriteSheet; 11] = [
        SpriteSheet::Tower(1),
        SpriteSheet::Tower(2),
        SpriteSheet::Tower(3),
        SpriteSheet::Tower(4),
        SpriteSheet::Tower(5),
        SpriteSheet::Biker(1),
        SpriteSheet::Biker(2),
        SpriteSheet::Biker(3),
        SpriteSheet::Bullet,
        SpriteSheet::Effects,
        SpriteSheet::Terrain,
    ];

    /// Tower sheet for the provided upgrade levels.
    #[must_use]
    pub fn for_tower(levels: TowerLevels) -> Self {
        Self::Tower(levels.sprite_variant())
    }

    /// Enemy sheet for the provided health.
    #[must_use]
    pub fn for_enemy(health: Health) -> Self {
        Self::Biker(health.biker_variant())
    }

    /// Manifest key identifying the sheet, e.g. `tower3` or `bullet`.
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::Tower(variant) => format!("tower{}", variant.clamp(1, MAX_TOWER_VARIANT)),
            Self::Biker(variant) => format!("biker{}", variant.clamp(1, MAX_BIKER_VARIANT)),
            Self::Bullet => "bullet".to_string(),
            Self::Effects => "sprites".to_string(),
            Self::Terrain => "terrain".to_string(),
        }
    }

    /// Resolves a manifest key back to the sheet it names.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sheet| sheet.key() == key)
    }

    /// Relative asset path of the sheet, e.g. `img/biker2.png`.
    #[must_use]
    pub fn asset_path(self) -> String {
        format!("img/{}.png", self.key())
    }
}

/// Source rectangle of a frame inside its sheet, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteRect {
    /// Left edge inside the sheet.
    pub x: f32,
    /// Top edge inside the sheet.
    pub y: f32,
    /// Frame width.
    pub width: f32,
    /// Frame height.
    pub height: f32,
}

/// Animation clock for a strip of frames cut from a [`SpriteSheet`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteAnimation {
    sheet: SpriteSheet,
    frame_offset: Position,
    frame_size: Size,
    speed: f32,
    frames: &'static [u16],
    once: bool,
    clock: f32,
    done: bool,
}

impl SpriteAnimation {
    /// Creates a still sprite showing the frame at `frame_offset`.
    #[must_use]
    pub const fn new(sheet: SpriteSheet, frame_offset: Position, frame_size: Size) -> Self {
        Self {
            sheet,
            frame_offset,
            frame_size,
            speed: 0.0,
            frames: &[],
            once: false,
            clock: 0.0,
            done: false,
        }
    }

    /// Plays `frames` at `speed` frames per second.
    #[must_use]
    pub fn with_frames(mut self, speed: f32, frames: &'static [u16]) -> Self {
        self.speed = speed;
        self.frames = frames;
        self
    }

    /// Plays the sequence a single time and then reports completion.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Idle animation of a tower.
    #[must_use]
    pub fn tower(levels: TowerLevels) -> Self {
        Self::new(
            SpriteSheet::for_tower(levels),
            Position::new(0.0, 0.0),
            crate::TOWER_SIZE,
        )
        .with_frames(TOWER_ANIMATION_SPEED, &TOWER_FRAMES)
    }

    /// Riding animation of an enemy.
    #[must_use]
    pub fn enemy(health: Health) -> Self {
        Self::new(
            SpriteSheet::for_enemy(health),
            Position::new(0.0, 0.0),
            crate::ENEMY_SIZE,
        )
        .with_frames(ENEMY_ANIMATION_SPEED, &ENEMY_FRAMES)
    }

    /// Bullet sprite.
    #[must_use]
    pub fn bullet() -> Self {
        Self::new(
            SpriteSheet::Bullet,
            Position::new(0.0, 0.0),
            crate::BULLET_SIZE,
        )
    }

    /// One-shot explosion cut from the effects sheet.
    #[must_use]
    pub fn explosion() -> Self {
        Self::new(
            SpriteSheet::Effects,
            Position::new(0.0, 117.0),
            crate::EXPLOSION_SIZE,
        )
        .with_frames(EXPLOSION_ANIMATION_SPEED, &EXPLOSION_FRAMES)
        .once()
    }

    /// Advances the animation clock.
    pub fn update(&mut self, dt: Duration) {
        if self.done {
            return;
        }

        self.clock += self.speed * dt.as_secs_f32();
        if self.once && self.is_animated() && self.frame_index() >= self.frames.len() {
            self.done = true;
        }
    }

    /// Reports whether a one-shot animation has played through.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Sheet the frames are cut from.
    #[must_use]
    pub const fn sheet(&self) -> SpriteSheet {
        self.sheet
    }

    /// Swaps the sheet without disturbing the clock.
    pub fn set_sheet(&mut self, sheet: SpriteSheet) {
        self.sheet = sheet;
    }

    /// Size of a single frame.
    #[must_use]
    pub const fn frame_size(&self) -> Size {
        self.frame_size
    }

    /// Frame currently on display, or `None` once a one-shot animation ends.
    #[must_use]
    pub fn current_frame(&self) -> Option<u16> {
        if self.done {
            return None;
        }

        if !self.is_animated() {
            return Some(0);
        }

        Some(self.frames[self.frame_index() % self.frames.len()])
    }

    /// Rectangle of the current frame inside the sheet.
    ///
    /// Frames are laid out left to right starting at the frame offset.
    #[must_use]
    pub fn source_rect(&self) -> Option<SpriteRect> {
        let frame = f32::from(self.current_frame()?);
        Some(SpriteRect {
            x: self.frame_offset.x() + frame * self.frame_size.width(),
            y: self.frame_offset.y(),
            width: self.frame_size.width(),
            height: self.frame_size.height(),
        })
    }

    fn is_animated(&self) -> bool {
        self.speed > 0.0 && !self.frames.is_empty()
    }

    fn frame_index(&self) -> usize {
        self.clock.max(0.0).floor() as usize
    }
}
