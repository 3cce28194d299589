#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Card Defence adapters.

use anyhow::Result as AnyResult;
use card_defence_core::{
    CardAction, CardId, Position, PurchaseTrack, SpriteAnimation, SpriteRect, SpriteSheet,
};
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Card released over the play surface during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardDrop {
    /// Card that was dragged.
    pub card: CardId,
    /// Release point in play surface pixels.
    pub point: Vec2,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Purchase button pressed on this frame, if any.
    pub purchase: Option<PurchaseTrack>,
    /// Whether the "play again" affordance was activated on this frame.
    pub restart: bool,
    /// Card released over the play surface on this frame, if any.
    pub card_drop: Option<CardDrop>,
}

impl FrameInput {
    /// Reports whether the frame carries no player intent.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.purchase.is_none() && !self.restart && self.card_drop.is_none()
    }
}

/// Single frame cut from a sprite sheet and placed on the play surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInstance {
    /// Sheet the frame is cut from.
    pub sheet: SpriteSheet,
    /// Frame rectangle inside the sheet.
    pub source: SpriteRect,
    /// Top-left corner on the play surface.
    pub position: Vec2,
    /// Size drawn on screen.
    pub size: Vec2,
}

impl SpriteInstance {
    /// Captures the current frame of `animation` drawn at `position`.
    ///
    /// Returns `None` once a one-shot animation has finished.
    #[must_use]
    pub fn from_animation(animation: &SpriteAnimation, position: Position) -> Option<Self> {
        let source = animation.source_rect()?;
        Some(Self {
            sheet: animation.sheet(),
            source,
            position: Vec2::new(position.x(), position.y()),
            size: Vec2::new(source.width, source.height),
        })
    }
}

/// Price shown on a purchase button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceTag {
    /// Track the button purchases from.
    pub track: PurchaseTrack,
    /// Rounded price charged on purchase.
    pub price: u32,
    /// Whether the button accepts presses.
    pub enabled: bool,
}

impl PriceTag {
    /// Builds a tag from the unrounded track cost and the current balance.
    ///
    /// The button is disabled while the unrounded cost exceeds the balance.
    #[must_use]
    pub fn new(track: PurchaseTrack, raw_cost: f64, coins: u32) -> Self {
        Self {
            track,
            price: raw_cost.round().max(0.0) as u32,
            enabled: raw_cost <= f64::from(coins),
        }
    }

    /// Button caption such as `T -4`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} -{}", self.track.label(), self.price)
    }
}

/// Heads-up display values shown next to the play surface.
#[derive(Clone, Debug, PartialEq)]
pub struct HudPresentation {
    /// Coins available to spend.
    pub coins: u32,
    /// Points accumulated this session.
    pub score: u32,
    /// Purchase buttons in display order.
    pub prices: Vec<PriceTag>,
    /// Whether the game-over overlay is shown.
    pub game_over: bool,
}

impl Default for HudPresentation {
    fn default() -> Self {
        Self {
            coins: 0,
            score: 0,
            prices: PurchaseTrack::ALL
                .into_iter()
                .map(|track| PriceTag::new(track, track.initial_cost(), 0))
                .collect(),
            game_over: false,
        }
    }
}

impl HudPresentation {
    /// Coin counter caption.
    #[must_use]
    pub fn coins_label(&self) -> String {
        format!("Coins: {}", self.coins)
    }

    /// Score counter caption.
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("Score: {}", self.score)
    }
}

/// Card waiting in the player's hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardPresentation {
    /// Identifier sent back when the card is dropped.
    pub card: CardId,
    /// Effect printed on the card.
    pub action: CardAction,
}

impl CardPresentation {
    /// Creates a new card descriptor.
    #[must_use]
    pub const fn new(card: CardId, action: CardAction) -> Self {
        Self { card, action }
    }

    /// Caption printed on the card.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.action.label()
    }
}

/// Play surface dimensions and ground texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayfieldPresentation {
    width: f32,
    height: f32,
    /// Sheet tiled across the surface.
    pub terrain: SpriteSheet,
    /// Color used when the terrain sheet is unavailable.
    pub fallback: Color,
}

impl PlayfieldPresentation {
    /// Creates a play surface descriptor, rejecting empty or non-finite sizes.
    pub fn new(
        width: f32,
        height: f32,
        terrain: SpriteSheet,
        fallback: Color,
    ) -> Result<Self, RenderingError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RenderingError::InvalidPlayfield { width, height });
        }

        Ok(Self {
            width,
            height,
            terrain,
            fallback,
        })
    }

    /// Surface width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether `point` lies on the surface, far edges excluded.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height
    }
}

/// Scene description combining the play surface, sprites, HUD and hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Play surface drawn beneath every sprite.
    pub playfield: PlayfieldPresentation,
    /// Sprites in draw order.
    pub sprites: Vec<SpriteInstance>,
    /// Economy and session values.
    pub hud: HudPresentation,
    /// Cards available for dragging.
    pub hand: Vec<CardPresentation>,
}

impl Scene {
    /// Creates a new scene descriptor with an empty surface and default HUD.
    #[must_use]
    pub fn new(playfield: PlayfieldPresentation) -> Self {
        Self {
            playfield,
            sprites: Vec::new(),
            hud: HudPresentation::default(),
            hand: Vec::new(),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Card Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, the input
    /// captured by the adapter, and may mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors or assets.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Surface dimensions must be positive and finite.
    #[error("play surface must have a positive size (received {width}x{height})")]
    InvalidPlayfield {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
    /// The sprite manifest uses a format revision this build cannot read.
    #[error("unsupported sprite manifest version {found}; expected {expected}")]
    UnsupportedManifestVersion {
        /// Version declared by the manifest.
        found: u32,
        /// Version understood by the adapter.
        expected: u32,
    },
    /// The sprite manifest names a sheet that does not exist.
    #[error("unknown sprite key `{key}` in manifest")]
    UnknownSpriteKey {
        /// Offending key.
        key: String,
    },
    /// The sprite manifest lacks an entry for a required sheet.
    #[error("sprite manifest missing entry for `{key}`")]
    MissingSprite {
        /// Key of the missing sheet.
        key: String,
    },
}
