#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Card Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The window shows the play surface on top and a strip underneath holding the
//! card tray on the left and the HUD panel on the right. All UI-specific calls
//! live inside the local `ui` module.

mod cards;
mod layout;
mod sprites;
mod ui;

use self::{
    cards::{CardTray, PlacedCard, Pointer},
    layout::{Layout, ScreenRect, TRAY_HEIGHT},
    sprites::SpriteAtlas,
    ui::{draw_game_over_ui, draw_hud_ui, GameOverUiContext, HudUiContext, HudUiResult},
};
use anyhow::Result;
use card_defence_core::{CardAction, PurchaseTrack, SpriteRect, SpriteSheet};
use card_defence_rendering::{
    CardDrop, Color, FrameInput, HudPresentation, PlayfieldPresentation, Presentation,
    RenderingBackend, Scene, SpriteInstance,
};
use glam::Vec2;
use macroquad::{
    input::{
        is_key_pressed, is_mouse_button_pressed, is_mouse_button_released, mouse_position,
        KeyCode, MouseButton,
    },
    math::Vec2 as MacroquadVec2,
};
use std::{
    collections::VecDeque,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, trace, warn};

const PANEL_BACKGROUND: Color = Color::new(0.12, 0.12, 0.14, 1.0);
const TRAY_BACKGROUND: Color = Color::new(0.18, 0.16, 0.13, 1.0);
const GAME_OVER_SHADE: Color = Color::new(0.0, 0.0, 0.0, 0.6);
const GAME_OVER_DIALOG: Vec2 = Vec2::new(260.0, 130.0);

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct HudInputState {
    purchase_latched: Option<PurchaseTrack>,
    restart_latched: bool,
}

impl HudInputState {
    /// Returns the latched purchase request, clearing it so the action fires once.
    pub fn take_purchase(&mut self) -> Option<PurchaseTrack> {
        self.purchase_latched.take()
    }

    /// Records that a purchase button was pressed this frame.
    pub fn register_purchase(&mut self, track: PurchaseTrack) {
        self.purchase_latched = Some(track);
    }

    /// Returns whether "Play again" was requested and clears the latch.
    pub fn take_restart(&mut self) -> bool {
        let latched = self.restart_latched;
        self.restart_latched = false;
        latched
    }

    /// Records that the "Play again" button was pressed this frame.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }

    fn register(&mut self, result: HudUiResult) {
        if let Some(track) = result.purchase {
            self.register_purchase(track);
        }
        if result.restart {
            self.register_restart();
        }
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `T`, `U` or `P` buy from the matching track.
    purchase: Option<PurchaseTrack>,
    /// `Enter` plays again after a game over.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let purchase = if is_key_pressed(KeyCode::T) {
            Some(PurchaseTrack::Tower)
        } else if is_key_pressed(KeyCode::U) {
            Some(PurchaseTrack::Upgrade)
        } else if is_key_pressed(KeyCode::P) {
            Some(PurchaseTrack::PowerUp)
        } else {
            None
        };
        let restart = is_key_pressed(KeyCode::Enter);

        Self {
            quit_requested,
            purchase,
            restart,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    sprite_manifest: Option<PathBuf>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures the sprite manifest to load; `None` draws placeholder shapes.
    #[must_use]
    pub fn with_sprite_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.sprite_manifest = manifest;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_update: self.update_accum / self.frames,
            avg_render: self.render_accum / self.frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            sprite_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.playfield.width().round() as i32,
            window_height: (scene.playfield.height() + TRAY_HEIGHT).round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = sprite_manifest.and_then(|path| {
                match SpriteAtlas::from_manifest_path(&path) {
                    Ok(atlas) => {
                        info!(manifest = %path.display(), "sprite atlas loaded");
                        Some(atlas)
                    }
                    Err(error) => {
                        warn!(
                            manifest = %path.display(),
                            error = ?error,
                            "sprite atlas unavailable, drawing placeholders"
                        );
                        None
                    }
                }
            });

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut hud_input = HudInputState::default();
            let mut tray = CardTray::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    info!("quit requested");
                    break;
                }

                macroquad::window::clear_background(background);
                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let layout_before = Layout::fit(&scene.playfield, screen);
                let (cursor_x, cursor_y) = mouse_position();
                let pointer = Pointer {
                    position: Vec2::new(cursor_x, cursor_y),
                    pressed: is_mouse_button_pressed(MouseButton::Left),
                    released: is_mouse_button_released(MouseButton::Left),
                };
                let card_drop =
                    tray.update(&scene.hand, &scene.playfield, &layout_before, pointer);
                let frame_input = gather_frame_input(&mut hud_input, keyboard, card_drop);
                if !frame_input.is_idle() {
                    trace!(?frame_input, "player input");
                }

                let update_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                let layout = Layout::fit(&scene.playfield, screen);
                draw_terrain(&scene.playfield, &layout, sprite_atlas.as_ref());
                draw_sprites(&scene.sprites, &layout, sprite_atlas.as_ref());
                draw_letterbox(&layout, screen, background);
                fill_rect(layout.tray, TRAY_BACKGROUND);
                fill_rect(layout.panel, PANEL_BACKGROUND);
                let placements = tray.placements(&scene.hand, &layout);
                draw_cards(&placements, pointer.position);

                {
                    let mut root_ui = macroquad::ui::root_ui();
                    label_cards(&mut root_ui, &placements);
                    let hud_result = draw_hud_ui(
                        &mut root_ui,
                        HudUiContext {
                            origin: to_macroquad_vec(layout.panel.origin),
                            size: to_macroquad_vec(layout.panel.size),
                            background: to_macroquad_color(PANEL_BACKGROUND),
                            hud: &scene.hud,
                        },
                    );
                    hud_input.register(hud_result);

                    if scene.hud.game_over {
                        let restart = draw_game_over(&mut root_ui, &scene.hud, &layout);
                        hud_input.register(restart);
                    }
                }
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_update,
                        avg_render,
                    }) = fps_metrics
                    {
                        info!(
                            fps = f64::from(per_second),
                            fps_10s = f64::from(trailing_ten_seconds),
                            update_ms = avg_update.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(
    hud_input: &mut HudInputState,
    keyboard: KeyboardShortcuts,
    card_drop: Option<CardDrop>,
) -> FrameInput {
    let purchase = hud_input.take_purchase().or(keyboard.purchase);
    let restart = hud_input.take_restart() || keyboard.restart;
    FrameInput {
        purchase,
        restart,
        card_drop,
    }
}

fn draw_terrain(
    playfield: &PlayfieldPresentation,
    layout: &Layout,
    sprite_atlas: Option<&SpriteAtlas>,
) {
    let tile = sprite_atlas.and_then(|atlas| {
        let size = atlas.dimensions(playfield.terrain)?;
        (size.x > f32::EPSILON && size.y > f32::EPSILON).then_some((atlas, size))
    });
    let Some((atlas, tile_size)) = tile else {
        fill_rect(layout.surface, playfield.fallback);
        return;
    };

    let columns = (playfield.width() / tile_size.x).ceil() as u32;
    let rows = (playfield.height() / tile_size.y).ceil() as u32;
    let source = SpriteRect {
        x: 0.0,
        y: 0.0,
        width: tile_size.x,
        height: tile_size.y,
    };
    for row in 0..rows {
        for column in 0..columns {
            let origin = Vec2::new(column as f32 * tile_size.x, row as f32 * tile_size.y);
            let drawn = atlas.draw(
                playfield.terrain,
                source,
                layout.to_screen(origin),
                tile_size * layout.scale,
                macroquad::color::WHITE,
            );
            if drawn.is_err() {
                fill_rect(layout.surface, playfield.fallback);
                return;
            }
        }
    }
}

fn draw_sprites(sprites: &[SpriteInstance], layout: &Layout, sprite_atlas: Option<&SpriteAtlas>) {
    for sprite in sprites {
        let position = layout.to_screen(sprite.position);
        let size = sprite.size * layout.scale;
        let drawn = match sprite_atlas {
            Some(atlas) => atlas
                .draw(
                    sprite.sheet,
                    sprite.source,
                    position,
                    size,
                    macroquad::color::WHITE,
                )
                .is_ok(),
            None => false,
        };
        if !drawn {
            fill_rect(
                ScreenRect::new(position, size),
                placeholder_color(sprite.sheet),
            );
        }
    }
}

/// Colour used for a sheet when no texture is available.
fn placeholder_color(sheet: SpriteSheet) -> Color {
    match sheet {
        SpriteSheet::Tower(variant) => {
            Color::from_rgb_u8(60, 90, 170).lighten(f32::from(variant.saturating_sub(1)) * 0.12)
        }
        SpriteSheet::Biker(variant) => {
            Color::from_rgb_u8(190, 50, 40).lighten(f32::from(3_u8.saturating_sub(variant)) * 0.2)
        }
        SpriteSheet::Bullet => Color::from_rgb_u8(240, 220, 80),
        SpriteSheet::Effects => Color::from_rgb_u8(250, 140, 40).with_alpha(0.7),
        SpriteSheet::Terrain => Color::from_rgb_u8(96, 128, 64),
    }
}

fn card_color(action: CardAction) -> Color {
    match action {
        CardAction::Tower => Color::from_rgb_u8(70, 110, 170),
        CardAction::Aim => Color::from_rgb_u8(170, 120, 60),
        CardAction::Speed => Color::from_rgb_u8(90, 150, 90),
        CardAction::Erase => Color::from_rgb_u8(150, 60, 60),
    }
}

fn draw_letterbox(layout: &Layout, screen: Vec2, background: macroquad::color::Color) {
    let surface = layout.surface;
    let right = surface.origin.x + surface.size.x;
    macroquad::shapes::draw_rectangle(0.0, 0.0, surface.origin.x, screen.y, background);
    macroquad::shapes::draw_rectangle(right, 0.0, screen.x - right, screen.y, background);
    macroquad::shapes::draw_rectangle(0.0, 0.0, screen.x, surface.origin.y, background);
}

fn draw_cards(placements: &[PlacedCard], cursor: Vec2) {
    let (resting, held): (Vec<&PlacedCard>, Vec<&PlacedCard>) =
        placements.iter().partition(|placed| !placed.dragging);
    for placed in resting.into_iter().chain(held) {
        let mut color = card_color(placed.card.action);
        if placed.dragging || placed.rect.contains(cursor) {
            color = color.lighten(0.25);
        }
        fill_rect(placed.rect, color);
        macroquad::shapes::draw_rectangle_lines(
            placed.rect.origin.x,
            placed.rect.origin.y,
            placed.rect.size.x,
            placed.rect.size.y,
            2.0,
            macroquad::color::WHITE,
        );
    }
}

fn label_cards(ui: &mut macroquad::ui::Ui, placements: &[PlacedCard]) {
    for placed in placements {
        let anchor = placed.rect.origin + Vec2::new(8.0, 8.0);
        ui.label(Some(to_macroquad_vec(anchor)), placed.card.label());
    }
}

fn draw_game_over(
    ui: &mut macroquad::ui::Ui,
    hud: &HudPresentation,
    layout: &Layout,
) -> HudUiResult {
    fill_rect(layout.surface, GAME_OVER_SHADE);
    let center = layout.surface.center();
    draw_game_over_ui(
        ui,
        GameOverUiContext {
            origin: to_macroquad_vec(center - GAME_OVER_DIALOG * 0.5),
            size: to_macroquad_vec(GAME_OVER_DIALOG),
            background: to_macroquad_color(PANEL_BACKGROUND),
            score: hud.score,
        },
    )
}

fn fill_rect(rect: ScreenRect, color: Color) {
    macroquad::shapes::draw_rectangle(
        rect.origin.x,
        rect.origin.y,
        rect.size.x,
        rect.size.y,
        to_macroquad_color(color),
    );
}

fn to_macroquad_vec(vector: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(vector.x, vector.y)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
