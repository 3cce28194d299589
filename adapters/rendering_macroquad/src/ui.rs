//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use card_defence_core::PurchaseTrack;
use card_defence_rendering::HudPresentation;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Skin, Ui},
};

const DISABLED_TEXT: Color = Color::new(0.6, 0.6, 0.6, 1.0);

/// Outcome of rendering the HUD for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct HudUiResult {
    /// Purchase button pressed during this frame.
    pub(crate) purchase: Option<PurchaseTrack>,
    /// Whether "Play again" was pressed during this frame.
    pub(crate) restart: bool,
}

/// Layout and data for the HUD panel.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HudUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour of the panel.
    pub(crate) background: Color,
    /// Values shown in the panel.
    pub(crate) hud: &'a HudPresentation,
}

/// Layout of the game-over dialog.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GameOverUiContext {
    /// Top-left corner of the dialog in screen coordinates.
    pub(crate) origin: Vec2,
    /// Dialog dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour of the dialog.
    pub(crate) background: Color,
    /// Final score.
    pub(crate) score: u32,
}

fn panel_skin(ui: &mut Ui, background: Color) -> Skin {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    skin.window_style = ui
        .style_builder()
        .color(background)
        .color_hovered(background)
        .color_clicked(background)
        .color_selected(background)
        .color_selected_hovered(background)
        .color_inactive(background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();

    skin.label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();

    skin.button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(8.0, 8.0, 6.0, 6.0))
        .build();

    skin
}

/// Renders the coin and score counters plus one button per purchase track.
///
/// Unaffordable tracks are shown as greyed captions instead of buttons.
pub(crate) fn draw_hud_ui(ui: &mut Ui, context: HudUiContext<'_>) -> HudUiResult {
    let mut skin = panel_skin(ui, context.background);
    let disabled_style = ui
        .style_builder()
        .text_color(DISABLED_TEXT)
        .text_color_hovered(DISABLED_TEXT)
        .text_color_clicked(DISABLED_TEXT)
        .margin(RectOffset::new(8.0, 8.0, 6.0, 6.0))
        .build();
    ui.push_skin(&skin);

    let mut purchase = None;
    let hud = context.hud;
    let _ = ui.window(hash!("hud_panel"), context.origin, context.size, |ui| {
        ui.label(None, hud.coins_label().as_str());
        ui.label(None, hud.score_label().as_str());

        for tag in &hud.prices {
            let caption = tag.label();
            if tag.enabled {
                if ui.button(None, caption.as_str()) {
                    purchase = Some(tag.track);
                }
            } else {
                skin.label_style = disabled_style.clone();
                ui.push_skin(&skin);
                ui.label(None, caption.as_str());
                ui.pop_skin();
            }
        }
    });

    ui.pop_skin();

    HudUiResult {
        purchase,
        restart: false,
    }
}

/// Renders the game-over dialog with its "Play again" button.
pub(crate) fn draw_game_over_ui(ui: &mut Ui, context: GameOverUiContext) -> HudUiResult {
    let skin = panel_skin(ui, context.background);
    ui.push_skin(&skin);

    let mut restart = false;
    let _ = ui.window(hash!("game_over"), context.origin, context.size, |ui| {
        ui.label(None, "GAME OVER");
        ui.label(None, format!("Final score: {}", context.score).as_str());
        restart = ui.button(None, "Play again");
    });

    ui.pop_skin();

    HudUiResult {
        purchase: None,
        restart,
    }
}
