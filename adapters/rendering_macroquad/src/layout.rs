//! Screen-space layout of the play surface, the card tray and the HUD panel.

use card_defence_rendering::PlayfieldPresentation;
use glam::Vec2;

/// Height of the strip below the play surface, in surface pixels.
pub(crate) const TRAY_HEIGHT: f32 = 140.0;

/// Width of the HUD panel at the right end of the strip, in surface pixels.
pub(crate) const PANEL_WIDTH: f32 = 240.0;

/// Axis-aligned rectangle in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScreenRect {
    pub(crate) origin: Vec2,
    pub(crate) size: Vec2,
}

impl ScreenRect {
    pub(crate) const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub(crate) fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }
}

/// Placement of every region for the current window size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Layout {
    pub(crate) scale: f32,
    pub(crate) surface: ScreenRect,
    pub(crate) tray: ScreenRect,
    pub(crate) panel: ScreenRect,
}

impl Layout {
    /// Fits the surface plus the strip below it into the window, preserving
    /// aspect ratio and centring the result.
    pub(crate) fn fit(playfield: &PlayfieldPresentation, screen: Vec2) -> Self {
        let design = Vec2::new(playfield.width(), playfield.height() + TRAY_HEIGHT);
        let scale = (screen.x / design.x).min(screen.y / design.y);
        let scale = if scale.is_finite() && scale > f32::EPSILON {
            scale
        } else {
            1.0
        };

        let offset = ((screen - design * scale) * 0.5).max(Vec2::ZERO);
        let surface_size = Vec2::new(playfield.width(), playfield.height()) * scale;
        let strip_origin = offset + Vec2::new(0.0, surface_size.y);
        let panel_width = PANEL_WIDTH.min(playfield.width()) * scale;
        let tray_width = (surface_size.x - panel_width).max(0.0);
        let strip_height = TRAY_HEIGHT * scale;

        Self {
            scale,
            surface: ScreenRect::new(offset, surface_size),
            tray: ScreenRect::new(strip_origin, Vec2::new(tray_width, strip_height)),
            panel: ScreenRect::new(
                strip_origin + Vec2::new(tray_width, 0.0),
                Vec2::new(panel_width, strip_height),
            ),
        }
    }

    /// Converts a screen point into play surface pixels.
    pub(crate) fn to_surface(&self, screen: Vec2) -> Vec2 {
        (screen - self.surface.origin) / self.scale
    }

    /// Converts a play surface point into screen pixels.
    pub(crate) fn to_screen(&self, surface: Vec2) -> Vec2 {
        self.surface.origin + surface * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::SpriteSheet;
    use card_defence_rendering::Color;

    fn playfield() -> PlayfieldPresentation {
        PlayfieldPresentation::new(
            1024.0,
            520.0,
            SpriteSheet::Terrain,
            Color::new(0.0, 0.0, 0.0, 1.0),
        )
        .expect("valid playfield")
    }

    #[test]
    fn native_window_maps_one_to_one() {
        let layout = Layout::fit(&playfield(), Vec2::new(1024.0, 660.0));
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.surface.origin, Vec2::ZERO);
        assert_eq!(layout.tray.origin, Vec2::new(0.0, 520.0));
        assert_eq!(layout.tray.size, Vec2::new(784.0, 140.0));
        assert_eq!(layout.panel.origin, Vec2::new(784.0, 520.0));
        assert_eq!(layout.to_surface(Vec2::new(300.0, 200.0)), Vec2::new(300.0, 200.0));
    }

    #[test]
    fn wide_window_is_letterboxed_horizontally() {
        let layout = Layout::fit(&playfield(), Vec2::new(2048.0 + 200.0, 1320.0));
        assert_eq!(layout.scale, 2.0);
        assert_eq!(layout.surface.origin, Vec2::new(100.0, 0.0));
        let screen = layout.to_screen(Vec2::new(10.0, 20.0));
        assert_eq!(screen, Vec2::new(120.0, 40.0));
        assert_eq!(layout.to_surface(screen), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn degenerate_window_falls_back_to_unit_scale() {
        let layout = Layout::fit(&playfield(), Vec2::ZERO);
        assert_eq!(layout.scale, 1.0);
    }

    #[test]
    fn rectangles_exclude_far_edges() {
        let rect = ScreenRect::new(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0));
        assert!(rect.contains(Vec2::new(10.0, 14.9)));
        assert!(!rect.contains(Vec2::new(15.0, 12.0)));
        assert_eq!(rect.center(), Vec2::new(12.5, 12.5));
    }
}
