//! Drag-and-drop state for the cards waiting in the tray.

use card_defence_core::CardId;
use card_defence_rendering::{CardDrop, CardPresentation, PlayfieldPresentation};
use glam::Vec2;

use crate::layout::{Layout, ScreenRect};

/// Card face size in surface pixels.
pub(crate) const CARD_SIZE: Vec2 = Vec2::new(80.0, 110.0);

const CARD_GAP: f32 = 12.0;

/// Mouse observations for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Pointer {
    /// Cursor position in screen pixels.
    pub(crate) position: Vec2,
    /// Left button went down this frame.
    pub(crate) pressed: bool,
    /// Left button went up this frame.
    pub(crate) released: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Grab {
    card: CardId,
    offset: Vec2,
    cursor: Vec2,
}

/// Where a card should be drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedCard {
    pub(crate) card: CardPresentation,
    pub(crate) rect: ScreenRect,
    pub(crate) dragging: bool,
}

/// Tracks the card currently held by the pointer.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CardTray {
    grab: Option<Grab>,
}

impl CardTray {
    /// Feeds the pointer state and reports a card released over the surface.
    ///
    /// Releasing outside the surface returns the card to its slot.
    pub(crate) fn update(
        &mut self,
        hand: &[CardPresentation],
        playfield: &PlayfieldPresentation,
        layout: &Layout,
        pointer: Pointer,
    ) -> Option<CardDrop> {
        if let Some(grab) = self.grab {
            if !hand.iter().any(|card| card.card == grab.card) {
                self.grab = None;
            }
        }

        if self.grab.is_none() && pointer.pressed {
            self.grab = slot_rects(hand.len(), layout)
                .zip(hand)
                .find(|(rect, _)| rect.contains(pointer.position))
                .map(|(rect, card)| Grab {
                    card: card.card,
                    offset: pointer.position - rect.origin,
                    cursor: pointer.position,
                });
        }

        let grab = self.grab.as_mut()?;
        grab.cursor = pointer.position;
        if !pointer.released {
            return None;
        }

        let card = grab.card;
        self.grab = None;
        let point = layout.to_surface(pointer.position);
        playfield
            .contains(point)
            .then_some(CardDrop { card, point })
    }

    /// Positions every card, lifting the held one to the pointer.
    pub(crate) fn placements(&self, hand: &[CardPresentation], layout: &Layout) -> Vec<PlacedCard> {
        slot_rects(hand.len(), layout)
            .zip(hand)
            .map(|(rect, card)| match self.grab {
                Some(grab) if grab.card == card.card => PlacedCard {
                    card: *card,
                    rect: ScreenRect::new(grab.cursor - grab.offset, rect.size),
                    dragging: true,
                },
                _ => PlacedCard {
                    card: *card,
                    rect,
                    dragging: false,
                },
            })
            .collect()
    }
}

fn slot_rects(count: usize, layout: &Layout) -> impl Iterator<Item = ScreenRect> {
    let scale = layout.scale;
    let size = CARD_SIZE * scale;
    let step = (CARD_SIZE.x + CARD_GAP) * scale;
    let top = layout.tray.origin.y + (layout.tray.size.y - size.y) * 0.5;
    let left = layout.tray.origin.x + CARD_GAP * scale;
    (0..count).map(move |index| ScreenRect::new(Vec2::new(left + step * index as f32, top), size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::{CardAction, SpriteSheet};
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

    fn layout() -> Layout {
        Layout::fit(&playfield(), Vec2::new(1024.0, 660.0))
    }

    fn hand() -> Vec<CardPresentation> {
        vec![
            CardPresentation::new(CardId::new(0), CardAction::Tower),
            CardPresentation::new(CardId::new(4), CardAction::Aim),
        ]
    }

    fn press(x: f32, y: f32) -> Pointer {
        Pointer {
            position: Vec2::new(x, y),
            pressed: true,
            released: false,
        }
    }

    fn hover(x: f32, y: f32) -> Pointer {
        Pointer {
            position: Vec2::new(x, y),
            ..Pointer::default()
        }
    }

    fn release(x: f32, y: f32) -> Pointer {
        Pointer {
            position: Vec2::new(x, y),
            pressed: false,
            released: true,
        }
    }

    #[test]
    fn slots_line_up_inside_the_tray() {
        let placements = CardTray::default().placements(&hand(), &layout());
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].rect.origin, Vec2::new(12.0, 535.0));
        assert_eq!(placements[1].rect.origin, Vec2::new(104.0, 535.0));
        assert!(placements.iter().all(|placed| !placed.dragging));
    }

    #[test]
    fn dropping_on_the_surface_reports_the_release_point() {
        let (hand, layout, field) = (hand(), layout(), playfield());
        let mut tray = CardTray::default();
        assert_eq!(tray.update(&hand, &field, &layout, press(110.0, 560.0)), None);
        assert_eq!(tray.update(&hand, &field, &layout, hover(300.0, 300.0)), None);

        let placements = tray.placements(&hand, &layout);
        assert!(placements[1].dragging);
        assert_eq!(placements[1].rect.origin, Vec2::new(294.0, 275.0));

        let drop = tray.update(&hand, &field, &layout, release(320.0, 200.0));
        assert_eq!(
            drop,
            Some(CardDrop {
                card: CardId::new(4),
                point: Vec2::new(320.0, 200.0)
            })
        );
        assert!(tray.grab.is_none());
    }

    #[test]
    fn releasing_over_the_tray_returns_the_card() {
        let (hand, layout, field) = (hand(), layout(), playfield());
        let mut tray = CardTray::default();
        let _ = tray.update(&hand, &field, &layout, press(20.0, 560.0));
        assert_eq!(tray.update(&hand, &field, &layout, release(400.0, 600.0)), None);
        assert!(tray.placements(&hand, &layout).iter().all(|placed| !placed.dragging));
    }

    #[test]
    fn pressing_empty_space_grabs_nothing() {
        let (hand, layout, field) = (hand(), layout(), playfield());
        let mut tray = CardTray::default();
        let _ = tray.update(&hand, &field, &layout, press(600.0, 560.0));
        assert!(tray.grab.is_none());
        assert_eq!(tray.update(&hand, &field, &layout, release(300.0, 300.0)), None);
    }

    #[test]
    fn held_card_removed_from_hand_cancels_the_drag() {
        let (hand, layout, field) = (hand(), layout(), playfield());
        let mut tray = CardTray::default();
        let _ = tray.update(&hand, &field, &layout, press(20.0, 560.0));
        let remaining = vec![hand[1]];
        assert_eq!(tray.update(&remaining, &field, &layout, release(300.0, 300.0)), None);
        assert!(tray.grab.is_none());
    }
}
