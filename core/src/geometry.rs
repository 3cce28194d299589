//! Pixel-space geometry shared by the world, systems, and adapters.

use serde::{Deserialize, Serialize};

/// Point on the play surface expressed in pixels.
///
/// The origin sits at the top-left corner of the surface; `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from pixel coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in pixels.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in pixels.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position displaced by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height of an entity expressed in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Offset from a top-left corner to the centre of a box with this size.
    #[must_use]
    pub fn half(self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    origin: Position,
    size: Size,
}

impl BoundingBox {
    /// Constructs a box from its top-left corner and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: Position, size: Size) -> Self {
        Self { origin, size }
    }

    /// Top-left corner of the box.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Dimensions of the box.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.origin.x()
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.origin.y()
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x() + self.size.width()
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y() + self.size.height()
    }

    /// Reports whether `self` overlaps `other`.
    ///
    /// The predicate is deliberately asymmetric: boxes that merely touch along
    /// `self`'s right or bottom edge do not overlap, while `self`'s left or top
    /// edge touching `other`'s right or bottom edge does. Callers must keep the
    /// argument order stable (the moving entity first).
    #[must_use]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.right() <= other.left()
            || self.left() > other.right()
            || self.bottom() <= other.top()
            || self.top() > other.bottom())
    }
}

/// Dimensions of the play surface and the fixed landmarks derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    width: f32,
    height: f32,
}

impl Playfield {
    /// Surface used by the shipped game.
    pub const DEFAULT: Playfield = Playfield::new(1024.0, 520.0);

    /// Size of the base hitbox enemies must not touch.
    pub const BASE_HITBOX_SIZE: Size = Size::new(48.0, 30.0);

    /// Creates a play surface with the provided pixel dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
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

    /// Centre of the surface, which is also where the base sits.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Hitbox of the base, anchored with its top-left corner on the centre.
    #[must_use]
    pub fn base_hitbox(&self) -> BoundingBox {
        BoundingBox::from_origin_and_size(self.center(), Self::BASE_HITBOX_SIZE)
    }

    /// Reports whether a bullet at `position` is still inside the surface.
    ///
    /// Bullets never leave through the left edge check; the range is
    /// `x <= width` and `0 <= y <= height`, boundaries included.
    #[must_use]
    pub fn contains_bullet(&self, position: Position) -> bool {
        position.x() <= self.width && position.y() >= 0.0 && position.y() <= self.height
    }

    /// Reports whether a card dropped at `position` landed on the surface.
    #[must_use]
    pub fn contains_drop(&self, position: Position) -> bool {
        position.x() >= 0.0
            && position.y() >= 0.0
            && position.x() < self.width
            && position.y() < self.height
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(x: f32, y: f32) -> BoundingBox {
        BoundingBox::from_origin_and_size(Position::new(x, y), Size::new(10.0, 10.0))
    }

    #[test]
    fn touching_right_edge_does_not_overlap() {
        let left = unit_box(0.0, 0.0);
        let right = unit_box(10.0, 0.0);
        assert!(!left.overlaps(&right));
    }

    #[test]
    fn touching_left_edge_overlaps() {
        let left = unit_box(0.0, 0.0);
        let right = unit_box(10.0, 0.0);
        assert!(right.overlaps(&left));
    }

    #[test]
    fn touching_top_edge_overlaps_but_bottom_does_not() {
        let upper = unit_box(0.0, 0.0);
        let lower = unit_box(0.0, 10.0);
        assert!(lower.overlaps(&upper));
        assert!(!upper.overlaps(&lower));
    }

    #[test]
    fn base_hitbox_starts_at_center() {
        let hitbox = Playfield::DEFAULT.base_hitbox();
        assert_eq!(hitbox.origin(), Position::new(512.0, 260.0));
        assert_eq!(hitbox.right(), 560.0);
        assert_eq!(hitbox.bottom(), 290.0);
    }

    #[test]
    fn bullet_bounds_are_inclusive() {
        let field = Playfield::DEFAULT;
        assert!(field.contains_bullet(Position::new(1024.0, 520.0)));
        assert!(field.contains_bullet(Position::new(-300.0, 0.0)));
        assert!(!field.contains_bullet(Position::new(1024.5, 10.0)));
        assert!(!field.contains_bullet(Position::new(10.0, -0.5)));
        assert!(!field.contains_bullet(Position::new(10.0, 520.5)));
        assert!(!field.contains_bullet(Position::new(f32::NAN, 10.0)));
    }

    #[test]
    fn drop_bounds_exclude_far_edges() {
        let field = Playfield::DEFAULT;
        assert!(field.contains_drop(Position::new(0.0, 0.0)));
        assert!(field.contains_drop(Position::new(1023.9, 519.9)));
        assert!(!field.contains_drop(Position::new(1024.0, 10.0)));
        assert!(!field.contains_drop(Position::new(10.0, 520.0)));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f32::EPSILON);
    }
}
