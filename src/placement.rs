//! # Tooltip Placement
//!
//! Pure geometry: where a tooltip of a given size goes for a cursor position, in page
//! coordinates.
//!
//! ## Rules
//! - The tooltip sits below the cursor, `gap` pixels down
//! - If that overflows the bottom of the visible area it flips above the cursor
//! - If it then overflows the top, it is pinned to the top edge
//! - Horizontally it is either centered on the cursor or offset to its right
//!   (flipping to the left near the right edge), then clamped to the visible area
//!
//! Clamped edges keep a 1px inset.
//!
//! ## Example
//! ```rust
//! use abc_hover::{Orientation, PlacementStrategy, Point, Size, TooltipPlacer, Viewport};
//!
//! let placer = TooltipPlacer::new(PlacementStrategy::Centered, 10.0);
//! let placement = placer.place(
//!     Size::new(100.0, 50.0),
//!     Point::new(400.0, 590.0),
//!     Viewport::new(800.0, 600.0),
//! );
//! assert_eq!(placement.orientation, Orientation::Above);
//! assert_eq!(placement.top, 530.0);
//! assert_eq!(placement.left, 350.0);
//! ```

use serde::{Deserialize, Serialize};

/// Distance from the screen edges for clamped tooltips.
const EDGE_INSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The visible part of the page: its size and scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    pub fn scrolled(mut self, scroll_left: f64, scroll_top: f64) -> Self {
        self.scroll_left = scroll_left;
        self.scroll_top = scroll_top;
        self
    }

    fn right(&self) -> f64 {
        self.scroll_left + self.width
    }

    fn bottom(&self) -> f64 {
        self.scroll_top + self.height
    }
}

/// Which side of the cursor the tooltip ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Below,
    Above,
}

impl Orientation {
    /// Class selecting the arrow direction.
    pub fn css_class(self) -> &'static str {
        match self {
            Orientation::Below => "abc-tooltip-below",
            Orientation::Above => "abc-tooltip-above",
        }
    }

    /// The tooltip grows away from the cursor when scaled.
    pub fn transform_origin(self) -> &'static str {
        match self {
            Orientation::Below => "top center",
            Orientation::Above => "bottom center",
        }
    }
}

/// Horizontal placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    /// Centered on the cursor, clamped without flipping.
    #[default]
    Centered,
    /// `gap` pixels right of the cursor, flipping left near the right edge.
    Offset,
}

/// Visual styling of the tooltip box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipStyle {
    /// Directional arrow pointing at the cursor.
    #[default]
    Arrow,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacer {
    strategy: PlacementStrategy,
    gap: f64,
}

impl TooltipPlacer {
    pub fn new(strategy: PlacementStrategy, gap: f64) -> Self {
        Self { strategy, gap }
    }

    pub fn place(&self, size: Size, anchor: Point, viewport: Viewport) -> Placement {
        let (top, orientation) = self.vertical(size, anchor, &viewport);
        Placement {
            left: self.horizontal(size, anchor, &viewport),
            top,
            orientation,
        }
    }

    fn horizontal(&self, size: Size, anchor: Point, viewport: &Viewport) -> f64 {
        let mut left = match self.strategy {
            PlacementStrategy::Centered => anchor.x - size.width / 2.0,
            PlacementStrategy::Offset => {
                let right_of_cursor = anchor.x + self.gap;
                if right_of_cursor + size.width > viewport.right() {
                    anchor.x - size.width - self.gap
                } else {
                    right_of_cursor
                }
            }
        };

        if left + size.width > viewport.right() {
            left = viewport.right() - size.width - EDGE_INSET;
        }
        if left < viewport.scroll_left {
            left = viewport.scroll_left + EDGE_INSET;
        }
        left
    }

    fn vertical(&self, size: Size, anchor: Point, viewport: &Viewport) -> (f64, Orientation) {
        let mut top = anchor.y + self.gap;
        let mut orientation = Orientation::Below;

        if top + size.height > viewport.bottom() {
            orientation = Orientation::Above;
            top = anchor.y - size.height - self.gap;
        }
        if top < viewport.scroll_top {
            top = viewport.scroll_top + EDGE_INSET;
        }
        (top, orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered() -> TooltipPlacer {
        TooltipPlacer::new(PlacementStrategy::Centered, 10.0)
    }

    fn offset() -> TooltipPlacer {
        TooltipPlacer::new(PlacementStrategy::Offset, 10.0)
    }

    #[test]
    fn test_fits_below() {
        let size = Size::new(100.0, 50.0);
        let viewport = Viewport::new(800.0, 600.0);

        let placement = centered().place(size, Point::new(50.0, 50.0), viewport);
        assert_eq!(placement.orientation, Orientation::Below);
        assert_eq!(placement.top, 60.0);
        assert!(placement.left >= 0.0 && placement.left <= 700.0);
        assert_eq!(placement.left, 0.0);

        let placement = offset().place(size, Point::new(50.0, 50.0), viewport);
        assert_eq!(placement.orientation, Orientation::Below);
        assert_eq!(placement.top, 60.0);
        assert_eq!(placement.left, 60.0);
    }

    #[test]
    fn test_flips_above_near_bottom() {
        let placement = centered().place(
            Size::new(100.0, 50.0),
            Point::new(400.0, 590.0),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(placement.orientation, Orientation::Above);
        assert_eq!(placement.top, 530.0);
    }

    #[test]
    fn test_above_is_clamped_to_scroll_top() {
        // Taller than the space on either side of the cursor.
        let viewport = Viewport::new(800.0, 300.0).scrolled(0.0, 1000.0);
        let placement = centered().place(
            Size::new(100.0, 250.0),
            Point::new(400.0, 1100.0),
            viewport,
        );
        assert_eq!(placement.orientation, Orientation::Above);
        assert_eq!(placement.top, 1001.0);
    }

    #[test]
    fn test_centered_clamps_right_edge_without_flipping() {
        let placement = centered().place(
            Size::new(200.0, 50.0),
            Point::new(790.0, 100.0),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(placement.left, 599.0);
    }

    #[test]
    fn test_centered_clamps_left_edge() {
        let viewport = Viewport::new(800.0, 600.0).scrolled(100.0, 0.0);
        let placement =
            centered().place(Size::new(200.0, 50.0), Point::new(120.0, 100.0), viewport);
        assert_eq!(placement.left, 101.0);
    }

    #[test]
    fn test_offset_flips_left_of_cursor() {
        let placement = offset().place(
            Size::new(200.0, 50.0),
            Point::new(700.0, 100.0),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(placement.left, 490.0);
    }

    #[test]
    fn test_offset_flip_still_clamped() {
        // Too wide for either side: ends up clamped to the left edge.
        let placement = offset().place(
            Size::new(500.0, 50.0),
            Point::new(300.0, 100.0),
            Viewport::new(600.0, 600.0),
        );
        assert_eq!(placement.left, 1.0);
    }

    #[test]
    fn test_scrolled_page_coordinates() {
        let viewport = Viewport::new(800.0, 600.0).scrolled(0.0, 2000.0);
        let placement =
            centered().place(Size::new(100.0, 50.0), Point::new(400.0, 2100.0), viewport);
        assert_eq!(placement.orientation, Orientation::Below);
        assert_eq!(placement.top, 2110.0);

        let placement =
            centered().place(Size::new(100.0, 50.0), Point::new(400.0, 2590.0), viewport);
        assert_eq!(placement.orientation, Orientation::Above);
        assert_eq!(placement.top, 2530.0);
    }

    #[test]
    fn test_orientation_styling() {
        assert_eq!(Orientation::Below.css_class(), "abc-tooltip-below");
        assert_eq!(Orientation::Above.transform_origin(), "bottom center");
    }
}
