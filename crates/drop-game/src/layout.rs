//! Responsive placement of widgets relative to the window.
//!
//! Widgets carrying an [`Anchor`] are repositioned by [`relayout`] whenever
//! the window size changes, so `"50%", "50%"` stays centred.

use drop_anim::{Point, WidgetHost, WidgetId};

use crate::widgets::WidgetTree;

/// Window or widget extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// One coordinate of an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Fraction of the window extent, in percent.
    Percent(f32),
    Pixels(f32),
}

impl Length {
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Length::Percent(pct) => extent * pct / 100.0,
            Length::Pixels(px) => px,
        }
    }

    /// Parse `"50%"` or `"12"` / `"12px"`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(pct) = input.strip_suffix('%') {
            return pct.trim().parse().ok().map(Length::Percent);
        }
        let px = input.strip_suffix("px").unwrap_or(input);
        px.trim().parse().ok().map(Length::Pixels)
    }
}

/// Window-relative position of a widget's pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: Length,
    pub y: Length,
}

impl Anchor {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub const fn percent(x: f32, y: f32) -> Self {
        Self::new(Length::Percent(x), Length::Percent(y))
    }

    pub fn parse(x: &str, y: &str) -> Option<Self> {
        Some(Self::new(Length::parse(x)?, Length::parse(y)?))
    }

    pub fn resolve(&self, window: Size) -> Point {
        Point::new(self.x.resolve(window.width), self.y.resolve(window.height))
    }
}

/// Move every anchored widget to its anchor in `window`. Returns how many
/// widgets were placed.
pub fn relayout(tree: &WidgetTree, window: Size) -> usize {
    let anchored = tree.anchored();
    let mut placed = 0;
    for (id, anchor) in anchored {
        if tree.set_position(id, anchor.resolve(window)) {
            placed += 1;
        }
    }
    tracing::debug!(width = window.width, height = window.height, placed, "relayout");
    placed
}

/// Move one widget to its anchor in `window`. `false` if the widget is gone
/// or not anchored.
pub fn reanchor(tree: &WidgetTree, id: WidgetId, window: Size) -> bool {
    match tree.get(id).and_then(|w| w.anchor) {
        Some(anchor) => tree.set_position(id, anchor.resolve(window)),
        None => false,
    }
}
