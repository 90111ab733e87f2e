//! Seam between the scheduler and the widget tree that owns the widgets.

use crate::types::{Point, WidgetId};

/// Position access to externally owned widgets.
///
/// The scheduler never owns widgets. It validates each handle through the
/// host every time it touches one, so a widget destroyed mid-animation is
/// observed as a missing position rather than a dangling reference.
///
/// Implementations use interior mutability: completion callbacks run while a
/// tick is in progress and may touch the host themselves.
pub trait WidgetHost: Send + Sync {
    /// Current position of a live widget, `None` once it is gone.
    fn position(&self, widget: WidgetId) -> Option<Point>;

    /// Move a live widget. Returns `false` if the widget is gone.
    fn set_position(&self, widget: WidgetId, position: Point) -> bool;

    fn is_alive(&self, widget: WidgetId) -> bool {
        self.position(widget).is_some()
    }
}
