//! Headless retained widget tree.
//!
//! Widgets live in generational slots. A [`WidgetId`] stays valid until its
//! widget is removed; a later widget reusing the slot gets a new generation,
//! so the old handle never reaches it.

use drop_anim::{Point, WidgetHost, WidgetId};
use parking_lot::RwLock;

use crate::layout::{Anchor, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Label,
    Button,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub kind: WidgetKind,
    pub text: String,
    pub text_size: u32,
    /// Where the pivot sits, in window coordinates.
    pub position: Point,
    pub size: Size,
    /// Normalised pivot: `(0, 0)` top-left, `(0.5, 0.5)` centre, `(1, 0)`
    /// top-right.
    pub origin: Point,
    pub anchor: Option<Anchor>,
}

impl Widget {
    fn new(kind: WidgetKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            text_size: 16,
            position: Point::ORIGIN,
            size: Size::default(),
            origin: Point::ORIGIN,
            anchor: None,
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Label, text)
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Button, text)
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Point::new(x, y);
        self
    }

    pub fn with_text_size(mut self, text_size: u32) -> Self {
        self.text_size = text_size;
        self
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Top-left corner after applying the pivot.
    pub fn top_left(&self) -> Point {
        self.position.offset(
            -self.origin.x * self.size.width,
            -self.origin.y * self.size.height,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        let tl = self.top_left();
        point.x >= tl.x
            && point.x <= tl.x + self.size.width
            && point.y >= tl.y
            && point.y <= tl.y + self.size.height
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    widget: Option<Widget>,
}

#[derive(Debug, Default)]
struct Slots {
    entries: Vec<Slot>,
    free: Vec<u32>,
}

impl Slots {
    fn get(&self, id: WidgetId) -> Option<&Widget> {
        let slot = self.entries.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.widget.as_ref()
    }

    fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        let slot = self.entries.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.widget.as_mut()
    }

    fn live(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.entries.iter().enumerate().filter_map(|(index, slot)| {
            slot.widget
                .as_ref()
                .map(|w| (WidgetId::new(index as u32, slot.generation), w))
        })
    }
}

/// Owner of every widget in the window.
///
/// Shared by `Arc` between the game, the frame loop and the animation
/// scheduler; all access goes through an internal `RwLock`.
#[derive(Debug, Default)]
pub struct WidgetTree {
    slots: RwLock<Slots>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, widget: Widget) -> WidgetId {
        let mut slots = self.slots.write();
        if let Some(index) = slots.free.pop() {
            let slot = &mut slots.entries[index as usize];
            slot.widget = Some(widget);
            return WidgetId::new(index, slot.generation);
        }
        let index = slots.entries.len() as u32;
        slots.entries.push(Slot {
            generation: 0,
            widget: Some(widget),
        });
        WidgetId::new(index, 0)
    }

    /// Remove a widget. Returns `false` for an already-invalid handle.
    pub fn remove(&self, id: WidgetId) -> bool {
        let mut slots = self.slots.write();
        if slots.get(id).is_none() {
            return false;
        }
        let slot = &mut slots.entries[id.index() as usize];
        slot.widget = None;
        slot.generation = slot.generation.wrapping_add(1);
        slots.free.push(id.index());
        true
    }

    pub fn get(&self, id: WidgetId) -> Option<Widget> {
        self.slots.read().get(id).cloned()
    }

    pub fn text(&self, id: WidgetId) -> Option<String> {
        self.slots.read().get(id).map(|w| w.text.clone())
    }

    pub fn set_text(&self, id: WidgetId, text: impl Into<String>) -> bool {
        match self.slots.write().get_mut(id) {
            Some(widget) => {
                widget.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topmost button under `point`.
    pub fn hit_test(&self, point: Point) -> Option<WidgetId> {
        let slots = self.slots.read();
        slots
            .live()
            .filter(|(_, w)| w.kind == WidgetKind::Button && w.contains(point))
            .map(|(id, _)| id)
            .last()
    }

    pub fn anchored(&self) -> Vec<(WidgetId, Anchor)> {
        let slots = self.slots.read();
        slots
            .live()
            .filter_map(|(id, w)| w.anchor.map(|anchor| (id, anchor)))
            .collect()
    }

    /// Copies of every live widget in slot order.
    pub fn snapshot(&self) -> Vec<(WidgetId, Widget)> {
        let slots = self.slots.read();
        slots.live().map(|(id, w)| (id, w.clone())).collect()
    }
}

impl WidgetHost for WidgetTree {
    fn position(&self, widget: WidgetId) -> Option<Point> {
        self.slots.read().get(widget).map(|w| w.position)
    }

    fn set_position(&self, widget: WidgetId, position: Point) -> bool {
        match self.slots.write().get_mut(widget) {
            Some(w) => {
                w.position = position;
                true
            }
            None => false,
        }
    }
}
