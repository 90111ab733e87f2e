//! Per-frame driver: input, animation tick, presentation.

use std::sync::Arc;

use drop_anim::{AnimationSystem, Point, WidgetId};

use crate::game::DiceGame;
use crate::layout::Size;
use crate::widgets::{Widget, WidgetTree};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click(Point),
    Resize(Size),
    Close,
}

/// Presentation target for a finished frame.
pub trait Surface {
    fn present(&mut self, frame: u64, widgets: &[(WidgetId, Widget)]);
}

/// Surface that logs frames instead of drawing them.
#[derive(Debug, Default)]
pub struct LogSurface {
    frames: u64,
    last_widget_count: usize,
}

impl LogSurface {
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_widget_count(&self) -> usize {
        self.last_widget_count
    }
}

impl Surface for LogSurface {
    fn present(&mut self, frame: u64, widgets: &[(WidgetId, Widget)]) {
        for (id, widget) in widgets {
            tracing::trace!(
                frame,
                widget = %id,
                kind = ?widget.kind,
                text = %widget.text,
                x = widget.position.x,
                y = widget.position.y,
                "draw"
            );
        }
        self.frames += 1;
        self.last_widget_count = widgets.len();
    }
}

pub struct FrameLoop<S> {
    game: DiceGame,
    system: Arc<AnimationSystem>,
    tree: Arc<WidgetTree>,
    surface: S,
    frame: u64,
    open: bool,
}

impl<S: Surface> FrameLoop<S> {
    pub fn new(game: DiceGame, surface: S) -> Self {
        let system = Arc::clone(game.system());
        let tree = Arc::clone(game.tree());
        Self {
            game,
            system,
            tree,
            surface,
            frame: 0,
            open: true,
        }
    }

    pub fn game(&self) -> &DiceGame {
        &self.game
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Run one frame. Returns `false` once the window has closed.
    pub fn frame(&mut self, events: impl IntoIterator<Item = InputEvent>) -> bool {
        if !self.open {
            return false;
        }

        for event in events {
            match event {
                InputEvent::Click(at) => {
                    self.game.click(at);
                }
                InputEvent::Resize(size) => self.game.resize(size),
                InputEvent::Close => {
                    self.close();
                    return false;
                }
            }
        }

        self.system.update_animations();
        for event in self.system.drain_events() {
            tracing::trace!(?event, "animation event");
        }

        self.surface.present(self.frame, &self.tree.snapshot());
        self.frame += 1;
        true
    }

    /// Close the window, cancelling every animation without callbacks.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.system.shutdown();
        tracing::info!(frames = self.frame, "window closed");
    }
}
