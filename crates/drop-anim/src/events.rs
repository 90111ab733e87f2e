//! Animation lifecycle events.
//!
//! The scheduler records an event whenever a step starts interpolating,
//! reaches its target, or is dropped without finishing. Events are polled
//! after a tick; they complement completion callbacks and never replace them.
//!
//! ```ignore
//! system.update_animations();
//! for event in system.drain_events() {
//!     if let AnimationEvent::Ended { widget, .. } = event {
//!         tracing::debug!(%widget, "landed");
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{AnimationId, Point, WidgetId};

/// Why a step left the active set without finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// `stop` was called for the step's widget, or for everything.
    Stopped,
    /// The widget was destroyed while the step was scheduled.
    WidgetGone,
}

/// Event emitted when a step changes state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationEvent {
    /// The step resolved its start position and began interpolating.
    Started {
        animation_id: AnimationId,
        widget: WidgetId,
        from: Point,
        to: Point,
    },
    /// The step reached its target position.
    Ended {
        animation_id: AnimationId,
        widget: WidgetId,
        at: Point,
    },
    /// The step was dropped before finishing; no callback ran.
    Cancelled {
        animation_id: AnimationId,
        widget: WidgetId,
        reason: CancelReason,
    },
}

impl AnimationEvent {
    pub fn animation_id(&self) -> AnimationId {
        match self {
            Self::Started { animation_id, .. }
            | Self::Ended { animation_id, .. }
            | Self::Cancelled { animation_id, .. } => *animation_id,
        }
    }

    pub fn widget(&self) -> WidgetId {
        match self {
            Self::Started { widget, .. }
            | Self::Ended { widget, .. }
            | Self::Cancelled { widget, .. } => *widget,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Bounded FIFO of lifecycle events.
///
/// When full, the oldest event is discarded so an unpolled queue cannot grow
/// without limit.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<AnimationEvent>,
    capacity: usize,
}

impl EventQueue {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, event: AnimationEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<AnimationEvent> {
        self.events.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ended(id: u64) -> AnimationEvent {
        AnimationEvent::Ended {
            animation_id: AnimationId(id),
            widget: WidgetId::new(0, 0),
            at: Point::ORIGIN,
        }
    }

    #[test]
    fn test_drain_empties_queue_in_order() {
        let mut queue = EventQueue::new();
        queue.push(ended(1));
        queue.push(ended(2));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].animation_id(), AnimationId(1));
        assert_eq!(drained[1].animation_id(), AnimationId(2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let mut queue = EventQueue::with_capacity(2);
        queue.push(ended(1));
        queue.push(ended(2));
        queue.push(ended(3));

        let ids: Vec<_> = queue.drain().iter().map(|e| e.animation_id().0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_event_accessors() {
        let event = AnimationEvent::Cancelled {
            animation_id: AnimationId(7),
            widget: WidgetId::new(4, 2),
            reason: CancelReason::WidgetGone,
        };
        assert!(event.is_cancelled());
        assert_eq!(event.widget(), WidgetId::new(4, 2));
        assert!(!ended(1).is_cancelled());
    }
}
