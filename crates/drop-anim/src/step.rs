//! A single scheduled position transition.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::easing::Easing;
use crate::types::{AnimationId, AnimationState, Point, WidgetId};

/// Completion callback run once when a step reaches its target.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Shared cancellation flag.
///
/// Cloned into the scheduler's in-flight table so `stop` can reach a step
/// while a tick has it checked out of the active set.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One widget moving from wherever it is at `scheduled_start` to `end`.
pub struct AnimationStep {
    pub id: AnimationId,
    pub widget: WidgetId,
    /// Resolved from the widget's position on the first tick at or after
    /// `scheduled_start`; `None` until then.
    pub start: Option<Point>,
    pub end: Point,
    pub duration: Duration,
    pub easing: Easing,
    pub scheduled_start: Instant,
    pub state: AnimationState,
    /// Linear progress computed on the most recent tick.
    pub progress: f32,
    pub(crate) cancel: CancelFlag,
    pub(crate) on_complete: Option<Callback>,
}

impl AnimationStep {
    pub fn new(
        widget: WidgetId,
        end: Point,
        duration: Duration,
        easing: Easing,
        scheduled_start: Instant,
    ) -> Self {
        Self {
            id: AnimationId::new(),
            widget,
            start: None,
            end,
            duration,
            easing,
            scheduled_start,
            state: AnimationState::Pending,
            progress: 0.0,
            cancel: CancelFlag::default(),
            on_complete: None,
        }
    }

    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.on_complete = Some(callback);
        self
    }

    pub fn has_callback(&self) -> bool {
        self.on_complete.is_some()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the scheduled start lies after `now`.
    pub fn is_pending_at(&self, now: Instant) -> bool {
        self.scheduled_start > now
    }

    /// Linear progress at `now`, clamped to `[0, 1]`.
    ///
    /// A zero duration is complete as soon as the start time is reached.
    pub fn linear_progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.scheduled_start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Position for a given linear progress. Requires a resolved start.
    pub fn position_at(&self, progress: f32) -> Option<Point> {
        let start = self.start?;
        Some(start.lerp(self.end, self.easing.evaluate(progress)))
    }

    pub fn snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            id: self.id,
            widget: self.widget,
            state: self.state,
            progress: self.progress,
            start: self.start,
            end: self.end,
            easing: self.easing,
        }
    }
}

impl fmt::Debug for AnimationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationStep")
            .field("id", &self.id)
            .field("widget", &self.widget)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("cancelled", &self.is_cancelled())
            .field("has_callback", &self.has_callback())
            .finish()
    }
}

/// Read-only view of a step, returned by queries.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshot {
    pub id: AnimationId,
    pub widget: WidgetId,
    pub state: AnimationState,
    pub progress: f32,
    pub start: Option<Point>,
    pub end: Point,
    pub easing: Easing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(duration: Duration, start_at: Instant) -> AnimationStep {
        AnimationStep::new(
            WidgetId::new(0, 0),
            Point::new(100.0, 0.0),
            duration,
            Easing::Linear,
            start_at,
        )
    }

    #[test]
    fn test_progress_is_clamped() {
        let t0 = Instant::now();
        let s = step(Duration::from_secs(2), t0);
        assert_eq!(s.linear_progress(t0), 0.0);
        assert!((s.linear_progress(t0 + Duration::from_secs(1)) - 0.5).abs() < 1e-6);
        assert_eq!(s.linear_progress(t0 + Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn test_progress_before_start_is_zero() {
        let t0 = Instant::now();
        let s = step(Duration::from_secs(1), t0 + Duration::from_secs(1));
        assert!(s.is_pending_at(t0));
        assert_eq!(s.linear_progress(t0), 0.0);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let t0 = Instant::now();
        let s = step(Duration::ZERO, t0);
        assert_eq!(s.linear_progress(t0), 1.0);
    }

    #[test]
    fn test_position_requires_resolved_start() {
        let t0 = Instant::now();
        let mut s = step(Duration::from_secs(1), t0);
        assert_eq!(s.position_at(0.5), None);

        s.start = Some(Point::ORIGIN);
        assert_eq!(s.position_at(0.5), Some(Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let s = step(Duration::from_secs(1), Instant::now());
        let flag = s.cancel.clone();
        assert!(!s.is_cancelled());
        flag.cancel();
        assert!(s.is_cancelled());
    }
}
