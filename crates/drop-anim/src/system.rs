//! The animation scheduler.
//!
//! `AnimationSystem` owns every in-flight step and advances them once per
//! frame. It is shared by `Arc` between the render loop, which ticks it, and
//! UI handlers and completion callbacks, which enqueue work into it.
//!
//! # Tick structure
//!
//! 1. Under the step lock, check the whole active set out and record a
//!    cancellation handle for each step in the in-flight table.
//! 2. Release the lock.
//! 3. Advance each step in insertion order: write positions through the
//!    [`WidgetHost`], fire completion callbacks. Callbacks may enqueue, stop
//!    or query freely because no lock is held.
//! 4. Re-acquire the lock and put retained steps back ahead of anything
//!    enqueued during the tick.
//!
//! # Failure policy
//!
//! Requests are fire-and-forget. A request against an inactive system, a dead
//! widget, or with mismatched list lengths is dropped whole and logged at
//! `debug`; nothing is returned to the caller.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::easing::Easing;
use crate::events::{AnimationEvent, CancelReason, EventQueue};
use crate::host::WidgetHost;
use crate::step::{AnimationStep, Callback, CancelFlag, StepSnapshot};
use crate::types::{AnimationId, AnimationState, Point, WidgetId};

/// What happens when a widget that already has steps receives new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Steps coexist. Overlapping steps on one widget all write each tick and
    /// the last one in insertion order wins.
    #[default]
    Stack,
    /// New requests cancel every existing step on the same widget first.
    Replace,
}

#[derive(Debug)]
struct InFlight {
    id: AnimationId,
    widget: WidgetId,
    cancel: CancelFlag,
}

#[derive(Default)]
struct StepSet {
    /// Steps waiting for the next tick, in insertion order.
    queued: Vec<AnimationStep>,
    /// Steps checked out by the running tick.
    in_flight: Vec<InFlight>,
}

impl StepSet {
    /// Cancel every step matching `filter`. Queued matches are removed and
    /// handed back so the caller can drop them (and their callbacks) after
    /// releasing the lock.
    fn cancel_matching(
        &mut self,
        filter: impl Fn(WidgetId) -> bool,
    ) -> (Vec<AnimationStep>, Vec<(AnimationId, WidgetId)>) {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.queued)
            .into_iter()
            .partition(|step| filter(step.widget));
        self.queued = kept;

        let mut cancelled: Vec<_> = removed
            .iter()
            .map(|step| {
                step.cancel();
                (step.id, step.widget)
            })
            .collect();

        for entry in &self.in_flight {
            if filter(entry.widget) && !entry.cancel.is_cancelled() {
                entry.cancel.cancel();
                cancelled.push((entry.id, entry.widget));
            }
        }

        (removed, cancelled)
    }

    fn live_count(&self) -> usize {
        self.queued.len()
            + self
                .in_flight
                .iter()
                .filter(|entry| !entry.cancel.is_cancelled())
                .count()
    }
}

enum Advance {
    Retain,
    Finished,
    /// Dropped without finishing. `None` when whoever cancelled it already
    /// reported the cancellation.
    Dropped(Option<CancelReason>),
}

/// Resets the tick-in-progress flag even if a callback panics.
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-frame tween scheduler for widget positions.
pub struct AnimationSystem {
    host: Arc<dyn WidgetHost>,
    clock: Arc<dyn Clock>,
    overlap: OverlapPolicy,
    active: AtomicBool,
    ticking: AtomicBool,
    steps: Mutex<StepSet>,
    events: Mutex<EventQueue>,
}

impl AnimationSystem {
    /// Create an inactive system. Call [`initialize`](Self::initialize)
    /// before enqueueing.
    pub fn new(host: Arc<dyn WidgetHost>, clock: Arc<dyn Clock>) -> Self {
        Self {
            host,
            clock,
            overlap: OverlapPolicy::default(),
            active: AtomicBool::new(false),
            ticking: AtomicBool::new(false),
            steps: Mutex::new(StepSet::default()),
            events: Mutex::new(EventQueue::new()),
        }
    }

    pub fn with_overlap_policy(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Activate the system with an empty step set. No-op if already active.
    pub fn initialize(&self) {
        let mut set = self.steps.lock();
        if self.active.swap(true, Ordering::AcqRel) {
            return;
        }
        let stale = std::mem::take(&mut set.queued);
        drop(set);
        drop(stale);
        tracing::info!("animation system initialized");
    }

    /// Cancel every pending and running step without running callbacks,
    /// clear the active set and deactivate.
    pub fn shutdown(&self) {
        let mut set = self.steps.lock();
        let was_active = self.active.swap(false, Ordering::AcqRel);
        let (removed, cancelled) = set.cancel_matching(|_| true);
        drop(set);
        self.events.lock().clear();
        drop(removed);

        if was_active {
            tracing::info!(cancelled = cancelled.len(), "animation system shut down");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    // ========================================================================
    // Enqueue
    // ========================================================================

    /// Move `widget` to `target`, starting now.
    pub fn move_to(
        &self,
        widget: WidgetId,
        target: Point,
        duration: Duration,
        easing: Easing,
    ) {
        if !self.admit(widget, "move") {
            return;
        }
        let step = AnimationStep::new(widget, target, duration, easing, self.clock.now());
        self.schedule(widget, vec![step]);
    }

    /// Move `widget` to `target`, starting now, and run `on_complete` once it
    /// arrives.
    pub fn move_with_callback(
        &self,
        widget: WidgetId,
        target: Point,
        duration: Duration,
        easing: Easing,
        on_complete: impl FnOnce() + Send + 'static,
    ) {
        if !self.admit(widget, "move_with_callback") {
            return;
        }
        let step = AnimationStep::new(widget, target, duration, easing, self.clock.now())
            .with_callback(Box::new(on_complete));
        self.schedule(widget, vec![step]);
    }

    /// Visit `positions` back to back, each step taking `step_duration`.
    pub fn sequence(
        &self,
        widget: WidgetId,
        positions: &[Point],
        step_duration: Duration,
        easing: Easing,
    ) {
        let durations = vec![step_duration; positions.len()];
        let easings = vec![easing; positions.len()];
        self.sequence_advanced(widget, positions, &durations, &easings);
    }

    /// Visit `positions` back to back with a duration and easing per step.
    ///
    /// `positions` and `durations` must have equal length or the request is
    /// dropped. If `easings` has any other length every step is linear.
    pub fn sequence_advanced(
        &self,
        widget: WidgetId,
        positions: &[Point],
        durations: &[Duration],
        easings: &[Easing],
    ) {
        if !self.admit(widget, "sequence") {
            return;
        }
        if positions.is_empty() || positions.len() != durations.len() {
            tracing::debug!(
                %widget,
                positions = positions.len(),
                durations = durations.len(),
                "dropping sequence with mismatched lengths"
            );
            return;
        }
        let Some(steps) = self.chain(widget, positions, durations, easings) else {
            tracing::debug!(%widget, "dropping sequence whose timing overflows the clock");
            return;
        };
        self.schedule(widget, steps);
    }

    /// Like [`sequence_advanced`](Self::sequence_advanced), with one callback
    /// per step run as that step completes.
    ///
    /// `positions`, `durations` and `callbacks` must have equal length or the
    /// request is dropped.
    pub fn sequence_with_callbacks(
        &self,
        widget: WidgetId,
        positions: &[Point],
        durations: &[Duration],
        callbacks: Vec<Callback>,
        easings: &[Easing],
    ) {
        if !self.admit(widget, "sequence_with_callbacks") {
            return;
        }
        if positions.is_empty()
            || positions.len() != durations.len()
            || positions.len() != callbacks.len()
        {
            tracing::debug!(
                %widget,
                positions = positions.len(),
                durations = durations.len(),
                callbacks = callbacks.len(),
                "dropping sequence with mismatched lengths"
            );
            return;
        }
        let Some(steps) = self.chain(widget, positions, durations, easings) else {
            tracing::debug!(%widget, "dropping sequence whose timing overflows the clock");
            return;
        };
        let steps = steps
            .into_iter()
            .zip(callbacks)
            .map(|(step, callback)| step.with_callback(callback))
            .collect();
        self.schedule(widget, steps);
    }

    fn admit(&self, widget: WidgetId, request: &'static str) -> bool {
        if !self.is_active() {
            tracing::debug!(%widget, request, "animation system inactive; request dropped");
            return false;
        }
        if !self.host.is_alive(widget) {
            tracing::debug!(%widget, request, "widget is gone; request dropped");
            return false;
        }
        true
    }

    /// Build back-to-back steps; step `i` starts once steps `0..i` have run.
    /// `None` if a start time falls outside the clock's range.
    fn chain(
        &self,
        widget: WidgetId,
        positions: &[Point],
        durations: &[Duration],
        easings: &[Easing],
    ) -> Option<Vec<AnimationStep>> {
        let per_step_easing = easings.len() == positions.len();
        let now = self.clock.now();
        let mut delay = Duration::ZERO;
        let mut steps = Vec::with_capacity(positions.len());

        for (i, (&target, &duration)) in positions.iter().zip(durations).enumerate() {
            let easing = if per_step_easing { easings[i] } else { Easing::Linear };
            let start = now.checked_add(delay)?;
            steps.push(AnimationStep::new(widget, target, duration, easing, start));
            delay = delay.checked_add(duration)?;
        }
        Some(steps)
    }

    fn schedule(&self, widget: WidgetId, steps: Vec<AnimationStep>) {
        let mut set = self.steps.lock();
        if !self.is_active() {
            return;
        }

        let (replaced, cancelled) = match self.overlap {
            OverlapPolicy::Stack => (Vec::new(), Vec::new()),
            OverlapPolicy::Replace => set.cancel_matching(|w| w == widget),
        };

        tracing::debug!(
            %widget,
            steps = steps.len(),
            replaced = cancelled.len(),
            "animation scheduled"
        );
        set.queued.extend(steps);
        drop(set);

        self.report_cancelled(&cancelled, CancelReason::Stopped);
        drop(replaced);
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance every step to the clock's current time.
    pub fn update_animations(&self) {
        self.update_animations_at(self.clock.now());
    }

    /// Advance every step to `now`.
    ///
    /// A tick requested while another tick is running (including from inside
    /// a completion callback) is skipped.
    pub fn update_animations_at(&self, now: Instant) {
        if !self.is_active() {
            return;
        }
        if self.ticking.swap(true, Ordering::AcqRel) {
            tracing::debug!("tick already in progress; skipped");
            return;
        }
        let _guard = TickGuard(&self.ticking);

        let batch = {
            let mut set = self.steps.lock();
            let batch = std::mem::take(&mut set.queued);
            set.in_flight = batch
                .iter()
                .map(|step| InFlight {
                    id: step.id,
                    widget: step.widget,
                    cancel: step.cancel.clone(),
                })
                .collect();
            batch
        };

        let mut retained = Vec::with_capacity(batch.len());
        for mut step in batch {
            if !self.is_active() {
                break;
            }
            match self.advance(&mut step, now) {
                Advance::Retain => retained.push(step),
                Advance::Finished => {
                    self.release(step.id);
                    self.emit(AnimationEvent::Ended {
                        animation_id: step.id,
                        widget: step.widget,
                        at: step.end,
                    });
                    if let Some(callback) = step.on_complete.take() {
                        callback();
                    }
                }
                Advance::Dropped(reason) => {
                    self.release(step.id);
                    if let Some(reason) = reason {
                        tracing::debug!(
                            widget = %step.widget,
                            id = %step.id,
                            ?reason,
                            "step dropped"
                        );
                        self.report_cancelled(&[(step.id, step.widget)], reason);
                    }
                }
            }
        }

        let mut set = self.steps.lock();
        set.in_flight.clear();
        if !self.is_active() {
            drop(set);
            return;
        }
        // stopped after being advanced this tick; already reported by `stop`
        retained.retain(|step| !step.is_cancelled());
        let enqueued = std::mem::replace(&mut set.queued, retained);
        set.queued.extend(enqueued);
    }

    fn advance(&self, step: &mut AnimationStep, now: Instant) -> Advance {
        if step.is_cancelled() {
            return Advance::Dropped(None);
        }
        if !self.host.is_alive(step.widget) {
            return Advance::Dropped(Some(CancelReason::WidgetGone));
        }
        if step.is_pending_at(now) {
            return Advance::Retain;
        }

        if step.start.is_none() {
            let Some(current) = self.host.position(step.widget) else {
                return Advance::Dropped(Some(CancelReason::WidgetGone));
            };
            step.start = Some(current);
            step.state = AnimationState::Running;
            self.emit(AnimationEvent::Started {
                animation_id: step.id,
                widget: step.widget,
                from: current,
                to: step.end,
            });
        }

        let progress = step.linear_progress(now);
        step.progress = progress;

        // the final frame writes the exact target to avoid drift
        let position = if progress >= 1.0 {
            step.end
        } else {
            match step.position_at(progress) {
                Some(position) => position,
                None => return Advance::Dropped(Some(CancelReason::WidgetGone)),
            }
        };

        tracing::trace!(
            widget = %step.widget,
            id = %step.id,
            progress,
            x = position.x,
            y = position.y,
            "step advanced"
        );
        if !self.host.set_position(step.widget, position) {
            return Advance::Dropped(Some(CancelReason::WidgetGone));
        }

        if progress >= 1.0 {
            step.state = AnimationState::Finished;
            Advance::Finished
        } else {
            Advance::Retain
        }
    }

    /// Remove a finished or dropped step from the in-flight table so queries
    /// made from its callback no longer count it.
    fn release(&self, id: AnimationId) {
        self.steps.lock().in_flight.retain(|entry| entry.id != id);
    }

    // ========================================================================
    // Cancellation and queries
    // ========================================================================

    /// Cancel the steps of `widget`, or of every widget when `None`.
    ///
    /// Covers running steps and not-yet-started sequence steps alike.
    /// Callbacks of cancelled steps never run.
    pub fn stop(&self, widget: Option<WidgetId>) {
        let mut set = self.steps.lock();
        let (removed, cancelled) =
            set.cancel_matching(|w| widget.is_none_or(|target| target == w));
        drop(set);

        if !cancelled.is_empty() {
            match widget {
                Some(widget) => {
                    tracing::debug!(%widget, cancelled = cancelled.len(), "animations stopped")
                }
                None => tracing::debug!(cancelled = cancelled.len(), "all animations stopped"),
            }
        }
        self.report_cancelled(&cancelled, CancelReason::Stopped);
        drop(removed);
    }

    /// Whether the system is active and any step is still scheduled.
    pub fn is_busy(&self) -> bool {
        self.is_active() && self.steps.lock().live_count() > 0
    }

    /// Number of steps not yet finished or cancelled.
    pub fn active_count(&self) -> usize {
        self.steps.lock().live_count()
    }

    /// Whether `widget` has any scheduled step.
    pub fn is_animating(&self, widget: WidgetId) -> bool {
        let set = self.steps.lock();
        set.queued.iter().any(|step| step.widget == widget)
            || set
                .in_flight
                .iter()
                .any(|entry| entry.widget == widget && !entry.cancel.is_cancelled())
    }

    /// Snapshots of the queued steps targeting `widget`, in insertion order.
    ///
    /// Steps checked out by a running tick are not included.
    pub fn steps_for(&self, widget: WidgetId) -> Vec<StepSnapshot> {
        self.steps
            .lock()
            .queued
            .iter()
            .filter(|step| step.widget == widget)
            .map(AnimationStep::snapshot)
            .collect()
    }

    /// Take every lifecycle event recorded since the last drain.
    pub fn drain_events(&self) -> Vec<AnimationEvent> {
        self.events.lock().drain()
    }

    fn emit(&self, event: AnimationEvent) {
        self.events.lock().push(event);
    }

    fn report_cancelled(&self, cancelled: &[(AnimationId, WidgetId)], reason: CancelReason) {
        if cancelled.is_empty() {
            return;
        }
        let mut events = self.events.lock();
        for &(animation_id, widget) in cancelled {
            events.push(AnimationEvent::Cancelled {
                animation_id,
                widget,
                reason,
            });
        }
    }
}
