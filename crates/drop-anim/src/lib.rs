//! Tween scheduler for positioning GUI widgets over time.
//!
//! This crate provides:
//! - **Easing Functions**: the fixed family of timing curves steps can use
//! - **Animation Steps**: one scheduled position transition of one widget
//! - **Animation System**: the per-frame service that advances every step,
//!   fires completion callbacks and honours cancellation
//! - **Animation Events**: lifecycle notifications drained after each tick
//!
//! # Architecture
//!
//! ```text
//! AnimationSystem
//!   ├── WidgetHost   (reads/writes widget positions, reports liveness)
//!   ├── Clock        (supplies the frame time)
//!   ├── Active steps (insertion-ordered, guarded by a mutex)
//!   └── EventQueue   (Started / Ended / Cancelled)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let system = Arc::new(AnimationSystem::new(host, Arc::new(SystemClock)));
//! system.initialize();
//! system.move_to(widget, Point::new(200.0, 40.0), Duration::from_millis(500), Easing::BounceOut);
//!
//! // once per frame, after input and before drawing
//! system.update_animations();
//! ```

pub mod clock;
pub mod easing;
pub mod events;
pub mod host;
pub mod step;
pub mod system;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use easing::Easing;
pub use events::{AnimationEvent, CancelReason, EventQueue};
pub use host::WidgetHost;
pub use step::{AnimationStep, Callback, StepSnapshot};
pub use system::{AnimationSystem, OverlapPolicy};
pub use types::{AnimationId, AnimationState, Point, WidgetId};
