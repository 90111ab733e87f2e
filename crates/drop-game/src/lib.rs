//! Drop it or Die game layer.
//!
//! Concrete collaborators for the animation scheduler: a headless widget tree
//! it animates, anchor layout, dice, scoring, the round controller and the
//! frame loop that ticks everything once per frame.

pub mod dice;
pub mod error;
pub mod frame_loop;
pub mod game;
pub mod layout;
pub mod score;
pub mod widgets;

pub use dice::{Dice, DiceRoll, PlayerRoll};
pub use error::{GameError, GameResult};
pub use frame_loop::{FrameLoop, InputEvent, LogSurface, Surface};
pub use game::{DiceGame, SceneWidgets};
pub use layout::{Anchor, Length, Size, reanchor, relayout};
pub use score::{Player, RoundOutcome, Scoreboard};
pub use widgets::{Widget, WidgetKind, WidgetTree};
