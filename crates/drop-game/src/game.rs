//! Round controller.
//!
//! A press on the roll button throws four dice, drops them onto the table one
//! after another and, once the last die lands, scores the round and bumps the
//! winner's score label. Presses arriving while anything is still animating
//! are ignored.

use std::sync::{Arc, Weak};
use std::time::Duration;

use drop_anim::{AnimationSystem, Callback, Easing, Point, WidgetHost, WidgetId};
use drop_config::DropConfig;
use parking_lot::Mutex;

use crate::dice::{Dice, DiceRoll};
use crate::error::{GameError, GameResult};
use crate::layout::{Anchor, Size, reanchor, relayout};
use crate::score::{Player, RoundOutcome, Scoreboard};
use crate::widgets::{Widget, WidgetTree};

pub const ROLL_BUTTON_TEXT: &str = "Click me!";
pub const DIE_SIZE: f32 = 48.0;
/// How far a score label rises when its player wins a round.
pub const BUMP_HEIGHT: f32 = 10.0;

/// Horizontal table slots of the four dice, as window fractions.
const DIE_COLUMNS: [f32; 4] = [0.2, 0.32, 0.68, 0.8];
const TABLE_ROW: f32 = 0.8;

/// Handles of the widgets the game drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneWidgets {
    pub score_labels: [WidgetId; 2],
    pub roll_button: WidgetId,
    pub dice: [WidgetId; 4],
    pub result: WidgetId,
}

#[derive(Debug, Clone, Copy)]
struct Tuning {
    drop: Duration,
    stagger: Duration,
    easing: Easing,
    bump: Duration,
}

#[derive(Debug)]
struct RoundState {
    scoreboard: Scoreboard,
    dice: Dice,
    window: Size,
    last_outcome: Option<RoundOutcome>,
}

pub struct DiceGame {
    system: Arc<AnimationSystem>,
    tree: Arc<WidgetTree>,
    widgets: SceneWidgets,
    tuning: Tuning,
    state: Arc<Mutex<RoundState>>,
}

/// Resting place of die `slot` for a window.
pub fn table_position(window: Size, slot: usize) -> Point {
    let column = DIE_COLUMNS[slot % DIE_COLUMNS.len()];
    Point::new(window.width * column, window.height * TABLE_ROW)
}

impl DiceGame {
    /// Build the scene into `tree`. The scheduler must already be
    /// initialized and animate the same tree.
    pub fn new(
        config: &DropConfig,
        system: Arc<AnimationSystem>,
        tree: Arc<WidgetTree>,
    ) -> GameResult<Self> {
        config.validate()?;
        if !system.is_active() {
            return Err(GameError::Inactive);
        }
        let window = &config.window;
        let size = Size::new(window.width as f32, window.height as f32);
        let scoreboard = Scoreboard::new(&config.players.first, &config.players.second);

        let score_labels = [
            tree.insert(
                Widget::label(scoreboard.label_text(Player::First))
                    .with_origin(0.0, 0.0)
                    .anchored(Anchor::percent(1.0, 2.0)),
            ),
            tree.insert(
                Widget::label(scoreboard.label_text(Player::Second))
                    .with_origin(1.0, 0.0)
                    .anchored(Anchor::percent(99.0, 2.0)),
            ),
        ];
        let roll_button = tree.insert(
            Widget::button(ROLL_BUTTON_TEXT)
                .with_size(150.0, 70.0)
                .with_text_size(28)
                .with_origin(0.5, 0.5)
                .anchored(Anchor::percent(50.0, 50.0)),
        );
        let dice: [WidgetId; 4] = std::array::from_fn(|slot| {
            tree.insert(
                Widget::label("?")
                    .with_size(DIE_SIZE, DIE_SIZE)
                    .with_text_size(32)
                    .with_origin(0.5, 0.5)
                    .at(table_position(size, slot)),
            )
        });
        let result = tree.insert(
            Widget::label("")
                .with_text_size(24)
                .with_origin(0.5, 0.5)
                .anchored(Anchor::percent(50.0, 25.0)),
        );
        relayout(&tree, size);

        let animation = &config.animation;
        tracing::info!(
            title = %window.title,
            width = window.width,
            height = window.height,
            first = %config.players.first,
            second = %config.players.second,
            "scene built"
        );

        Ok(Self {
            system,
            tree,
            widgets: SceneWidgets {
                score_labels,
                roll_button,
                dice,
                result,
            },
            tuning: Tuning {
                drop: animation.drop_duration(),
                stagger: animation.stagger(),
                easing: animation.drop_easing,
                bump: animation.score_bump_duration(),
            },
            state: Arc::new(Mutex::new(RoundState {
                scoreboard,
                dice: Dice::new(config.demo.seed),
                window: size,
                last_outcome: None,
            })),
        })
    }

    pub fn widgets(&self) -> &SceneWidgets {
        &self.widgets
    }

    pub fn tree(&self) -> &Arc<WidgetTree> {
        &self.tree
    }

    pub fn system(&self) -> &Arc<AnimationSystem> {
        &self.system
    }

    pub fn is_idle(&self) -> bool {
        !self.system.is_busy()
    }

    pub fn rounds_played(&self) -> u32 {
        self.state.lock().scoreboard.rounds()
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.state.lock().scoreboard.clone()
    }

    pub fn last_outcome(&self) -> Option<RoundOutcome> {
        self.state.lock().last_outcome
    }

    /// Centre of the roll button, if it still exists.
    pub fn roll_button_position(&self) -> Option<Point> {
        self.tree.position(self.widgets.roll_button)
    }

    /// Route a click; only the roll button reacts. Returns whether a round
    /// started.
    pub fn click(&self, at: Point) -> bool {
        match self.tree.hit_test(at) {
            Some(hit) if hit == self.widgets.roll_button => self.press_roll(),
            _ => false,
        }
    }

    /// Start a round unless animations are still running.
    pub fn press_roll(&self) -> bool {
        if self.system.is_busy() {
            tracing::debug!("roll ignored while animating");
            return false;
        }

        let (roll, window) = {
            let mut state = self.state.lock();
            (state.dice.roll(), state.window)
        };
        self.tree.set_text(self.widgets.result, "");

        let last = self.widgets.dice.len() - 1;
        for (slot, (&die, face)) in self.widgets.dice.iter().zip(roll.faces()).enumerate() {
            self.tree.set_text(die, face.to_string());

            let landing = table_position(window, slot);
            let above = Point::new(landing.x, -DIE_SIZE);
            self.tree.set_position(die, above);

            let path = [above, landing];
            let durations = [self.tuning.stagger.saturating_mul(slot as u32), self.tuning.drop];
            let easings = [Easing::Linear, self.tuning.easing];
            if slot == last {
                let callbacks = vec![Box::new(|| {}) as Callback, self.round_finisher(roll)];
                self.system
                    .sequence_with_callbacks(die, &path, &durations, callbacks, &easings);
            } else {
                self.system.sequence_advanced(die, &path, &durations, &easings);
            }
        }

        tracing::debug!(faces = ?roll.faces(), "dice thrown");
        true
    }

    /// Reflow anchored widgets and, when idle, put the dice back on the table.
    pub fn resize(&self, window: Size) {
        if window.is_empty() {
            tracing::warn!(
                width = window.width,
                height = window.height,
                "ignoring resize to empty window"
            );
            return;
        }
        self.state.lock().window = window;
        relayout(&self.tree, window);
        if self.system.is_busy() {
            return;
        }
        for (slot, &die) in self.widgets.dice.iter().enumerate() {
            self.tree.set_position(die, table_position(window, slot));
        }
    }

    /// Completion of the last die: score the round and bump the winner.
    fn round_finisher(&self, roll: DiceRoll) -> Callback {
        let state = Arc::clone(&self.state);
        let tree = Arc::clone(&self.tree);
        let system: Weak<AnimationSystem> = Arc::downgrade(&self.system);
        let widgets = self.widgets;
        let bump = self.tuning.bump;

        Box::new(move || {
            let (outcome, labels, result, round) = {
                let mut state = state.lock();
                let outcome = state.scoreboard.record(&roll);
                state.last_outcome = Some(outcome);
                let board = &state.scoreboard;
                (
                    outcome,
                    Player::BOTH.map(|player| board.label_text(player)),
                    board.outcome_text(outcome),
                    board.rounds(),
                )
            };

            for (&label, text) in widgets.score_labels.iter().zip(labels) {
                tree.set_text(label, text);
            }
            tree.set_text(widgets.result, result);
            tracing::info!(
                round,
                first = roll.first.sum(),
                second = roll.second.sum(),
                ?outcome,
                "round finished"
            );

            let Some(winner) = outcome.winner() else {
                return;
            };
            if let Some(system) = system.upgrade() {
                let label = widgets.score_labels[winner.index()];
                bump_label(&system, &tree, &state, label, bump);
            }
        })
    }
}

/// Raise a label and let it settle back where it was. Once it lands the
/// label is snapped to its anchor, which may have moved if the window was
/// resized mid-bump.
fn bump_label(
    system: &AnimationSystem,
    tree: &Arc<WidgetTree>,
    state: &Arc<Mutex<RoundState>>,
    label: WidgetId,
    duration: Duration,
) {
    let Some(rest) = tree.position(label) else {
        return;
    };
    let raised = rest.offset(0.0, -BUMP_HEIGHT);

    let tree = Arc::clone(tree);
    let state = Arc::clone(state);
    let settle: Callback = Box::new(move || {
        let window = state.lock().window;
        reanchor(&tree, label, window);
    });
    system.sequence_with_callbacks(
        label,
        &[raised, rest],
        &[duration, duration],
        vec![Box::new(|| {}) as Callback, settle],
        &[Easing::EaseOut, Easing::BackOut],
    );
}
