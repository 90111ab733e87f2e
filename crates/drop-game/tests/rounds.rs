use std::sync::Arc;
use std::time::Duration;

use drop_anim::{AnimationSystem, ManualClock, OverlapPolicy, Point, WidgetHost};
use drop_config::DropConfig;
use drop_game::game::table_position;
use drop_game::{DiceGame, FrameLoop, InputEvent, LogSurface, Player, Size, WidgetTree};

const FRAME: Duration = Duration::from_micros(16_667);

struct Harness {
    clock: Arc<ManualClock>,
    frames: FrameLoop<LogSurface>,
}

impl Harness {
    fn new(config: &DropConfig) -> anyhow::Result<Self> {
        let tree = Arc::new(WidgetTree::new());
        let clock = Arc::new(ManualClock::new());
        let system = Arc::new(
            AnimationSystem::new(tree.clone(), clock.clone())
                .with_overlap_policy(config.animation.overlap),
        );
        system.initialize();
        let game = DiceGame::new(config, system, tree)?;
        Ok(Self {
            clock,
            frames: FrameLoop::new(game, LogSurface::default()),
        })
    }

    fn game(&self) -> &DiceGame {
        self.frames.game()
    }

    fn step(&mut self, events: Vec<InputEvent>) -> bool {
        let open = self.frames.frame(events);
        self.clock.advance(FRAME);
        open
    }

    fn run_for(&mut self, duration: Duration) {
        let frames = (duration.as_secs_f64() / FRAME.as_secs_f64()).ceil() as usize;
        for _ in 0..frames {
            self.step(Vec::new());
        }
    }

    fn button(&self) -> anyhow::Result<Point> {
        self.game()
            .roll_button_position()
            .ok_or_else(|| anyhow::anyhow!("roll button missing"))
    }
}

fn seeded(seed: u64) -> DropConfig {
    let mut config = DropConfig::default();
    config.demo.seed = Some(seed);
    config
}

#[test]
fn dice_land_on_the_table() -> anyhow::Result<()> {
    let mut h = Harness::new(&seeded(3))?;
    let click = InputEvent::Click(h.button()?);
    h.step(vec![click]);
    assert!(!h.game().is_idle());

    h.run_for(Duration::from_millis(1300));

    let tree = h.game().tree();
    let window = Size::new(1024.0, 512.0);
    for (slot, &die) in h.game().widgets().dice.iter().enumerate() {
        assert_eq!(tree.position(die), Some(table_position(window, slot)));
    }
    assert_eq!(h.game().rounds_played(), 1);
    Ok(())
}

#[test]
fn round_result_updates_labels() -> anyhow::Result<()> {
    let mut h = Harness::new(&seeded(11))?;
    let click = InputEvent::Click(h.button()?);
    h.step(vec![click]);
    h.run_for(Duration::from_secs(2));

    let game = h.game();
    let board = game.scoreboard();
    let tree = game.tree();
    let widgets = game.widgets();
    for player in Player::BOTH {
        assert_eq!(
            tree.text(widgets.score_labels[player.index()]),
            Some(board.label_text(player))
        );
    }
    let outcome = game.last_outcome().ok_or_else(|| anyhow::anyhow!("no outcome"))?;
    assert_eq!(tree.text(widgets.result), Some(board.outcome_text(outcome)));
    assert!(game.is_idle());
    Ok(())
}

#[test]
fn winner_label_bumps_and_settles() -> anyhow::Result<()> {
    let (config, winner) = winning_config()?;

    let mut h = Harness::new(&config)?;
    let label = h.game().widgets().score_labels[winner.index()];
    let rest = h.game().tree().position(label);
    let click = InputEvent::Click(h.button()?);
    h.step(vec![click]);

    // last die lands at 0.45 + 0.8 seconds; the bump then takes two halves
    h.run_for(Duration::from_millis(1300));
    assert!(h.game().system().is_animating(label));

    h.run_for(Duration::from_millis(600));
    assert!(!h.game().system().is_animating(label));
    assert_eq!(h.game().tree().position(label), rest);
    assert_eq!(h.game().scoreboard().score(winner), 1);
    Ok(())
}

fn winning_config() -> anyhow::Result<(DropConfig, Player)> {
    (0..50)
        .find_map(|seed| {
            let mut dice = drop_game::Dice::new(Some(seed));
            let outcome = drop_game::RoundOutcome::of(&dice.roll());
            outcome.winner().map(|w| (seeded(seed), w))
        })
        .ok_or_else(|| anyhow::anyhow!("no winning seed"))
}

#[test]
fn resize_during_bump_settles_on_new_anchor() -> anyhow::Result<()> {
    let (config, winner) = winning_config()?;
    let mut h = Harness::new(&config)?;
    let label = h.game().widgets().score_labels[winner.index()];
    let click = InputEvent::Click(h.button()?);
    h.step(vec![click]);

    h.run_for(Duration::from_millis(1300));
    assert!(h.game().system().is_animating(label));

    let window = Size::new(640.0, 480.0);
    h.step(vec![InputEvent::Resize(window)]);
    h.run_for(Duration::from_millis(700));
    assert!(!h.game().system().is_animating(label));

    let anchor = h
        .game()
        .tree()
        .get(label)
        .and_then(|w| w.anchor)
        .ok_or_else(|| anyhow::anyhow!("score label lost its anchor"))?;
    assert_eq!(h.game().tree().position(label), Some(anchor.resolve(window)));
    Ok(())
}

#[test]
fn presses_are_ignored_until_idle() -> anyhow::Result<()> {
    let mut h = Harness::new(&seeded(5))?;
    let center = h.button()?;

    assert!(h.game().click(center));
    h.run_for(Duration::from_millis(500));
    assert!(!h.game().click(center));

    h.run_for(Duration::from_secs(2));
    assert_eq!(h.game().rounds_played(), 1);
    assert!(h.game().click(center));
    Ok(())
}

#[test]
fn demo_loop_plays_configured_rounds() -> anyhow::Result<()> {
    let mut config = seeded(21);
    config.demo.rounds = 3;
    let mut h = Harness::new(&config)?;
    let center = h.button()?;

    let mut guard = 0;
    loop {
        let events = if h.game().rounds_played() >= config.demo.rounds {
            vec![InputEvent::Close]
        } else if h.game().is_idle() {
            vec![InputEvent::Click(center)]
        } else {
            Vec::new()
        };
        if !h.step(events) {
            break;
        }
        guard += 1;
        assert!(guard < 10_000, "demo loop did not finish");
    }

    let board = h.game().scoreboard();
    assert_eq!(board.rounds(), 3);
    assert!(board.score(Player::First) + board.score(Player::Second) <= 3);
    assert!(!h.game().system().is_active());
    assert!(h.frames.surface().frames() > 0);
    assert_eq!(h.frames.surface().last_widget_count(), 8);
    Ok(())
}

#[test]
fn closing_mid_round_cancels_scoring() -> anyhow::Result<()> {
    let mut h = Harness::new(&seeded(8))?;
    let click = InputEvent::Click(h.button()?);
    h.step(vec![click]);
    h.run_for(Duration::from_millis(300));

    assert!(!h.step(vec![InputEvent::Close]));
    assert!(!h.frames.is_open());
    h.run_for(Duration::from_secs(3));

    assert_eq!(h.game().rounds_played(), 0);
    assert!(h.game().is_idle());
    Ok(())
}

#[test]
fn resize_recentres_the_button() -> anyhow::Result<()> {
    let mut h = Harness::new(&DropConfig::default())?;
    h.step(vec![InputEvent::Resize(Size::new(640.0, 480.0))]);

    assert_eq!(h.button()?, Point::new(320.0, 240.0));
    assert!(!h.game().click(Point::new(512.0, 256.0)));
    Ok(())
}

#[test]
fn replace_policy_still_finishes_rounds() -> anyhow::Result<()> {
    let mut config = seeded(2);
    config.animation.overlap = OverlapPolicy::Replace;
    let mut h = Harness::new(&config)?;
    let click = InputEvent::Click(h.button()?);
    h.step(vec![click]);
    h.run_for(Duration::from_secs(2));

    assert_eq!(h.game().rounds_played(), 1);
    Ok(())
}
