use std::sync::Arc;

use anyhow::{Context, Result};
use drop_anim::{AnimationSystem, ManualClock};
use drop_config::DropConfig;
use drop_game::{DiceGame, FrameLoop, InputEvent, LogSurface, Player, WidgetTree};

/// Frames allowed per round before the demo gives up.
const FRAMES_PER_ROUND_LIMIT: u64 = 60 * 60;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DropConfig::load().context("loading drop-it.toml")?;
    log::info!(
        "{} ({}x{} @ {} fps), {} rounds",
        config.window.title,
        config.window.width,
        config.window.height,
        config.window.frame_rate,
        config.demo.rounds
    );

    // The clock only moves between frames, so every frame ticks at a fixed step.
    let tree = Arc::new(WidgetTree::new());
    let clock = Arc::new(ManualClock::new());
    let system = Arc::new(
        AnimationSystem::new(tree.clone(), clock.clone())
            .with_overlap_policy(config.animation.overlap),
    );
    system.initialize();

    let game = DiceGame::new(&config, system, tree).context("building the game scene")?;
    let button = game
        .roll_button_position()
        .context("roll button missing from scene")?;
    let mut frames = FrameLoop::new(game, LogSurface::default());

    let interval = config.window.frame_interval();
    let frame_limit = FRAMES_PER_ROUND_LIMIT * (u64::from(config.demo.rounds) + 1);
    loop {
        let game = frames.game();
        let events = if game.rounds_played() >= config.demo.rounds {
            vec![InputEvent::Close]
        } else if frames.frame_count() >= frame_limit {
            log::warn!("frame limit reached after {} rounds", game.rounds_played());
            vec![InputEvent::Close]
        } else if game.is_idle() {
            vec![InputEvent::Click(button)]
        } else {
            Vec::new()
        };

        if !frames.frame(events) {
            break;
        }
        clock.advance(interval);
    }

    let board = frames.game().scoreboard();
    for player in Player::BOTH {
        log::info!("{}", board.label_text(player));
    }
    log::info!(
        "{} rounds in {} frames",
        board.rounds(),
        frames.surface().frames()
    );
    Ok(())
}
