//! Drop it or Die configuration system
//!
//! Settings are read from `drop-it.toml` in the working directory and can be
//! overridden per run with `DROP_*` environment variables.

use drop_anim::{Easing, OverlapPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "drop-it.toml";

/// Longest accepted animation duration, in seconds.
pub const MAX_ANIMATION_SECS: f32 = 3600.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DropConfig {
    pub window: WindowConfig,
    pub players: PlayersConfig,
    pub animation: AnimationConfig,
    pub demo: DemoConfig,
}

/// Window geometry and frame pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Frames per second the loop is paced at
    pub frame_rate: u32,
}

/// Player display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    pub first: String,
    pub second: String,
}

/// Dice and score label animation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Seconds a die takes to fall onto the table
    pub drop_secs: f32,
    /// Delay between consecutive dice starting to fall
    pub stagger_secs: f32,
    pub drop_easing: Easing,
    /// Seconds for each half of the score label bump
    pub score_bump_secs: f32,
    pub overlap: OverlapPolicy,
}

/// Headless demo run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub rounds: u32,
    /// Fixed seed for dice rolls; random when unset
    pub seed: Option<u64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Drop it or Die".to_string(),
            width: 1024,
            height: 512,
            frame_rate: 60,
        }
    }
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            first: "pl1".to_string(),
            second: "pl2".to_string(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            drop_secs: 0.8,
            stagger_secs: 0.15,
            drop_easing: Easing::BounceOut,
            score_bump_secs: 0.25,
            overlap: OverlapPolicy::Stack,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            seed: None,
        }
    }
}

impl WindowConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

impl AnimationConfig {
    pub fn drop_duration(&self) -> Duration {
        secs(self.drop_secs)
    }

    pub fn stagger(&self) -> Duration {
        secs(self.stagger_secs)
    }

    pub fn score_bump_duration(&self) -> Duration {
        secs(self.score_bump_secs)
    }
}

fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

impl DropConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `drop-it.toml` from the current directory, or defaults if it is
    /// missing or unusable
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparseable values are logged and ignored.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup, e.g. a map in tests.
    pub fn merge_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Window settings
        if let Some(title) = lookup("DROP_TITLE") {
            self.window.title = title;
        }
        override_parsed(&lookup, "DROP_WIDTH", &mut self.window.width);
        override_parsed(&lookup, "DROP_HEIGHT", &mut self.window.height);
        override_parsed(&lookup, "DROP_FRAME_RATE", &mut self.window.frame_rate);

        // Players
        if let Some(name) = lookup("DROP_PLAYER1") {
            self.players.first = name;
        }
        if let Some(name) = lookup("DROP_PLAYER2") {
            self.players.second = name;
        }

        // Animation
        override_parsed(&lookup, "DROP_ANIM_DROP_SECS", &mut self.animation.drop_secs);
        if let Some(val) = lookup("DROP_ANIM_EASING") {
            match parse_easing(&val) {
                Some(easing) => self.animation.drop_easing = easing,
                None => tracing::warn!(key = "DROP_ANIM_EASING", value = %val, "unknown easing ignored"),
            }
        }

        // Demo
        override_parsed(&lookup, "DROP_ROUNDS", &mut self.demo.rounds);
        if let Some(val) = lookup("DROP_SEED") {
            match val.parse::<u64>() {
                Ok(seed) => self.demo.seed = Some(seed),
                Err(_) => tracing::warn!(key = "DROP_SEED", value = %val, "invalid override ignored"),
            }
        }
    }

    /// Reject settings the game cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.window.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be at least 1".into()));
        }
        let durations = [
            ("drop_secs", self.animation.drop_secs),
            ("stagger_secs", self.animation.stagger_secs),
            ("score_bump_secs", self.animation.score_bump_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "animation.{name} must be a non-negative number of seconds, got {value}"
                )));
            }
            if value > MAX_ANIMATION_SECS {
                return Err(ConfigError::Invalid(format!(
                    "animation.{name} must be at most {MAX_ANIMATION_SECS} seconds, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from drop-it.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    /// 3. Validate the result
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config.validate()?;
        Ok(config)
    }
}

fn override_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) {
    let Some(val) = lookup(key) else {
        return;
    };
    match val.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => tracing::warn!(key, value = %val, "invalid override ignored"),
    }
}

fn parse_easing(name: &str) -> Option<Easing> {
    let wanted = name.trim().replace('-', "_").to_ascii_lowercase();
    toml::Value::String(wanted).try_into().ok()
}
