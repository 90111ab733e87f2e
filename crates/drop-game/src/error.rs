use drop_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("animation system must be initialized before building the scene")]
    Inactive,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type GameResult<T> = Result<T, GameError>;
