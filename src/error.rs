use thiserror::Error;

/// Errors that can occur when manipulating a game state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The move is not in the current legal-move set (also returned for any
    /// operation attempted after the game ended).
    #[error("move is not legal in the current state")]
    InvalidMove,
    /// Drawing with both hand and waste empty.
    #[error("no cards left to draw")]
    NoCardsToDraw,
}

/// Errors raised while replaying a notation log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("malformed notation entry '{0}'")]
    Malformed(String),
    #[error("entry '{entry}' cannot be applied: {source}")]
    Replay {
        entry: String,
        source: GameError,
    },
}

/// Errors surfaced by the evolutionary trainer.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("checkpoint version {found} is not supported (expected {expected})")]
    UnsupportedCheckpointVersion { found: u32, expected: u32 },
    #[error("weights file version {found} is not supported (expected {expected})")]
    UnsupportedWeightsVersion { found: u32, expected: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
