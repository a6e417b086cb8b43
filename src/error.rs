// Error type shared by configuration loading, snapshot construction and replay
//
// The search core never returns errors: eliminations and timeouts are game
// outcomes, not faults. Only the edges of the crate produce EngineError.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read config file: {0}")]
    ConfigRead(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[source] toml::de::Error),

    #[error("snake with id '{0}' not found in board state")]
    UnknownEntity(String),

    #[error("invalid board: {0}")]
    InvalidBoard(String),

    #[error("failed to read log file: {0}")]
    LogRead(#[source] std::io::Error),

    #[error("failed to parse JSON on line {line}: {source}")]
    LogParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    #[error("turn {0} not found in log file")]
    TurnNotFound(i32),
}
