use thiserror::Error;

pub type Result<T, E = ModelError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Neither side of the game belongs to the modeled player.
    #[error("cannot determine which side '{username}' played")]
    AmbiguousColor { username: String },

    /// Nothing to estimate a rating from.
    #[error("insufficient data for a rating estimate")]
    InsufficientData,

    #[error("malformed move '{token}' at ply {ply}")]
    MalformedMove { ply: usize, token: String },

    #[error("game has no result")]
    UnfinishedGame,

    #[error("unsupported variant '{0}'")]
    UnsupportedVariant(String),

    #[error("empty game batch")]
    EmptyBatch,

    #[error("no usable games in batch of {total}")]
    NoUsableGames { total: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Collects per-game diagnostics without failing the game.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn push_error(&mut self, err: &ModelError) {
        self.push(&err.to_string());
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
