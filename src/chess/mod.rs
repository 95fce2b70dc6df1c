pub mod config;
pub mod error;
pub mod error_profile;
pub mod filter;
mod movetext;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod rating;
pub mod style;
pub mod timecontrol;
pub mod trie;
pub mod types;

pub use config::{ErrorThresholds, ModelConfig, PhaseBoundaries};
pub use error::{ErrorAccumulator, ModelError, Result};
pub use error_profile::{ErrorProfile, PhaseCounts, PhaseErrors, build_error_profile};
pub use filter::GameFilter;
pub use normalize::{NormalizedBatch, SkippedGame, normalize, normalize_batch};
pub use pipeline::{PlayerModel, RatingOutcome, build_player_model, model_games};
pub use provider::ProviderGame;
pub use rating::{FideEstimate, KnownRatings, estimate_fide, known_ratings_from_games};
pub use style::{StyleProfile, confidence, is_settling, score_style};
pub use timecontrol::TimeControl;
pub use trie::{OpeningTrie, TrieNode, build_trie, build_trie_filtered};
pub use types::{GameRecord, GameResult, OutcomeTally, Phase, PlayerColor};
