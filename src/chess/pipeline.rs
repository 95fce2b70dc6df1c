use log::debug;
use serde::Serialize;

use super::config::ModelConfig;
use super::error::{ModelError, Result};
use super::error_profile::{ErrorProfile, build_error_profile};
use super::filter::GameFilter;
use super::normalize::normalize_batch;
use super::provider::ProviderGame;
use super::rating::{FideEstimate, KnownRatings, estimate_fide, known_ratings_from_games};
use super::style::{StyleProfile, confidence, score_style};
use super::trie::{OpeningTrie, build_trie};
use super::types::{GameRecord, PlayerColor};

/// Rating outcome as shown to clients: an estimate or an explicit reason
/// why there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RatingOutcome {
    Estimated(FideEstimate),
    Unavailable { reason: String },
}

impl From<Result<FideEstimate>> for RatingOutcome {
    fn from(result: Result<FideEstimate>) -> Self {
        match result {
            Ok(estimate) => Self::Estimated(estimate),
            Err(err) => Self::Unavailable {
                reason: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerModel {
    pub username: String,
    pub white: OpeningTrie,
    pub black: OpeningTrie,
    pub errors: ErrorProfile,
    pub style: StyleProfile,
    pub style_confidence: u8,
    pub rating: RatingOutcome,
    pub games_used: usize,
    pub games_skipped: usize,
}

/// Runs the modeling stages over already normalized games.
pub fn model_games(
    username: &str,
    games: &[GameRecord],
    known: &KnownRatings,
    config: &ModelConfig,
) -> PlayerModel {
    let ((white, black), errors) = rayon::join(
        || {
            rayon::join(
                || build_trie(games, PlayerColor::White),
                || build_trie(games, PlayerColor::Black),
            )
        },
        || build_error_profile(games, config),
    );

    let style = score_style(games, &[&white, &black], config);
    let rating = estimate_fide(known, &errors, style.sample_size).into();

    debug!(
        "{username}: {} games, {} evaluated moves, style sample {}",
        games.len(),
        errors.total_sample_moves(),
        style.sample_size
    );

    PlayerModel {
        username: username.to_string(),
        white,
        black,
        errors,
        style_confidence: confidence(style.sample_size),
        style,
        rating,
        games_used: games.len(),
        games_skipped: 0,
    }
}

/// Normalizes a provider batch, applies `filter`, and models what remains.
/// Known ratings fall back to the batch's own rated games when none are
/// given.
pub fn build_player_model(
    provider_games: &[ProviderGame],
    username: &str,
    known: &KnownRatings,
    filter: &GameFilter,
    config: &ModelConfig,
) -> Result<PlayerModel> {
    config.validate()?;
    let batch = normalize_batch(provider_games, username)?;

    let games: Vec<GameRecord> = filter.apply(&batch.games).cloned().collect();
    if games.is_empty() {
        return Err(ModelError::NoUsableGames {
            total: provider_games.len(),
        });
    }

    let derived;
    let known = if known.is_empty() {
        derived = known_ratings_from_games(&games);
        &derived
    } else {
        known
    };

    let mut model = model_games(username, &games, known, config);
    model.games_skipped = batch.skipped.len() + (batch.games.len() - games.len());
    Ok(model)
}
