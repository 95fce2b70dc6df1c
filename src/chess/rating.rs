use serde::Serialize;
use std::collections::BTreeMap;

use super::error::{ModelError, Result};
use super::error_profile::ErrorProfile;
use super::style::confidence as style_confidence;
use super::timecontrol::TimeControl;
use super::types::GameRecord;

/// Online rating per time control; a missing key means no rating.
pub type KnownRatings = BTreeMap<TimeControl, u32>;

const MIN_RATING: f64 = 100.0;
const MAX_RATING: f64 = 3000.0;

/// Rating points lost per unit of aggregate blunder rate.
const BLUNDER_PENALTY: f64 = 1000.0;
const MAX_BLUNDER_PENALTY: f64 = 400.0;

/// Evaluated moves needed for the full evaluation share of the confidence.
const SATURATING_EVALUATED_MOVES: f64 = 600.0;
const MAX_CONFIDENCE: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FideEstimate {
    pub rating: u32,
    /// 0..=100.
    pub confidence: u8,
}

/// Blend weight and online-to-over-the-board offset. Correspondence ratings
/// say little about over-the-board play and are left out.
fn blend_entry(time_control: TimeControl) -> Option<(f64, f64)> {
    match time_control {
        TimeControl::UltraBullet => Some((0.25, -450.0)),
        TimeControl::Bullet => Some((0.5, -350.0)),
        TimeControl::Blitz => Some((1.0, -300.0)),
        TimeControl::Rapid => Some((1.5, -200.0)),
        TimeControl::Classical => Some((2.0, -150.0)),
        TimeControl::Correspondence => None,
    }
}

fn blended_rating(known: &KnownRatings) -> Option<f64> {
    let (weighted, total_weight) = known
        .iter()
        .filter_map(|(tc, rating)| {
            let (weight, offset) = blend_entry(*tc)?;
            Some((weight * (f64::from(*rating) + offset), weight))
        })
        .fold((0.0, 0.0), |(sum, weights), (value, weight)| {
            (sum + value, weights + weight)
        });

    (total_weight > 0.0).then(|| weighted / total_weight)
}

/// Rating implied by average centipawn loss alone.
fn rating_from_acpl(acpl: f64) -> f64 {
    3100.0 * (-0.01 * acpl).exp()
}

/// Estimates an over-the-board rating from online ratings and the error
/// profile. Fails when neither carries any signal.
pub fn estimate_fide(
    known: &KnownRatings,
    errors: &ErrorProfile,
    style_sample_size: u32,
) -> Result<FideEstimate> {
    let blended = blended_rating(known);
    let base = blended
        .or_else(|| errors.average_centipawn_loss().map(rating_from_acpl))
        .ok_or(ModelError::InsufficientData)?;

    let penalty = (BLUNDER_PENALTY * errors.aggregate_blunder_rate()).min(MAX_BLUNDER_PENALTY);
    let rating = (base - penalty).clamp(MIN_RATING, MAX_RATING).round() as u32;

    let evaluated = f64::from(errors.total_sample_moves());
    let confidence = 55.0 * (evaluated / SATURATING_EVALUATED_MOVES).min(1.0)
        + 35.0 * f64::from(style_confidence(style_sample_size)) / 100.0
        + if blended.is_some() { 10.0 } else { 0.0 };

    Ok(FideEstimate {
        rating,
        confidence: confidence.min(MAX_CONFIDENCE).round() as u8,
    })
}

/// Latest rated-game rating per time control, for callers without a
/// profile lookup.
pub fn known_ratings_from_games(games: &[GameRecord]) -> KnownRatings {
    let mut latest: BTreeMap<TimeControl, (Option<chrono::DateTime<chrono::Utc>>, u32)> =
        BTreeMap::new();

    for game in games.iter().filter(|game| game.rated) {
        let (Some(tc), Some(rating)) = (game.time_control, game.player_rating) else {
            continue;
        };
        match latest.get(&tc) {
            Some((seen_at, _)) if *seen_at > game.played_at => {}
            _ => {
                latest.insert(tc, (game.played_at, rating));
            }
        }
    }

    latest
        .into_iter()
        .map(|(tc, (_, rating))| (tc, rating))
        .collect()
}
