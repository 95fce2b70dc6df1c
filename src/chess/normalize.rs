use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::error::{ErrorAccumulator, ModelError, Result};
use super::movetext::parse_movetext_mainline;
use super::provider::{Evaluation, ProviderGame};
use super::timecontrol::{TimeControl, categorize_timecontrol};
use super::types::{GameRecord, GameResult, PlayerColor};

/// Evaluations are clamped to this many centipawns; forced mates count as it.
pub const EVAL_CLAMP_CP: i32 = 1000;

const DRAW_STATUSES: &[&str] = &[
    "draw",
    "stalemate",
    "repetition",
    "agreed",
    "insufficient",
    "insufficientmaterial",
    "timevsinsufficientmaterial",
    "50move",
    "outoftime",
];

/// Normalizes one provider record from `username`'s point of view.
pub fn normalize(game: &ProviderGame, username: &str) -> Result<GameRecord> {
    if let Some(variant) = game.variant.as_deref()
        && !variant.eq_ignore_ascii_case("standard")
    {
        return Err(ModelError::UnsupportedVariant(variant.to_string()));
    }

    let player_color = player_color(game, username)?;
    let mut parsed = parse_movetext_mainline(&game.moves);
    let result = game_result(game, parsed.outcome.as_deref(), player_color)?;

    let mut diagnostics = ErrorAccumulator::default();
    if let Some(err) = parsed.error.take() {
        debug!(
            "game {}: truncated to {} moves: {err}",
            game.id.as_deref().unwrap_or("?"),
            parsed.sans.len()
        );
        diagnostics.push_error(&err);
    }

    let evals: Option<Vec<Option<Evaluation>>> = match &game.analysis {
        Some(analysis) if !analysis.is_empty() => {
            Some(analysis.iter().map(|e| e.evaluation()).collect())
        }
        _ if parsed.has_evals() => Some(parsed.evals.clone()),
        _ => None,
    };
    let eval_deltas = evals.map(|evals| {
        let deltas = centipawn_losses(&evals);
        if deltas.len() < evals.len().min(parsed.sans.len()) {
            diagnostics.push(&format!("analysis stops at ply {}", deltas.len() + 1));
        }
        deltas
    });

    let player = match player_color {
        PlayerColor::White => &game.players.white,
        PlayerColor::Black => &game.players.black,
    };

    let record = GameRecord {
        id: game.id.clone(),
        moves: parsed.sans,
        player_color,
        result,
        eval_deltas: None,
        time_control: time_control(game),
        played_at: game.created_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        player_rating: player.rating,
        rated: game.rated.unwrap_or(false),
        parse_error: diagnostics.take(),
    };
    Ok(match eval_deltas {
        Some(deltas) => record.with_eval_deltas(deltas),
        None => record,
    })
}

fn player_color(game: &ProviderGame, username: &str) -> Result<PlayerColor> {
    match (
        game.players.white.matches(username),
        game.players.black.matches(username),
    ) {
        (true, false) => Ok(PlayerColor::White),
        (false, true) => Ok(PlayerColor::Black),
        _ => Err(ModelError::AmbiguousColor {
            username: username.to_string(),
        }),
    }
}

fn game_result(
    game: &ProviderGame,
    pgn_outcome: Option<&str>,
    color: PlayerColor,
) -> Result<GameResult> {
    let winner = match game.winner.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("white") => Some(Some(PlayerColor::White)),
        Some("black") => Some(Some(PlayerColor::Black)),
        _ => None,
    };

    let winner = winner
        .or_else(|| {
            let status = game.status.as_deref()?.to_ascii_lowercase();
            DRAW_STATUSES.contains(&status.as_str()).then_some(None)
        })
        .or_else(|| match pgn_outcome? {
            "1-0" => Some(Some(PlayerColor::White)),
            "0-1" => Some(Some(PlayerColor::Black)),
            "1/2-1/2" => Some(None),
            _ => None,
        })
        .ok_or(ModelError::UnfinishedGame)?;

    Ok(match winner {
        None => GameResult::Draw,
        Some(side) if side == color => GameResult::Win,
        Some(_) => GameResult::Loss,
    })
}

fn time_control(game: &ProviderGame) -> Option<TimeControl> {
    game.speed
        .as_deref()
        .and_then(TimeControl::from_speed)
        .or_else(|| {
            game.clock
                .map(|clock| TimeControl::from_clock(clock.initial, clock.increment))
        })
        .or_else(|| game.time_control.as_deref().and_then(categorize_timecontrol))
}

/// White-relative centipawns of the position after ply `index`.
fn eval_cp(eval: Evaluation, index: usize) -> i32 {
    match eval {
        Evaluation::Centipawns(cp) => cp.clamp(-EVAL_CLAMP_CP, EVAL_CLAMP_CP),
        Evaluation::Mate(n) if n > 0 => EVAL_CLAMP_CP,
        Evaluation::Mate(n) if n < 0 => -EVAL_CLAMP_CP,
        // Mate on the board: the side that just moved delivered it.
        Evaluation::Mate(_) if index.is_multiple_of(2) => EVAL_CLAMP_CP,
        Evaluation::Mate(_) => -EVAL_CLAMP_CP,
    }
}

/// Converts per-ply evaluations (position after each ply) into the
/// centipawn loss of the side that moved. Stops at the first missing entry.
pub fn centipawn_losses(evals: &[Option<Evaluation>]) -> Vec<u32> {
    let mut before = 0;
    let mut losses = Vec::with_capacity(evals.len());

    for (index, eval) in evals.iter().enumerate() {
        let Some(eval) = eval else { break };
        let after = eval_cp(*eval, index);
        let loss = if index.is_multiple_of(2) {
            before - after
        } else {
            after - before
        };
        losses.push(loss.max(0) as u32);
        before = after;
    }

    losses
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGame {
    pub index: usize,
    pub id: Option<String>,
    pub error: ModelError,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub games: Vec<GameRecord>,
    pub skipped: Vec<SkippedGame>,
}

/// Normalizes a batch, dropping games that cannot be attributed or finished.
/// Fails only when the batch is empty or nothing survives.
pub fn normalize_batch(games: &[ProviderGame], username: &str) -> Result<NormalizedBatch> {
    if games.is_empty() {
        return Err(ModelError::EmptyBatch);
    }

    let mut batch = NormalizedBatch::default();
    for (index, game) in games.iter().enumerate() {
        match normalize(game, username) {
            Ok(record) => batch.games.push(record),
            Err(error) => {
                warn!(
                    "skipping game {} ({}): {error}",
                    index,
                    game.id.as_deref().unwrap_or("?")
                );
                batch.skipped.push(SkippedGame {
                    index,
                    id: game.id.clone(),
                    error,
                });
            }
        }
    }

    if batch.games.is_empty() {
        return Err(ModelError::NoUsableGames { total: games.len() });
    }

    debug!(
        "normalized {} of {} games for {username}",
        batch.games.len(),
        games.len()
    );
    Ok(batch)
}
