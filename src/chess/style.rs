//! Style scores from move notation alone.
//!
//! Nothing here replays the board: captures, checks and recaptures are read
//! off the SAN tokens, so the sacrifice count is an approximation.

use serde::Serialize;

use super::config::ModelConfig;
use super::trie::OpeningTrie;
use super::types::{GameRecord, PlayerColor};

/// Below this many games the profile is still settling.
pub const SETTLED_SAMPLE_SIZE: u32 = 30;

const NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    pub aggression: u8,
    pub tactical: u8,
    pub positional: u8,
    pub endgame: u8,
    pub sample_size: u32,
}

/// Monotone in `sample_size`, reaching 100 at 30 games.
pub fn confidence(sample_size: u32) -> u8 {
    let ratio = f64::from(sample_size) / f64::from(SETTLED_SAMPLE_SIZE);
    (100.0 * ratio.sqrt()).round().min(100.0) as u8
}

pub fn is_settling(sample_size: u32) -> bool {
    sample_size < SETTLED_SAMPLE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SanFeatures<'a> {
    piece: Piece,
    capture: bool,
    check: bool,
    /// `None` for castling.
    destination: Option<&'a str>,
}

impl<'a> SanFeatures<'a> {
    fn parse(san: &'a str) -> Self {
        let check = san.ends_with('+') || san.ends_with('#');
        let body = san.trim_end_matches(['+', '#']);

        if body.starts_with("O-O") {
            return Self {
                piece: Piece::King,
                capture: false,
                check,
                destination: None,
            };
        }

        let piece = match body.chars().next() {
            Some('N') => Piece::Knight,
            Some('B') => Piece::Bishop,
            Some('R') => Piece::Rook,
            Some('Q') => Piece::Queen,
            Some('K') => Piece::King,
            _ => Piece::Pawn,
        };
        let square = body.split('=').next().unwrap_or(body);
        let destination = square
            .len()
            .checked_sub(2)
            .and_then(|start| square.get(start..));

        Self {
            piece,
            capture: body.contains('x'),
            check,
            destination,
        }
    }

    fn recaptured_by(&self, reply: &SanFeatures<'_>) -> bool {
        self.capture
            && reply.capture
            && self.destination.is_some()
            && self.destination == reply.destination
    }

    /// Heavy piece, or a checking minor piece, taken back by a pawn or the
    /// king: material given up for the initiative.
    fn is_sacrifice(&self, reply: &SanFeatures<'_>) -> bool {
        let offered = match self.piece {
            Piece::Queen | Piece::Rook => true,
            Piece::Knight | Piece::Bishop => self.check,
            Piece::Pawn | Piece::King => false,
        };
        offered
            && self.recaptured_by(reply)
            && matches!(reply.piece, Piece::Pawn | Piece::King)
    }
}

/// Move-choice counts over the games that have at least one player move.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleMetrics {
    pub games: u32,
    pub player_moves: u32,
    pub captures: u32,
    pub checks: u32,
    pub forcing_moves: u32,
    pub exchanges: u32,
    pub sacrifices: u32,
    pub endgames_reached: u32,
    pub endgames_held: u32,
}

impl StyleMetrics {
    pub fn collect(games: &[GameRecord], config: &ModelConfig) -> Self {
        let mut metrics = Self::default();

        for game in games {
            let features: Vec<SanFeatures<'_>> =
                game.moves.iter().map(|mv| SanFeatures::parse(mv)).collect();

            let mut player_moves = 0;
            for (ply, _) in game.player_moves() {
                let san = &features[ply];
                player_moves += 1;
                metrics.captures += u32::from(san.capture);
                metrics.checks += u32::from(san.check);
                metrics.forcing_moves += u32::from(san.capture || san.check);

                if let Some(reply) = features.get(ply + 1) {
                    metrics.exchanges += u32::from(san.recaptured_by(reply));
                    metrics.sacrifices += u32::from(san.is_sacrifice(reply));
                }
            }

            if player_moves == 0 {
                continue;
            }
            metrics.games += 1;
            metrics.player_moves += player_moves;

            if config.phases.reaches_endgame(game.moves.len()) {
                metrics.endgames_reached += 1;
                metrics.endgames_held += u32::from(!game.result.is_loss());
            }
        }

        metrics
    }

    fn per_move(&self, count: u32) -> f64 {
        ratio(count, self.player_moves)
    }

    fn per_game(&self, count: u32) -> f64 {
        ratio(count, self.games)
    }
}

fn ratio(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(total)
    }
}

/// Min/max normalization into [0, 1].
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

fn to_score(unit: f64) -> u8 {
    (unit * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Share of the player's first-move decisions that went to the favourite
/// move, across the given tries.
fn repertoire_concentration(tries: &[&OpeningTrie]) -> Option<f64> {
    let mut favourite = 0;
    let mut decisions = 0;

    for trie in tries {
        let decision_nodes: Vec<_> = match trie.color {
            PlayerColor::White => vec![&trie.root],
            PlayerColor::Black => trie.root.children.iter().collect(),
        };
        for node in decision_nodes {
            if let Some(best) = node.most_played() {
                favourite += best.visit_count;
                decisions += node.continued();
            }
        }
    }

    (decisions > 0).then(|| ratio(favourite, decisions))
}

/// Scores the player's style over `games`, using `tries` for repertoire
/// breadth.
pub fn score_style(games: &[GameRecord], tries: &[&OpeningTrie], config: &ModelConfig) -> StyleProfile {
    let metrics = StyleMetrics::collect(games, config);

    let capture_rate = metrics.per_move(metrics.captures);
    let forcing_rate = metrics.per_move(metrics.forcing_moves);
    let sacrifices_per_game = metrics.per_game(metrics.sacrifices);
    let exchanges_per_game = metrics.per_game(metrics.exchanges);
    let average_length = metrics.per_game(metrics.player_moves);

    let aggression = 0.7 * normalize(capture_rate, 0.05, 0.35)
        + 0.3 * normalize(sacrifices_per_game, 0.0, 0.5);

    let tactical = normalize(forcing_rate, 0.08, 0.45);

    let length_weight = 0.5 + 0.5 * normalize(average_length, 15.0, 60.0);
    let concentration = repertoire_concentration(tries).unwrap_or(NEUTRAL_SCORE);
    let positional = 0.75 * (1.0 - tactical) * length_weight
        + 0.15 * concentration
        + 0.10 * normalize(exchanges_per_game, 0.0, 6.0);

    let endgame = if metrics.endgames_reached == 0 {
        NEUTRAL_SCORE
    } else {
        ratio(metrics.endgames_held, metrics.endgames_reached)
    };

    let (aggression, tactical, positional, endgame) = if metrics.games == 0 {
        (0.0, 0.0, 0.0, NEUTRAL_SCORE)
    } else {
        (aggression, tactical, positional, endgame)
    };

    StyleProfile {
        aggression: to_score(aggression),
        tactical: to_score(tactical),
        positional: to_score(positional),
        endgame: to_score(endgame),
        sample_size: metrics.games,
    }
}
