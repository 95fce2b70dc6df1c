use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::timecontrol::TimeControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    /// Whether the ply at `index` (0-based) was played by this color.
    pub fn owns_ply(self, index: usize) -> bool {
        match self {
            Self::White => index.is_multiple_of(2),
            Self::Black => !index.is_multiple_of(2),
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Game result from the modeled player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl GameResult {
    pub fn is_loss(self) -> bool {
        self == Self::Loss
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl OutcomeTally {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Opening,
    Middlegame,
    Endgame,
}

impl Phase {
    pub fn index(self) -> usize {
        match self {
            Self::Opening => 0,
            Self::Middlegame => 1,
            Self::Endgame => 2,
        }
    }
}

/// One played game, normalized to the modeled player's perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub id: Option<String>,

    /// Mainline SAN tokens, both sides, in play order.
    pub moves: Vec<String>,
    pub player_color: PlayerColor,
    pub result: GameResult,

    /// Centipawn loss per ply, aligned to `moves`. Never longer than `moves`.
    pub eval_deltas: Option<Vec<u32>>,

    pub time_control: Option<TimeControl>,
    pub played_at: Option<DateTime<Utc>>,
    pub player_rating: Option<u32>,
    pub rated: bool,

    /// NULL for clean games, otherwise what was truncated or ignored.
    pub parse_error: Option<String>,
}

impl GameRecord {
    pub fn new(moves: Vec<String>, player_color: PlayerColor, result: GameResult) -> Self {
        Self {
            id: None,
            moves,
            player_color,
            result,
            eval_deltas: None,
            time_control: None,
            played_at: None,
            player_rating: None,
            rated: false,
            parse_error: None,
        }
    }

    /// Attaches evaluation deltas, truncating them to the move count.
    pub fn with_eval_deltas(mut self, mut deltas: Vec<u32>) -> Self {
        deltas.truncate(self.moves.len());
        self.eval_deltas = Some(deltas);
        self
    }

    /// The modeled player's moves with their ply index.
    pub fn player_moves(&self) -> impl Iterator<Item = (usize, &str)> {
        let color = self.player_color;
        self.moves
            .iter()
            .enumerate()
            .filter(move |(ply, _)| color.owns_ply(*ply))
            .map(|(ply, mv)| (ply, mv.as_str()))
    }

}
