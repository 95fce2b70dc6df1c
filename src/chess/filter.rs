use chrono::{DateTime, Utc};

use super::timecontrol::TimeControl;
use super::types::GameRecord;

/// Selects which games of a batch a trie or profile is built from.
///
/// The default filter accepts every game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    /// Accepted categories; empty accepts all, including games without one.
    pub time_controls: Vec<TimeControl>,
    pub rated_only: bool,
    pub since: Option<DateTime<Utc>>,
    pub min_moves: usize,
}

impl GameFilter {
    pub fn time_controls(mut self, time_controls: impl IntoIterator<Item = TimeControl>) -> Self {
        self.time_controls = time_controls.into_iter().collect();
        self
    }

    pub fn rated_only(mut self) -> Self {
        self.rated_only = true;
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn min_moves(mut self, min_moves: usize) -> Self {
        self.min_moves = min_moves;
        self
    }

    pub fn matches(&self, game: &GameRecord) -> bool {
        if !self.time_controls.is_empty()
            && !game
                .time_control
                .is_some_and(|tc| self.time_controls.contains(&tc))
        {
            return false;
        }

        if self.rated_only && !game.rated {
            return false;
        }

        // Undated games cannot prove they are recent enough.
        if let Some(since) = self.since
            && game.played_at.is_none_or(|played| played < since)
        {
            return false;
        }

        game.moves.len() >= self.min_moves
    }

    pub fn apply<'a>(&'a self, games: &'a [GameRecord]) -> impl Iterator<Item = &'a GameRecord> {
        games.iter().filter(move |game| self.matches(game))
    }
}
