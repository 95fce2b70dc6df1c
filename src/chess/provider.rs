//! Game records as the chess server exports them.
//!
//! Only the fields the normalizer reads are modeled; everything else in the
//! provider JSON is ignored on deserialization.

use serde::Deserialize;

/// Engine evaluation from white's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Centipawns(i32),
    /// Moves to mate; negative when black mates.
    Mate(i32),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderGame {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rated: Option<bool>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
    /// PGN-style `TimeControl` tag, used when neither `speed` nor `clock` is set.
    #[serde(default)]
    pub time_control: Option<String>,
    #[serde(default)]
    pub clock: Option<ProviderClock>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    /// `"white"` or `"black"`; absent for draws and unfinished games.
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub players: ProviderPlayers,
    /// Space-separated SAN or full PGN movetext.
    #[serde(default)]
    pub moves: String,
    /// One entry per ply when the server analysed the game.
    #[serde(default)]
    pub analysis: Option<Vec<ProviderEval>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProviderClock {
    /// Seconds.
    pub initial: u32,
    /// Seconds.
    #[serde(default)]
    pub increment: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPlayers {
    #[serde(default)]
    pub white: ProviderPlayer,
    #[serde(default)]
    pub black: ProviderPlayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPlayer {
    #[serde(default)]
    pub user: Option<ProviderUser>,
    #[serde(default)]
    pub rating: Option<u32>,
}

impl ProviderPlayer {
    pub fn matches(&self, username: &str) -> bool {
        let Some(user) = &self.user else {
            return false;
        };
        [user.name.as_deref(), user.id.as_deref()]
            .into_iter()
            .flatten()
            .any(|identity| identity.trim().eq_ignore_ascii_case(username.trim()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProviderEval {
    #[serde(default)]
    pub eval: Option<i32>,
    #[serde(default)]
    pub mate: Option<i32>,
}

impl ProviderEval {
    pub fn evaluation(&self) -> Option<Evaluation> {
        match (self.mate, self.eval) {
            (Some(mate), _) => Some(Evaluation::Mate(mate)),
            (None, Some(cp)) => Some(Evaluation::Centipawns(cp)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_minimal() {
        let game: ProviderGame = serde_json::from_value(json!({
            "moves": "e4 e5",
            "players": {
                "white": {"user": {"name": "Alice", "id": "alice"}, "rating": 1500},
                "black": {"user": {"name": "Bob"}}
            },
            "winner": "white",
            "unknownField": [1, 2, 3]
        }))
        .unwrap();

        assert_eq!(game.moves, "e4 e5");
        assert_eq!(game.players.white.rating, Some(1500));
        assert!(game.analysis.is_none());
        assert!(game.players.white.matches("ALICE"));
        assert!(game.players.black.matches(" bob "));
        assert!(!game.players.black.matches("alice"));
    }

    #[test]
    fn test_anonymous_player_never_matches() {
        let player = ProviderPlayer::default();
        assert!(!player.matches("anyone"));
    }

    #[test]
    fn test_provider_eval_prefers_mate() {
        let eval: ProviderEval = serde_json::from_value(json!({"eval": 900, "mate": 2})).unwrap();
        assert_eq!(eval.evaluation(), Some(Evaluation::Mate(2)));
        assert_eq!(ProviderEval::default().evaluation(), None);
    }
}
