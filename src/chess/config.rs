use serde::Deserialize;

use super::error::{ModelError, Result};
use super::types::Phase;

/// Move-count phase boundaries, in full moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseBoundaries {
    pub opening_last_move: u32,
    pub middlegame_last_move: u32,
}

impl Default for PhaseBoundaries {
    fn default() -> Self {
        Self {
            opening_last_move: 10,
            middlegame_last_move: 30,
        }
    }
}

impl PhaseBoundaries {
    /// Phase of the ply at `index` (0-based, both sides counted).
    pub fn phase_of_ply(&self, index: usize) -> Phase {
        let full_move = (index / 2 + 1) as u64;
        if full_move <= u64::from(self.opening_last_move) {
            Phase::Opening
        } else if full_move <= u64::from(self.middlegame_last_move) {
            Phase::Middlegame
        } else {
            Phase::Endgame
        }
    }

    /// Whether a game of `plies` half-moves got past the middlegame.
    pub fn reaches_endgame(&self, plies: usize) -> bool {
        plies as u64 > 2 * u64::from(self.middlegame_last_move)
    }
}

/// Centipawn-loss classification thresholds. A move is classified when its
/// loss is strictly greater than the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorThresholds {
    pub inaccuracy: u32,
    pub mistake: u32,
    pub blunder: u32,
}

impl Default for ErrorThresholds {
    fn default() -> Self {
        Self {
            inaccuracy: 50,
            mistake: 100,
            blunder: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    pub phases: PhaseBoundaries,
    pub thresholds: ErrorThresholds,
}

impl ModelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ModelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let PhaseBoundaries {
            opening_last_move,
            middlegame_last_move,
        } = self.phases;
        if opening_last_move == 0 {
            return Err(ModelError::Config(
                "openingLastMove must be at least 1".to_string(),
            ));
        }
        if middlegame_last_move <= opening_last_move {
            return Err(ModelError::Config(format!(
                "middlegameLastMove ({middlegame_last_move}) must exceed openingLastMove ({opening_last_move})"
            )));
        }

        let ErrorThresholds {
            inaccuracy,
            mistake,
            blunder,
        } = self.thresholds;
        if !(inaccuracy < mistake && mistake < blunder) {
            return Err(ModelError::Config(format!(
                "thresholds must increase: inaccuracy {inaccuracy}, mistake {mistake}, blunder {blunder}"
            )));
        }
        Ok(())
    }
}
