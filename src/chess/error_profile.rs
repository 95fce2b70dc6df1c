use serde::Serialize;

use super::config::ModelConfig;
use super::types::{GameRecord, Phase};

/// Raw move-quality counts for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCounts {
    pub sample_moves: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
    pub centipawn_loss: u64,
}

impl PhaseCounts {
    /// Classification is nested: a blunder also counts as a mistake and an
    /// inaccuracy.
    fn record(&mut self, loss: u32, config: &ModelConfig) {
        let thresholds = &config.thresholds;
        self.sample_moves += 1;
        self.centipawn_loss += u64::from(loss);
        if loss > thresholds.inaccuracy {
            self.inaccuracies += 1;
        }
        if loss > thresholds.mistake {
            self.mistakes += 1;
        }
        if loss > thresholds.blunder {
            self.blunders += 1;
        }
    }

    fn merge(&mut self, other: &PhaseCounts) {
        self.sample_moves += other.sample_moves;
        self.inaccuracies += other.inaccuracies;
        self.mistakes += other.mistakes;
        self.blunders += other.blunders;
        self.centipawn_loss += other.centipawn_loss;
    }
}

fn rate(count: impl Into<f64>, samples: u32) -> f64 {
    if samples == 0 {
        0.0
    } else {
        count.into() / f64::from(samples)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseErrors {
    pub phase: Phase,
    pub sample_moves: u32,
    pub inaccuracy_rate: f64,
    pub mistake_rate: f64,
    pub blunder_rate: f64,
    pub average_centipawn_loss: f64,
    pub counts: PhaseCounts,
}

impl PhaseErrors {
    fn from_counts(phase: Phase, counts: PhaseCounts) -> Self {
        let samples = counts.sample_moves;
        Self {
            phase,
            sample_moves: samples,
            inaccuracy_rate: rate(counts.inaccuracies, samples),
            mistake_rate: rate(counts.mistakes, samples),
            blunder_rate: rate(counts.blunders, samples),
            average_centipawn_loss: rate(counts.centipawn_loss as f64, samples),
            counts,
        }
    }
}

/// Per-phase mistake statistics over the player's evaluated moves.
///
/// Rates are zero, not undefined, for phases without samples; check
/// `sample_moves` before trusting them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProfile {
    pub games_analyzed: u32,
    /// Opening, middlegame, endgame.
    pub phases: [PhaseErrors; 3],
}

impl ErrorProfile {
    pub fn from_counts(games_analyzed: u32, counts: [PhaseCounts; 3]) -> Self {
        let [opening, middlegame, endgame] = counts;
        Self {
            games_analyzed,
            phases: [
                PhaseErrors::from_counts(Phase::Opening, opening),
                PhaseErrors::from_counts(Phase::Middlegame, middlegame),
                PhaseErrors::from_counts(Phase::Endgame, endgame),
            ],
        }
    }

    pub fn empty() -> Self {
        Self::from_counts(0, [PhaseCounts::default(); 3])
    }

    pub fn phase(&self, phase: Phase) -> &PhaseErrors {
        &self.phases[phase.index()]
    }

    fn totals(&self) -> PhaseCounts {
        let mut totals = PhaseCounts::default();
        for phase in &self.phases {
            totals.merge(&phase.counts);
        }
        totals
    }

    pub fn total_sample_moves(&self) -> u32 {
        self.totals().sample_moves
    }

    pub fn aggregate_mistake_rate(&self) -> f64 {
        let totals = self.totals();
        rate(totals.mistakes, totals.sample_moves)
    }

    pub fn aggregate_blunder_rate(&self) -> f64 {
        let totals = self.totals();
        rate(totals.blunders, totals.sample_moves)
    }

    /// `None` without evaluated moves.
    pub fn average_centipawn_loss(&self) -> Option<f64> {
        let totals = self.totals();
        (totals.sample_moves > 0).then(|| rate(totals.centipawn_loss as f64, totals.sample_moves))
    }
}

/// Buckets the player's evaluated moves into phases. Games without
/// evaluations contribute nothing.
pub fn build_error_profile(games: &[GameRecord], config: &ModelConfig) -> ErrorProfile {
    let mut counts = [PhaseCounts::default(); 3];
    let mut games_analyzed = 0;

    for game in games {
        let Some(deltas) = &game.eval_deltas else {
            continue;
        };
        games_analyzed += 1;

        for (ply, loss) in deltas.iter().enumerate().take(game.moves.len()) {
            if !game.player_color.owns_ply(ply) {
                continue;
            }
            let phase = config.phases.phase_of_ply(ply);
            counts[phase.index()].record(*loss, config);
        }
    }

    ErrorProfile::from_counts(games_analyzed, counts)
}
