use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: u64 = 86_400;

/// Time-control category of a game, as the rating pools split them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeControl {
    UltraBullet,
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Correspondence,
}

impl TimeControl {
    /// Provider speed tag (`"blitz"`, `"ultraBullet"`, `"daily"`, ...).
    pub fn from_speed(speed: &str) -> Option<Self> {
        match speed.trim().to_ascii_lowercase().as_str() {
            "ultrabullet" | "ultra-bullet" | "ultra_bullet" => Some(Self::UltraBullet),
            "bullet" => Some(Self::Bullet),
            "blitz" => Some(Self::Blitz),
            "rapid" => Some(Self::Rapid),
            "classical" | "standard" => Some(Self::Classical),
            "correspondence" | "daily" => Some(Self::Correspondence),
            _ => None,
        }
    }

    /// Categorizes a clock by its estimated duration for 40 moves.
    pub fn from_clock(initial_seconds: u32, increment_seconds: u32) -> Self {
        let estimated_seconds = initial_seconds as u64 + 40 * increment_seconds as u64;

        match estimated_seconds {
            0..=29 => Self::UltraBullet,
            30..=179 => Self::Bullet,
            180..=479 => Self::Blitz,
            480..=1499 => Self::Rapid,
            s if s >= SECONDS_PER_DAY => Self::Correspondence,
            _ => Self::Classical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UltraBullet => "ultraBullet",
            Self::Bullet => "bullet",
            Self::Blitz => "blitz",
            Self::Rapid => "rapid",
            Self::Classical => "classical",
            Self::Correspondence => "correspondence",
        }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub moves: Option<u32>,
    pub base_seconds: u32,
    pub increment_seconds: Option<u32>,
}

fn parse_u32(s: &str) -> Option<u32> {
    s.trim().parse().ok()
}

/// Parses one PGN `TimeControl` stage: `300`, `300+3`, `40/5400`, `1/259200`.
fn parse_stage(s: &str) -> Option<Period> {
    let (base_part, inc_part) = match s.split_once('+') {
        Some((base, inc)) => (base, Some(inc)),
        None => (s, None),
    };

    let (moves, base_str) = match base_part.split_once('/') {
        Some((moves, base)) => (Some(parse_u32(moves)?), base),
        None => (None, base_part),
    };

    let base_seconds = parse_u32(base_str)?;
    let increment_seconds = match inc_part {
        Some(inc_str) => Some(parse_u32(inc_str)?),
        None => None,
    };

    Some(Period {
        moves,
        base_seconds,
        increment_seconds,
    })
}

/// Categorizes a PGN-style time control string. Only the first stage of a
/// multi-stage control is considered; `-` and `?` yield `None`.
pub fn categorize_timecontrol(raw: &str) -> Option<TimeControl> {
    let input = raw.trim();
    if input.is_empty() || input == "-" || input == "?" {
        return None;
    }

    let first_stage = input.split(':').next()?;
    let period = parse_stage(first_stage)?;

    if period.moves == Some(1) && period.base_seconds as u64 >= SECONDS_PER_DAY {
        return Some(TimeControl::Correspondence);
    }

    Some(TimeControl::from_clock(
        period.base_seconds,
        period.increment_seconds.unwrap_or(0),
    ))
}
