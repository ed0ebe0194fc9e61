use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Milliseconds added to a solve carrying a +2 penalty.
pub const PLUS_TWO_MS: u64 = 2000;

pub type SolveId = i64;
pub type SessionId = i64;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum PuzzleType {
    #[serde(rename = "2x2")]
    #[value(name = "2x2")]
    #[strum(serialize = "2x2")]
    TwoByTwo,
    #[default]
    #[serde(rename = "3x3")]
    #[value(name = "3x3")]
    #[strum(serialize = "3x3")]
    ThreeByThree,
    #[serde(rename = "4x4")]
    #[value(name = "4x4")]
    #[strum(serialize = "4x4")]
    FourByFour,
    #[serde(rename = "5x5")]
    #[value(name = "5x5")]
    #[strum(serialize = "5x5")]
    FiveByFive,
    #[serde(rename = "pyraminx")]
    #[strum(serialize = "pyraminx")]
    Pyraminx,
    #[serde(rename = "megaminx")]
    #[strum(serialize = "megaminx")]
    Megaminx,
    #[serde(rename = "skewb")]
    #[strum(serialize = "skewb")]
    Skewb,
}

impl PuzzleType {
    pub const ALL: [PuzzleType; 7] = [
        PuzzleType::TwoByTwo,
        PuzzleType::ThreeByThree,
        PuzzleType::FourByFour,
        PuzzleType::FiveByFive,
        PuzzleType::Pyraminx,
        PuzzleType::Megaminx,
        PuzzleType::Skewb,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PuzzleType::TwoByTwo => "2x2 Cube",
            PuzzleType::ThreeByThree => "3x3 Cube",
            PuzzleType::FourByFour => "4x4 Cube",
            PuzzleType::FiveByFive => "5x5 Cube",
            PuzzleType::Pyraminx => "Pyraminx",
            PuzzleType::Megaminx => "Megaminx",
            PuzzleType::Skewb => "Skewb",
        }
    }

    /// The next puzzle in selection order, wrapping around.
    pub fn next(&self) -> PuzzleType {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown puzzle type '{0}'")]
pub struct ParsePuzzleError(pub String);

impl FromStr for PuzzleType {
    type Err = ParsePuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PuzzleType::ALL
            .into_iter()
            .find(|p| p.to_string() == s)
            .ok_or_else(|| ParsePuzzleError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Penalty {
    #[serde(rename = "+2")]
    #[strum(serialize = "+2")]
    PlusTwo,
    #[serde(rename = "DNF")]
    #[strum(serialize = "DNF")]
    Dnf,
}

impl Penalty {
    /// Review toggle order: none -> +2 -> DNF -> none.
    pub fn cycle(current: Option<Penalty>) -> Option<Penalty> {
        match current {
            None => Some(Penalty::PlusTwo),
            Some(Penalty::PlusTwo) => Some(Penalty::Dnf),
            Some(Penalty::Dnf) => None,
        }
    }

    pub fn parse(s: &str) -> Option<Penalty> {
        match s {
            "+2" => Some(Penalty::PlusTwo),
            "DNF" => Some(Penalty::Dnf),
            _ => None,
        }
    }
}

/// A recorded attempt. Only `penalty` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub id: SolveId,
    pub time_ms: u64,
    pub scramble: String,
    pub puzzle_type: PuzzleType,
    pub session_id: SessionId,
    pub timestamp: DateTime<Local>,
    pub penalty: Option<Penalty>,
}

impl Solve {
    /// Time used by every statistic and display path; `None` for a DNF.
    pub fn effective_time(&self) -> Option<f64> {
        match self.penalty {
            Some(Penalty::Dnf) => None,
            Some(Penalty::PlusTwo) => Some((self.time_ms + PLUS_TWO_MS) as f64),
            None => Some(self.time_ms as f64),
        }
    }

    pub fn is_dnf(&self) -> bool {
        self.penalty == Some(Penalty::Dnf)
    }
}

/// A completed attempt before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSolve {
    pub time_ms: u64,
    pub scramble: String,
    pub puzzle_type: PuzzleType,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub puzzle_type: PuzzleType,
    pub created_at: DateTime<Local>,
    pub solves: Vec<Solve>,
}

#[cfg(test)]
pub(crate) fn solve_fixture(id: SolveId, time_ms: u64, penalty: Option<Penalty>) -> Solve {
    Solve {
        id,
        time_ms,
        scramble: "R U R' U'".to_string(),
        puzzle_type: PuzzleType::ThreeByThree,
        session_id: 1,
        timestamp: Local::now(),
        penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puzzle_type_labels() {
        assert_eq!(PuzzleType::ThreeByThree.to_string(), "3x3");
        assert_eq!(PuzzleType::Pyraminx.to_string(), "pyraminx");
        assert_eq!("5x5".parse::<PuzzleType>(), Ok(PuzzleType::FiveByFive));
        assert!("6x6".parse::<PuzzleType>().is_err());
    }

    #[test]
    fn test_puzzle_type_serde_uses_labels() {
        let json = serde_json::to_string(&PuzzleType::TwoByTwo).unwrap();
        assert_eq!(json, "\"2x2\"");
        let back: PuzzleType = serde_json::from_str("\"skewb\"").unwrap();
        assert_eq!(back, PuzzleType::Skewb);
    }

    #[test]
    fn test_puzzle_type_next_wraps() {
        assert_eq!(PuzzleType::TwoByTwo.next(), PuzzleType::ThreeByThree);
        assert_eq!(PuzzleType::Skewb.next(), PuzzleType::TwoByTwo);
    }

    #[test]
    fn test_penalty_cycle() {
        assert_eq!(Penalty::cycle(None), Some(Penalty::PlusTwo));
        assert_eq!(Penalty::cycle(Some(Penalty::PlusTwo)), Some(Penalty::Dnf));
        assert_eq!(Penalty::cycle(Some(Penalty::Dnf)), None);
    }

    #[test]
    fn test_penalty_labels() {
        assert_eq!(Penalty::PlusTwo.to_string(), "+2");
        assert_eq!(Penalty::parse("DNF"), Some(Penalty::Dnf));
        assert_eq!(Penalty::parse("ok"), None);
    }

    #[test]
    fn test_effective_time() {
        assert_eq!(solve_fixture(1, 12_340, None).effective_time(), Some(12_340.0));
        assert_eq!(
            solve_fixture(1, 12_340, Some(Penalty::PlusTwo)).effective_time(),
            Some(14_340.0)
        );
        assert_eq!(solve_fixture(1, 12_340, Some(Penalty::Dnf)).effective_time(), None);
    }
}
