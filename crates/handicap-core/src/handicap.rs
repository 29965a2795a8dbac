//! Handicap: the mean of a player's three highest scores.

use tracing::info;

use crate::score::Score;

/// Number of top scores averaged into the handicap.
pub const COUNTED_ROUNDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Handicap {
    Insufficient { recorded: usize },
    Average(f64),
}

impl Handicap {
    /// Average, or 0.0 when there were not enough rounds.
    pub fn value(&self) -> f64 {
        match self {
            Self::Insufficient { .. } => 0.0,
            Self::Average(v) => *v,
        }
    }
}

/// Scores ordered highest first. The input slice is left as it was.
pub fn ranked(scores: &[Score]) -> Vec<&Score> {
    let mut view: Vec<&Score> = scores.iter().collect();
    view.sort_unstable_by(|a, b| b.score().cmp(&a.score()));
    view
}

pub fn compute_handicap(scores: &[Score]) -> Handicap {
    if scores.len() < COUNTED_ROUNDS {
        info!(
            "Not enough scores for a handicap: {} of {} needed",
            scores.len(),
            COUNTED_ROUNDS
        );
        return Handicap::Insufficient {
            recorded: scores.len(),
        };
    }

    let total: i64 = ranked(scores)
        .into_iter()
        .take(COUNTED_ROUNDS)
        .map(|s| i64::from(s.score()))
        .sum();
    Handicap::Average(total as f64 / COUNTED_ROUNDS as f64)
}

/// Handicap value with 0.0 as the insufficient-data sentinel.
pub fn handicap(scores: &[Score]) -> f64 {
    compute_handicap(scores).value()
}
