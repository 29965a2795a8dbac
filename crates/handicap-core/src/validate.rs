//! Input validation for values entering the score store.
//!
//! Everything here is a pure function: no I/O and no retry loop. Callers that
//! read from a terminal decide whether to re-prompt.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::{Error, Result};

// ASCII classes only: `\d` would also accept non-ASCII digits
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// Check that `candidate` is a `YYYY-MM-DD` date after trimming.
///
/// Only the shape is checked, so `2024-02-30` is accepted.
pub fn validate_date(candidate: &str) -> bool {
    DATE_RE.is_match(candidate.trim())
}

/// Trimmed date if it passes [`validate_date`].
pub fn normalize_date(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim();
    DATE_RE.is_match(trimmed).then(|| trimmed.to_string())
}

/// How score text that is not an integer is handled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreParsing {
    /// Reject the input.
    #[default]
    Strict,
    /// Record the score as 0 and carry on.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedScore {
    Valid(i32),
    /// Input was not an integer and was replaced by 0 under lenient parsing.
    Defaulted { input: String },
}

impl ParsedScore {
    pub fn value(&self) -> i32 {
        match self {
            Self::Valid(v) => *v,
            Self::Defaulted { .. } => 0,
        }
    }
}

pub fn parse_score(text: &str, mode: ScoreParsing) -> Result<ParsedScore> {
    let trimmed = text.trim();
    match trimmed.parse::<i32>() {
        Ok(v) => Ok(ParsedScore::Valid(v)),
        Err(e) => match mode {
            ScoreParsing::Strict => Err(Error::InvalidScore(trimmed.to_string())),
            ScoreParsing::Lenient => {
                warn!("Could not convert score {:?} to int ({}), using 0", trimmed, e);
                Ok(ParsedScore::Defaulted {
                    input: trimmed.to_string(),
                })
            }
        },
    }
}
