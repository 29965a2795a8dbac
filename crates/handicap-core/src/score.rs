use std::fmt;

use crate::error::{Error, Result};
use crate::validate::normalize_date;

/// One round played: score, course and date.
///
/// Fields are private so a `Score` can only be built through [`Score::new`],
/// which trims the course and rejects dates outside `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Score {
    score: i32,
    course: String,
    date: String,
}

/// Structural identity of a score record, used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    pub score: i32,
    pub course: String,
    pub date: String,
}

impl Score {
    pub fn new(score: i32, course: &str, date: &str) -> Result<Self> {
        let date = normalize_date(date).ok_or_else(|| Error::InvalidDate(date.to_string()))?;
        Ok(Self {
            score,
            course: course.trim().to_string(),
            date,
        })
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            score: self.score,
            course: self.course.clone(),
            date: self.date.clone(),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Score: {}, Course: {}, Date: {}",
            self.score, self.course, self.date
        )
    }
}

/// Player name, also used as the stem of the player's score file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(raw: &str) -> Result<Self> {
        let name = raw.trim();
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || name.chars().any(char::is_control);
        if invalid {
            return Err(Error::InvalidPlayerName(raw.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
