//! # handicap-core
//!
//! Core library for the golf handicap tracker.
//!
//! This crate provides:
//! - Score records and the structural dedup key
//! - Per-player score files (append-only, deduplicated)
//! - Handicap calculation (mean of the three highest scores)
//! - Validation of dates, score text and player names
//! - TOML configuration

pub mod config;
pub mod error;
pub mod handicap;
pub mod score;
pub mod storage;
pub mod validate;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use handicap::{COUNTED_ROUNDS, Handicap, compute_handicap, handicap, ranked};
pub use score::{PlayerName, Score, ScoreKey};
pub use storage::{LoadOutcome, LoadStatus, SaveSummary, ScoreStore};
pub use validate::{ParsedScore, ScoreParsing, normalize_date, parse_score, validate_date};
