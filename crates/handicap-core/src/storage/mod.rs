//! Score file storage.
//!
//! Each player has one comma-separated file named `<player>.<extension>`
//! inside the data directory:
//!
//! - **Format**: header `Score,Course,Date`, then one row per round
//! - **Loading**: tolerant of bad rows, never fails the caller
//! - **Saving**: append-only, deduplicated on the (score, course, date) key

mod format;
mod score_file;

pub use format::{
    HEADER, ParseError, format_header, format_record, format_score_row, parse_records,
};
pub use score_file::{LoadOutcome, LoadStatus, SaveSummary, ScoreStore};
