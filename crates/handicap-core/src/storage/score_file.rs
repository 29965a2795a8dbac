use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::format::{format_header, format_score_row, parse_records};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::score::{PlayerName, Score, ScoreKey};

/// Result of reading a player's score file.
#[derive(Debug)]
pub struct LoadOutcome {
    pub scores: Vec<Score>,
    pub status: LoadStatus,
}

#[derive(Debug)]
pub enum LoadStatus {
    /// No file for this player yet.
    Missing,
    Loaded { skipped_rows: usize },
    /// File could not be read or parsed; `scores` is empty.
    Malformed(Error),
}

impl LoadOutcome {
    pub fn warning(&self) -> Option<&Error> {
        match &self.status {
            LoadStatus::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub written: usize,
    pub duplicates: usize,
    pub wrote_header: bool,
}

/// Per-player score files inside one data directory.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    data_dir: PathBuf,
    extension: String,
}

impl ScoreStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            extension: Config::default().extension,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            extension: config.extension.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, player: &PlayerName) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", player.as_str(), self.extension))
    }

    /// Read all valid score rows for `player`.
    ///
    /// Never fails: a missing file is empty history, an unreadable or
    /// structurally broken file is reported through [`LoadStatus::Malformed`]
    /// and yields no scores. Individual rows with fewer than three fields, a
    /// non-integer score or a date not in `YYYY-MM-DD` form are skipped.
    pub fn load(&self, player: &PlayerName) -> LoadOutcome {
        let path = self.path_for(player);
        match read_scores(&path) {
            Ok(None) => {
                debug!("No score file at {}", path.display());
                LoadOutcome {
                    scores: Vec::new(),
                    status: LoadStatus::Missing,
                }
            }
            Ok(Some((scores, skipped_rows))) => {
                debug!(
                    "Loaded {} scores from {} ({} rows skipped)",
                    scores.len(),
                    path.display(),
                    skipped_rows
                );
                LoadOutcome {
                    scores,
                    status: LoadStatus::Loaded { skipped_rows },
                }
            }
            Err(e) => {
                warn!("Failed to read score file: {}", e);
                LoadOutcome {
                    scores: Vec::new(),
                    status: LoadStatus::Malformed(e),
                }
            }
        }
    }

    /// Append every score in `new_scores` not already stored for `player`.
    ///
    /// Calling this repeatedly with overlapping input never duplicates a
    /// row. The header is written only when the file is empty. Existing rows
    /// are never rewritten; if the existing file cannot be parsed while there
    /// are scores to append, the save is aborted without touching it.
    pub fn save(&self, player: &PlayerName, new_scores: &[Score]) -> Result<SaveSummary> {
        let path = self.path_for(player);
        // Existing rows only matter when there is something to append
        let existing = if new_scores.is_empty() {
            None
        } else {
            match fs::read_to_string(&path) {
                Ok(content) => Some(content),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    return Err(Error::malformed(&path, e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        };

        let mut seen: HashSet<ScoreKey> = match &existing {
            Some(content) => {
                let (scores, _) =
                    parse_scores(content).map_err(|reason| Error::malformed(&path, reason))?;
                scores.iter().map(Score::key).collect()
            }
            None => HashSet::new(),
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let wrote_header = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if wrote_header {
            writeln!(writer, "{}", format_header())?;
        }

        let mut written = 0;
        let mut duplicates = 0;
        for score in new_scores {
            if !seen.insert(score.key()) {
                duplicates += 1;
                continue;
            }
            if written == 0 && !wrote_header && needs_line_break(existing.as_deref()) {
                writeln!(writer)?;
            }
            writeln!(writer, "{}", format_score_row(score))?;
            written += 1;
        }
        writer.flush()?;

        if written > 0 {
            info!("Saved {} new scores to {}", written, path.display());
        } else {
            debug!("No new scores for {}", path.display());
        }

        Ok(SaveSummary {
            path,
            written,
            duplicates,
            wrote_header,
        })
    }
}

fn needs_line_break(existing: Option<&str>) -> bool {
    existing.is_some_and(|c| !c.is_empty() && !c.ends_with('\n'))
}

/// `Ok(None)` when the file does not exist.
fn read_scores(path: &Path) -> Result<Option<(Vec<Score>, usize)>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::malformed(path, e.to_string())),
    };
    let parsed = parse_scores(&content).map_err(|reason| Error::malformed(path, reason))?;
    Ok(Some(parsed))
}

/// Parse file content into scores plus the number of skipped data rows.
fn parse_scores(content: &str) -> std::result::Result<(Vec<Score>, usize), String> {
    let records = parse_records(content).map_err(|e| e.to_string())?;

    let mut scores = Vec::new();
    let mut skipped = 0;
    for record in records.iter().skip(1) {
        match score_from_record(record) {
            Some(score) => scores.push(score),
            None => {
                debug!("Skipping malformed row: {:?}", record);
                skipped += 1;
            }
        }
    }
    Ok((scores, skipped))
}

fn score_from_record(record: &[String]) -> Option<Score> {
    if record.len() < 3 {
        return None;
    }
    let value = record[0].parse::<i32>().ok()?;
    Score::new(value, &record[1], &record[2]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn player(name: &str) -> PlayerName {
        PlayerName::new(name).unwrap()
    }

    fn score(value: i32, course: &str, date: &str) -> Score {
        Score::new(value, course, date).unwrap()
    }

    fn keys(scores: &[Score]) -> HashSet<ScoreKey> {
        scores.iter().map(Score::key).collect()
    }

    #[test]
    fn test_path_for_uses_name_and_extension() {
        let store = ScoreStore::new("data");
        assert_eq!(
            store.path_for(&player("alice")),
            Path::new("data").join("alice.csv")
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let outcome = store.load(&player("nobody"));
        assert!(outcome.scores.is_empty());
        assert!(matches!(outcome.status, LoadStatus::Missing));
        assert!(outcome.warning().is_none());
    }

    #[test]
    fn test_save_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");

        let summary = store
            .save(&alice, &[score(72, "Pebble Beach", "2024-03-15")])
            .unwrap();
        assert!(summary.wrote_header);
        assert_eq!(summary.written, 1);

        let content = fs::read_to_string(store.path_for(&alice)).unwrap();
        assert_eq!(content, "Score,Course,Date\n72,Pebble Beach,2024-03-15\n");
    }

    #[test]
    fn test_save_empty_creates_header_only() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");

        store.save(&alice, &[]).unwrap();
        let content = fs::read_to_string(store.path_for(&alice)).unwrap();
        assert_eq!(content, "Score,Course,Date\n");
    }

    #[test]
    fn test_repeated_save_does_not_duplicate() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");

        let first = vec![score(72, "Pebble Beach", "2024-03-15")];
        let mut second = first.clone();
        second.push(score(80, "St Andrews", "2024-04-01"));

        store.save(&alice, &first).unwrap();
        store.save(&alice, &second).unwrap();
        let summary = store.save(&alice, &second).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.duplicates, 2);
        assert!(!summary.wrote_header);

        let loaded = store.load(&alice).scores;
        assert_eq!(loaded, second);

        let content = fs::read_to_string(store.path_for(&alice)).unwrap();
        assert_eq!(content.matches("Score,Course,Date").count(), 1);
    }

    #[test]
    fn test_save_dedups_within_batch() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        let s = score(90, "Augusta", "2024-04-10");

        let summary = store.save(&alice, &[s.clone(), s.clone()]).unwrap();
        assert_eq!(summary.written, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(store.load(&alice).scores, vec![s]);
    }

    #[test]
    fn test_save_then_load_is_union_of_all_saves() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let bob = player("bob");

        let a = score(70, "A", "2024-01-01");
        let b = score(85, "B", "2024-01-02");
        let c = score(90, "C", "2024-01-03");

        store.save(&bob, &[a.clone(), b.clone()]).unwrap();
        let loaded = store.load(&bob).scores;
        let mut session = loaded.clone();
        session.push(c.clone());
        store.save(&bob, &session).unwrap();
        store.save(&bob, &[c.clone(), a.clone()]).unwrap();

        let after = store.load(&bob).scores;
        assert_eq!(after.len(), 3);
        assert_eq!(keys(&after), keys(&[a, b, c]));
    }

    #[test]
    fn test_save_empty_leaves_existing_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        store
            .save(&alice, &[score(72, "Pebble Beach", "2024-03-15")])
            .unwrap();

        let before = fs::read(store.path_for(&alice)).unwrap();
        let summary = store.save(&alice, &[]).unwrap();
        let after = fs::read(store.path_for(&alice)).unwrap();
        assert_eq!(before, after);
        assert_eq!(summary.written, 0);
    }

    #[test]
    fn test_colliding_concatenations_are_distinct() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");

        store.save(&alice, &[score(1, "23", "2024-01-01")]).unwrap();
        let summary = store.save(&alice, &[score(12, "3", "2024-01-01")]).unwrap();
        assert_eq!(summary.written, 1);
        assert_eq!(store.load(&alice).scores.len(), 2);
    }

    #[test]
    fn test_quoted_course_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        let s = score(88, "Links, \"North\" Course", "2024-06-01");

        store.save(&alice, &[s.clone()]).unwrap();
        let summary = store.save(&alice, &[s.clone()]).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(store.load(&alice).scores, vec![s]);
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        fs::write(
            store.path_for(&alice),
            "Score,Course,Date\n\
             72,Pebble Beach,2024-03-15\n\
             abc,Pebble Beach,2024-01-01\n\
             80,Short Row\n\
             85, St Andrews , 2024-04-01 \n",
        )
        .unwrap();

        let outcome = store.load(&alice);
        assert!(matches!(outcome.status, LoadStatus::Loaded { skipped_rows: 2 }));
        assert_eq!(
            outcome.scores,
            vec![
                score(72, "Pebble Beach", "2024-03-15"),
                score(85, "St Andrews", "2024-04-01"),
            ]
        );
    }

    #[test]
    fn test_load_skips_row_with_bad_date() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        fs::write(
            store.path_for(&alice),
            "Score,Course,Date\n72,Pebble Beach,March 3\n80,Links,2024-01-01\n",
        )
        .unwrap();

        let outcome = store.load(&alice);
        assert!(matches!(outcome.status, LoadStatus::Loaded { skipped_rows: 1 }));
        assert_eq!(outcome.scores, vec![score(80, "Links", "2024-01-01")]);
    }

    #[test]
    fn test_load_malformed_file_warns_and_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        fs::write(
            store.path_for(&alice),
            "Score,Course,Date\n72,\"Pebble Beach,2024-03-15\n",
        )
        .unwrap();

        let outcome = store.load(&alice);
        assert!(outcome.scores.is_empty());
        assert!(matches!(
            outcome.warning(),
            Some(Error::MalformedFile { .. })
        ));
    }

    #[test]
    fn test_load_non_utf8_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        fs::write(store.path_for(&alice), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let outcome = store.load(&alice);
        assert!(outcome.scores.is_empty());
        assert!(outcome.warning().is_some());
    }

    #[test]
    fn test_save_refuses_to_append_to_malformed_file() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        let broken = "Score,Course,Date\n72,\"Pebble Beach,2024-03-15\n";
        fs::write(store.path_for(&alice), broken).unwrap();

        let err = store
            .save(&alice, &[score(80, "Augusta", "2024-04-10")])
            .unwrap_err();
        assert!(matches!(err, Error::MalformedFile { .. }));
        assert_eq!(fs::read_to_string(store.path_for(&alice)).unwrap(), broken);
    }

    #[test]
    fn test_empty_save_to_malformed_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        let broken = "Score,Course,Date\n72,\"Pebble Beach,2024-03-15\n";
        fs::write(store.path_for(&alice), broken).unwrap();

        let summary = store.save(&alice, &[]).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(fs::read_to_string(store.path_for(&alice)).unwrap(), broken);
    }

    #[test]
    fn test_save_treats_existing_padded_scores_as_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        fs::write(
            store.path_for(&alice),
            "Score,Course,Date\n072, Pebble Beach ,2024-03-15\n",
        )
        .unwrap();

        let summary = store
            .save(&alice, &[score(72, "Pebble Beach", "2024-03-15")])
            .unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.duplicates, 1);
    }

    #[test]
    fn test_save_adds_line_break_to_unterminated_file() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());
        let alice = player("alice");
        fs::write(
            store.path_for(&alice),
            "Score,Course,Date\n72,Pebble Beach,2024-03-15",
        )
        .unwrap();

        store
            .save(&alice, &[score(80, "Augusta", "2024-04-10")])
            .unwrap();
        let content = fs::read_to_string(store.path_for(&alice)).unwrap();
        assert_eq!(
            content,
            "Score,Course,Date\n72,Pebble Beach,2024-03-15\n80,Augusta,2024-04-10\n"
        );
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path().join("nested").join("scores"));
        let alice = player("alice");

        store
            .save(&alice, &[score(72, "Pebble Beach", "2024-03-15")])
            .unwrap();
        assert_eq!(store.load(&alice).scores.len(), 1);
    }

    #[test]
    fn test_players_use_separate_files() {
        let dir = TempDir::new().unwrap();
        let store = ScoreStore::new(dir.path());

        store
            .save(&player("alice"), &[score(72, "A", "2024-01-01")])
            .unwrap();
        store
            .save(&player("bob"), &[score(95, "B", "2024-01-02")])
            .unwrap();

        assert_eq!(store.load(&player("alice")).scores[0].score(), 72);
        assert_eq!(store.load(&player("bob")).scores[0].score(), 95);
    }
}
