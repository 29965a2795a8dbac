//! Interactive menu loop for one player.

use std::io::{BufRead, Write};

use anyhow::Result;
use handicap_core::{
    Handicap, LoadStatus, ParsedScore, PlayerName, Score, ScoreParsing, ScoreStore,
    compute_handicap, normalize_date, parse_score,
};
use tracing::{debug, warn};

use crate::menu::{MENU_TEXT, MenuChoice};
use crate::prompter::LinePrompter;

/// Ask for a player name until a usable one is given.
///
/// Returns `None` if input ends first.
pub fn ask_player<R: BufRead, W: Write>(
    prompter: &mut LinePrompter<R, W>,
) -> Result<Option<PlayerName>> {
    loop {
        let Some(line) = prompter.ask("Enter your name:")? else {
            return Ok(None);
        };
        match PlayerName::new(&line) {
            Ok(name) => return Ok(Some(name)),
            Err(e) => prompter.say(format_args!("{}. Please try again.", e))?,
        }
    }
}

/// Run the menu until the player quits or input ends.
///
/// Scores entered during the session are saved after each addition and
/// again on exit.
pub fn run<R: BufRead, W: Write>(
    prompter: &mut LinePrompter<R, W>,
    store: &ScoreStore,
    player: &PlayerName,
    parsing: ScoreParsing,
) -> Result<()> {
    let mut entered: Vec<Score> = Vec::new();

    loop {
        let Some(line) = prompter.ask(MENU_TEXT)? else {
            debug!("Input closed, leaving menu");
            break;
        };

        match MenuChoice::parse(&line) {
            Some(MenuChoice::AddScore) => {
                if let Some(score) = read_score(prompter, parsing)? {
                    entered.push(score);
                    persist(prompter, store, player, &entered)?;
                }
            }
            Some(MenuChoice::ShowHandicap) => {
                let scores = load_history(prompter, store, player)?;
                match compute_handicap(&scores) {
                    Handicap::Insufficient { recorded } => prompter.say(format_args!(
                        "Not enough scores to calculate handicap. At least 3 scores are needed ({} recorded).",
                        recorded
                    ))?,
                    Handicap::Average(value) => {
                        prompter.say(format_args!("Your average golf score is: {}", value))?
                    }
                }
            }
            Some(MenuChoice::ListScores) => {
                let scores = load_history(prompter, store, player)?;
                prompter.say(format_args!("\nScore data for {}", player))?;
                if scores.is_empty() {
                    prompter.say("No scores recorded yet.")?;
                }
                for (i, score) in scores.iter().enumerate() {
                    prompter.say(format_args!("{}. {}", i + 1, score))?;
                }
            }
            Some(MenuChoice::Quit) => break,
            None => prompter.say(format_args!("Unknown option {:?}.", line.trim()))?,
        }
    }

    if persist(prompter, store, player, &entered)? {
        prompter.say("Exiting... Data saved.")?;
    } else {
        prompter.say("Exiting... Some scores could not be saved.")?;
    }
    Ok(())
}

/// Collect score, course and date. `None` if input ends part way.
fn read_score<R: BufRead, W: Write>(
    prompter: &mut LinePrompter<R, W>,
    parsing: ScoreParsing,
) -> Result<Option<Score>> {
    let value = loop {
        let Some(line) = prompter.ask("Enter your score:")? else {
            return Ok(None);
        };
        match parse_score(&line, parsing) {
            Ok(parsed) => {
                if let ParsedScore::Defaulted { input } = &parsed {
                    prompter.say(format_args!(
                        "Error: could not convert {:?} to a whole number, recording 0.",
                        input
                    ))?;
                }
                break parsed.value();
            }
            Err(e) => prompter.say(format_args!("{}. Please enter a whole number.", e))?,
        }
    };

    let Some(course) = prompter.ask("Enter the course:")? else {
        return Ok(None);
    };

    let date = loop {
        let Some(line) = prompter.ask("Enter date played in yyyy-mm-dd format:")? else {
            return Ok(None);
        };
        match normalize_date(&line) {
            Some(date) => break date,
            None => prompter
                .say("Invalid date format. Please enter the date in yyyy-mm-dd format.")?,
        }
    };

    Ok(Some(Score::new(value, &course, &date)?))
}

fn load_history<R: BufRead, W: Write>(
    prompter: &mut LinePrompter<R, W>,
    store: &ScoreStore,
    player: &PlayerName,
) -> Result<Vec<Score>> {
    let outcome = store.load(player);
    match &outcome.status {
        LoadStatus::Missing => {
            prompter.say(format_args!("No scores found for {} yet.", player))?;
        }
        LoadStatus::Malformed(e) => {
            prompter.say(format_args!("Warning: {}. Treating history as empty.", e))?;
        }
        LoadStatus::Loaded { skipped_rows } if *skipped_rows > 0 => {
            prompter.say(format_args!("Skipped {} unreadable rows.", skipped_rows))?;
        }
        LoadStatus::Loaded { .. } => {}
    }
    Ok(outcome.scores)
}

/// Save the session's scores. Returns `false` if the save failed.
fn persist<R: BufRead, W: Write>(
    prompter: &mut LinePrompter<R, W>,
    store: &ScoreStore,
    player: &PlayerName,
    entered: &[Score],
) -> Result<bool> {
    match store.save(player, entered) {
        Ok(summary) => {
            if summary.written > 0 {
                prompter.say(format_args!(
                    "Scores saved to file {}!",
                    summary.path.display()
                ))?;
            }
            Ok(true)
        }
        Err(e) => {
            warn!("Save failed for {}: {}", player, e);
            prompter.say(format_args!("Could not save scores: {}", e))?;
            Ok(false)
        }
    }
}
