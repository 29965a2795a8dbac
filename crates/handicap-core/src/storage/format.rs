//! Comma-separated text format for score files.
//!
//! Quoting follows the usual CSV rules: a field containing a comma, quote,
//! CR or LF, or starting with whitespace, is wrapped in double quotes with
//! inner quotes doubled. Rows end in `\n`; `\r\n` is accepted when reading.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::score::Score;

pub const HEADER: [&str; 3] = ["Score", "Course", "Date"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {0}: unterminated quoted field")]
    UnterminatedQuote(usize),

    #[error("line {0}: bare \" in unquoted field")]
    BareQuote(usize),

    #[error("line {0}: extraneous character after closing quote")]
    TrailingAfterQuote(usize),
}

/// Header line, without terminator.
pub fn format_header() -> String {
    format_record(&HEADER)
}

/// One data row for `score`, without terminator.
pub fn format_score_row(score: &Score) -> String {
    format_record(&[score.score().to_string().as_str(), score.course(), score.date()])
}

pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    if !field_needs_quotes(field) {
        return field.to_string();
    }
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn field_needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\r', '\n']) || field.starts_with(char::is_whitespace)
}

/// Split `content` into records of raw (unquoted, untrimmed) fields.
///
/// Blank lines are skipped. Records may have any number of fields; judging
/// whether a row is usable is left to the caller.
pub fn parse_records(content: &str) -> Result<Vec<Vec<String>>, ParseError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut field_start = true;
    let mut in_record = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if field_start => {
                read_quoted(&mut chars, &mut field, &mut line)?;
                match chars.peek() {
                    None | Some(',') | Some('\n') | Some('\r') => {}
                    Some(_) => return Err(ParseError::TrailingAfterQuote(line)),
                }
                field_start = false;
                in_record = true;
            }
            '"' => return Err(ParseError::BareQuote(line)),
            ',' => {
                record.push(std::mem::take(&mut field));
                field_start = true;
                in_record = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if in_record {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                line += 1;
                field_start = true;
                in_record = false;
            }
            _ => {
                field.push(c);
                field_start = false;
                in_record = true;
            }
        }
    }

    if in_record {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

fn read_quoted(
    chars: &mut Peekable<Chars<'_>>,
    field: &mut String,
    line: &mut usize,
) -> Result<(), ParseError> {
    let start_line = *line;
    loop {
        match chars.next() {
            None => return Err(ParseError::UnterminatedQuote(start_line)),
            Some('"') => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    return Ok(());
                }
            }
            Some(c) => {
                if c == '\n' {
                    *line += 1;
                }
                field.push(c);
            }
        }
    }
}
