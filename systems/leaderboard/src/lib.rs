#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! High-score table kept in a small JSON document next to the game.
//!
//! Loading never fails from the player's point of view: unreadable or
//! malformed files yield an empty table. Both the current `{"entries": [...]}`
//! layout and the legacy `{"scores": [...]}` layout are accepted, and only the
//! current layout is written back.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snake_quest_core::Event;
use thiserror::Error;

/// Number of entries kept in the table.
pub const MAX_ENTRIES: usize = 5;

/// Name stored for entries without a usable name.
pub const ANONYMOUS_NAME: &str = "Anon";

/// One row of the high-score table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Player name.
    pub name: String,
    /// Points scored.
    pub score: i64,
}

impl Entry {
    /// Creates an entry with a normalized name.
    #[must_use]
    pub fn new(name: &str, score: i64) -> Self {
        Self {
            name: sanitize_name(name),
            score,
        }
    }
}

/// Errors raised while reading or writing the leaderboard file.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// The file exists but could not be read.
    #[error("failed to read leaderboard {}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("failed to write leaderboard {}", .path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document could not be parsed or encoded as JSON.
    #[error("malformed leaderboard JSON")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Document<'a> {
    entries: &'a [Entry],
}

/// Keeps the alphanumeric characters of a name, substituting [`ANONYMOUS_NAME`]
/// when nothing remains.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|character| character.is_alphanumeric())
        .collect();
    if kept.is_empty() {
        ANONYMOUS_NAME.to_owned()
    } else {
        kept
    }
}

/// Sorts entries by descending score and keeps the best [`MAX_ENTRIES`].
///
/// The sort is stable, so equal scores keep their insertion order.
#[must_use]
pub fn normalize(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|left, right| right.score.cmp(&left.score));
    entries.truncate(MAX_ENTRIES);
    entries
}

/// Parses a leaderboard document, dropping rows whose score is not numeric.
///
/// Documents without an entry list yield an empty table.
///
/// # Errors
///
/// Returns [`LeaderboardError::Parse`] when `text` is not JSON.
pub fn parse(text: &str) -> Result<Vec<Entry>, LeaderboardError> {
    let payload: Value = serde_json::from_str(text)?;
    let rows = match &payload {
        Value::Object(map) => match map.get("entries") {
            Some(Value::Null) | None => map.get("scores"),
            found => found,
        },
        _ => None,
    };
    let Some(Value::Array(rows)) = rows else {
        return Ok(Vec::new());
    };

    let entries = rows.iter().filter_map(parse_row).collect();
    Ok(normalize(entries))
}

fn parse_row(row: &Value) -> Option<Entry> {
    let (name, score) = match row {
        Value::Object(fields) => (
            fields.get("name").cloned().unwrap_or(Value::Null),
            fields.get("score").cloned().unwrap_or(Value::from(0)),
        ),
        other => (Value::Null, other.clone()),
    };
    Some(Entry {
        name: name_value(&name),
        score: score_value(&score)?,
    })
}

fn name_value(name: &Value) -> String {
    match name {
        Value::String(text) => sanitize_name(text),
        Value::Bool(true) => "True".to_owned(),
        Value::Number(number) if number.as_f64() != Some(0.0) => number.to_string(),
        Value::Array(items) if !items.is_empty() => sanitize_name(&name.to_string()),
        Value::Object(fields) if !fields.is_empty() => sanitize_name(&name.to_string()),
        _ => ANONYMOUS_NAME.to_owned(),
    }
}

/// Integer conversion accepting integers, truncated floats, booleans and
/// integer strings.
fn score_value(score: &Value) -> Option<i64> {
    match score {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        }),
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::String(text) => text.trim().parse().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Serializes entries in the current document layout.
///
/// # Errors
///
/// Returns [`LeaderboardError::Parse`] if encoding fails.
pub fn to_json(entries: &[Entry]) -> Result<String, LeaderboardError> {
    Ok(serde_json::to_string_pretty(&Document { entries })?)
}

/// High-score table bound to an optional backing file.
#[derive(Debug)]
pub struct Leaderboard {
    path: Option<PathBuf>,
    entries: Vec<Entry>,
}

impl Leaderboard {
    /// Loads the table stored at `path`, degrading to an empty table.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read(&path) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring unreadable leaderboard");
                Vec::new()
            }
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "leaderboard loaded");
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Creates a table that is never persisted.
    #[must_use]
    pub fn in_memory(entries: Vec<Entry>) -> Self {
        Self {
            path: None,
            entries: normalize(entries),
        }
    }

    /// Rows in display order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Inserts a score, keeping the table normalized.
    pub fn record(&mut self, name: &str, score: i64) {
        self.entries.push(Entry::new(name, score));
        self.entries = normalize(std::mem::take(&mut self.entries));
    }

    /// Writes the table to its backing file.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::Write`] when the file cannot be written.
    pub fn save(&self) -> Result<(), LeaderboardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = to_json(&self.entries)?;
        fs::write(path, json).map_err(|source| LeaderboardError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "leaderboard saved");
        Ok(())
    }

    /// Records every submitted score and persists the table.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn handle(&mut self, events: &[Event]) {
        let mut changed = false;
        for event in events {
            if let Event::ScoreSubmitted { name, score } = event {
                self.record(name, i64::from(*score));
                changed = true;
            }
        }
        if !changed {
            return;
        }
        if let Err(error) = self.save() {
            tracing::warn!(%error, "leaderboard not saved");
        }
    }
}

fn read(path: &Path) -> Result<Vec<Entry>, LeaderboardError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LeaderboardError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse(&text)
}
