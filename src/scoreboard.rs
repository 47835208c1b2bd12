//! Scoreboard engine (C7): rank finished games and render the top-10 report.

use std::fs;

use crate::config::{ServerPaths, SCOREBOARD_SIZE};
use crate::error::GameError;

/// One parsed line from a score file: `SSS PPPPPP CCCC N MODE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: u8,
    pub plid: String,
    pub code: String,
    pub trials: u8,
    pub mode: String,
    /// The score file's basename, used only to break ties by recency.
    timestamp_key: String,
}

fn parse_score_file(path: &std::path::Path) -> Option<ScoreEntry> {
    let body = fs::read_to_string(path).ok()?;
    let line = body.lines().next()?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [score, plid, code, trials, mode] = tokens[..] else {
        return None;
    };
    let timestamp_key = path.file_stem()?.to_str()?.to_string();
    Some(ScoreEntry {
        score: score.parse().ok()?,
        plid: plid.to_string(),
        code: code.to_string(),
        trials: trials.parse().ok()?,
        mode: mode.to_string(),
        timestamp_key,
    })
}

/// Scan the scores directory and return the best `SCOREBOARD_SIZE` entries.
///
/// Files that vanish or fail to parse between listing and reading (another
/// request finalizing a win concurrently) are silently skipped, matching the
/// store's tolerant read-without-locking contract.
pub fn top_n(paths: &ServerPaths) -> Result<Vec<ScoreEntry>, GameError> {
    if !paths.scores_dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&paths.scores_dir)? {
        let Ok(entry) = entry else { continue };
        if let Some(parsed) = parse_score_file(&entry.path()) {
            entries.push(parsed);
        }
    }

    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.timestamp_key.cmp(&a.timestamp_key))
    });
    entries.truncate(SCOREBOARD_SIZE);
    Ok(entries)
}

/// Render entries into the fixed-width table an `RSS OK` file payload carries.
pub fn format_report(entries: &[ScoreEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<4} {:<6} {:<8} {:<4} {:<6} {:<5}\n",
        "RANK", "SCORE", "PLID", "CODE", "TRIALS", "MODE"
    ));
    for (i, e) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<6} {:<8} {:<4} {:<6} {:<5}\n",
            i + 1,
            e.score,
            e.plid,
            e.code,
            e.trials,
            e.mode,
        ));
    }
    out
}
