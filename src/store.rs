//! Game store (C5): the live PLID -> GameRecord map, plus archive recovery.

use std::collections::HashMap;
use std::fs;

use chrono::{DateTime, Local};

use crate::config::ServerPaths;
use crate::error::GameError;
use crate::game::{EndCode, GameRecord};

/// The process-wide map of currently active games.
///
/// Single-writer discipline is enforced by wrapping this in
/// `tokio::sync::Mutex<GameStore>` at the listener layer (C8) — nothing here
/// is itself thread-safe, by design, matching the spec's single-mutex model.
#[derive(Debug, Default)]
pub struct GameStore {
    games: HashMap<String, GameRecord>,
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
        }
    }

    pub fn find(&self, plid: &str) -> Option<&GameRecord> {
        self.games.get(plid)
    }

    pub fn find_mut(&mut self, plid: &str) -> Option<&mut GameRecord> {
        self.games.get_mut(plid)
    }

    pub fn insert(&mut self, game: GameRecord) {
        self.games.insert(game.plid.clone(), game);
    }

    pub fn erase(&mut self, plid: &str) -> Option<GameRecord> {
        self.games.remove(plid)
    }

    /// If `plid` has an active, timed-out record, finalize it with `Timeout`
    /// and remove it from the store. Returns the archived secret on timeout,
    /// so callers that need it (e.g. TRY's `ETM` reply) don't re-read memory
    /// after the record has already been evicted.
    pub fn sweep_expired(
        &mut self,
        plid: &str,
        now: DateTime<Local>,
        paths: &ServerPaths,
    ) -> Result<Option<[crate::color::Color; 4]>, GameError> {
        let timed_out = match self.games.get(plid) {
            Some(game) if game.active && game.is_time_exceeded(now) => true,
            _ => false,
        };
        if !timed_out {
            return Ok(None);
        }
        let mut game = self.games.remove(plid).expect("checked above");
        let secret = game.secret;
        game.finalize(EndCode::Timeout, now, paths)?;
        Ok(Some(secret))
    }

    /// Scan `plid`'s archive directory and return the most recently finished
    /// game's basename (without extension), chosen by lexicographic order of
    /// the `YYYYMMDD_HHMMSS` prefix — which is also chronological order.
    pub fn load_last_finished(
        &self,
        plid: &str,
        paths: &ServerPaths,
    ) -> Result<Option<String>, GameError> {
        let dir = paths.archive_dir(plid);
        if !dir.exists() {
            return Ok(None);
        }
        let mut best: Option<String> = None;
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str().map(str::to_owned))
            else {
                continue;
            };
            if best.as_deref().is_none_or(|b| stem.as_str() > b) {
                best = Some(stem);
            }
        }
        Ok(best)
    }
}
