//! Shared constants and path conventions (C9).

use std::path::{Path, PathBuf};

/// Default UDP/TCP port the server listens on, and the client targets.
pub const DEFAULT_PORT: u16 = 58030;

/// Maximum number of trials a game allows before it ends in failure.
pub const MAX_ATTEMPTS: u8 = 8;

/// Top-N entries kept and reported by the scoreboard.
pub const SCOREBOARD_SIZE: usize = 10;

/// Default server-side directory for in-progress and archived game files.
pub const DEFAULT_GAMES_DIR: &str = "GAMES";

/// Default server-side directory for finished-game score files.
pub const DEFAULT_SCORES_DIR: &str = "SCORES";

/// Default client-side directory the `STR` response is written into.
pub const DEFAULT_HISTORY_DIR: &str = "Client/Game_History";

/// Default client-side directory the `SSB` response is written into.
pub const DEFAULT_SCORES_VIEW_DIR: &str = "Client/Top_Scores";

/// Resolved filesystem locations the server operates against.
#[derive(Debug, Clone)]
pub struct ServerPaths {
    pub games_dir: PathBuf,
    pub scores_dir: PathBuf,
}

impl ServerPaths {
    pub fn new(games_dir: impl Into<PathBuf>, scores_dir: impl Into<PathBuf>) -> Self {
        Self {
            games_dir: games_dir.into(),
            scores_dir: scores_dir.into(),
        }
    }

    /// Path of a PLID's in-progress mirror file: `GAMES/GAME_<PLID>.txt`.
    pub fn in_progress_file(&self, plid: &str) -> PathBuf {
        self.games_dir.join(format!("GAME_{plid}.txt"))
    }

    /// Directory a PLID's finished games are archived under: `GAMES/<PLID>/`.
    pub fn archive_dir(&self, plid: &str) -> PathBuf {
        self.games_dir.join(plid)
    }

    /// Path of one archived game: `GAMES/<PLID>/<basename>.txt`.
    pub fn archive_file(&self, plid: &str, basename: &str) -> PathBuf {
        self.archive_dir(plid).join(format!("{basename}.txt"))
    }
}

impl Default for ServerPaths {
    fn default() -> Self {
        Self::new(DEFAULT_GAMES_DIR, DEFAULT_SCORES_DIR)
    }
}

impl ServerPaths {
    /// Path of a score file: `SCORES/<score>_<PLID>_<DDMMYYYY_HHMMSS>.txt`.
    pub fn score_file(&self, score: u8, plid: &str, ddmmyyyy_hhmmss: &str) -> PathBuf {
        self.scores_dir
            .join(format!("{score}_{plid}_{ddmmyyyy_hhmmss}.txt"))
    }
}

/// Resolved filesystem locations the client writes received files into.
#[derive(Debug, Clone)]
pub struct ClientPaths {
    pub history_dir: PathBuf,
    pub scores_view_dir: PathBuf,
}

impl ClientPaths {
    pub fn new(history_dir: impl Into<PathBuf>, scores_view_dir: impl Into<PathBuf>) -> Self {
        Self {
            history_dir: history_dir.into(),
            scores_view_dir: scores_view_dir.into(),
        }
    }
}

impl Default for ClientPaths {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DIR, DEFAULT_SCORES_VIEW_DIR)
    }
}

/// Ensure a directory exists, creating it (and parents) if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_file_name() {
        let paths = ServerPaths::new("GAMES", "SCORES");
        assert_eq!(
            paths.in_progress_file("123456"),
            PathBuf::from("GAMES/GAME_123456.txt")
        );
    }

    #[test]
    fn archive_file_shape() {
        let paths = ServerPaths::default();
        assert_eq!(
            paths.archive_file("123456", "20260101_120000_W"),
            PathBuf::from("GAMES/123456/20260101_120000_W.txt")
        );
    }
}
