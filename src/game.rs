//! Per-player game record (C4): in-memory state plus its file-backed mirror.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::color::{code_from_tokens, code_to_compact, code_to_wire, Code};
use crate::config::{ServerPaths, MAX_ATTEMPTS};
use crate::error::GameError;

/// Play uses a server-generated secret; Debug accepts a caller-supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Play,
    Debug,
}

impl Mode {
    fn letter(self) -> char {
        match self {
            Mode::Play => 'P',
            Mode::Debug => 'D',
        }
    }

    fn score_word(self) -> &'static str {
        match self {
            Mode::Play => "PLAY",
            Mode::Debug => "DEBUG",
        }
    }
}

/// How a game reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCode {
    Win,
    Fail,
    Timeout,
    Quit,
}

impl EndCode {
    fn letter(self) -> char {
        match self {
            EndCode::Win => 'W',
            EndCode::Fail => 'F',
            EndCode::Timeout => 'T',
            EndCode::Quit => 'Q',
        }
    }

    fn word(self) -> &'static str {
        match self {
            EndCode::Win => "WIN",
            EndCode::Fail => "FAIL",
            EndCode::Timeout => "TIMEOUT",
            EndCode::Quit => "QUIT",
        }
    }
}

/// One accepted guess and its scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    pub guess: Code,
    pub n_b: u8,
    pub n_w: u8,
    pub secs_from_start: i64,
}

/// A player's current or just-finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub plid: String,
    pub mode: Mode,
    pub secret: Code,
    pub max_time: i64,
    pub start_time: DateTime<Local>,
    pub trials: Vec<Trial>,
    pub active: bool,
}

impl GameRecord {
    /// Start a new game and write its in-progress mirror file.
    pub fn start(
        plid: String,
        mode: Mode,
        secret: Code,
        max_time: i64,
        start_time: DateTime<Local>,
        paths: &ServerPaths,
    ) -> Result<Self, GameError> {
        let game = GameRecord {
            plid,
            mode,
            secret,
            max_time,
            start_time,
            trials: Vec::new(),
            active: true,
        };
        game.write_in_progress(paths)?;
        Ok(game)
    }

    pub fn is_time_exceeded(&self, now: DateTime<Local>) -> bool {
        (now - self.start_time).num_seconds() > self.max_time
    }

    fn elapsed_secs(&self, now: DateTime<Local>) -> i64 {
        (now - self.start_time).num_seconds()
    }

    /// Append an accepted trial, updating both memory and the mirror file.
    pub fn append_trial(
        &mut self,
        guess: Code,
        n_b: u8,
        n_w: u8,
        now: DateTime<Local>,
        paths: &ServerPaths,
    ) -> Result<(), GameError> {
        let trial = Trial {
            guess,
            n_b,
            n_w,
            secs_from_start: self.elapsed_secs(now),
        };
        let line = format!(
            "T: {} {} {}\n",
            code_to_wire(&trial.guess),
            format!("{} {}", trial.n_b, trial.n_w),
            trial.secs_from_start,
        );
        self.append_line(paths, &line)?;
        self.trials.push(trial);
        Ok(())
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    pub fn has_exhausted_attempts(&self) -> bool {
        self.trials.len() >= MAX_ATTEMPTS as usize
    }

    /// Finalize the game: mark inactive, append the closing line, write a
    /// score file on a win, then rename the mirror into the archive directory.
    pub fn finalize(
        &mut self,
        end_code: EndCode,
        now: DateTime<Local>,
        paths: &ServerPaths,
    ) -> Result<String, GameError> {
        self.active = false;
        let elapsed = self.elapsed_secs(now);
        let close_line = format!("{} {}\n", now.format("%Y-%m-%d %H:%M:%S"), elapsed);
        self.append_line(paths, &close_line)?;

        if end_code == EndCode::Win {
            self.write_score_file(elapsed, now, paths)?;
        }

        let basename = format!("{}_{}", now.format("%Y%m%d_%H%M%S"), end_code.letter());
        fs::create_dir_all(paths.archive_dir(&self.plid))?;
        fs::rename(
            paths.in_progress_file(&self.plid),
            paths.archive_file(&self.plid, &basename),
        )?;

        Ok(basename)
    }

    fn header_line(&self) -> String {
        format!(
            "{} {} {} {} {}\n",
            self.plid,
            self.mode.letter(),
            code_to_wire(&self.secret),
            self.max_time,
            format!(
                "{} {}",
                self.start_time.format("%Y-%m-%d %H:%M:%S"),
                self.start_time.timestamp(),
            ),
        )
    }

    fn write_in_progress(&self, paths: &ServerPaths) -> Result<(), GameError> {
        fs::create_dir_all(&paths.games_dir)?;
        let mut file = fs::File::create(paths.in_progress_file(&self.plid))?;
        file.write_all(self.header_line().as_bytes())?;
        Ok(())
    }

    fn append_line(&self, paths: &ServerPaths, line: &str) -> Result<(), GameError> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(paths.in_progress_file(&self.plid))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn write_score_file(
        &self,
        elapsed: i64,
        now: DateTime<Local>,
        paths: &ServerPaths,
    ) -> Result<(), GameError> {
        let score = compute_score(elapsed, self.max_time, self.trials.len());
        let timestamp = now.format("%d%m%Y_%H%M%S").to_string();
        fs::create_dir_all(&paths.scores_dir)?;
        let mut file = fs::File::create(paths.score_file(score, &self.plid, &timestamp))?;
        let line = format!(
            "{} {} {} {} {}\n",
            score,
            self.plid,
            code_to_compact(&self.secret),
            self.trials.len(),
            self.mode.score_word(),
        );
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Render this game's transcript as `STR`'s file payload content.
    pub fn render_transcript(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header_line());
        for t in &self.trials {
            out.push_str(&format!(
                "T: {} {} {} {}\n",
                code_to_wire(&t.guess),
                t.n_b,
                t.n_w,
                t.secs_from_start,
            ));
        }
        out
    }
}

/// `score = clamp(round(timePct*50) + round(trialPct*50), 0, 100)`.
pub fn compute_score(elapsed: i64, max_time: i64, trials_used: usize) -> u8 {
    let time_pct = (1.0 - (elapsed as f64 / max_time as f64)).max(0.0);
    let trial_pct = 1.0 - (trials_used as f64 / MAX_ATTEMPTS as f64);
    let raw = (time_pct * 50.0).round() + (trial_pct * 50.0).round();
    raw.clamp(0.0, 100.0) as u8
}

/// Append the termination line `STR` shows for a finished game, matching the
/// word vocabulary used for archive basenames (`WIN`/`FAIL`/`TIMEOUT`/`QUIT`).
pub fn termination_word_for_letter(letter: char) -> &'static str {
    match letter {
        'W' => EndCode::Win.word(),
        'F' => EndCode::Fail.word(),
        'T' => EndCode::Timeout.word(),
        'Q' => EndCode::Quit.word(),
        _ => "UNKNOWN",
    }
}

/// Read and minimally parse an archived game file's path to pull out the
/// end-code letter embedded in its basename (`..._<X>.txt`).
pub fn end_code_letter_from_path(path: &Path) -> Option<char> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('_').next()?.chars().next()
}

/// Parse a header line back into `(plid, mode, secret, max_time, start)`, used
/// by the store when recovering STR/timeout state from disk-only info.
pub fn parse_header_line(line: &str) -> Option<(String, Mode, Code, i64, DateTime<Local>)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    // PLID M C1 C2 C3 C4 maxTime YYYY-MM-DD HH:MM:SS epoch
    if tokens.len() != 10 {
        return None;
    }
    let plid = tokens[0].to_string();
    let mode = match tokens[1] {
        "P" => Mode::Play,
        "D" => Mode::Debug,
        _ => return None,
    };
    let secret = code_from_tokens(&tokens[2..6])?;
    let max_time: i64 = tokens[6].parse().ok()?;
    let epoch: i64 = tokens[9].parse().ok()?;
    let start = DateTime::from_timestamp(epoch, 0)?.with_timezone(&Local);
    Some((plid, mode, secret, max_time, start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_bounded() {
        for elapsed in [0, 30, 60, 600, 1000] {
            for trials in 0..=8 {
                let s = compute_score(elapsed, 60, trials);
                assert!(s <= 100);
            }
        }
    }

    #[test]
    fn score_decreases_with_elapsed_time() {
        let fast = compute_score(5, 60, 2);
        let slow = compute_score(55, 60, 2);
        assert!(fast >= slow);
    }

    #[test]
    fn score_decreases_with_more_trials() {
        let few = compute_score(10, 60, 1);
        let many = compute_score(10, 60, 8);
        assert!(few >= many);
    }

    #[test]
    fn perfect_game_scores_100() {
        assert_eq!(compute_score(0, 60, 0), 100);
    }

    #[test]
    fn header_round_trips() {
        let now = Local::now();
        let header = format!(
            "123456 P R G B Y 60 {} {}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            now.timestamp()
        );
        let (plid, mode, secret, max_time, _start) = parse_header_line(&header).unwrap();
        assert_eq!(plid, "123456");
        assert_eq!(mode, Mode::Play);
        assert_eq!(max_time, 60);
        assert_eq!(secret.len(), 4);
    }

    #[test]
    fn end_code_letter_extracted_from_basename() {
        let path = Path::new("GAMES/123456/20260101_120000_W.txt");
        assert_eq!(end_code_letter_from_path(path), Some('W'));
    }
}
