//! Request handlers (C6): one function per verb, the sole authority for
//! state transitions. Transport multiplexing and socket I/O live in C8.

use chrono::{DateTime, Local};
use rand::Rng;

use crate::codec::{Request, Response};
use crate::color::{code_to_wire, Code, Color};
use crate::config::ServerPaths;
use crate::error::GameError;
use crate::game::{termination_word_for_letter, EndCode, GameRecord, Mode};
use crate::logger::Logger;
use crate::scoreboard;
use crate::store::GameStore;
use crate::validate::{valid_plid, valid_time};

/// Route a parsed request to its handler and render the wire response.
///
/// Any `GameError` produced by a handler becomes that verb's `ERR` reply —
/// protocol and transient-I/O failures share the same observable shape on
/// the wire. Transient I/O failures are additionally logged at `Warn` here,
/// since `log` is the only place both the error and its verb are in scope.
pub fn dispatch(
    req: &Request,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
    log: &Logger,
) -> Response {
    let result = match req {
        Request::StartNewGame { plid, max_time } => handle_sng(plid, *max_time, store, paths, now),
        Request::Try { plid, guess, n } => handle_try(plid, *guess, *n, store, paths, now),
        Request::Quit { plid } => handle_qut(plid, store, paths, now),
        Request::DebugStart {
            plid,
            max_time,
            secret,
        } => handle_dbg(plid, *max_time, *secret, store, paths, now),
        Request::ShowTrials { plid } => handle_str(plid, store, paths, now),
        Request::Scoreboard => handle_ssb(paths),
    };

    result.unwrap_or_else(|err| {
        if let GameError::Io(io_err) = &err {
            log.warn(format!("{} failed: {io_err}", verb_prefix(req)));
        }
        Response::plain(format!("{} ERR", verb_prefix(req)))
    })
}

fn verb_prefix(req: &Request) -> &'static str {
    match req {
        Request::StartNewGame { .. } => "RSG",
        Request::Try { .. } => "RTR",
        Request::Quit { .. } => "RQT",
        Request::DebugStart { .. } => "RDB",
        Request::ShowTrials { .. } => "RST",
        Request::Scoreboard => "RSS",
    }
}

fn random_secret() -> Code {
    let mut rng = rand::thread_rng();
    let mut code = [Color::Red; 4];
    for slot in &mut code {
        *slot = Color::ALL[rng.gen_range(0..Color::ALL.len())];
    }
    code
}

fn start_game(
    plid: &str,
    mode: Mode,
    secret: Code,
    max_time: i64,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
) -> Result<(), GameError> {
    if let Some(existing) = store.find(plid) {
        if existing.active {
            store.erase(plid);
        }
    }
    let game = GameRecord::start(plid.to_string(), mode, secret, max_time, now, paths)?;
    store.insert(game);
    Ok(())
}

fn already_midgame(store: &GameStore, plid: &str, now: DateTime<Local>) -> bool {
    match store.find(plid) {
        Some(game) => game.active && !game.is_time_exceeded(now) && !game.trials.is_empty(),
        None => false,
    }
}

/// SNG — Start New.
fn handle_sng(
    plid: &str,
    max_time: i64,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
) -> Result<Response, GameError> {
    if !valid_plid(plid) || !valid_time(max_time) {
        return Err(GameError::protocol("invalid SNG arguments"));
    }

    store.sweep_expired(plid, now, paths)?;

    if already_midgame(store, plid, now) {
        return Ok(Response::plain("RSG NOK"));
    }

    start_game(plid, Mode::Play, random_secret(), max_time, store, paths, now)?;
    Ok(Response::plain("RSG OK"))
}

/// DBG — Debug-Start.
fn handle_dbg(
    plid: &str,
    max_time: i64,
    secret: Code,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
) -> Result<Response, GameError> {
    if !valid_plid(plid) || !valid_time(max_time) {
        return Err(GameError::protocol("invalid DBG arguments"));
    }

    store.sweep_expired(plid, now, paths)?;

    if already_midgame(store, plid, now) {
        return Ok(Response::plain("RDB NOK"));
    }

    start_game(plid, Mode::Debug, secret, max_time, store, paths, now)?;
    Ok(Response::plain("RDB OK"))
}

/// TRY — Submit Guess.
fn handle_try(
    plid: &str,
    guess: Code,
    n: u32,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
) -> Result<Response, GameError> {
    if !valid_plid(plid) {
        return Err(GameError::protocol("invalid TRY PLID"));
    }

    if let Some(secret) = store.sweep_expired(plid, now, paths)? {
        return Ok(Response::plain(format!("RTR ETM {}", code_to_wire(&secret))));
    }

    let Some(game) = store.find(plid) else {
        return Ok(Response::plain("RTR NOK"));
    };
    if !game.active {
        return Ok(Response::plain("RTR NOK"));
    }

    let expected = game.trial_count() as u32 + 1;

    if n == expected.saturating_sub(1) {
        if let Some(last) = game.trials.last() {
            if last.guess == guess {
                let (n_b, n_w) = crate::evaluator::score(&game.secret, &guess);
                return Ok(Response::plain(format!("RTR OK {n} {n_b} {n_w}")));
            }
        }
        return Ok(Response::plain("RTR INV"));
    }
    if n != expected {
        return Ok(Response::plain("RTR INV"));
    }

    if game.trials.iter().any(|t| t.guess == guess) {
        return Ok(Response::plain("RTR DUP"));
    }

    let (n_b, n_w) = crate::evaluator::score(&game.secret, &guess);
    let secret = game.secret;

    let game = store.find_mut(plid).expect("looked up above");
    game.append_trial(guess, n_b, n_w, now, paths)?;

    if n_b == 4 {
        let mut game = store.erase(plid).expect("just mutated");
        game.finalize(EndCode::Win, now, paths)?;
        return Ok(Response::plain(format!("RTR OK {n} 4 0")));
    }

    if store.find(plid).expect("present").has_exhausted_attempts() {
        let mut game = store.erase(plid).expect("just mutated");
        game.finalize(EndCode::Fail, now, paths)?;
        return Ok(Response::plain(format!("RTR ENT {}", code_to_wire(&secret))));
    }

    Ok(Response::plain(format!("RTR OK {n} {n_b} {n_w}")))
}

/// QUT — Quit.
fn handle_qut(
    plid: &str,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
) -> Result<Response, GameError> {
    if !valid_plid(plid) {
        return Err(GameError::protocol("invalid QUT PLID"));
    }

    if store.sweep_expired(plid, now, paths)?.is_some() {
        return Ok(Response::plain("RQT NOK"));
    }

    let Some(game) = store.find(plid) else {
        return Ok(Response::plain("RQT NOK"));
    };
    if !game.active {
        return Ok(Response::plain("RQT NOK"));
    }

    let secret = game.secret;
    let mut game = store.erase(plid).expect("just looked up");
    game.finalize(EndCode::Quit, now, paths)?;
    Ok(Response::plain(format!("RQT OK {}", code_to_wire(&secret))))
}

/// STR — Show Trials.
fn handle_str(
    plid: &str,
    store: &mut GameStore,
    paths: &ServerPaths,
    now: DateTime<Local>,
) -> Result<Response, GameError> {
    if !valid_plid(plid) {
        return Err(GameError::protocol("invalid STR PLID"));
    }

    store.sweep_expired(plid, now, paths)?;

    let filename = format!("STATE_{plid}.txt");

    if let Some(game) = store.find(plid) {
        if game.active {
            let content = game.render_transcript();
            return Ok(Response::with_file("RST ACT", filename, content));
        }
    }

    if let Some(basename) = store.load_last_finished(plid, paths)? {
        let path = paths.archive_file(plid, &basename);
        let mut content = std::fs::read_to_string(&path)?;
        if let Some(letter) = crate::game::end_code_letter_from_path(&path) {
            content.push_str(termination_word_for_letter(letter));
            content.push('\n');
        }
        return Ok(Response::with_file("RST FIN", filename, content));
    }

    Ok(Response::plain("RST NOK"))
}

/// SSB — Scoreboard.
fn handle_ssb(paths: &ServerPaths) -> Result<Response, GameError> {
    let entries = scoreboard::top_n(paths)?;
    if entries.is_empty() {
        return Ok(Response::plain("RSS EMPTY"));
    }
    let content = scoreboard::format_report(&entries);
    Ok(Response::with_file("RSS OK", "TOPSCORES.txt".into(), content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color::*;

    fn temp_paths(label: &str) -> ServerPaths {
        let mut dir = std::env::temp_dir();
        dir.push(format!(
            "mastermind-handlers-test-{label}-{:?}",
            std::thread::current().id()
        ));
        ServerPaths::new(dir.join("GAMES"), dir.join("SCORES"))
    }

    #[test]
    fn start_then_guess_win() {
        let paths = temp_paths("win");
        let mut store = GameStore::new();
        let now = Local::now();
        let log = Logger::new(0);

        let resp = dispatch(
            &Request::DebugStart {
                plid: "123456".into(),
                max_time: 60,
                secret: [Red, Green, Blue, Yellow],
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        assert_eq!(resp.line, "RDB OK");

        let resp = dispatch(
            &Request::Try {
                plid: "123456".into(),
                guess: [Red, Green, Blue, Yellow],
                n: 1,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        assert_eq!(resp.line, "RTR OK 1 4 0");
        assert!(store.find("123456").is_none());

        std::fs::remove_dir_all(paths.games_dir.parent().unwrap()).ok();
    }

    #[test]
    fn double_start_refused_once_trials_exist() {
        let paths = temp_paths("double-start");
        let mut store = GameStore::new();
        let now = Local::now();
        let log = Logger::new(0);

        dispatch(
            &Request::StartNewGame {
                plid: "222222".into(),
                max_time: 60,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        dispatch(
            &Request::Try {
                plid: "222222".into(),
                guess: [Red, Red, Red, Red],
                n: 1,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        let resp = dispatch(
            &Request::StartNewGame {
                plid: "222222".into(),
                max_time: 60,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        assert_eq!(resp.line, "RSG NOK");

        std::fs::remove_dir_all(paths.games_dir.parent().unwrap()).ok();
    }

    #[test]
    fn exhaustion_after_eight_misses() {
        let paths = temp_paths("exhaustion");
        let mut store = GameStore::new();
        let now = Local::now();
        let log = Logger::new(0);

        dispatch(
            &Request::DebugStart {
                plid: "333333".into(),
                max_time: 600,
                secret: [Red, Red, Red, Red],
            },
            &mut store,
            &paths,
            now,
            &log,
        );

        let wrong_guesses = [
            [Green, Green, Green, Green],
            [Blue, Blue, Blue, Blue],
            [Yellow, Yellow, Yellow, Yellow],
            [Orange, Orange, Orange, Orange],
            [Purple, Purple, Purple, Purple],
            [Green, Blue, Yellow, Orange],
            [Blue, Yellow, Orange, Purple],
        ];
        let mut last_resp = Response::plain("");
        for (i, guess) in wrong_guesses.iter().enumerate() {
            last_resp = dispatch(
                &Request::Try {
                    plid: "333333".into(),
                    guess: *guess,
                    n: (i + 1) as u32,
                },
                &mut store,
                &paths,
                now,
                &log,
            );
        }
        assert!(last_resp.line.starts_with("RTR OK"));

        let final_resp = dispatch(
            &Request::Try {
                plid: "333333".into(),
                guess: [Orange, Purple, Green, Blue],
                n: 8,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        assert_eq!(final_resp.line, "RTR ENT R R R R");
        assert!(store.find("333333").is_none());

        std::fs::remove_dir_all(paths.games_dir.parent().unwrap()).ok();
    }

    #[test]
    fn resend_is_idempotent() {
        let paths = temp_paths("resend");
        let mut store = GameStore::new();
        let now = Local::now();
        let log = Logger::new(0);

        dispatch(
            &Request::DebugStart {
                plid: "444444".into(),
                max_time: 600,
                secret: [Red, Green, Blue, Yellow],
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        let first = dispatch(
            &Request::Try {
                plid: "444444".into(),
                guess: [Green, Green, Blue, Yellow],
                n: 1,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        let resend = dispatch(
            &Request::Try {
                plid: "444444".into(),
                guess: [Green, Green, Blue, Yellow],
                n: 1,
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        assert_eq!(first.line, resend.line);
        assert_eq!(store.find("444444").unwrap().trial_count(), 1);

        std::fs::remove_dir_all(paths.games_dir.parent().unwrap()).ok();
    }

    #[test]
    fn quit_archives_and_reveals_secret() {
        let paths = temp_paths("quit");
        let mut store = GameStore::new();
        let now = Local::now();
        let log = Logger::new(0);

        dispatch(
            &Request::DebugStart {
                plid: "555555".into(),
                max_time: 600,
                secret: [Purple, Orange, Blue, Yellow],
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        let resp = dispatch(
            &Request::Quit {
                plid: "555555".into(),
            },
            &mut store,
            &paths,
            now,
            &log,
        );
        assert_eq!(resp.line, "RQT OK P O B Y");
        assert!(store.find("555555").is_none());

        std::fs::remove_dir_all(paths.games_dir.parent().unwrap()).ok();
    }
}
