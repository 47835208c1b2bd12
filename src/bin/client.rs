use std::fmt;
use std::io::{self, Write as _};
use std::time::Duration;

use clap::{ArgAction, Parser};
use mastermind::config::ensure_dir;
use mastermind::logger::Logger;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, UdpSocket};

const UDP_TIMEOUT: Duration = Duration::from_secs(5);

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "client",
    version,
    about = "Mastermind game client",
    long_about = "Interactive terminal client for the Mastermind game server.\n\
                  Commands: start <PLID> <time>, try <C1> <C2> <C3> <C4>,\n  \
                    show_trials|st, scoreboard|sb, debug <PLID> <time> <C1> <C2> <C3> <C4>,\n  \
                    quit, exit"
)]
struct Args {
    /// Server host to connect to
    #[arg(short = 'n', long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 58030)]
    port: u16,

    /// Directory STR responses are written into
    #[arg(long, default_value = "Client/Game_History")]
    history_dir: String,

    /// Directory SSB responses are written into
    #[arg(long, default_value = "Client/Top_Scores")]
    scores_dir: String,

    /// Increase output verbosity (-v verbose, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ── CLIENT EVENTS ─────────────────────────────────────────────────────────────

enum Event<'a> {
    Sending { line: &'a str },
    Received { line: &'a str },
    UdpTimeout,
    ConnectError { reason: String },
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Sending { line } => write!(f, "→ {line}"),
            Event::Received { line } => write!(f, "← {line}"),
            Event::UdpTimeout => write!(f, "timed out waiting for a reply"),
            Event::ConnectError { reason } => write!(f, "connect error: {reason}"),
        }
    }
}

// ── USER COMMANDS ─────────────────────────────────────────────────────────────

/// A validated REPL command, with the wire-frame arity already checked
/// (mirroring the original client's up-front token-count validation).
enum Cmd {
    Start { plid: String, time: String },
    Try { colors: [String; 4] },
    ShowTrials,
    Scoreboard,
    Debug { plid: String, time: String, colors: [String; 4] },
    Quit,
    Exit,
}

impl Cmd {
    fn parse(raw: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let Some((keyword, args)) = tokens.split_first() else {
            return Err("empty input".into());
        };

        match keyword.to_ascii_lowercase().as_str() {
            "start" => match args {
                [plid, time] => Ok(Cmd::Start { plid: plid.to_string(), time: time.to_string() }),
                _ => Err("usage: start <PLID> <time>".into()),
            },
            "try" => match args {
                [c1, c2, c3, c4] => Ok(Cmd::Try {
                    colors: [c1.to_string(), c2.to_string(), c3.to_string(), c4.to_string()],
                }),
                _ => Err("usage: try <C1> <C2> <C3> <C4>".into()),
            },
            "show_trials" | "st" => match args {
                [] => Ok(Cmd::ShowTrials),
                _ => Err("usage: show_trials".into()),
            },
            "scoreboard" | "sb" => match args {
                [] => Ok(Cmd::Scoreboard),
                _ => Err("usage: scoreboard".into()),
            },
            "debug" => match args {
                [plid, time, c1, c2, c3, c4] => Ok(Cmd::Debug {
                    plid: plid.to_string(),
                    time: time.to_string(),
                    colors: [c1.to_string(), c2.to_string(), c3.to_string(), c4.to_string()],
                }),
                _ => Err("usage: debug <PLID> <time> <C1> <C2> <C3> <C4>".into()),
            },
            "quit" => match args {
                [] => Ok(Cmd::Quit),
                _ => Err("quit takes no arguments".into()),
            },
            "exit" => match args {
                [] => Ok(Cmd::Exit),
                _ => Err("exit takes no arguments".into()),
            },
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

fn print_help() {
    println!("  Commands:");
    println!("    start <PLID> <time>                       — begin a new game");
    println!("    try <C1> <C2> <C3> <C4>                   — submit a guess");
    println!("    show_trials | st                          — show this game's trial history");
    println!("    scoreboard | sb                           — show the top-10 scoreboard");
    println!("    debug <PLID> <time> <C1> <C2> <C3> <C4>   — start a game with a known secret");
    println!("    quit | exit                               — end the current game / leave");
}

fn print_prompt() {
    print!("mastermind> ");
    io::stdout().flush().ok();
}

// ── CLIENT STATE ──────────────────────────────────────────────────────────────

struct Session {
    plid: Option<String>,
    next_trial: u32,
}

impl Session {
    fn new() -> Self {
        Self { plid: None, next_trial: 1 }
    }
}

// ── WIRE I/O ───────────────────────────────────────────────────────────────────

async fn send_udp(socket: &UdpSocket, line: &str, log: &Logger) -> Option<String> {
    log.verbose(Event::Sending { line });
    if socket.send(format!("{line}\n").as_bytes()).await.is_err() {
        return None;
    }

    let mut buf = vec![0u8; 2048];
    match tokio::time::timeout(UDP_TIMEOUT, socket.recv(&mut buf)).await {
        Ok(Ok(n)) => {
            let reply = String::from_utf8_lossy(&buf[..n]).trim_end().to_string();
            log.verbose(Event::Received { line: &reply });
            Some(reply)
        }
        Ok(Err(_)) => None,
        Err(_) => {
            log.warn(Event::UdpTimeout);
            None
        }
    }
}

/// Run a TCP request/response exchange, writing any file payload into `dir`
/// under the filename the server declared. Returns the status line.
async fn send_tcp(host: &str, port: u16, line: &str, dir: &str, log: &Logger) -> Option<String> {
    let addr = format!("{host}:{port}");
    let mut stream = match TcpStream::connect(&addr).await {
        Ok(s) => s,
        Err(e) => {
            log.warn(Event::ConnectError { reason: e.to_string() });
            return None;
        }
    };

    log.verbose(Event::Sending { line });
    stream.write_all(format!("{line}\n").as_bytes()).await.ok()?;

    let mut reader = BufReader::new(&mut stream);
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await.ok()?;
    let status_line = status_line.trim_end().to_string();
    log.verbose(Event::Received { line: &status_line });

    let tokens: Vec<&str> = status_line.splitn(4, ' ').collect();
    if let [verb, status, filename, size] = tokens[..] {
        if let Ok(size) = size.parse::<usize>() {
            let mut content = vec![0u8; size];
            if reader.read_exact(&mut content).await.is_ok() {
                ensure_dir(std::path::Path::new(dir)).ok();
                let path = std::path::Path::new(dir).join(filename);
                if let Err(e) = std::fs::write(&path, &content) {
                    eprintln!("Failed to save {}: {e}", path.display());
                } else {
                    println!("Saved {} to {}", filename, path.display());
                }
            }
            return Some(format!("{verb} {status}"));
        }
    }
    Some(status_line)
}

// ── MAIN ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let log = Logger::new(args.verbose);

    let udp = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open UDP socket: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = udp.connect(format!("{}:{}", args.host, args.port)).await {
        eprintln!("Failed to resolve {}:{}: {e}", args.host, args.port);
        std::process::exit(1);
    }

    println!("Mastermind client — connected to {}:{}", args.host, args.port);
    print_help();

    let mut session = Session::new();
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

    print_prompt();
    while let Ok(Some(raw)) = stdin_lines.next_line().await {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            print_prompt();
            continue;
        }

        let cmd = match Cmd::parse(trimmed) {
            Ok(cmd) => cmd,
            Err(reason) => {
                println!("  ? {reason}");
                print_prompt();
                continue;
            }
        };

        match cmd {
            Cmd::Start { plid, time } => {
                let line = format!("SNG {plid} {time}");
                if let Some(reply) = send_udp(&udp, &line, &log).await {
                    println!("{reply}");
                    if reply == "RSG OK" {
                        session.plid = Some(plid);
                        session.next_trial = 1;
                    }
                }
            }
            Cmd::Debug { plid, time, colors } => {
                let line = format!("DBG {plid} {time} {} {} {} {}", colors[0], colors[1], colors[2], colors[3]);
                if let Some(reply) = send_udp(&udp, &line, &log).await {
                    println!("{reply}");
                    if reply == "RDB OK" {
                        session.plid = Some(plid);
                        session.next_trial = 1;
                    }
                }
            }
            Cmd::Try { colors } => {
                let Some(plid) = session.plid.clone() else {
                    println!("no game in progress — use 'start' or 'debug' first");
                    print_prompt();
                    continue;
                };
                let line = format!(
                    "TRY {plid} {} {} {} {} {}",
                    colors[0], colors[1], colors[2], colors[3], session.next_trial
                );
                if let Some(reply) = send_udp(&udp, &line, &log).await {
                    println!("{reply}");
                    if reply.starts_with("RTR OK") {
                        session.next_trial += 1;
                    }
                    if reply.starts_with("RTR ENT") || reply.starts_with("RTR OK") && reply.ends_with(" 4 0") {
                        session.plid = None;
                    }
                }
            }
            Cmd::ShowTrials => {
                let Some(plid) = session.plid.clone() else {
                    println!("no game in progress");
                    print_prompt();
                    continue;
                };
                let line = format!("STR {plid}");
                if let Some(reply) = send_tcp(&args.host, args.port, &line, &args.history_dir, &log).await {
                    println!("{reply}");
                }
            }
            Cmd::Scoreboard => {
                let line = "SSB".to_string();
                if let Some(reply) = send_tcp(&args.host, args.port, &line, &args.scores_dir, &log).await {
                    println!("{reply}");
                }
            }
            Cmd::Quit => {
                if let Some(plid) = session.plid.take() {
                    let line = format!("QUT {plid}");
                    if let Some(reply) = send_udp(&udp, &line, &log).await {
                        println!("{reply}");
                    }
                } else {
                    println!("no game in progress");
                }
            }
            Cmd::Exit => {
                if let Some(plid) = session.plid.take() {
                    let line = format!("QUT {plid}");
                    send_udp(&udp, &line, &log).await;
                }
                println!("bye");
                break;
            }
        }

        print_prompt();
    }
}
