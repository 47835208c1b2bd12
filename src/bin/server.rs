use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use mastermind::codec::{parse_request, Request};
use mastermind::config::{ensure_dir, ServerPaths};
use mastermind::handlers::dispatch;
use mastermind::logger::Logger;
use mastermind::store::GameStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::Mutex;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "server",
    version,
    about = "Mastermind game server",
    long_about = "Hosts per-player Mastermind games over a line-oriented UDP/TCP protocol.\n\
                  SNG/TRY/QUT/DBG arrive over UDP; STR/SSB arrive over TCP."
)]
struct Args {
    /// UDP and TCP port to listen on
    #[arg(short, long, default_value_t = 58030)]
    port: u16,

    /// Directory holding in-progress and archived game files
    #[arg(long, default_value = "GAMES")]
    games_dir: String,

    /// Directory holding finished-game score files
    #[arg(long, default_value = "SCORES")]
    scores_dir: String,

    /// Increase output verbosity (-v verbose, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ── DISPLAY EVENTS ────────────────────────────────────────────────────────────

enum Event<'a> {
    Listening { port: u16 },
    Request { verb: &'a str, plid: Option<&'a str>, transport: &'static str, peer: String },
    AcceptError { reason: String },
    BindError { reason: String },
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Listening { port } => write!(f, "Listening on UDP+TCP port {port}"),
            Event::Request { verb, plid, transport, peer } => match plid {
                Some(plid) => write!(f, "{transport} {verb} plid={plid} peer={peer}"),
                None => write!(f, "{transport} {verb} peer={peer}"),
            },
            Event::AcceptError { reason } => write!(f, "TCP accept error: {reason}"),
            Event::BindError { reason } => write!(f, "Bind error: {reason}"),
        }
    }
}

fn request_verb(req: &Request) -> &'static str {
    match req {
        Request::StartNewGame { .. } => "SNG",
        Request::Try { .. } => "TRY",
        Request::Quit { .. } => "QUT",
        Request::DebugStart { .. } => "DBG",
        Request::ShowTrials { .. } => "STR",
        Request::Scoreboard => "SSB",
    }
}

fn request_plid(req: &Request) -> Option<&str> {
    match req {
        Request::StartNewGame { plid, .. }
        | Request::Try { plid, .. }
        | Request::Quit { plid }
        | Request::DebugStart { plid, .. }
        | Request::ShowTrials { plid } => Some(plid),
        Request::Scoreboard => None,
    }
}

async fn handle_tcp(
    mut socket: tokio::net::TcpStream,
    peer: SocketAddr,
    store: Arc<Mutex<GameStore>>,
    paths: Arc<ServerPaths>,
    log: Arc<Logger>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.contains(&b'\n') {
                    break;
                }
            }
            Err(_) => return,
        }
    }
    let line = String::from_utf8_lossy(&buf);
    let line = line.trim_end_matches(['\n', '\r']);

    let response = match parse_request(line) {
        Ok(req) if req.is_tcp() => {
            log.verbose(Event::Request {
                verb: request_verb(&req),
                plid: request_plid(&req),
                transport: "TCP",
                peer: peer.to_string(),
            });
            let mut store = store.lock().await;
            dispatch(&req, &mut store, &paths, chrono::Local::now(), &log)
        }
        Ok(_) => mastermind::codec::Response::plain("ERR"),
        Err(_) => mastermind::codec::Response::plain("ERR"),
    };

    let _ = socket.write_all(&response.to_wire()).await;
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let log = Arc::new(Logger::new(args.verbose));

    let paths = Arc::new(ServerPaths::new(args.games_dir.clone(), args.scores_dir.clone()));
    if let Err(e) = ensure_dir(&paths.games_dir).and_then(|_| ensure_dir(&paths.scores_dir)) {
        eprintln!("Failed to create storage directories: {e}");
        std::process::exit(1);
    }

    let bind_addr = format!("0.0.0.0:{}", args.port);

    let udp = UdpSocket::bind(&bind_addr).await.unwrap_or_else(|e| {
        log.warn(Event::BindError { reason: e.to_string() });
        std::process::exit(1);
    });
    let tcp = TcpListener::bind(&bind_addr).await.unwrap_or_else(|e| {
        log.warn(Event::BindError { reason: e.to_string() });
        std::process::exit(1);
    });

    log.info(Event::Listening { port: args.port });

    let store = Arc::new(Mutex::new(GameStore::new()));
    let mut udp_buf = vec![0u8; 2048];

    loop {
        tokio::select! {
            result = udp.recv_from(&mut udp_buf) => {
                let (n, peer) = match result {
                    Ok(pair) => pair,
                    Err(e) => {
                        log.warn(Event::AcceptError { reason: e.to_string() });
                        continue;
                    }
                };
                let line = String::from_utf8_lossy(&udp_buf[..n]);
                let line = line.trim_end_matches(['\n', '\r']);

                let response = match parse_request(line) {
                    Ok(req) if !req.is_tcp() => {
                        log.verbose(Event::Request {
                            verb: request_verb(&req),
                            plid: request_plid(&req),
                            transport: "UDP",
                            peer: peer.to_string(),
                        });
                        let mut store = store.lock().await;
                        dispatch(&req, &mut store, &paths, chrono::Local::now(), &log)
                    }
                    Ok(_) => mastermind::codec::Response::plain("ERR"),
                    Err(_) => mastermind::codec::Response::plain("ERR"),
                };

                if let Err(e) = udp.send_to(&response.to_wire(), peer).await {
                    log.warn(Event::AcceptError { reason: e.to_string() });
                }
            }

            result = tcp.accept() => {
                let (socket, peer) = match result {
                    Ok(pair) => pair,
                    Err(e) => {
                        log.warn(Event::AcceptError { reason: e.to_string() });
                        continue;
                    }
                };
                let store = Arc::clone(&store);
                let paths = Arc::clone(&paths);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    handle_tcp(socket, peer, store, paths, log).await;
                });
            }
        }
    }
}
