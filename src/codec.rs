//! Wire codec (C1): tokenizes request lines and formats response frames.

use crate::color::{code_from_tokens, Code};
use crate::error::GameError;

/// A parsed request frame, independent of which transport carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    StartNewGame { plid: String, max_time: i64 },
    Try { plid: String, guess: Code, n: u32 },
    Quit { plid: String },
    DebugStart { plid: String, max_time: i64, secret: Code },
    ShowTrials { plid: String },
    Scoreboard,
}

impl Request {
    /// Whether this verb is carried over TCP (`STR`/`SSB`) or UDP (everything else).
    pub fn is_tcp(&self) -> bool {
        matches!(self, Request::ShowTrials { .. } | Request::Scoreboard)
    }
}

/// Parse one request line (without its trailing newline) into a `Request`.
pub fn parse_request(line: &str) -> Result<Request, GameError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (verb, args) = tokens
        .split_first()
        .ok_or_else(|| GameError::protocol("empty request"))?;

    match *verb {
        "SNG" => {
            let [plid, t] = args else {
                return Err(GameError::protocol("SNG wants 2 arguments"));
            };
            let max_time: i64 = t
                .parse()
                .map_err(|_| GameError::protocol("SNG time not numeric"))?;
            Ok(Request::StartNewGame {
                plid: plid.to_string(),
                max_time,
            })
        }
        "TRY" => {
            let [plid, c1, c2, c3, c4, n] = args else {
                return Err(GameError::protocol("TRY wants 6 arguments"));
            };
            let guess = code_from_tokens(&[*c1, *c2, *c3, *c4])
                .ok_or_else(|| GameError::protocol("TRY colors invalid"))?;
            let n: u32 = n
                .parse()
                .map_err(|_| GameError::protocol("TRY trial number not numeric"))?;
            Ok(Request::Try {
                plid: plid.to_string(),
                guess,
                n,
            })
        }
        "QUT" => {
            let [plid] = args else {
                return Err(GameError::protocol("QUT wants 1 argument"));
            };
            Ok(Request::Quit {
                plid: plid.to_string(),
            })
        }
        "DBG" => {
            let [plid, t, c1, c2, c3, c4] = args else {
                return Err(GameError::protocol("DBG wants 6 arguments"));
            };
            let max_time: i64 = t
                .parse()
                .map_err(|_| GameError::protocol("DBG time not numeric"))?;
            let secret = code_from_tokens(&[*c1, *c2, *c3, *c4])
                .ok_or_else(|| GameError::protocol("DBG colors invalid"))?;
            Ok(Request::DebugStart {
                plid: plid.to_string(),
                max_time,
                secret,
            })
        }
        "STR" => {
            let [plid] = args else {
                return Err(GameError::protocol("STR wants 1 argument"));
            };
            Ok(Request::ShowTrials {
                plid: plid.to_string(),
            })
        }
        "SSB" => {
            if !args.is_empty() {
                return Err(GameError::protocol("SSB takes no arguments"));
            }
            Ok(Request::Scoreboard)
        }
        other => Err(GameError::protocol(format!("unknown verb {other}"))),
    }
}

/// A response frame, possibly carrying a named file payload (`STR`/`SSB`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub line: String,
    pub payload: Option<FilePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: String,
    pub content: String,
}

impl Response {
    pub fn plain(line: impl Into<String>) -> Self {
        Response {
            line: line.into(),
            payload: None,
        }
    }

    pub fn with_file(verb_and_status: impl Into<String>, filename: String, content: String) -> Self {
        let prefix = verb_and_status.into();
        Response {
            line: format!("{prefix} {filename} {}", content.len()),
            payload: Some(FilePayload { filename, content }),
        }
    }

    /// Serialize to the exact bytes written to the wire: the status line,
    /// a trailing newline, and (for file responses) the raw payload bytes.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.line.as_bytes());
        out.push(b'\n');
        if let Some(payload) = &self.payload {
            out.extend_from_slice(payload.content.as_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color::*;

    #[test]
    fn parses_sng() {
        let req = parse_request("SNG 123456 60").unwrap();
        assert_eq!(
            req,
            Request::StartNewGame {
                plid: "123456".into(),
                max_time: 60
            }
        );
    }

    #[test]
    fn parses_try() {
        let req = parse_request("TRY 123456 R G B Y 1").unwrap();
        assert_eq!(
            req,
            Request::Try {
                plid: "123456".into(),
                guess: [Red, Green, Blue, Yellow],
                n: 1
            }
        );
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(parse_request("SNG 123456").is_err());
        assert!(parse_request("TRY 123456 R G B 1").is_err());
        assert!(parse_request("SSB extra").is_err());
    }

    #[test]
    fn rejects_unknown_verb() {
        assert!(parse_request("FOO bar").is_err());
    }

    #[test]
    fn tcp_classification() {
        assert!(parse_request("STR 123456").unwrap().is_tcp());
        assert!(parse_request("SSB").unwrap().is_tcp());
        assert!(!parse_request("QUT 123456").unwrap().is_tcp());
    }

    #[test]
    fn file_response_wire_format() {
        let resp = Response::with_file("RST ACT", "STATE_123456.txt".into(), "hello".into());
        assert_eq!(resp.line, "RST ACT STATE_123456.txt 5");
        assert_eq!(resp.to_wire(), b"RST ACT STATE_123456.txt 5\nhello");
    }
}
