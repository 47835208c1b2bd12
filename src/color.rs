//! The six-color alphabet a secret code is drawn from, and the 4-tuple code type.

use std::fmt;
use std::str::FromStr;

/// One of the six pegs a Mastermind code is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Orange,
        Color::Purple,
    ];

    fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Purple => 'P',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Parse a single-letter color token. Anything else (wrong length, lowercase,
/// unknown letter) is rejected — callers treat `Err` as a protocol-level
/// validation failure, not a panic.
impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(());
        };
        match c {
            'R' => Ok(Color::Red),
            'G' => Ok(Color::Green),
            'B' => Ok(Color::Blue),
            'Y' => Ok(Color::Yellow),
            'O' => Ok(Color::Orange),
            'P' => Ok(Color::Purple),
            _ => Err(()),
        }
    }
}

/// An ordered 4-tuple of colors — a secret or a guess. Duplicates are allowed.
pub type Code = [Color; 4];

/// Render a code in the wire's space-separated form, e.g. `"R G B Y"`.
pub fn code_to_wire(code: &Code) -> String {
    code.iter()
        .map(Color::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse four whitespace-separated color tokens into a code.
pub fn code_from_tokens(tokens: &[&str]) -> Option<Code> {
    if tokens.len() != 4 {
        return None;
    }
    let mut out = [Color::Red; 4];
    for (slot, tok) in out.iter_mut().zip(tokens) {
        *slot = tok.parse().ok()?;
    }
    Some(out)
}

/// Render a code as four contiguous letters, e.g. `"RGBY"` — the form used
/// inside a score file's single-line body, which is itself one field among
/// several space-separated ones.
pub fn code_to_compact(code: &Code) -> String {
    code.iter().map(Color::to_string).collect()
}

/// Parse a contiguous 4-letter code, e.g. `"RGBY"`.
pub fn code_from_compact(s: &str) -> Option<Code> {
    if s.chars().count() != 4 {
        return None;
    }
    let mut out = [Color::Red; 4];
    for (slot, c) in out.iter_mut().zip(s.chars()) {
        *slot = c.to_string().parse().ok()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_color() {
        for c in Color::ALL {
            let s = c.to_string();
            assert_eq!(s.parse::<Color>().unwrap(), c);
        }
    }

    #[test]
    fn rejects_lowercase_and_unknown() {
        assert!("r".parse::<Color>().is_err());
        assert!("X".parse::<Color>().is_err());
        assert!("RG".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn code_wire_round_trip() {
        let code = [Color::Red, Color::Green, Color::Blue, Color::Yellow];
        let wire = code_to_wire(&code);
        assert_eq!(wire, "R G B Y");
        let tokens: Vec<&str> = wire.split(' ').collect();
        assert_eq!(code_from_tokens(&tokens), Some(code));
    }

    #[test]
    fn code_from_tokens_rejects_wrong_arity() {
        assert_eq!(code_from_tokens(&["R", "G", "B"]), None);
        assert_eq!(code_from_tokens(&["R", "G", "B", "Y", "O"]), None);
    }

    #[test]
    fn code_compact_round_trip() {
        let code = [Color::Red, Color::Green, Color::Blue, Color::Yellow];
        let compact = code_to_compact(&code);
        assert_eq!(compact, "RGBY");
        assert_eq!(code_from_compact(&compact), Some(code));
    }

    #[test]
    fn code_from_compact_rejects_wrong_length() {
        assert_eq!(code_from_compact("RGB"), None);
        assert_eq!(code_from_compact("RGBYO"), None);
        assert_eq!(code_from_compact(""), None);
    }
}
