//! Standalone field validators (C2). Each returns a plain `bool` so handlers
//! can compose them into a single protocol-level ERR check before touching
//! any state.

/// Exactly 6 decimal digits.
pub fn valid_plid(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// `1 <= t <= 600` seconds.
pub fn valid_time(t: i64) -> bool {
    (1..=600).contains(&t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plid_requires_six_digits() {
        assert!(valid_plid("123456"));
        assert!(!valid_plid("12345"));
        assert!(!valid_plid("1234567"));
        assert!(!valid_plid("12345a"));
        assert!(!valid_plid(""));
    }

    #[test]
    fn time_bounds() {
        assert!(!valid_time(0));
        assert!(valid_time(1));
        assert!(valid_time(600));
        assert!(!valid_time(601));
        assert!(!valid_time(-5));
    }
}
