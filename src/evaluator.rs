//! Match evaluator (C3): computes blacks/whites for a guess against a secret.

use crate::color::Code;

/// Score a guess against a secret, returning `(nB, nW)`.
///
/// `nB` counts exact position+color matches. `nW` is the size of a greedy
/// left-to-right bipartite match between the remaining (unmatched) guess and
/// secret positions under color equality — each position on either side is
/// consumed at most once.
pub fn score(secret: &Code, guess: &Code) -> (u8, u8) {
    let mut secret_used = [false; 4];
    let mut guess_used = [false; 4];

    let mut n_b = 0u8;
    for i in 0..4 {
        if guess[i] == secret[i] {
            n_b += 1;
            secret_used[i] = true;
            guess_used[i] = true;
        }
    }

    let mut n_w = 0u8;
    for i in 0..4 {
        if guess_used[i] {
            continue;
        }
        for j in 0..4 {
            if !secret_used[j] && guess[i] == secret[j] {
                n_w += 1;
                secret_used[j] = true;
                break;
            }
        }
    }

    (n_b, n_w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::color::Color::*;

    #[test]
    fn exact_match_is_all_black() {
        let code = [Red, Green, Blue, Yellow];
        assert_eq!(score(&code, &code), (4, 0));
    }

    #[test]
    fn no_overlap_is_zero() {
        let secret = [Red, Red, Red, Red];
        let guess = [Green, Green, Green, Green];
        assert_eq!(score(&secret, &guess), (0, 0));
    }

    #[test]
    fn transposition_counts_as_white() {
        let secret = [Red, Green, Blue, Yellow];
        let guess = [Green, Red, Blue, Yellow];
        assert_eq!(score(&secret, &guess), (2, 2));
    }

    #[test]
    fn duplicate_colors_consumed_at_most_once() {
        // secret has one Red; guess offers two Reds — only one can white-match.
        let secret = [Red, Green, Green, Green];
        let guess = [Green, Red, Red, Blue];
        let (n_b, n_w) = score(&secret, &guess);
        assert_eq!(n_b, 0);
        assert_eq!(n_w, 2); // one Green matches white, one Red matches white
    }

    #[test]
    fn property_sum_never_exceeds_four() {
        let mut rng_state: u32 = 12345;
        let mut next = || {
            rng_state = rng_state.wrapping_mul(1103515245).wrapping_add(12345);
            (rng_state >> 16) as usize % 6
        };
        let palette = Color::ALL;
        for _ in 0..2000 {
            let secret = [
                palette[next()],
                palette[next()],
                palette[next()],
                palette[next()],
            ];
            let guess = [
                palette[next()],
                palette[next()],
                palette[next()],
                palette[next()],
            ];
            let (n_b, n_w) = score(&secret, &guess);
            assert!(n_b + n_w <= 4);
            assert_eq!(n_b == 4, secret == guess);
        }
    }
}
