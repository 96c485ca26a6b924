/// Probability that a player rated `r_a` beats a player rated `r_b` under the
/// standard 400-point logistic rating curve.
pub fn expected_score(r_a: f64, r_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(-(r_a - r_b) / 400.0))
}

/// My chance to win a game at `my_elo` against `their_elo`.
///
/// Computed from the absolute gap and then oriented, so the favourite's
/// chance is always `1 - p(underdog)` exactly.
pub fn chance_to_win(my_elo: i32, their_elo: i32) -> f64 {
    let gap = (i64::from(my_elo) - i64::from(their_elo)).abs() as f64;
    let underdog = 1.0 / (10.0_f64.powf(gap / 400.0) + 1.0);
    if my_elo > their_elo {
        1.0 - underdog
    } else {
        underdog
    }
}

#[cfg(test)]
mod tests {
    use super::{chance_to_win, expected_score};

    #[test]
    fn even_ratings_are_a_coin_flip() {
        assert!((expected_score(2500.0, 2500.0) - 0.5).abs() < 1e-12);
        assert!((chance_to_win(3100, 3100) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn four_hundred_points_is_ten_to_one() {
        let p = chance_to_win(2600, 3000);
        assert!((p - 1.0 / 11.0).abs() < 1e-12);
        let q = chance_to_win(3000, 2600);
        assert!((q - 10.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn extreme_gaps_stay_in_range() {
        let p = chance_to_win(i32::MIN, i32::MAX);
        assert!(p.is_finite() && (0.0..=0.5).contains(&p));
        let q = chance_to_win(i32::MAX, i32::MIN);
        assert!(q.is_finite() && (0.5..=1.0).contains(&q));
    }

    #[test]
    fn oriented_chance_matches_expected_score() {
        for (a, b) in [(2000, 2450), (4100, 3900), (3300, 3300)] {
            let direct = expected_score(a as f64, b as f64);
            assert!((chance_to_win(a, b) - direct).abs() < 1e-9);
        }
    }
}
