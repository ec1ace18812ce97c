//! Percentile rank of the latest IV within its rolling window.

/// `100 * count(x < latest) / len(window)`.
///
/// `window` must already contain `latest`. Equal values do not count, so a
/// single-element window ranks at 0. Returns `None` for an empty window.
pub fn percentile_rank(window: &[f64], latest: f64) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let below = window.iter().filter(|&&x| x < latest).count();
    Some(100.0 * below as f64 / window.len() as f64)
}

/// Round to two decimal places, the precision used for display and policy.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_is_zero() {
        assert_eq!(percentile_rank(&[15.3], 15.3), Some(0.0));
    }

    #[test]
    fn empty_window_has_no_rank() {
        assert_eq!(percentile_rank(&[], 12.0), None);
    }

    #[test]
    fn strict_less_than() {
        // two below, one equal (itself), one above
        let window = [10.0, 11.0, 14.0, 12.0];
        assert_eq!(percentile_rank(&window, 12.0), Some(50.0));

        let ties = [12.0, 12.0, 12.0];
        assert_eq!(percentile_rank(&ties, 12.0), Some(0.0));
    }

    #[test]
    fn new_maximum_ranks_n_minus_one_over_n() {
        let window = [10.0, 11.0, 12.0, 13.0, 20.0];
        assert_eq!(percentile_rank(&window, 20.0), Some(80.0));
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(100.0 * 2.0 / 3.0), 66.67);
        assert_eq!(round2(100.0 / 3.0), 33.33);
        assert_eq!(round2(95.0), 95.0);
    }
}
