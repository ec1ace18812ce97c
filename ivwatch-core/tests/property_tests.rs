//! Property tests for signal invariants.
//!
//! Uses proptest to verify:
//! 1. Window capacity — length after insert is min(30, prior + 1), FIFO eviction
//! 2. Percentile bounds — rank is always within [0, 100]
//! 3. Rank of a new maximum — exactly 100 * (n - 1) / n
//! 4. ATM selection — the chosen strike is never farther from spot than any quoted strike

use ivwatch_core::domain::{ChainRow, IndexSymbol, OptionChainSnapshot};
use ivwatch_core::signals::{extract_atm_iv, percentile_rank, IvHistory, WINDOW_CAPACITY};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_iv() -> impl Strategy<Value = f64> {
    (5.0..80.0_f64).prop_map(|v| (v * 100.0).round() / 100.0)
}

fn arb_ivs(max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_iv(), 0..max)
}

// ── 1. Window capacity ───────────────────────────────────────────────

proptest! {
    #[test]
    fn window_length_is_capped(prior in arb_ivs(60), next in arb_iv()) {
        let mut history = IvHistory::new();
        for &v in &prior {
            history.append(IndexSymbol::Nifty, v);
        }
        let before = history.window(IndexSymbol::Nifty);
        let after = history.append(IndexSymbol::Nifty, next).to_vec();

        prop_assert_eq!(after.len(), WINDOW_CAPACITY.min(before.len() + 1));
        prop_assert_eq!(*after.last().unwrap(), next);

        // Survivors keep their order: the window is a suffix of before + [next].
        let mut expected = before.clone();
        expected.push(next);
        let skip = expected.len() - after.len();
        prop_assert_eq!(&after[..], &expected[skip..]);
        if before.len() == WINDOW_CAPACITY {
            prop_assert_eq!(skip, 1);
        }
    }

    // ── 2. Percentile bounds ─────────────────────────────────────────

    #[test]
    fn percentile_within_bounds(prior in arb_ivs(40), latest in arb_iv()) {
        let mut history = IvHistory::new();
        for &v in &prior {
            history.append(IndexSymbol::BankNifty, v);
        }
        let window = history.append(IndexSymbol::BankNifty, latest).to_vec();
        let p = percentile_rank(&window, latest).unwrap();

        prop_assert!((0.0..=100.0).contains(&p));
        if window.len() == 1 {
            prop_assert_eq!(p, 0.0);
        }
        // latest is in the window and never counts against itself
        prop_assert!(p < 100.0);
    }

    // ── 3. Rank of a new maximum ─────────────────────────────────────

    #[test]
    fn new_maximum_ranks_n_minus_one_over_n(prior in arb_ivs(40)) {
        let mut history = IvHistory::new();
        for &v in &prior {
            history.append(IndexSymbol::Nifty, v);
        }
        let latest = 100.0; // above every generated IV
        let window = history.append(IndexSymbol::Nifty, latest).to_vec();
        let n = window.len() as f64;

        let p = percentile_rank(&window, latest).unwrap();
        prop_assert!((p - 100.0 * (n - 1.0) / n).abs() < 1e-9);
    }

    // ── 4. ATM selection ─────────────────────────────────────────────

    #[test]
    fn atm_strike_is_nearest_quoted(
        spot in 90.0..110.0_f64,
        strikes in prop::collection::vec((80u32..120).prop_map(f64::from), 1..20),
        iv in arb_iv(),
    ) {
        let rows: Vec<ChainRow> = strikes.iter().map(|&k| ChainRow::new(k, Some(iv), Some(iv))).collect();
        let snapshot = OptionChainSnapshot { spot, rows };
        let atm = extract_atm_iv(IndexSymbol::Nifty, &snapshot).unwrap();

        let chosen = (atm.strike - spot).abs();
        for &k in &strikes {
            prop_assert!(chosen <= (k - spot).abs());
        }
        // first minimal row wins
        let first = strikes.iter().copied().find(|&k| (k - spot).abs() == chosen).unwrap();
        prop_assert_eq!(atm.strike, first);
        prop_assert_eq!(atm.value, iv);
    }
}
