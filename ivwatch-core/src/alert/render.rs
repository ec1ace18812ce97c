//! Alert text — per-index blocks, summary lines, and cycle aggregation.
//!
//! All numbers are rendered with two decimals. Output is a pure function
//! of the records, so identical inputs give byte-identical text.

use super::policy::{AlertRecord, IvExtreme};

/// Header line of the outbound message.
pub const MESSAGE_HEADER: &str = "📈 Nifty & BankNifty IV and Move Alerts:";

const IV_PLACEHOLDER: &str = "N/A";

fn format_iv(iv_percentile: Option<f64>) -> String {
    iv_percentile.map_or_else(|| IV_PLACEHOLDER.to_string(), |p| format!("{p:.2}"))
}

/// Multi-line block for an index that triggered.
pub fn alert_block(record: &AlertRecord) -> String {
    let mut lines = vec![
        format!("📊 {} Index Update:", record.symbol),
        format!("• Move: {:.2}%", record.percent_move),
        format!("• Current Price: {:.2}", record.close_price),
    ];
    if let Some(p) = record.iv_percentile {
        lines.push(format!("• IV Percentile: {p:.2}"));
    }
    if record.move_alert {
        lines.push("⚡ Significant Move Detected (±1% or more)".to_string());
    }
    if record.iv_alert {
        match record.iv_extreme() {
            Some(IvExtreme::VeryLow) => lines.push("🟢 Very Low IV Percentile (≤10)".to_string()),
            Some(IvExtreme::VeryHigh) => lines.push("🔴 Very High IV Percentile (≥90)".to_string()),
            None => {}
        }
    }
    lines.join("\n")
}

/// One-line summary for an index that did not trigger.
pub fn summary_line(record: &AlertRecord) -> String {
    format!(
        "❌ {}: No major move ({:.2}%) or IV alert ({}).",
        record.symbol,
        record.percent_move,
        format_iv(record.iv_percentile)
    )
}

/// Status line logged for every evaluated index, alerting or not.
pub fn status_line(record: &AlertRecord) -> String {
    format!(
        "{}: Move={:.2}%, IV Percentile={}",
        record.symbol,
        record.percent_move,
        format_iv(record.iv_percentile)
    )
}

/// Reduce the cycle's records to ordered message blocks.
///
/// With no triggering index this is a single "no major moves" block.
/// Otherwise it is every alert block, then one summary block for the
/// quiet indices when there are any.
pub fn render_blocks(records: &[AlertRecord]) -> Vec<String> {
    let (alerting, quiet): (Vec<&AlertRecord>, Vec<&AlertRecord>) =
        records.iter().partition(|r| r.should_alert());
    let summaries: Vec<String> = quiet.iter().map(|r| summary_line(r)).collect();

    if alerting.is_empty() {
        return vec![format!("✅ No major moves today:\n{}", summaries.join("\n"))];
    }

    let mut blocks: Vec<String> = alerting.iter().map(|r| alert_block(r)).collect();
    if !summaries.is_empty() {
        blocks.push(format!("ℹ️ Other indices summary:\n{}", summaries.join("\n")));
    }
    blocks
}

/// Join blocks into the outbound message: header, then blank-line separated blocks.
pub fn compose_message(blocks: &[String]) -> String {
    format!("{MESSAGE_HEADER}\n\n{}", blocks.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndexSymbol;

    fn rec(symbol: IndexSymbol, mv: f64, close: f64, iv: Option<f64>) -> AlertRecord {
        AlertRecord::evaluate(symbol, mv, close, iv)
    }

    #[test]
    fn alert_block_with_both_notices() {
        let block = alert_block(&rec(IndexSymbol::Nifty, 1.2, 22000.0, Some(95.0)));
        assert_eq!(
            block,
            "📊 NIFTY Index Update:\n\
             • Move: 1.20%\n\
             • Current Price: 22000.00\n\
             • IV Percentile: 95.00\n\
             ⚡ Significant Move Detected (±1% or more)\n\
             🔴 Very High IV Percentile (≥90)"
        );
    }

    #[test]
    fn alert_block_omits_missing_iv() {
        let block = alert_block(&rec(IndexSymbol::BankNifty, -1.456, 48000.0, None));
        assert!(block.contains("• Move: -1.46%"));
        assert!(!block.contains("IV Percentile"));
        assert!(block.ends_with("⚡ Significant Move Detected (±1% or more)"));
    }

    #[test]
    fn iv_only_alert_has_no_move_notice() {
        let block = alert_block(&rec(IndexSymbol::Nifty, 0.2, 22000.0, Some(5.0)));
        assert!(!block.contains("Significant Move"));
        assert!(block.ends_with("🟢 Very Low IV Percentile (≤10)"));
    }

    #[test]
    fn summary_line_placeholder() {
        assert_eq!(
            summary_line(&rec(IndexSymbol::BankNifty, 0.3, 48144.0, None)),
            "❌ BANKNIFTY: No major move (0.30%) or IV alert (N/A)."
        );
        assert_eq!(
            summary_line(&rec(IndexSymbol::Nifty, -0.25, 22000.0, Some(40.0))),
            "❌ NIFTY: No major move (-0.25%) or IV alert (40.00)."
        );
    }

    #[test]
    fn quiet_cycle_is_single_block() {
        let blocks = render_blocks(&[
            rec(IndexSymbol::Nifty, 0.2, 22000.0, Some(50.0)),
            rec(IndexSymbol::BankNifty, 0.3, 48000.0, None),
        ]);
        assert_eq!(
            blocks,
            vec![
                "✅ No major moves today:\n\
                 ❌ NIFTY: No major move (0.20%) or IV alert (50.00).\n\
                 ❌ BANKNIFTY: No major move (0.30%) or IV alert (N/A)."
                    .to_string()
            ]
        );
    }

    #[test]
    fn trailing_summary_omitted_when_all_trigger() {
        let blocks = render_blocks(&[
            rec(IndexSymbol::Nifty, 1.5, 22000.0, Some(50.0)),
            rec(IndexSymbol::BankNifty, 0.1, 48000.0, Some(95.0)),
        ]);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("📊 NIFTY"));
        assert!(blocks[1].starts_with("📊 BANKNIFTY"));
    }

    #[test]
    fn compose_joins_with_blank_lines() {
        let msg = compose_message(&["a".to_string(), "b".to_string()]);
        assert_eq!(msg, format!("{MESSAGE_HEADER}\n\na\n\nb"));
    }
}
