//! Property tests for report export.
//!
//! Uses proptest to verify, over generated per-leg ledgers:
//! 1. JSON export followed by import gives back the same report
//! 2. The series CSV has one line per analysed period plus a header

use std::collections::BTreeSet;

use proptest::prelude::*;
use pnllab_core::{RawField, RawTradeRecord};
use pnllab_runner::{analyze_ledger, export_json, export_series_csv, import_json, AnalysisConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn leg(day: u32, trade_type: &str, exit: f64) -> RawTradeRecord {
    RawTradeRecord {
        trade_date: Some(format!("2024-{:02}-{:02}", 1 + day / 28, 1 + day % 28).as_str().into()),
        strike: Some("22000PE".into()),
        entry_price: Some(RawField::Number(100.0)),
        exit_price: Some(exit.into()),
        trade_type: Some(trade_type.into()),
        ..Default::default()
    }
}

fn arb_leg() -> impl Strategy<Value = (u32, bool, f64)> {
    (2u32..120, any::<bool>(), (100i64..30_000).prop_map(|c| c as f64 / 100.0))
}

/// A win on day 0 and a loss on day 1, then random legs from day 2 on, so
/// every generated ledger has both a winning and a losing period.
fn arb_ledger() -> impl Strategy<Value = Vec<RawTradeRecord>> {
    prop::collection::vec(arb_leg(), 0..60).prop_map(|legs| {
        let mut ledger = vec![leg(0, "LONG", 150.0), leg(1, "LONG", 50.0)];
        ledger.extend(
            legs.into_iter()
                .map(|(day, long, exit)| leg(day, if long { "LONG" } else { "SHORT" }, exit)),
        );
        ledger
    })
}

fn distinct_dates(ledger: &[RawTradeRecord]) -> usize {
    ledger
        .iter()
        .filter_map(RawTradeRecord::parsed_date)
        .collect::<BTreeSet<_>>()
        .len()
}

// ── 1. JSON ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn json_export_imports_to_the_same_report(ledger in arb_ledger()) {
        let report = analyze_ledger(&AnalysisConfig::new("sts"), &ledger).unwrap();
        let json = export_json(&report).unwrap();
        let loaded = import_json(&json).unwrap();
        prop_assert_eq!(loaded, report);
    }
}

// ── 2. Series CSV ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn series_csv_has_a_line_per_period(ledger in arb_ledger()) {
        let report = analyze_ledger(&AnalysisConfig::new("sts"), &ledger).unwrap();
        let csv = export_series_csv(&report.analysis).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        prop_assert_eq!(report.analysis.rows.len(), distinct_dates(&ledger));
        prop_assert_eq!(lines.len(), report.analysis.rows.len() + 1);
        prop_assert!(lines[0].starts_with("key,trade_date,net_pnl"));

        let last_cum = lines.last().unwrap().split(',').nth(3).unwrap();
        prop_assert_eq!(last_cum, format!("{:.2}", report.analysis.kpis.net_profit));
    }
}
