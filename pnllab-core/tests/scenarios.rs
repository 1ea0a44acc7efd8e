//! End-to-end scenarios through the public API, from raw ledger rows.

use chrono::NaiveDate;
use pnllab_core::{
    AnalysisError, AnalysisMode, Analyzer, PeriodKey, PnlTag, RawField, RawTradeRecord,
    SlippageModel, TradeTypePolicy,
};

fn leg(date: &str, trade_type: &str, entry: f64, exit: f64) -> RawTradeRecord {
    RawTradeRecord {
        trade_date: Some(date.into()),
        strike: Some(RawField::Number(21500.0)),
        entry_price: Some(entry.into()),
        exit_price: Some(exit.into()),
        trade_type: Some(trade_type.into()),
        ..Default::default()
    }
}

fn signal(date: &str, trade_type: &str, entry: f64, pnl: f64) -> RawTradeRecord {
    RawTradeRecord {
        pnl: Some(pnl.into()),
        ..leg(date, trade_type, entry, entry)
    }
}

/// A LONG leg whose net PnL after 2% slippage is exactly `net` (entry 100 → adjusted 102).
fn long_with_net(date: &str, net: f64) -> RawTradeRecord {
    leg(date, "LONG", 100.0, 102.0 + net)
}

#[test]
fn reference_series_from_ledger() {
    let ledger = vec![
        long_with_net("2024-01-02", 10.0),
        long_with_net("2024-01-03", -5.0),
        long_with_net("2024-01-04", -5.0),
        long_with_net("2024-01-05", 20.0),
    ];
    let a = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap();

    let cum: Vec<f64> = a.rows.iter().map(|r| r.cum_pnl).collect();
    let dd: Vec<f64> = a.rows.iter().map(|r| r.drawdown).collect();
    let win: Vec<usize> = a.rows.iter().map(|r| r.win_streak).collect();
    let loss: Vec<usize> = a.rows.iter().map(|r| r.loss_streak).collect();

    assert_eq!(cum, vec![10.0, 5.0, 0.0, 20.0]);
    assert_eq!(dd, vec![0.0, -5.0, -10.0, 0.0]);
    assert_eq!(win, vec![1, 0, 0, 1]);
    assert_eq!(loss, vec![0, 1, 2, 0]);
    assert_eq!(a.kpis.max_drawdown, -10.0);
    assert_eq!(a.kpis.net_profit, 20.0);
}

#[test]
fn short_and_long_reference_trades() {
    let ledger = vec![
        leg("2024-01-02", "SHORT", 100.0, 90.0),
        leg("2024-01-03", "LONG", 100.0, 110.0),
        leg("2024-01-04", "LONG", 100.0, 90.0),
    ];
    let a = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap();
    assert_eq!(a.net_pnls(), vec![8.0, 8.0, -12.0]);
}

#[test]
fn unordered_ledger_is_sorted_by_date_with_legs_summed() {
    let ledger = vec![
        leg("2024-02-06", "SHORT", 100.0, 90.0),
        leg("2024-02-05", "LONG", 100.0, 110.0),
        leg("2024-02-06", "SHORT", 100.0, 110.0),
    ];
    let a = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap();
    let keys: Vec<PeriodKey> = a.rows.iter().map(|r| r.key).collect();
    assert_eq!(
        keys,
        vec![
            PeriodKey::Date(NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()),
            PeriodKey::Date(NaiveDate::from_ymd_opt(2024, 2, 6).unwrap()),
        ]
    );
    // 8 + (98 - 110) = -4
    assert_eq!(a.net_pnls(), vec![8.0, -4.0]);
    assert_eq!(a.rows[1].trades, 2);
}

#[test]
fn calendar_roll_ups_for_per_leg() {
    let ledger = vec![
        long_with_net("2024-01-29", 4.0),  // Monday
        long_with_net("2024-01-31", -6.0), // Wednesday
        long_with_net("2024-02-05", 3.0),  // Monday
    ];
    let a = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap();
    let cal = a.calendar.unwrap();

    assert_eq!(cal.monthly.len(), 2);
    assert_eq!(cal.monthly[0].label, "Jan 2024");
    assert_eq!(cal.monthly[0].net_pnl, -2.0);
    assert_eq!(cal.monthly[0].tag, PnlTag::Negative);
    assert_eq!(cal.monthly[1].label, "Feb 2024");
    assert_eq!(cal.monthly[1].tag, PnlTag::Positive);

    assert_eq!(cal.weekday[0].label, "Monday");
    assert_eq!(cal.weekday[0].net_pnl, 7.0);
    assert_eq!(cal.weekday[1].label, "Wednesday");
}

#[test]
fn per_signal_ledger_keyed_by_trade_number() {
    let ledger = vec![
        signal("2024-03-01", "SHORT", 100.0, 12.0), // 98 - 100 + 12 = 10
        signal("2024-03-01", "LONG", 50.0, -4.0),   // 51 - 50 - 4 = -3
        signal("2024-03-04", "LONG", 200.0, 10.0),  // 204 - 200 + 10 = 14
    ];
    let a = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerSignal)
        .unwrap();
    assert_eq!(a.net_pnls(), vec![10.0, -3.0, 14.0]);
    let keys: Vec<PeriodKey> = a.rows.iter().map(|r| r.key).collect();
    assert_eq!(
        keys,
        vec![PeriodKey::TradeNo(1), PeriodKey::TradeNo(2), PeriodKey::TradeNo(3)]
    );
    assert!(a.calendar.is_none());
    assert_eq!(a.kpis.total_periods, 3);
}

#[test]
fn empty_ledger_is_empty_input() {
    let err = Analyzer::default()
        .analyze_raw(&[], AnalysisMode::PerLeg)
        .unwrap_err();
    assert_eq!(err, AnalysisError::EmptyInput);
}

#[test]
fn all_losing_ledger_fails_on_win_average() {
    let ledger = vec![
        long_with_net("2024-01-02", -5.0),
        long_with_net("2024-01-03", -5.0),
        long_with_net("2024-01-04", -5.0),
    ];
    let err = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap_err();
    assert_eq!(
        err,
        AnalysisError::DivisionByZero {
            metric: "avg_profit_on_win_days"
        }
    );
}

#[test]
fn malformed_record_is_reported_with_position() {
    let mut bad = leg("2024-01-03", "LONG", 100.0, 110.0);
    bad.entry_price = Some("abc".into());
    let ledger = vec![leg("2024-01-02", "LONG", 100.0, 110.0), bad];
    let err = Analyzer::default()
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::MalformedRecord {
            index: 1,
            field: "entry_price",
            ..
        }
    ));
}

#[test]
fn lenient_policy_treats_unknown_type_as_long() {
    let ledger = vec![
        leg("2024-01-02", "BUY", 100.0, 110.0),
        leg("2024-01-03", "SHORT", 100.0, 105.0),
    ];
    let strict = Analyzer::default().analyze_raw(&ledger, AnalysisMode::PerLeg);
    assert!(strict.unwrap_err().is_malformed());

    let lenient = Analyzer::new(SlippageModel::default(), TradeTypePolicy::LenientLong)
        .analyze_raw(&ledger, AnalysisMode::PerLeg)
        .unwrap();
    assert_eq!(lenient.net_pnls(), vec![8.0, -7.0]);
}

#[test]
fn analysis_is_idempotent() {
    let ledger = vec![
        leg("2024-01-02", "SHORT", 100.0, 90.0),
        leg("2024-01-03", "LONG", 100.0, 90.0),
    ];
    let analyzer = Analyzer::default();
    let a = analyzer.analyze_raw(&ledger, AnalysisMode::PerLeg).unwrap();
    let b = analyzer.analyze_raw(&ledger, AnalysisMode::PerLeg).unwrap();
    assert_eq!(a, b);
}
