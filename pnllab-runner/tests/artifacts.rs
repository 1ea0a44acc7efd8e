use pnllab_core::RawTradeRecord;
use pnllab_runner::{analyze_ledger, load_artifacts, save_artifacts, AnalysisConfig};

fn leg(date: &str, trade_type: &str, entry: f64, exit: f64, pnl: Option<f64>) -> RawTradeRecord {
    RawTradeRecord {
        trade_date: Some(date.into()),
        strike: Some("21500CE".into()),
        entry_price: Some(entry.into()),
        exit_price: Some(exit.into()),
        trade_type: Some(trade_type.into()),
        pnl: pnl.map(Into::into),
        ..Default::default()
    }
}

#[test]
fn per_leg_artifacts_written_and_reloaded() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ledger = vec![
        leg("2024-01-02", "SHORT", 100.0, 90.0, None),
        leg("2024-01-03", "LONG", 100.0, 90.0, None),
        leg("2024-02-05", "LONG", 100.0, 120.0, None),
    ];
    let report = analyze_ledger(&AnalysisConfig::new("sts"), &ledger).unwrap();

    let dir = save_artifacts(&report, temp_dir.path()).unwrap();
    let name = dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("sts_"));
    for file in ["manifest.json", "series.csv", "monthly.csv", "weekday.csv", "report.md"] {
        assert!(dir.join(file).exists(), "{file} missing");
    }

    let loaded = load_artifacts(&dir).unwrap();
    assert_eq!(loaded, report);
}

#[test]
fn per_signal_artifacts_skip_calendar() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ledger = vec![
        leg("2024-03-01", "LONG", 100.0, 100.0, Some(10.0)),
        leg("2024-03-01", "LONG", 100.0, 100.0, Some(-10.0)),
    ];
    let report = analyze_ledger(&AnalysisConfig::new("macd"), &ledger).unwrap();

    let dir = save_artifacts(&report, temp_dir.path()).unwrap();
    assert!(dir.join("manifest.json").exists());
    assert!(dir.join("series.csv").exists());
    assert!(!dir.join("monthly.csv").exists());
    assert!(!dir.join("weekday.csv").exists());

    let series = std::fs::read_to_string(dir.join("series.csv")).unwrap();
    assert!(series.lines().nth(1).unwrap().starts_with("1,2024-03-01,12.00"));
}

#[test]
fn load_from_missing_dir_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(load_artifacts(&temp_dir.path().join("nope")).is_err());
}
