//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for analysis reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the analysed series and the calendar roll-ups
//! - **Markdown**: human-readable report with the KPI table
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pnllab_core::{Analysis, CalendarBucket, DayDetail, DayStatus};

use crate::runner::{AnalysisReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the analysed series.
///
/// Columns: key, trade_date, net_pnl, cum_pnl, drawdown, win_streak, loss_streak
pub fn export_series_csv(analysis: &Analysis) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "key",
        "trade_date",
        "net_pnl",
        "cum_pnl",
        "drawdown",
        "win_streak",
        "loss_streak",
    ])?;

    for r in &analysis.rows {
        wtr.write_record([
            &r.key.to_string(),
            &r.trade_date.to_string(),
            &format!("{:.2}", r.net_pnl),
            &format!("{:.2}", r.cum_pnl),
            &format!("{:.2}", r.drawdown),
            &r.win_streak.to_string(),
            &r.loss_streak.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export monthly or weekday buckets with bucket, net_pnl, periods and tag columns.
pub fn export_buckets_csv(buckets: &[CalendarBucket]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bucket", "net_pnl", "periods", "tag"])?;
    for b in buckets {
        wtr.write_record([
            &b.label,
            &format!("{:.2}", b.net_pnl),
            &b.periods.to_string(),
            b.tag.as_str(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates a directory named `{strategy}_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `AnalysisReport`
/// - `series.csv`: the analysed series
/// - `monthly.csv`, `weekday.csv`: calendar roll-ups (per-leg only)
/// - `report.md`: the Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.strategy_key(),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("manifest.json"), &export_json(report)?)?;
    write(
        &run_dir.join("series.csv"),
        &export_series_csv(&report.analysis)?,
    )?;
    if let Some(cal) = &report.analysis.calendar {
        write(&run_dir.join("monthly.csv"), &export_buckets_csv(&cal.monthly)?)?;
        write(&run_dir.join("weekday.csv"), &export_buckets_csv(&cal.weekday)?)?;
    }
    write(&run_dir.join("report.md"), &generate_report(report))?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load an `AnalysisReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for one analysis.
pub fn generate_report(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(2048);
    let kpis = &report.analysis.kpis;

    md.push_str(&format!("# PnL Report: {}\n\n", report.strategy));

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Collection | {} |\n", report.collection));
    md.push_str(&format!("| Mode | {} |\n", report.mode));
    md.push_str(&format!("| Slippage | {:.2}% |\n", report.slippage_pct));
    md.push_str(&format!("| Records | {} |\n", report.record_count));
    if let (Some(first), Some(last)) = (report.analysis.rows.first(), report.analysis.rows.last()) {
        md.push_str(&format!(
            "| Period | {} to {} |\n",
            first.trade_date, last.trade_date
        ));
    }
    md.push_str(&format!("| Ledger Hash | {} |\n", report.ledger_hash));
    md.push_str(&format!("| Generated | {} |\n", report.generated_at));
    md.push('\n');

    // Headline
    md.push_str("## Headline\n\n");
    md.push_str("| Win % | Net Profit | Avg. daily profit |\n");
    md.push_str("| ---: | ---: | ---: |\n");
    md.push_str(&format!(
        "| {:.2} | {:.2} | {:.2} |\n\n",
        kpis.win_ratio, kpis.net_profit, kpis.avg_profit_per_day
    ));

    // KPI table
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | ---: |\n");
    for (label, value) in kpis.labeled() {
        md.push_str(&format!("| {label} | {} |\n", format_kpi(value)));
    }
    md.push('\n');

    if let Some(cal) = &report.analysis.calendar {
        md.push_str(&format_buckets("Monthly PnL", "Month", &cal.monthly));
        md.push_str(&format_buckets("Weekday PnL", "Weekday", &cal.weekday));
    }

    md
}

/// Whole values print without decimals, others with two.
pub fn format_kpi(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn format_buckets(title: &str, column: &str, buckets: &[CalendarBucket]) -> String {
    let mut md = format!("## {title}\n\n| {column} | Net PnL | Periods |\n| --- | ---: | ---: |\n");
    for b in buckets {
        md.push_str(&format!(
            "| {} | {:.2} | {} |\n",
            b.label, b.net_pnl, b.periods
        ));
    }
    md.push('\n');
    md
}

/// Plain-text table of one day's legs, for terminal output.
pub fn format_day(detail: &DayDetail) -> String {
    if detail.is_empty() {
        return format!("No trade on {}\n", detail.date);
    }

    let mut out = String::new();
    match (detail.net_pnl(), detail.status()) {
        (Some(net), Some(DayStatus::Profit)) => {
            out.push_str(&format!("{}  PROFIT  {net:.2}\n", detail.date))
        }
        (Some(net), Some(DayStatus::Loss)) => {
            out.push_str(&format!("{}  LOSS  {net:.2}\n", detail.date))
        }
        _ => out.push_str(&format!("{}  no valid legs\n", detail.date)),
    }

    out.push_str(&format!(
        "{:<12} {:<6} {:>10} {:>10} {:>10} {:>10} {:<8} {:<8} {:<12}\n",
        "strike", "type", "entry", "entry+slp", "exit", "net", "in", "out", "exit_type"
    ));
    for row in &detail.rows {
        match row {
            Ok(r) => out.push_str(&format!(
                "{:<12} {:<6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:<8} {:<8} {:<12}\n",
                r.strike,
                r.trade_type.as_str(),
                r.entry_price,
                r.entry_price_with_slippage,
                r.exit_price,
                r.net_pnl,
                r.entry_time.as_deref().unwrap_or("-"),
                r.exit_time.as_deref().unwrap_or("-"),
                r.exit_type.as_deref().unwrap_or("-"),
            )),
            Err(e) => out.push_str(&format!("  skipped: {e}\n")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::runner::analyze_ledger;
    use pnllab_core::RawTradeRecord;

    fn leg(date: &str, entry: f64, exit: f64) -> RawTradeRecord {
        RawTradeRecord {
            trade_date: Some(date.into()),
            strike: Some("21500CE".into()),
            entry_price: Some(entry.into()),
            exit_price: Some(exit.into()),
            trade_type: Some("LONG".into()),
            ..Default::default()
        }
    }

    fn report() -> AnalysisReport {
        let ledger = vec![
            leg("2024-01-02", 100.0, 112.0),
            leg("2024-01-03", 100.0, 97.0),
            leg("2024-02-05", 100.0, 122.0),
        ];
        analyze_ledger(&AnalysisConfig::new("sts"), &ledger).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let r = report();
        let json = export_json(&r).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn newer_schema_rejected() {
        let mut r = report();
        r.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&r).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn missing_schema_version_defaults() {
        let r = report();
        let mut value = serde_json::to_value(&r).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let back = import_json(&value.to_string()).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn series_csv_has_header_and_rows() {
        let csv = export_series_csv(&report().analysis).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "key,trade_date,net_pnl,cum_pnl,drawdown,win_streak,loss_streak"
        );
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "2024-01-02,2024-01-02,10.00,10.00,0.00,1,0");
        assert_eq!(lines[2], "2024-01-03,2024-01-03,-5.00,5.00,-5.00,0,1");
    }

    #[test]
    fn buckets_csv_tags_sign() {
        let r = report();
        let cal = r.analysis.calendar.as_ref().unwrap();
        let csv = export_buckets_csv(&cal.monthly).unwrap();
        assert!(csv.contains("Jan 2024,5.00,2,positive"));
        assert!(csv.contains("Feb 2024,20.00,1,positive"));
    }

    #[test]
    fn report_lists_dashboard_labels() {
        let md = generate_report(&report());
        assert!(md.contains("# PnL Report: sts"));
        assert!(md.contains("| Win % | Net Profit | Avg. daily profit |"));
        assert!(md.contains("| Total days | 3 |"));
        assert!(md.contains("| Max Drawdown | -5 |"));
        assert!(md.contains("| System Expectancy |"));
        assert!(md.contains("## Monthly PnL"));
        assert!(md.contains("## Weekday PnL"));
    }

    #[test]
    fn format_day_without_trades() {
        let detail = DayDetail {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            rows: vec![],
        };
        assert_eq!(format_day(&detail), "No trade on 2024-01-06\n");
    }
}
