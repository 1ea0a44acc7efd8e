//! Raw ledger records and boundary validation.
//!
//! Ledgers arrive loosely typed: numbers may be text, fields may be absent.
//! [`RawTradeRecord::validate`] is the only way into a [`TradeRecord`], so a
//! bad field is reported once, with its position, before any math runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::mode::AnalysisMode;
use super::trade::{TradeRecord, TradeType};
use crate::error::{AnalysisError, AnalysisResult};

/// Date format used by ledgers.
pub const TRADE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A scalar as it appears in a ledger: a number or a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    /// Numeric value, parsing text if needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawField::Number(n) => Some(*n),
            RawField::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Text value. Whole numbers render without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            RawField::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", *n as i64),
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for RawField {
    fn from(n: f64) -> Self {
        RawField::Number(n)
    }
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        RawField::Text(s.to_string())
    }
}

/// How to treat a `trade_type` that is neither LONG nor SHORT.
///
/// Both policies trim and upper-case the value first, so `" short "` is
/// SHORT either way; the policy only decides what happens to what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeTypePolicy {
    /// Reject the record as malformed.
    #[default]
    Strict,
    /// Treat anything that does not normalise to SHORT as LONG.
    LenientLong,
}

/// One ledger row before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTradeRecord {
    pub trade_date: Option<RawField>,
    pub strike: Option<RawField>,
    pub entry_price: Option<RawField>,
    pub sl_price: Option<RawField>,
    pub qty: Option<RawField>,
    pub entry_time: Option<RawField>,
    pub exit_price: Option<RawField>,
    pub pnl: Option<RawField>,
    pub exit_time: Option<RawField>,
    pub exit_type: Option<RawField>,
    pub pnl_movement: Option<RawField>,
    pub trade_type: Option<RawField>,
}

impl RawTradeRecord {
    /// Parse the `trade_date` field without validating anything else.
    ///
    /// Used by the drill-down to select a day's rows.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let text = self.trade_date.as_ref()?.as_text();
        NaiveDate::parse_from_str(&text, TRADE_DATE_FORMAT).ok()
    }

    /// Validate into a [`TradeRecord`].
    ///
    /// `index` is the record's position in the ledger and is echoed in errors.
    /// The recorded `pnl` is required in per-signal mode and ignored per-leg.
    /// `sl_price` and `qty` are carried for display only: a non-numeric value
    /// becomes `None` instead of rejecting the record.
    pub fn validate(
        &self,
        index: usize,
        mode: AnalysisMode,
        policy: TradeTypePolicy,
    ) -> AnalysisResult<TradeRecord> {
        let trade_date = {
            let text = required(&self.trade_date, index, "trade_date")?.as_text();
            NaiveDate::parse_from_str(&text, TRADE_DATE_FORMAT).map_err(|_| {
                AnalysisError::malformed(
                    index,
                    "trade_date",
                    format!("'{text}' is not a YYYY-MM-DD date"),
                )
            })?
        };

        let strike = required(&self.strike, index, "strike")?.as_text();
        if strike.is_empty() {
            return Err(AnalysisError::malformed(index, "strike", "is empty"));
        }

        let entry_price = price(
            required(&self.entry_price, index, "entry_price")?,
            index,
            "entry_price",
        )?;
        let exit_price = price(
            required(&self.exit_price, index, "exit_price")?,
            index,
            "exit_price",
        )?;
        let sl_price = passthrough_number(&self.sl_price, index, "sl_price");
        let qty = passthrough_number(&self.qty, index, "qty");

        let trade_type = trade_type(
            required(&self.trade_type, index, "trade_type")?,
            index,
            policy,
        )?;

        // per-leg PnL is recomputed from prices; the recorded value is never read
        let pnl = match mode {
            AnalysisMode::PerSignal => match self.pnl.as_ref() {
                Some(f) => Some(number(f, index, "pnl")?),
                None => {
                    return Err(AnalysisError::malformed(
                        index,
                        "pnl",
                        "is required for per-signal ledgers",
                    ))
                }
            },
            AnalysisMode::PerLeg => None,
        };

        Ok(TradeRecord {
            trade_date,
            strike,
            trade_type,
            entry_price,
            exit_price,
            sl_price,
            qty,
            entry_time: text(&self.entry_time),
            exit_time: text(&self.exit_time),
            exit_type: text(&self.exit_type),
            pnl_movement: text(&self.pnl_movement),
            pnl,
        })
    }
}

/// Validate a whole ledger, failing on the first malformed record.
pub fn validate_records(
    raw: &[RawTradeRecord],
    mode: AnalysisMode,
    policy: TradeTypePolicy,
) -> AnalysisResult<Vec<TradeRecord>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| r.validate(i, mode, policy))
        .collect()
}

fn required<'a>(
    field: &'a Option<RawField>,
    index: usize,
    name: &'static str,
) -> AnalysisResult<&'a RawField> {
    match field {
        Some(RawField::Text(s)) if s.trim().is_empty() => {
            Err(AnalysisError::malformed(index, name, "is missing"))
        }
        Some(f) => Ok(f),
        None => Err(AnalysisError::malformed(index, name, "is missing")),
    }
}

fn number(field: &RawField, index: usize, name: &'static str) -> AnalysisResult<f64> {
    match field.as_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AnalysisError::malformed(
            index,
            name,
            format!("'{}' is not numeric", field.as_text()),
        )),
    }
}

/// Display-only numeric field: unparseable values are dropped, not rejected.
fn passthrough_number(
    field: &Option<RawField>,
    index: usize,
    name: &'static str,
) -> Option<f64> {
    let field = field.as_ref()?;
    match field.as_f64() {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            let raw = field.as_text();
            if !raw.is_empty() {
                tracing::warn!(index, field = name, value = %raw, "ignoring non-numeric passthrough field");
            }
            None
        }
    }
}

fn price(field: &RawField, index: usize, name: &'static str) -> AnalysisResult<f64> {
    let value = number(field, index, name)?;
    if value <= 0.0 {
        return Err(AnalysisError::malformed(
            index,
            name,
            format!("{value} is not a positive price"),
        ));
    }
    Ok(value)
}

fn trade_type(
    field: &RawField,
    index: usize,
    policy: TradeTypePolicy,
) -> AnalysisResult<TradeType> {
    let raw = field.as_text();
    match (raw.parse::<TradeType>(), policy) {
        (Ok(t), _) => Ok(t),
        (Err(_), TradeTypePolicy::LenientLong) => {
            tracing::warn!(index, trade_type = %raw, "unrecognized trade type treated as LONG");
            Ok(TradeType::Long)
        }
        (Err(e), TradeTypePolicy::Strict) => {
            Err(AnalysisError::malformed(index, "trade_type", e.to_string()))
        }
    }
}

fn text(field: &Option<RawField>) -> Option<String> {
    field
        .as_ref()
        .map(RawField::as_text)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_leg() -> RawTradeRecord {
        RawTradeRecord {
            trade_date: Some("2024-03-04".into()),
            strike: Some(RawField::Number(22000.0)),
            entry_price: Some(RawField::Number(100.0)),
            sl_price: Some("130.5".into()),
            qty: Some(RawField::Number(50.0)),
            entry_time: Some("09:20:00".into()),
            exit_price: Some("90".into()),
            pnl: None,
            exit_time: Some("15:15:00".into()),
            exit_type: Some("TIME".into()),
            pnl_movement: None,
            trade_type: Some("SHORT".into()),
        }
    }

    #[test]
    fn validates_mixed_number_and_text_fields() {
        let rec = raw_leg()
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap();
        assert_eq!(rec.trade_date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(rec.strike, "22000");
        assert_eq!(rec.exit_price, 90.0);
        assert_eq!(rec.sl_price, Some(130.5));
        assert_eq!(rec.trade_type, TradeType::Short);
        assert_eq!(rec.pnl_movement, None);
        assert_eq!(rec.exit_type.as_deref(), Some("TIME"));
    }

    #[test]
    fn missing_entry_price_is_malformed() {
        let mut raw = raw_leg();
        raw.entry_price = None;
        let err = raw
            .validate(7, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MalformedRecord {
                index: 7,
                field: "entry_price",
                reason: "is missing".into()
            }
        );
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let mut raw = raw_leg();
        raw.trade_date = Some("  ".into());
        let err = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedRecord { field: "trade_date", .. }
        ));
    }

    #[test]
    fn non_numeric_exit_price_is_malformed() {
        let mut raw = raw_leg();
        raw.exit_price = Some("n/a".into());
        let err = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err();
        assert!(err.to_string().contains("exit_price"));
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn non_positive_price_is_malformed() {
        let mut raw = raw_leg();
        raw.entry_price = Some(RawField::Number(0.0));
        assert!(raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn bad_date_is_malformed() {
        let mut raw = raw_leg();
        raw.trade_date = Some("04/03/2024".into());
        let err = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn unknown_trade_type_depends_on_policy() {
        let mut raw = raw_leg();
        raw.trade_type = Some("BUY".into());
        assert!(raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err()
            .is_malformed());
        let rec = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::LenientLong)
            .unwrap();
        assert_eq!(rec.trade_type, TradeType::Long);
    }

    #[test]
    fn trade_type_case_is_normalised_under_both_policies() {
        for value in ["short", " Short ", "SHORT"] {
            let mut raw = raw_leg();
            raw.trade_type = Some(value.into());
            for policy in [TradeTypePolicy::Strict, TradeTypePolicy::LenientLong] {
                let rec = raw.validate(0, AnalysisMode::PerLeg, policy).unwrap();
                assert_eq!(rec.trade_type, TradeType::Short, "{value:?} under {policy:?}");
            }
        }
    }

    #[test]
    fn pnl_required_only_per_signal() {
        let raw = raw_leg();
        assert!(raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .is_ok());
        let err = raw
            .validate(2, AnalysisMode::PerSignal, TradeTypePolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedRecord { index: 2, field: "pnl", .. }
        ));
    }

    #[test]
    fn non_numeric_qty_is_dropped_not_rejected() {
        let mut raw = raw_leg();
        raw.qty = Some("1 lot".into());
        let rec = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap();
        assert_eq!(rec.qty, None);
        assert_eq!(rec.exit_price, 90.0);
    }

    #[test]
    fn non_numeric_sl_price_is_dropped_not_rejected() {
        let mut raw = raw_leg();
        raw.sl_price = Some("none".into());
        let rec = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap();
        assert_eq!(rec.sl_price, None);
        assert_eq!(rec.qty, Some(50.0));
    }

    #[test]
    fn recorded_pnl_is_not_read_per_leg() {
        let mut raw = raw_leg();
        raw.pnl = Some("n/a".into());
        let rec = raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap();
        assert_eq!(rec.pnl, None);

        let err = raw
            .validate(0, AnalysisMode::PerSignal, TradeTypePolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedRecord { field: "pnl", .. }
        ));
    }

    #[test]
    fn ledger_with_junk_passthrough_fields_still_validates() {
        let mut first = raw_leg();
        first.qty = Some("1 lot".into());
        first.sl_price = Some("none".into());
        first.pnl = Some("n/a".into());
        let ledger = vec![first, raw_leg()];
        let records =
            validate_records(&ledger, AnalysisMode::PerLeg, TradeTypePolicy::Strict).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].qty, None);
        assert_eq!(records[1].sl_price, Some(130.5));
    }

    #[test]
    fn validate_records_reports_first_bad_index() {
        let mut bad = raw_leg();
        bad.trade_type = None;
        let ledger = vec![raw_leg(), raw_leg(), bad];
        let err = validate_records(&ledger, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedRecord { index: 2, field: "trade_type", .. }
        ));
    }

    #[test]
    fn raw_record_deserializes_from_json_with_extra_fields() {
        let json = r#"{
            "_id": "65f0",
            "trade_date": "2024-03-04",
            "strike": 22000,
            "entry_price": 100.0,
            "exit_price": "90",
            "trade_type": "SHORT",
            "pnl_movement": null
        }"#;
        let raw: RawTradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.strike, Some(RawField::Number(22000.0)));
        assert_eq!(raw.exit_price, Some(RawField::Text("90".into())));
        assert_eq!(raw.pnl_movement, None);
        assert!(raw
            .validate(0, AnalysisMode::PerLeg, TradeTypePolicy::Strict)
            .is_ok());
    }

    #[test]
    fn parsed_date_ignores_other_fields() {
        let raw = RawTradeRecord {
            trade_date: Some("2024-01-05".into()),
            ..Default::default()
        };
        assert_eq!(raw.parsed_date(), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(RawTradeRecord::default().parsed_date(), None);
    }
}
