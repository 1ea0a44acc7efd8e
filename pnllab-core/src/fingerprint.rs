//! Ledger fingerprint: content hash of validated records.
//!
//! Two reports with the same fingerprint were computed from identical trades.

use crate::domain::TradeRecord;

/// BLAKE3 hex digest over the JSON encoding of each record, in order.
pub fn ledger_hash(records: &[TradeRecord]) -> Result<String, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        serde_json::to_writer(&mut hasher, record)?;
        hasher.update(b"\n");
    }
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeType;
    use chrono::NaiveDate;

    fn record(exit: f64) -> TradeRecord {
        TradeRecord {
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            strike: "21500".into(),
            trade_type: TradeType::Long,
            entry_price: 100.0,
            exit_price: exit,
            sl_price: None,
            qty: None,
            entry_time: None,
            exit_time: None,
            exit_type: None,
            pnl_movement: None,
            pnl: None,
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let a = ledger_hash(&[record(110.0), record(95.0)]).unwrap();
        let b = ledger_hash(&[record(110.0), record(95.0)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_depends_on_content_and_order() {
        let a = ledger_hash(&[record(110.0), record(95.0)]).unwrap();
        let b = ledger_hash(&[record(95.0), record(110.0)]).unwrap();
        let c = ledger_hash(&[record(110.0), record(96.0)]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
