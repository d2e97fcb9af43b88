//! Batch input: reading transaction records and getting them signed.
//!
//! A batch file is a JSON array of records:
//!
//! ```json
//! [{"timestamp": 50, "from_user": "alice", "to_user": "bob", "amount": 120}]
//! ```
//!
//! `amount` defaults to 0 and `signature` is optional. A batch where every
//! record is signed is taken as-is, in file order. Anything else goes
//! through a processing line and comes out in line order.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use fraudbook_engine::transaction::{compute_signature, ProcessingLine, Signature, Transaction};

/// One record of a batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub timestamp: u64,
    pub from_user: String,
    pub to_user: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub signature: Option<Signature>,
}

impl Record {
    fn into_parts(self) -> (Transaction, u64) {
        let mut tx = Transaction::new(self.timestamp, self.from_user, self.to_user);
        tx.signature = self.signature;
        (tx, self.amount)
    }
}

/// A signed batch and the amount that goes with each transaction.
#[derive(Debug, Clone)]
pub struct Batch {
    pub transactions: Vec<Transaction>,
    pub amounts: Vec<u64>,

    /// `true` when the batch went through a processing line.
    pub line_signed: bool,

    /// Signatures supplied in the file that the line re-signed over.
    pub replaced_signatures: usize,
}

/// Reads and parses a batch file.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse batch file {}", path.display()))?;
    tracing::info!(path = %path.display(), records = records.len(), "batch loaded");
    Ok(records)
}

/// Turns records into a signed [`Batch`].
///
/// `critical` picks the line's pivot by timestamp; the first record is
/// used when it is `None`. It is ignored for fully pre-signed batches.
pub fn prepare_batch(records: Vec<Record>, critical: Option<u64>) -> Result<Batch> {
    if records.iter().all(|record| record.signature.is_some()) {
        let (transactions, amounts) = records.into_iter().map(Record::into_parts).unzip();
        return Ok(Batch {
            transactions,
            amounts,
            line_signed: false,
            replaced_signatures: 0,
        });
    }

    let replaced_signatures = records
        .iter()
        .filter(|record| record.signature.is_some())
        .count();
    if replaced_signatures > 0 {
        tracing::warn!(
            supplied = replaced_signatures,
            records = records.len(),
            "batch is only partly signed; supplied signatures will be recomputed"
        );
    }

    let pivot = match critical {
        Some(timestamp) => records
            .iter()
            .position(|record| record.timestamp == timestamp)
            .with_context(|| format!("no record has critical timestamp {timestamp}"))?,
        None => 0,
    };

    let mut parts: Vec<(Transaction, u64)> = records.into_iter().map(Record::into_parts).collect();
    let (critical_tx, critical_amount) = parts.remove(pivot);
    let critical_timestamp = critical_tx.timestamp;

    // The line reorders, so amounts are matched back up by signature.
    // Identical triples sign identically and are interchangeable.
    let mut pending: HashMap<Signature, VecDeque<u64>> = HashMap::new();
    pending
        .entry(compute_signature(&critical_tx))
        .or_default()
        .push_back(critical_amount);

    let mut line = ProcessingLine::new(critical_tx);
    for (tx, amount) in parts {
        pending.entry(compute_signature(&tx)).or_default().push_back(amount);
        line.add_transaction(tx)?;
    }

    let transactions: Vec<Transaction> = line.process()?.collect();
    let mut amounts = Vec::with_capacity(transactions.len());
    for tx in &transactions {
        let amount = tx
            .signature()
            .and_then(|signature| pending.get_mut(signature))
            .and_then(VecDeque::pop_front);
        match amount {
            Some(amount) => amounts.push(amount),
            None => bail!("processing line produced an unexpected transaction at {}", tx.timestamp),
        }
    }

    tracing::info!(
        transactions = transactions.len(),
        critical_timestamp,
        "batch signed through processing line"
    );
    Ok(Batch {
        transactions,
        amounts,
        line_signed: true,
        replaced_signatures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(timestamp: u64, from: &str, amount: u64) -> Record {
        Record {
            timestamp,
            from_user: from.to_string(),
            to_user: "merchant".to_string(),
            amount,
            signature: None,
        }
    }

    #[test]
    fn load_records_reads_optional_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"timestamp": 1, "from_user": "a", "to_user": "b"}},
                {{"timestamp": 2, "from_user": "c", "to_user": "d", "amount": 9, "signature": "abc123"}}
            ]"#
        )
        .unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 0);
        assert!(records[0].signature.is_none());
        assert_eq!(records[1].amount, 9);
        assert_eq!(records[1].signature.as_ref().map(Signature::as_str), Some("abc123"));
    }

    #[test]
    fn load_records_rejects_illegal_signatures() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"timestamp": 1, "from_user": "a", "to_user": "b", "signature": "AB-12"}}]"#
        )
        .unwrap();
        let err = load_records(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse batch file"));
    }

    #[test]
    fn load_records_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read batch file"));
    }

    #[test]
    fn presigned_batch_keeps_file_order() {
        let records = vec![
            Record {
                signature: Some(Signature::parse("zz").unwrap()),
                ..record(5, "a", 1)
            },
            Record {
                signature: Some(Signature::parse("aa").unwrap()),
                ..record(1, "b", 2)
            },
        ];
        let batch = prepare_batch(records, Some(1)).unwrap();
        assert!(!batch.line_signed);
        assert_eq!(batch.amounts, vec![1, 2]);
        assert_eq!(batch.transactions[0].signature().unwrap().as_str(), "zz");
    }

    #[test]
    fn unsigned_batch_is_ordered_around_the_critical_record() {
        let records = vec![
            record(10, "a", 100),
            record(5, "b", 50),
            record(20, "c", 200),
            record(15, "d", 150),
            record(1, "e", 10),
        ];
        let batch = prepare_batch(records, Some(10)).unwrap();
        assert!(batch.line_signed);

        let order: Vec<u64> = batch.transactions.iter().map(|tx| tx.timestamp).collect();
        assert_eq!(order, vec![5, 1, 10, 15, 20]);
        assert_eq!(batch.amounts, vec![50, 10, 100, 150, 200]);
        assert!(batch.transactions.iter().all(Transaction::is_signed));
    }

    #[test]
    fn first_record_is_the_default_critical() {
        let records = vec![record(3, "a", 30), record(9, "b", 90), record(1, "c", 10)];
        let batch = prepare_batch(records, None).unwrap();
        let order: Vec<u64> = batch.transactions.iter().map(|tx| tx.timestamp).collect();
        assert_eq!(order, vec![1, 3, 9]);
        assert_eq!(batch.amounts, vec![10, 30, 90]);
    }

    #[test]
    fn duplicate_records_keep_their_amounts() {
        let records = vec![record(1, "a", 5), record(1, "a", 7), record(0, "z", 1)];
        let batch = prepare_batch(records, None).unwrap();
        assert_eq!(batch.transactions.len(), 3);
        let mut amounts = batch.amounts.clone();
        amounts.sort_unstable();
        assert_eq!(amounts, vec![1, 5, 7]);
    }

    #[test]
    fn partly_signed_batch_reports_replaced_signatures() {
        let records = vec![
            Record {
                signature: Some(Signature::parse("zzzz").unwrap()),
                ..record(50, "alice", 1)
            },
            record(60, "bob", 2),
        ];
        let batch = prepare_batch(records, None).unwrap();
        assert!(batch.line_signed);
        assert_eq!(batch.replaced_signatures, 1);

        let alice = &batch.transactions[0];
        assert_eq!(alice.signature(), Some(&compute_signature(alice)));
        assert_ne!(alice.signature().map(Signature::as_str), Some("zzzz"));
    }

    #[test]
    fn unsigned_batch_replaces_nothing() {
        let batch = prepare_batch(vec![record(1, "a", 1), record(2, "b", 2)], None).unwrap();
        assert_eq!(batch.replaced_signatures, 0);
    }

    #[test]
    fn load_records_rejects_overlong_signatures() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let signature = "a".repeat(100_000);
        write!(
            file,
            r#"[{{"timestamp": 1, "from_user": "a", "to_user": "b", "signature": "{signature}"}}]"#
        )
        .unwrap();
        let err = load_records(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("at most 256 allowed"));
    }

    #[test]
    fn unknown_critical_timestamp_is_an_error() {
        let records = vec![record(1, "a", 1)];
        let err = prepare_batch(records, Some(42)).unwrap_err();
        assert!(err.to_string().contains("critical timestamp 42"));
    }
}
