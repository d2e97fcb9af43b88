//! JSON reports printed on stdout, one per invocation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fraudbook_engine::storage::Entry;
use fraudbook_engine::transaction::Transaction;

/// Envelope shared by every report.
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub command: &'static str,
    pub generated_at: DateTime<Utc>,
    pub transactions: usize,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(command: &'static str, transactions: usize, body: T) -> Self {
        Self {
            command,
            generated_at: Utc::now(),
            transactions,
            body,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A transaction with its amount, as printed by `sign` and `book`.
#[derive(Debug, Serialize)]
pub struct SignedRecord<'a> {
    #[serde(flatten)]
    pub transaction: &'a Transaction,
    pub amount: u64,
}

impl<'a> From<Entry<'a>> for SignedRecord<'a> {
    fn from(entry: Entry<'a>) -> Self {
        Self {
            transaction: entry.transaction(),
            amount: entry.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignBody<'a> {
    pub line_signed: bool,
    pub replaced_signatures: usize,
    pub records: Vec<SignedRecord<'a>>,
}

/// MPCL of one candidate key function.
#[derive(Debug, Serialize)]
pub struct CandidateScore {
    pub name: String,
    pub mpcl: usize,
}

#[derive(Debug, Serialize)]
pub struct RectifyBody {
    pub initial_table_size: usize,
    pub winner: String,
    pub winner_index: usize,
    pub mpcl: usize,
    pub candidates: Vec<CandidateScore>,
}

/// Result of one `--remove`.
#[derive(Debug, Serialize)]
pub struct Removal {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookBody<'a> {
    pub size: usize,
    pub error_count: usize,
    pub depth: usize,
    pub removals: Vec<Removal>,
    pub entries: Vec<SignedRecord<'a>>,
}
