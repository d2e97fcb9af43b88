// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! The processing line: orders a batch around a critical transaction.
//!
//! Transactions at or before the critical timestamp leave the line first,
//! oldest-added first. Then the critical transaction. Then everything after
//! it, newest-added first. Each one is signed on its way out.
//!
//! A line is single-use. Once [`ProcessingLine::process`] has been called it
//! is locked: no more transactions can be added and it cannot be processed
//! again. While the iterator is alive the borrow checker already rules out
//! mutation; the lock covers everything after it.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::signing::sign_transaction;
use super::types::{Transaction, TransactionError};

/// A batch of transactions waiting to be signed in critical-centred order.
#[derive(Debug)]
pub struct ProcessingLine {
    /// The pivot. Taken out when the iterator reaches it.
    critical: Option<Transaction>,

    /// Timestamp of the pivot, kept after the pivot itself has been taken.
    critical_timestamp: u64,

    /// Transactions with `timestamp <= critical_timestamp`, FIFO.
    before: VecDeque<Transaction>,

    /// Transactions with `timestamp > critical_timestamp`, LIFO.
    after: Vec<Transaction>,

    locked: bool,
}

impl ProcessingLine {
    /// Creates an empty line around `critical`.
    pub fn new(critical: Transaction) -> Self {
        Self {
            critical_timestamp: critical.timestamp,
            critical: Some(critical),
            before: VecDeque::new(),
            after: Vec::new(),
            locked: false,
        }
    }

    /// Files a transaction before or after the critical one.
    ///
    /// Fails with [`TransactionError::LineLocked`] once processing has begun.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), TransactionError> {
        if self.locked {
            return Err(TransactionError::LineLocked);
        }
        if tx.timestamp <= self.critical_timestamp {
            self.before.push_back(tx);
        } else {
            self.after.push(tx);
        }
        Ok(())
    }

    /// Number of transactions still waiting, the critical one included.
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len() + usize::from(self.critical.is_some())
    }

    /// Returns `true` once every transaction has left the line.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the line has been handed out for processing.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locks the line and returns the one-shot signing iterator.
    ///
    /// Fails with [`TransactionError::LineLocked`] on every call after the
    /// first, whether or not the first iterator was drained.
    pub fn process(&mut self) -> Result<ProcessingLineIter<'_>, TransactionError> {
        if self.locked {
            return Err(TransactionError::LineLocked);
        }
        self.locked = true;
        debug!(
            before = self.before.len(),
            after = self.after.len(),
            critical_timestamp = self.critical_timestamp,
            "processing line locked"
        );
        Ok(ProcessingLineIter { line: self })
    }
}

/// Iterator returned by [`ProcessingLine::process`]. Yields owned, signed
/// transactions.
#[derive(Debug)]
pub struct ProcessingLineIter<'a> {
    line: &'a mut ProcessingLine,
}

impl Iterator for ProcessingLineIter<'_> {
    type Item = Transaction;

    fn next(&mut self) -> Option<Transaction> {
        let mut tx = self
            .line
            .before
            .pop_front()
            .or_else(|| self.line.critical.take())
            .or_else(|| self.line.after.pop())?;
        sign_transaction(&mut tx);
        trace!(timestamp = tx.timestamp, "transaction left the processing line");
        Some(tx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.line.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProcessingLineIter<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
