// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Detection Module
//!
//! Batch analytics over signed transactions. Both procedures are read-only
//! over the batch and allocate their working tables per iteration.
//!
//! ## Architecture
//!
//! ```text
//! blocks.rs   — detect_by_blocks: duplicate signatures hidden by block reordering
//! rectify.rs  — rectify: pick the key function with the shortest worst probe chain
//! probe.rs    — LinearProbeTable: the deterministic table rectify simulates
//! ```
//!
//! ## Design Decisions
//!
//! - Ties keep the first candidate examined (smallest block size, earliest
//!   key function). Both loops compare strictly against the running best.
//! - Malformed batches are rejected up front rather than producing a score
//!   that silently depends on which transaction came first.

pub mod blocks;
pub mod probe;
pub mod rectify;

use thiserror::Error;

use crate::transaction::Transaction;

pub use blocks::{canonical_key, BlockSuspicion};
pub use probe::{LinearProbeTable, Probe, ProbeTableConfig};
pub use rectify::Rectification;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure raised by a candidate key function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct KeyError {
    message: String,
}

impl KeyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by the detection procedures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// `detect_by_blocks` needs at least one transaction.
    #[error("transaction batch is empty")]
    EmptyBatch,

    /// A transaction in the batch has no signature.
    #[error("transaction at position {position} is unsigned")]
    Unsigned { position: usize },

    /// Signatures in the batch do not all have the same length.
    #[error("signature at position {position} has length {found}, expected {expected}")]
    InconsistentSignatureLength {
        position: usize,
        expected: usize,
        found: usize,
    },

    /// `rectify` was called without any candidate functions.
    #[error("no candidate key functions supplied")]
    NoCandidates,

    /// A candidate key function failed on a transaction.
    #[error("candidate {candidate} failed on transaction at position {position}: {source}")]
    KeyFunction {
        candidate: usize,
        position: usize,
        #[source]
        source: KeyError,
    },
}

// ---------------------------------------------------------------------------
// FraudDetection
// ---------------------------------------------------------------------------

/// Detection procedures over a borrowed batch of transactions.
#[derive(Debug, Clone)]
pub struct FraudDetection<'a> {
    transactions: &'a [Transaction],
    probe_config: ProbeTableConfig,
}

impl<'a> FraudDetection<'a> {
    /// Wraps a batch with the default probe table schedule.
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self::with_probe_config(transactions, ProbeTableConfig::default())
    }

    /// Wraps a batch with a custom probe table schedule for [`Self::rectify`].
    pub fn with_probe_config(transactions: &'a [Transaction], probe_config: ProbeTableConfig) -> Self {
        Self {
            transactions,
            probe_config,
        }
    }

    /// The batch under analysis.
    pub fn transactions(&self) -> &'a [Transaction] {
        self.transactions
    }
}
