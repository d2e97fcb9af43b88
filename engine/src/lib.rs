// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Fraudbook Engine — Core Library
//!
//! The analytical core of Fraudbook: a lightweight anti-fraud pipeline over
//! financial transactions. Every transaction carries a deterministic base-36
//! signature, and everything downstream keys off that signature.
//!
//! ## Architecture
//!
//! - **transaction** — The [`Transaction`] record, its validated
//!   [`Signature`], the rolling-hash signer and the processing line that
//!   orders and signs a batch around a critical transaction.
//! - **storage** — The processing book: a collapsing trie mapping
//!   signatures to amounts, one alphabet character per level.
//! - **detection** — Block-based duplicate-signature detection and
//!   probe-chain-minimizing key function selection.
//! - **config** — Alphabet, hash parameters and table sizes.
//!
//! ## Design Philosophy
//!
//! 1. Data-quality problems are counted, structural absence is an error.
//! 2. Everything is deterministic. Same batch in, same report out.
//! 3. The signature is a checksum, not a cryptographic digest. Don't
//!    use it as one.

pub mod config;
pub mod detection;
pub mod storage;
pub mod transaction;

pub use detection::{BlockSuspicion, DetectionError, FraudDetection, KeyError, Rectification};
pub use storage::{BookError, Page, ProcessingBook};
pub use transaction::{sign_transaction, ProcessingLine, Signature, Transaction, TransactionError};
