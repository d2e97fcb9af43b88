// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transaction Module
//!
//! The record every other module consumes, and the two collaborators that
//! turn a raw batch into a signed, ordered one.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — Transaction, Signature and TransactionError
//! signing.rs  — Rolling-hash signer producing 36-character base-36 signatures
//! line.rs     — ProcessingLine: orders a batch around a critical transaction
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Create** — [`Transaction::new`] with timestamp, sender and receiver.
//! 2. **Queue** — [`ProcessingLine::add_transaction`] files it before or after
//!    the critical transaction.
//! 3. **Sign** — [`ProcessingLine::process`] yields the batch in order,
//!    calling [`sign_transaction`] on each one as it comes out.
//! 4. **Analyse** — hand the signed batch to the detector, the rectifier or
//!    a processing book.

pub mod line;
pub mod signing;
pub mod types;

pub use line::{ProcessingLine, ProcessingLineIter};
pub use signing::{compute_signature, sign_transaction};
pub use types::{Signature, Transaction, TransactionError};
