// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Storage Module
//!
//! In-memory, signature-indexed storage for transaction amounts.
//!
//! ## Architecture
//!
//! ```text
//! book.rs  — ProcessingBook: a collapsing 36-way trie keyed by signature
//! ```
//!
//! ## Design Decisions
//!
//! 1. **One character per level.** A book at level `L` routes on the
//!    signature's `L`-th character. A child book only exists where two
//!    signatures actually share a prefix, so depth tracks real collisions.
//!
//! 2. **Eager collapse.** When deletions leave a single transaction under a
//!    child book, the child is replaced by that transaction's leaf. Lookups
//!    never walk through a book that has nothing left to disambiguate.
//!
//! 3. **Borrowed transactions.** Leaves hold `&Transaction`; the caller owns
//!    the batch, the book only indexes it.

pub mod book;

pub use book::{BookError, Entry, Page, ProcessingBook};
