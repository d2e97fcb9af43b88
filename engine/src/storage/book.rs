// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Processing Book — Collapsing Signature Trie
//!
//! Maps a transaction's signature to an amount. Each book routes on one
//! signature character: the book at level `L` picks one of its 36 pages
//! with the signature's `L`-th character. A page is empty, holds a single
//! leaf, or holds a child book at level `L + 1`.
//!
//! ```text
//! level 0      [a]            [0]
//!               |              |
//! level 1   book{b}       leaf 0bbzzz
//!               |
//! level 2   book{c}
//!               |
//! level 3   [1]     [x]
//!            |       |
//!     leaf abc123  leaf abcxyz
//! ```
//!
//! ## Invariants
//!
//! - `len()` is the number of distinct signatures beneath a book.
//! - `error_count()` counts rejected writes at or below a book, and a
//!   parent's count includes every error its children recorded.
//! - A child book never holds fewer than two transactions once a removal
//!   has finished: one survivor is hoisted into the parent page as a leaf.
//!
//! ## Error policy
//!
//! Writes never fail. A write that cannot be honoured (unsigned or too
//! short signature, a second amount for a stored signature, a signature
//! that is a strict prefix of a stored one) is counted and dropped; the
//! first write wins. Reads and removals of absent signatures fail with
//! [`BookError::NotFound`].

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{self, PAGE_COUNT};
use crate::transaction::{Signature, Transaction};

// ---------------------------------------------------------------------------
// BookError
// ---------------------------------------------------------------------------

/// Errors returned by processing book reads and removals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// No leaf in the book carries this signature.
    #[error("transaction {signature} not found")]
    NotFound { signature: String },
}

impl BookError {
    fn not_found(transaction: &Transaction) -> Self {
        Self::NotFound {
            signature: transaction
                .signature()
                .map_or_else(|| "<unsigned>".to_string(), Signature::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry & Page
// ---------------------------------------------------------------------------

/// A stored transaction and its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'tx> {
    transaction: &'tx Transaction,
    signature: &'tx Signature,
    amount: u64,
}

impl<'tx> Entry<'tx> {
    /// The stored transaction.
    pub fn transaction(&self) -> &'tx Transaction {
        self.transaction
    }

    /// The signature the entry is filed under.
    pub fn signature(&self) -> &'tx Signature {
        self.signature
    }

    /// The first amount written for this signature.
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// One of a book's 36 pages.
#[derive(Debug, Default)]
pub enum Page<'tx> {
    #[default]
    Empty,
    Leaf(Entry<'tx>),
    Book(Box<ProcessingBook<'tx>>),
}

// ---------------------------------------------------------------------------
// ProcessingBook
// ---------------------------------------------------------------------------

/// A signature-indexed book of transaction amounts.
///
/// Transactions are borrowed for `'tx`; the book never clones them.
#[derive(Debug)]
pub struct ProcessingBook<'tx> {
    /// Signature index this book routes on.
    level: usize,

    /// One page per legal character, in alphabet order.
    pages: [Page<'tx>; PAGE_COUNT],

    /// Rejected writes at or below this book. Never decreases.
    error_count: usize,

    /// Distinct signatures stored at or below this book.
    count: usize,
}

impl Default for ProcessingBook<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'tx> ProcessingBook<'tx> {
    /// Creates an empty top-level book.
    pub fn new() -> Self {
        Self::at_level(0)
    }

    fn at_level(level: usize) -> Self {
        Self {
            level,
            pages: std::array::from_fn(|_| Page::Empty),
            error_count: 0,
            count: 0,
        }
    }

    /// Signature index this book routes on. Zero for a top-level book.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Number of distinct signatures stored.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no transaction is stored.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of rejected writes so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// The page a character routes to in this book, or `None` if the
    /// character is outside the legal alphabet.
    pub fn page(&self, character: char) -> Option<&Page<'tx>> {
        config::page_index(character).map(|index| &self.pages[index])
    }

    /// Number of book levels from this one down to the deepest leaf.
    /// An empty or flat book has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .pages
            .iter()
            .filter_map(|page| match page {
                Page::Book(nested) => Some(nested.depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Stores `amount` under the transaction's signature.
    ///
    /// - empty page: the transaction becomes a leaf;
    /// - same signature already stored: a different amount is counted as
    ///   an error, the stored amount is kept;
    /// - different signature in the page: both move into a new child book
    ///   one level down;
    /// - child book: the write is delegated and its effects propagated.
    ///
    /// Unsigned transactions, signatures no longer than this book's level,
    /// and signatures that are a strict prefix of a stored one (or vice
    /// versa) are counted as errors and otherwise ignored.
    pub fn insert(&mut self, transaction: &'tx Transaction, amount: u64) {
        let Some(signature) = transaction.signature() else {
            self.error_count += 1;
            trace!(level = self.level, "unsigned transaction rejected");
            return;
        };
        let Some(index) = signature.page_at(self.level) else {
            self.error_count += 1;
            trace!(level = self.level, %signature, "signature too short for level");
            return;
        };

        let incoming = Entry {
            transaction,
            signature,
            amount,
        };

        self.pages[index] = match std::mem::take(&mut self.pages[index]) {
            Page::Empty => {
                self.count += 1;
                Page::Leaf(incoming)
            }
            Page::Leaf(existing) if existing.signature == signature => {
                if existing.amount != amount {
                    self.error_count += 1;
                    trace!(
                        %signature,
                        stored = existing.amount,
                        rejected = amount,
                        "conflicting amount ignored"
                    );
                }
                Page::Leaf(existing)
            }
            Page::Leaf(existing) if existing.signature.shadows(signature) => {
                self.error_count += 1;
                trace!(
                    %signature,
                    stored = %existing.signature,
                    "prefix signature cannot share a page"
                );
                Page::Leaf(existing)
            }
            Page::Leaf(existing) => {
                // Neither signature prefixes the other, so both have a
                // character at every level down to where they diverge.
                let mut nested = Box::new(Self::at_level(self.level + 1));
                nested.insert(existing.transaction, existing.amount);
                nested.insert(transaction, amount);
                self.count += 1;
                debug!(level = nested.level, "page split into nested book");
                Page::Book(nested)
            }
            Page::Book(mut nested) => {
                let (count_before, errors_before) = (nested.count, nested.error_count);
                nested.insert(transaction, amount);
                self.count += nested.count - count_before;
                self.error_count += nested.error_count - errors_before;
                Page::Book(nested)
            }
        };
    }

    /// Returns the amount stored under the transaction's signature.
    pub fn get(&self, transaction: &Transaction) -> Result<u64, BookError> {
        self.find(transaction)
            .map(|entry| entry.amount)
            .ok_or_else(|| BookError::not_found(transaction))
    }

    /// Returns `true` if the transaction's signature is stored.
    pub fn contains(&self, transaction: &Transaction) -> bool {
        self.find(transaction).is_some()
    }

    fn find(&self, transaction: &Transaction) -> Option<&Entry<'tx>> {
        let signature = transaction.signature()?;
        let mut book = self;
        loop {
            match &book.pages[signature.page_at(book.level)?] {
                Page::Empty => return None,
                Page::Leaf(entry) => return (entry.signature == signature).then_some(entry),
                Page::Book(nested) => book = &**nested,
            }
        }
    }

    /// Removes the transaction's signature and returns its amount.
    ///
    /// A child book left with no entries is cleared from its page; one left
    /// with a single entry is replaced by that entry's leaf.
    pub fn remove(&mut self, transaction: &Transaction) -> Result<u64, BookError> {
        let not_found = || BookError::not_found(transaction);
        let signature = transaction.signature().ok_or_else(not_found)?;
        let index = signature.page_at(self.level).ok_or_else(not_found)?;

        let amount = match &mut self.pages[index] {
            Page::Empty => return Err(not_found()),
            Page::Leaf(entry) if entry.signature == signature => entry.amount,
            Page::Leaf(_) => return Err(not_found()),
            Page::Book(nested) => {
                let amount = nested.remove(transaction)?;
                self.count -= 1;
                let remaining = nested.count;
                match remaining {
                    0 => self.pages[index] = Page::Empty,
                    1 => {
                        if let Some(survivor) = nested.extract_single() {
                            debug!(
                                level = self.level + 1,
                                survivor = %survivor.signature,
                                "nested book collapsed"
                            );
                            self.pages[index] = Page::Leaf(survivor);
                        }
                    }
                    _ => {}
                }
                return Ok(amount);
            }
        };

        self.pages[index] = Page::Empty;
        self.count -= 1;
        Ok(amount)
    }

    /// The single leaf reachable from this book, if there is exactly one
    /// occupied page and it resolves to a leaf through single-entry books.
    fn extract_single(&self) -> Option<Entry<'tx>> {
        let mut occupied = self
            .pages
            .iter()
            .filter(|page| !matches!(page, Page::Empty));
        let only = occupied.next()?;
        if occupied.next().is_some() {
            return None;
        }
        match only {
            Page::Leaf(entry) => Some(*entry),
            Page::Book(nested) => nested.extract_single(),
            Page::Empty => None,
        }
    }

    /// Every stored entry, in alphabet order of signatures.
    pub fn entries(&self) -> Vec<Entry<'tx>> {
        let mut out = Vec::with_capacity(self.count);
        self.collect_entries(&mut out);
        out
    }

    fn collect_entries(&self, out: &mut Vec<Entry<'tx>>) {
        for page in &self.pages {
            match page {
                Page::Empty => {}
                Page::Leaf(entry) => out.push(*entry),
                Page::Book(nested) => nested.collect_entries(out),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
