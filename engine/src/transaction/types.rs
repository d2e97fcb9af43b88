// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Core type definitions for Fraudbook transactions.
//!
//! A [`Transaction`] is three identity fields plus an optional
//! [`Signature`]. The signature is the only mutable part and is only ever
//! written by the signer (or by a caller replaying a pre-signed batch).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config;

// ---------------------------------------------------------------------------
// TransactionError
// ---------------------------------------------------------------------------

/// Errors raised while constructing signatures or driving a processing line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A signature string contains a character outside the legal alphabet.
    #[error("illegal signature character {character:?} at position {position}")]
    IllegalSignatureCharacter { character: char, position: usize },

    /// A signature string is longer than [`config::MAX_SIGNATURE_LENGTH`].
    #[error("signature has {length} characters, at most {max} allowed")]
    SignatureTooLong { length: usize, max: usize },

    /// The processing line has already been handed out for iteration.
    /// Lines are single-use: no more transactions, no second pass.
    #[error("processing line is locked")]
    LineLocked,
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A string over the legal alphabet (`a`-`z`, `0`-`9`).
///
/// Validation happens once, at construction, so every consumer can index
/// book pages without re-checking characters. Signatures coming out of the
/// signer are always [`config::SIGNATURE_LENGTH`] characters long; any
/// length up to [`config::MAX_SIGNATURE_LENGTH`] is accepted so hand-built
/// batches can be analysed too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(String);

impl Signature {
    /// Validates `raw` against the legal alphabet.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TransactionError> {
        let raw = raw.into();
        if raw.len() > config::MAX_SIGNATURE_LENGTH {
            return Err(TransactionError::SignatureTooLong {
                length: raw.len(),
                max: config::MAX_SIGNATURE_LENGTH,
            });
        }
        if let Some((position, character)) = raw
            .chars()
            .enumerate()
            .find(|(_, c)| config::page_index(*c).is_none())
        {
            return Err(TransactionError::IllegalSignatureCharacter {
                character,
                position,
            });
        }
        Ok(Self(raw))
    }

    /// Builds a signature from bytes already known to be legal characters.
    pub(crate) fn from_digits(digits: &[u8]) -> Self {
        debug_assert!(digits.iter().all(|b| config::page_index(*b as char).is_some()));
        Self(digits.iter().map(|b| *b as char).collect())
    }

    /// The signature text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters. All legal characters are ASCII, so this is
    /// also the byte length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the zero-length signature.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Page index of the character at `level`, or `None` once the signature
    /// has run out.
    pub fn page_at(&self, level: usize) -> Option<usize> {
        self.0
            .as_bytes()
            .get(level)
            .and_then(|b| config::page_index(*b as char))
    }

    /// Returns `true` if either signature is a strict prefix of the other.
    /// Two such signatures can never be told apart by a book.
    pub(crate) fn shadows(&self, other: &Signature) -> bool {
        self != other && (self.0.starts_with(&other.0) || other.0.starts_with(&self.0))
    }
}

impl TryFrom<String> for Signature {
    type Error = TransactionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl std::str::FromStr for Signature {
    type Err = TransactionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl From<Signature> for String {
    fn from(signature: Signature) -> Self {
        signature.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transfer between two users at a point in time.
///
/// `timestamp`, `from_user` and `to_user` are the identity of the
/// transaction: equal triples always sign to equal signatures. The
/// `signature` is `None` until [`super::sign_transaction`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-defined timestamp. Only its ordering matters to the engine.
    pub timestamp: u64,

    /// Sending user.
    pub from_user: String,

    /// Receiving user.
    pub to_user: String,

    /// Derived signature. `None` for unsigned transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl Transaction {
    /// Creates an unsigned transaction.
    pub fn new(timestamp: u64, from_user: impl Into<String>, to_user: impl Into<String>) -> Self {
        Self {
            timestamp,
            from_user: from_user.into(),
            to_user: to_user.into(),
            signature: None,
        }
    }

    /// Attaches an already-computed signature, replacing any previous one.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Returns `true` once a signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// The attached signature, if any.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The canonical field string the signer hashes:
    /// `"{timestamp}-{from_user}-{to_user}"`.
    pub fn signing_input(&self) -> String {
        format!("{}-{}-{}", self.timestamp, self.from_user, self.to_user)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
