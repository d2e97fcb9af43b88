//! Built-in key functions for `fraudbook rectify`.
//!
//! Each candidate maps a transaction to a string key. Names are parsed
//! from the `--candidates` list; parameterised ones carry their argument
//! after the last dash (`timestamp-mod-97`, `signature-prefix-4`).

use std::fmt;
use std::str::FromStr;

use fraudbook_engine::detection::KeyError;
use fraudbook_engine::transaction::Transaction;

/// Prefix length used by a bare `signature-prefix`.
pub const DEFAULT_SIGNATURE_PREFIX: usize = 8;

/// A named key function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    Timestamp,
    FromUser,
    ToUser,
    /// `"{from_user}>{to_user}"`.
    Route,
    /// First `n` signature characters. Fails on unsigned transactions.
    SignaturePrefix(usize),
    /// `timestamp mod n`, `n > 0`.
    TimestampMod(u64),
}

impl Candidate {
    /// Computes this candidate's key for `tx`.
    pub fn key(&self, tx: &Transaction) -> Result<String, KeyError> {
        match *self {
            Candidate::Timestamp => Ok(tx.timestamp.to_string()),
            Candidate::FromUser => Ok(tx.from_user.clone()),
            Candidate::ToUser => Ok(tx.to_user.clone()),
            Candidate::Route => Ok(format!("{}>{}", tx.from_user, tx.to_user)),
            Candidate::SignaturePrefix(len) => {
                let signature = tx
                    .signature()
                    .ok_or_else(|| KeyError::new("transaction is unsigned"))?
                    .as_str();
                // Signatures are ASCII, so byte and char offsets agree.
                Ok(signature[..len.min(signature.len())].to_string())
            }
            Candidate::TimestampMod(modulus) => Ok((tx.timestamp % modulus).to_string()),
        }
    }
}

impl FromStr for Candidate {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim() {
            "timestamp" => Ok(Candidate::Timestamp),
            "from-user" => Ok(Candidate::FromUser),
            "to-user" => Ok(Candidate::ToUser),
            "route" => Ok(Candidate::Route),
            "signature-prefix" => Ok(Candidate::SignaturePrefix(DEFAULT_SIGNATURE_PREFIX)),
            other => {
                if let Some(len) = other.strip_prefix("signature-prefix-") {
                    match len.parse::<usize>() {
                        Ok(len) if len > 0 => Ok(Candidate::SignaturePrefix(len)),
                        _ => Err(format!("invalid signature prefix length in {other:?}")),
                    }
                } else if let Some(modulus) = other.strip_prefix("timestamp-mod-") {
                    match modulus.parse::<u64>() {
                        Ok(modulus) if modulus > 0 => Ok(Candidate::TimestampMod(modulus)),
                        _ => Err(format!("invalid timestamp modulus in {other:?}")),
                    }
                } else {
                    Err(format!("unknown key function {other:?}"))
                }
            }
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Timestamp => f.write_str("timestamp"),
            Candidate::FromUser => f.write_str("from-user"),
            Candidate::ToUser => f.write_str("to-user"),
            Candidate::Route => f.write_str("route"),
            Candidate::SignaturePrefix(len) => write!(f, "signature-prefix-{len}"),
            Candidate::TimestampMod(modulus) => write!(f, "timestamp-mod-{modulus}"),
        }
    }
}
