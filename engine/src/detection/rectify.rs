// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Key function selection by maximum probe chain length (MPCL).
//!
//! Each candidate maps a transaction to a key. The keys are fed, in batch
//! order, into a fresh [`LinearProbeTable`] and the longest probe chain any
//! single insertion needed is the candidate's MPCL. The candidate with the
//! smallest MPCL spreads the batch best; the earliest one wins ties.

use std::fmt;

use tracing::debug;

use super::probe::LinearProbeTable;
use super::{DetectionError, FraudDetection, KeyError};
use crate::transaction::Transaction;

/// Outcome of [`FraudDetection::rectify`].
pub struct Rectification<'f, F> {
    /// The winning candidate.
    pub function: &'f F,

    /// Position of the winner in the candidate list.
    pub index: usize,

    /// The winner's maximum probe chain length.
    pub mpcl: usize,

    /// MPCL of every candidate, in candidate order.
    pub mpcls: Vec<usize>,
}

impl<F> fmt::Debug for Rectification<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rectification")
            .field("index", &self.index)
            .field("mpcl", &self.mpcl)
            .field("mpcls", &self.mpcls)
            .finish_non_exhaustive()
    }
}

impl FraudDetection<'_> {
    /// Picks the candidate key function with the smallest MPCL.
    ///
    /// Candidates are scored in order and replace the running best only
    /// with a strictly smaller MPCL. A candidate that fails on any
    /// transaction aborts the whole selection with
    /// [`DetectionError::KeyFunction`]; it is never skipped.
    pub fn rectify<'f, F, K>(&self, functions: &'f [F]) -> Result<Rectification<'f, F>, DetectionError>
    where
        F: Fn(&Transaction) -> Result<K, KeyError>,
        K: fmt::Display,
    {
        let mut best: Option<(usize, usize)> = None;
        let mut mpcls = Vec::with_capacity(functions.len());

        for (candidate, function) in functions.iter().enumerate() {
            let mpcl = self.max_probe_chain(candidate, function)?;
            debug!(candidate, mpcl, "candidate key function scored");
            mpcls.push(mpcl);

            if best.map_or(true, |(_, best_mpcl)| mpcl < best_mpcl) {
                best = Some((candidate, mpcl));
            }
        }

        let (index, mpcl) = best.ok_or(DetectionError::NoCandidates)?;
        debug!(index, mpcl, candidates = functions.len(), "rectification finished");
        Ok(Rectification {
            function: &functions[index],
            index,
            mpcl,
            mpcls,
        })
    }

    fn max_probe_chain<F, K>(&self, candidate: usize, function: &F) -> Result<usize, DetectionError>
    where
        F: Fn(&Transaction) -> Result<K, KeyError>,
        K: fmt::Display,
    {
        let mut table = LinearProbeTable::with_config(self.probe_config.clone());
        let mut longest = 0;

        for (position, tx) in self.transactions.iter().enumerate() {
            let key = function(tx)
                .map_err(|source| DetectionError::KeyFunction {
                    candidate,
                    position,
                    source,
                })?
                .to_string();
            let probe = table.insert(key, tx.timestamp);
            longest = longest.max(probe.chain);
        }

        Ok(longest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    type KeyFn = fn(&Transaction) -> Result<u64, KeyError>;

    fn four_transactions() -> Vec<Transaction> {
        (1..=4).map(|ts| Transaction::new(ts, "Alice", "Bob")).collect()
    }

    fn lookup(table: [u64; 4], tx: &Transaction) -> Result<u64, KeyError> {
        table
            .get(tx.timestamp as usize - 1)
            .copied()
            .ok_or_else(|| KeyError::new(format!("no key for timestamp {}", tx.timestamp)))
    }

    fn function1(tx: &Transaction) -> Result<u64, KeyError> {
        lookup([2, 1, 1, 50], tx)
    }

    fn function2(tx: &Transaction) -> Result<u64, KeyError> {
        lookup([1, 2, 3, 4], tx)
    }

    #[test]
    fn perfect_distribution_is_selected() {
        let txs = four_transactions();
        let functions: [KeyFn; 2] = [function1, function2];
        let result = FraudDetection::new(&txs).rectify(&functions).unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(result.mpcl, 0);
        assert_eq!(result.mpcls, vec![1, 0]);
        assert_eq!((result.function)(&txs[2]), Ok(3));
    }

    #[test]
    fn ties_keep_the_earliest_candidate() {
        let txs = four_transactions();
        let functions: [KeyFn; 3] = [function2, function1, function2];
        let result = FraudDetection::new(&txs).rectify(&functions).unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.mpcls, vec![0, 1, 0]);
    }

    #[test]
    fn colliding_keys_lengthen_the_chain() {
        // "1" and "6" share home slot 4 in a 5-slot table, and "16" homes
        // on 3 behind "11", walking 3 -> 4 -> 0 -> 1.
        let txs = four_transactions();
        let functions: [KeyFn; 1] = [|tx| lookup([1, 6, 11, 16], tx)];
        let result = FraudDetection::new(&txs).rectify(&functions).unwrap();
        assert_eq!(result.mpcl, 3);
    }

    #[test]
    fn constant_key_counts_every_update() {
        let txs = four_transactions();
        let functions: [KeyFn; 1] = [|_| Ok(7)];
        let result = FraudDetection::new(&txs).rectify(&functions).unwrap();
        assert_eq!(result.mpcl, 1);
    }

    #[test]
    fn no_candidates_is_an_error() {
        let txs = four_transactions();
        let functions: [KeyFn; 0] = [];
        let result = FraudDetection::new(&txs).rectify(&functions);
        assert_eq!(result.err(), Some(DetectionError::NoCandidates));
    }

    #[test]
    fn failing_candidate_aborts_selection() {
        let mut txs = four_transactions();
        txs.push(Transaction::new(5, "Alice", "Bob"));
        let functions: [KeyFn; 2] = [function2, function1];
        let err = FraudDetection::new(&txs).rectify(&functions).unwrap_err();
        assert_eq!(
            err,
            DetectionError::KeyFunction {
                candidate: 0,
                position: 4,
                source: KeyError::new("no key for timestamp 5"),
            }
        );
    }

    #[test]
    fn empty_batch_scores_zero() {
        let txs: Vec<Transaction> = Vec::new();
        let functions: [KeyFn; 2] = [function1, function2];
        let result = FraudDetection::new(&txs).rectify(&functions).unwrap();
        assert_eq!((result.index, result.mpcl), (0, 0));
    }

    #[test]
    fn boxed_closures_with_string_keys() {
        let txs = four_transactions();
        let by_route: Box<dyn Fn(&Transaction) -> Result<String, KeyError>> =
            Box::new(|tx: &Transaction| -> Result<String, KeyError> {
                Ok(format!("{}>{}", tx.from_user, tx.to_user))
            });
        let by_time: Box<dyn Fn(&Transaction) -> Result<String, KeyError>> =
            Box::new(|tx: &Transaction| -> Result<String, KeyError> { Ok(tx.timestamp.to_string()) });
        let functions = vec![by_route, by_time];
        let result = FraudDetection::new(&txs).rectify(&functions).unwrap();
        // Every transaction shares one route, so it only ever updates.
        assert_eq!(result.mpcls[0], 1);
        assert_eq!(result.index, 1);
    }
}
