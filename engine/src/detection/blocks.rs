// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Block-based duplicate-signature detection.
//!
//! Two transactions whose signatures are the same blocks in a different
//! order are suspicious. For a block size `S`, a signature of length `L` is
//! cut into `L / S` whole blocks plus a leftover suffix; the blocks are
//! sorted and glued back together in front of the suffix. Signatures that
//! are block permutations of each other end up with the same canonical key.
//!
//! ```text
//! S = 2:  "ab|cd|ef|g"  ->  blocks [ab, cd, ef] + "g"  ->  "abcdefg"
//!         "ef|cd|ab|g"  ->  blocks [ab, cd, ef] + "g"  ->  "abcdefg"
//! ```
//!
//! Each block size is scored by the product of its group sizes. The best
//! block size is the one with the highest score, smallest `S` on ties.
//!
//! Cost per block size is O(N·L) for slicing and keying plus the block
//! sort; summed over every `S`, O(N·L²) at best and O(N·L³) at worst.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DetectionError, FraudDetection};
use crate::transaction::Signature;

/// Best block size found by [`FraudDetection::detect_by_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSuspicion {
    pub block_size: usize,

    /// Product of group sizes at `block_size`. Saturates at `u128::MAX`.
    pub score: u128,
}

/// Canonical key of `signature` at `block_size`: its whole blocks sorted,
/// followed by the unaligned suffix.
pub fn canonical_key(signature: &Signature, block_size: NonZeroUsize) -> String {
    let signature = signature.as_str();
    let block_size = block_size.get();
    // Signatures are ASCII, so any byte offset is a char boundary.
    let aligned = signature.len() / block_size * block_size;
    let (prefix, suffix) = signature.split_at(aligned);

    let mut blocks: Vec<&[u8]> = prefix.as_bytes().chunks(block_size).collect();
    blocks.sort();

    let mut key = Vec::with_capacity(signature.len());
    for block in blocks {
        key.extend_from_slice(block);
    }
    key.extend_from_slice(suffix.as_bytes());
    String::from_utf8_lossy(&key).into_owned()
}

impl FraudDetection<'_> {
    /// Finds the block size that best exposes reordered duplicates.
    ///
    /// Every transaction must be signed, and all signatures must share one
    /// length `L`. Block sizes `1..=L` are tried in order; a block size
    /// replaces the running best only with a strictly higher score. The
    /// starting best is block size 1 with score 1, which is also the
    /// answer for zero-length signatures.
    pub fn detect_by_blocks(&self) -> Result<BlockSuspicion, DetectionError> {
        let signatures = self.uniform_signatures()?;
        let length = signatures[0].len();

        let mut best = BlockSuspicion {
            block_size: 1,
            score: 1,
        };

        for block_size in (1..=length).filter_map(NonZeroUsize::new) {
            let mut groups: HashMap<String, u128> = HashMap::new();
            for signature in &signatures {
                *groups.entry(canonical_key(signature, block_size)).or_insert(0) += 1;
            }
            let block_size = block_size.get();

            let score = groups
                .values()
                .fold(1u128, |score, &count| score.saturating_mul(count));
            debug!(block_size, groups = groups.len(), score, "block size scored");

            if score > best.score {
                best = BlockSuspicion { block_size, score };
            }
        }

        debug!(
            block_size = best.block_size,
            score = best.score,
            transactions = signatures.len(),
            "duplicate detection finished"
        );
        Ok(best)
    }

    /// All signatures of the batch, checked for presence and equal length.
    fn uniform_signatures(&self) -> Result<Vec<&Signature>, DetectionError> {
        let mut signatures: Vec<&Signature> = Vec::with_capacity(self.transactions.len());
        for (position, tx) in self.transactions.iter().enumerate() {
            let signature = tx.signature().ok_or(DetectionError::Unsigned { position })?;
            if let Some(first) = signatures.first() {
                let expected = first.len();
                if signature.len() != expected {
                    return Err(DetectionError::InconsistentSignatureLength {
                        position,
                        expected,
                        found: signature.len(),
                    });
                }
            }
            signatures.push(signature);
        }
        if signatures.is_empty() {
            return Err(DetectionError::EmptyBatch);
        }
        Ok(signatures)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn batch(signatures: &[&str]) -> Vec<Transaction> {
        signatures
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Transaction::new(i as u64 + 1, "Alice", "Bob")
                    .with_signature(Signature::parse(*s).unwrap())
            })
            .collect()
    }

    fn detect(signatures: &[&str]) -> BlockSuspicion {
        let txs = batch(signatures);
        FraudDetection::new(&txs).detect_by_blocks().unwrap()
    }

    fn key(signature: &str, block_size: usize) -> String {
        let signature = Signature::parse(signature).unwrap();
        canonical_key(&signature, NonZeroUsize::new(block_size).unwrap())
    }

    #[test]
    fn canonical_key_sorts_whole_blocks_only() {
        assert_eq!(key("efcdabg", 2), "abcdefg");
        assert_eq!(key("cba", 1), "abc");
        assert_eq!(key("zyx", 3), "zyx");
        assert_eq!(key("zyx", 2), "zyx");
        assert_eq!(key("ba12", 2), "12ba");
    }

    #[test]
    fn canonical_key_inputs_are_validated_by_type() {
        // Multi-byte text never becomes a Signature and a zero block size
        // never becomes a NonZeroUsize, so neither reaches the slicing.
        assert!(Signature::parse("a\u{e9}").is_err());
        assert!(NonZeroUsize::new(0).is_none());

        // Block sizes past the signature length leave it untouched.
        assert_eq!(key("zy", 5), "zy");
        assert_eq!(key("", 1), "");
    }

    #[test]
    fn identical_signatures_form_one_group() {
        let result = detect(&["aaaa", "aaaa", "aaaa"]);
        assert_eq!(result.score, 3);
        assert_eq!(result.block_size, 1);
    }

    #[test]
    fn block_permutations_group_at_block_size_one() {
        let result = detect(&["aabbcc", "ccbbaa"]);
        assert_eq!(result, BlockSuspicion { block_size: 1, score: 2 });
    }

    #[test]
    fn mixed_groups_multiply() {
        // S = 1: {abc, acb, bac} x {xyz, zyx} x {abb} -> 3 * 2 * 1
        let result = detect(&["abc", "acb", "xyz", "bac", "zyx", "abb"]);
        assert_eq!(result, BlockSuspicion { block_size: 1, score: 6 });
    }

    #[test]
    fn suffix_stays_in_place() {
        // Same letters, so S = 1 already groups them.
        let result = detect(&["abcdefg", "efcdabg"]);
        assert_eq!(result, BlockSuspicion { block_size: 1, score: 2 });

        // Different trailing character never groups.
        let result = detect(&["abcdefg", "efcdabh"]);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn finer_block_size_wins_when_it_splits_large_groups() {
        // S = 1 puts all six in one group: score 6.
        // S = 2 keeps two groups of three apart: score 9.
        let result = detect(&["abcd", "cdab", "abcd", "acbd", "bdac", "acbd"]);
        assert_eq!(result, BlockSuspicion { block_size: 2, score: 9 });
    }

    #[test]
    fn coarsest_grouping_wins_for_small_groups() {
        // S = 1: {ab12, 12ab, ba21} and {zz99} -> 3. S = 2: {ab12, 12ab} -> 2.
        let result = detect(&["ab12", "12ab", "ba21", "zz99"]);
        assert_eq!(result, BlockSuspicion { block_size: 1, score: 3 });
    }

    #[test]
    fn strict_improvement_needed_to_move_off_block_one() {
        // S = 2 groups [ab|cd] with [cd|ab]; S = 1 groups them too.
        // Equal scores keep the smaller block size.
        let result = detect(&["abcd", "cdab"]);
        assert_eq!(result, BlockSuspicion { block_size: 1, score: 2 });
    }

    #[test]
    fn all_unique_scores_one() {
        assert_eq!(detect(&["abcd", "efgh", "ijkl"]).score, 1);
        assert_eq!(detect(&["a", "b", "c"]), BlockSuspicion { block_size: 1, score: 1 });

        assert_eq!(detect(&["0007", "0017", "0027", "0037"]).score, 1);
    }

    #[test]
    fn many_identical_long_signatures() {
        let sig = "abcd".repeat(20);
        let sigs = vec![sig.as_str(); 10];
        let result = detect(&sigs);
        assert_eq!(result, BlockSuspicion { block_size: 1, score: 10 });
    }

    #[test]
    fn empty_signatures_default_to_block_one() {
        assert_eq!(detect(&["", ""]), BlockSuspicion { block_size: 1, score: 1 });
    }

    #[test]
    fn rejects_malformed_batches() {
        let empty: Vec<Transaction> = Vec::new();
        assert_eq!(
            FraudDetection::new(&empty).detect_by_blocks(),
            Err(DetectionError::EmptyBatch)
        );

        let mut txs = batch(&["abc", "abd"]);
        txs.push(Transaction::new(9, "a", "b"));
        assert_eq!(
            FraudDetection::new(&txs).detect_by_blocks(),
            Err(DetectionError::Unsigned { position: 2 })
        );

        let txs = batch(&["abc", "abcd"]);
        assert_eq!(
            FraudDetection::new(&txs).detect_by_blocks(),
            Err(DetectionError::InconsistentSignatureLength {
                position: 1,
                expected: 3,
                found: 4
            })
        );
    }
}
