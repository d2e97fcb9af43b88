// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Engine Configuration & Constants
//!
//! Every magic number in Fraudbook lives here. The alphabet, the signer's
//! hash parameters and the probe table sizes are all part of the observable
//! behaviour: change one and every stored signature, every book layout and
//! every rectifier score changes with it.

// ---------------------------------------------------------------------------
// Alphabet
// ---------------------------------------------------------------------------

/// The legal signature alphabet, in page order. A book page is selected by
/// a character's position in this string.
pub const LEGAL_CHARACTERS: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Fan-out of every book node. One page per legal character.
pub const PAGE_COUNT: usize = 36;

/// Returns the page index of a signature character, or `None` if the
/// character is outside the legal alphabet.
pub fn page_index(character: char) -> Option<usize> {
    match character {
        'a'..='z' => Some(character as usize - 'a' as usize),
        '0'..='9' => Some(26 + character as usize - '0' as usize),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Length of every signature produced by the signer.
pub const SIGNATURE_LENGTH: usize = 36;

/// Digits used to render the signer's hash, most significant first.
/// Note the order differs from [`LEGAL_CHARACTERS`]; both cover the same set.
pub const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Multiplier of the signer's polynomial rolling hash.
pub const SIGNATURE_HASH_BASE: u128 = 37;

/// Modulus of the signer's rolling hash: the Mersenne prime 2^127 - 1.
pub const SIGNATURE_HASH_MODULUS: u128 = (1u128 << 127) - 1;

/// Longest signature [`crate::transaction::Signature::parse`] accepts.
/// A processing book nests at most this many levels deep.
pub const MAX_SIGNATURE_LENGTH: usize = 256;

// ---------------------------------------------------------------------------
// Linear probe table
// ---------------------------------------------------------------------------

/// Table sizes the probe table walks through as it grows. All prime.
pub const PROBE_TABLE_SIZES: &[usize] = &[
    5, 13, 29, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613,
    393241, 786433, 1572869,
];

/// Starting coefficient of the probe table's string hash.
pub const PROBE_HASH_SEED: u64 = 31415;

/// Per-character multiplier applied to the probe hash coefficient.
pub const PROBE_HASH_BASE: u64 = 31;

/// The table grows once `len / size` exceeds this ratio (numerator, denominator).
pub const PROBE_MAX_LOAD: (usize, usize) = (2, 3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_matches_page_count() {
        assert_eq!(LEGAL_CHARACTERS.len(), PAGE_COUNT);
        assert_eq!(BASE36_DIGITS.len(), PAGE_COUNT);
    }

    #[test]
    fn test_page_index_follows_alphabet_order() {
        for (expected, character) in LEGAL_CHARACTERS.chars().enumerate() {
            assert_eq!(page_index(character), Some(expected));
        }
    }

    #[test]
    fn test_page_index_rejects_foreign_characters() {
        for character in ['A', 'Z', '-', ' ', 'é', '_'] {
            assert_eq!(page_index(character), None, "{character:?}");
        }
    }

    #[test]
    fn test_base36_digits_cover_the_alphabet() {
        for digit in BASE36_DIGITS.iter() {
            assert!(page_index(*digit as char).is_some());
        }
    }

    #[test]
    fn test_probe_sizes_are_increasing_primes() {
        let is_prime = |n: usize| n > 1 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0);
        assert!(PROBE_TABLE_SIZES.windows(2).all(|w| w[0] < w[1]));
        assert!(PROBE_TABLE_SIZES.iter().all(|&n| is_prime(n)));
    }

    #[test]
    fn test_signer_output_fits_the_length_cap() {
        assert!(SIGNATURE_LENGTH <= MAX_SIGNATURE_LENGTH);
    }

    #[test]
    fn test_hash_modulus_is_mersenne_127() {
        assert_eq!(SIGNATURE_HASH_MODULUS.count_ones(), 127);
        assert!(SIGNATURE_HASH_BASE < SIGNATURE_HASH_MODULUS);
    }
}
