// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Transaction signing with a polynomial rolling hash.
//!
//! Signing is a separate step from construction because the processing
//! line signs lazily, as each transaction leaves the line. The signature is
//! a checksum over [`Transaction::signing_input`], not a cryptographic
//! digest: it identifies, it does not authenticate.

use super::types::{Signature, Transaction};
use crate::config::{
    BASE36_DIGITS, SIGNATURE_HASH_BASE, SIGNATURE_HASH_MODULUS, SIGNATURE_LENGTH,
};

/// Signs a transaction in place and returns it for chaining.
///
/// The signing procedure:
/// 1. Build the input string `"{timestamp}-{from_user}-{to_user}"`.
/// 2. Fold it byte by byte into `h = (h * 37 + byte) mod (2^127 - 1)`.
/// 3. Render `h` as exactly 36 base-36 digits, zero-padded on the left.
///
/// Any previous signature is overwritten. Runs in time linear in the
/// length of the input string.
pub fn sign_transaction(tx: &mut Transaction) -> &Transaction {
    tx.signature = Some(compute_signature(tx));
    tx
}

/// Computes the signature `tx` would receive without attaching it.
pub fn compute_signature(tx: &Transaction) -> Signature {
    let hash = tx
        .signing_input()
        .bytes()
        .fold(0u128, |acc, byte| {
            add_mod(mul_mod(acc, SIGNATURE_HASH_BASE), u128::from(byte))
        });

    let mut digits = [b'0'; SIGNATURE_LENGTH];
    let mut remaining = hash;
    for slot in digits.iter_mut().rev() {
        *slot = BASE36_DIGITS[(remaining % 36) as usize];
        remaining /= 36;
    }

    // Base-36 digits are all legal characters.
    Signature::from_digits(&digits)
}

/// `(a + b) mod p` for `a, b < p < 2^127`. The sum cannot overflow `u128`.
fn add_mod(a: u128, b: u128) -> u128 {
    let sum = a + b;
    if sum >= SIGNATURE_HASH_MODULUS {
        sum - SIGNATURE_HASH_MODULUS
    } else {
        sum
    }
}

/// `(a * b) mod p` by double-and-add; `a * b` itself would overflow `u128`.
fn mul_mod(a: u128, mut b: u128) -> u128 {
    let mut result = 0;
    let mut addend = a % SIGNATURE_HASH_MODULUS;
    while b > 0 {
        if b & 1 == 1 {
            result = add_mod(result, addend);
        }
        addend = add_mod(addend, addend);
        b >>= 1;
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
