// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Deterministic linear-probing hash table.
//!
//! The rectifier scores candidate key functions by how long the probe
//! chains get when their keys go into this table, so the table's hash has
//! to be fixed: no random state, no per-process seeding. Identical key
//! sequences always produce identical probe sequences.

use crate::config::{PROBE_HASH_BASE, PROBE_HASH_SEED, PROBE_MAX_LOAD, PROBE_TABLE_SIZES};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Size schedule for [`LinearProbeTable`].
///
/// The table starts at `sizes[0]` and steps through the list as it fills.
/// Past the last entry each growth goes to `2n + 1`. Schedules only come
/// from [`Default`] or [`ProbeTableConfig::starting_at`], so they are always
/// strictly increasing and every growth step leaves free slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTableConfig {
    sizes: Vec<usize>,
}

impl Default for ProbeTableConfig {
    fn default() -> Self {
        Self {
            sizes: PROBE_TABLE_SIZES.to_vec(),
        }
    }
}

impl ProbeTableConfig {
    /// The default schedule with every size below `minimum` dropped. If the
    /// minimum exceeds every default size, `minimum` itself is used.
    pub fn starting_at(minimum: usize) -> Self {
        let mut sizes: Vec<usize> = PROBE_TABLE_SIZES
            .iter()
            .copied()
            .filter(|&size| size >= minimum)
            .collect();
        if sizes.is_empty() {
            sizes.push(minimum);
        }
        Self { sizes }
    }

    /// The size schedule, smallest first.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    fn size_at(&self, step: usize) -> usize {
        match self.sizes.get(step) {
            Some(&size) => size.max(2),
            None => {
                let last = self.sizes.last().copied().unwrap_or(PROBE_TABLE_SIZES[0]);
                let extra = step + 1 - self.sizes.len();
                (0..extra).fold(last.max(2), |size, _| size.saturating_mul(2).saturating_add(1))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Where a key lands and how far it had to walk to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Slot the key occupies (or would occupy).
    pub position: usize,

    /// Probe chain length: one per occupied slot holding a different key,
    /// plus one for the slot itself when it already holds this key.
    pub chain: usize,

    /// Whether the key was already present.
    pub existing: bool,
}

// ---------------------------------------------------------------------------
// LinearProbeTable
// ---------------------------------------------------------------------------

/// Open-addressing table with linear probing and wrap-around.
#[derive(Debug, Clone)]
pub struct LinearProbeTable<V> {
    slots: Vec<Option<(String, V)>>,
    len: usize,
    step: usize,
    config: ProbeTableConfig,
}

impl<V> Default for LinearProbeTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LinearProbeTable<V> {
    /// Creates an empty table with the default size schedule.
    pub fn new() -> Self {
        Self::with_config(ProbeTableConfig::default())
    }

    /// Creates an empty table with a custom size schedule.
    pub fn with_config(config: ProbeTableConfig) -> Self {
        let size = config.size_at(0);
        Self {
            slots: Self::empty_slots(size),
            len: 0,
            step: 0,
            config,
        }
    }

    fn empty_slots(size: usize) -> Vec<Option<(String, V)>> {
        std::iter::repeat_with(|| None).take(size).collect()
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of slots.
    pub fn table_size(&self) -> usize {
        self.slots.len()
    }

    /// Home slot of `key` in the current table.
    ///
    /// `value = (byte + a * value) mod n` over the key's bytes, with the
    /// coefficient `a` starting at 31415 and multiplied by 31 modulo
    /// `n - 1` after every byte.
    pub fn hash(&self, key: &str) -> usize {
        home_slot(key, self.table_size())
    }

    /// Walks from the home slot of `key` to the slot it occupies or would
    /// be inserted into.
    pub fn probe(&self, key: &str) -> Probe {
        let size = self.table_size();
        let mut position = self.hash(key);
        let mut chain = 0;
        // The load limit keeps at least one slot free, so this terminates.
        loop {
            match &self.slots[position] {
                None => {
                    return Probe {
                        position,
                        chain,
                        existing: false,
                    }
                }
                Some((stored, _)) if stored == key => {
                    return Probe {
                        position,
                        chain: chain + 1,
                        existing: true,
                    }
                }
                Some(_) => {
                    chain += 1;
                    position = (position + 1) % size;
                }
            }
        }
    }

    /// Inserts or updates `key` and returns the probe that placed it.
    /// The probe reflects the table as it was before the insert, before
    /// any growth the insert triggers.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Probe {
        let key = key.into();
        let probe = self.probe(&key);
        if !probe.existing {
            self.len += 1;
        }
        self.slots[probe.position] = Some((key, value));

        let (numerator, denominator) = PROBE_MAX_LOAD;
        if self.len * denominator > self.table_size() * numerator {
            self.grow();
        }
        probe
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&V> {
        let probe = self.probe(key);
        if !probe.existing {
            return None;
        }
        self.slots[probe.position].as_ref().map(|(_, value)| value)
    }

    /// Returns `true` if `key` is stored.
    pub fn contains_key(&self, key: &str) -> bool {
        self.probe(key).existing
    }

    fn grow(&mut self) {
        self.step += 1;
        let size = self.config.size_at(self.step);
        let old = std::mem::replace(&mut self.slots, Self::empty_slots(size));
        self.len = 0;
        for (key, value) in old.into_iter().flatten() {
            let probe = self.probe(&key);
            self.slots[probe.position] = Some((key, value));
            self.len += 1;
        }
    }
}

/// Rolling hash behind [`LinearProbeTable::hash`]. Products are taken in
/// `u128` so tables past 2^32 slots cannot overflow. `size` is at least 2.
fn home_slot(key: &str, size: usize) -> usize {
    let size = size as u128;
    let mut value = 0u128;
    let mut coefficient = u128::from(PROBE_HASH_SEED);
    for byte in key.bytes() {
        value = (u128::from(byte) + coefficient * value) % size;
        coefficient = coefficient * u128::from(PROBE_HASH_BASE) % (size - 1);
    }
    // value < size, which came from a usize.
    value as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
