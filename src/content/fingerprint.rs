//! SimHash fingerprints and the near-duplicate index

use sha2::{Digest, Sha256};
use std::collections::HashMap;

const BITS: u32 = 64;

/// 64-bit SimHash of a token multiset
///
/// Similar documents produce fingerprints with a small Hamming distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Computes the fingerprint, weighting each distinct token by its number of occurrences
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut weights: HashMap<&str, i64> = HashMap::new();
        for token in tokens {
            *weights.entry(token.as_ref()).or_insert(0) += 1;
        }

        let mut votes = [0i64; BITS as usize];
        for (token, weight) in weights {
            let hash = token_hash(token);
            for (bit, vote) in votes.iter_mut().enumerate() {
                if hash & (1 << bit) != 0 {
                    *vote += weight;
                } else {
                    *vote -= weight;
                }
            }
        }

        let value = votes
            .iter()
            .enumerate()
            .filter(|(_, vote)| **vote > 0)
            .fold(0u64, |acc, (bit, _)| acc | (1 << bit));
        Fingerprint(value)
    }

    /// Number of differing bits
    pub fn hamming_distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Append-only index answering "is anything within distance k of this fingerprint"
///
/// The 64 bits are cut into `k + 1` blocks. Two fingerprints within distance `k` agree
/// exactly on at least one block, so each entry is bucketed once per block and a query
/// only compares against entries sharing a block value.
#[derive(Debug, Clone)]
pub struct NearDuplicateIndex {
    max_distance: u32,
    blocks: Vec<(u32, u64)>,
    entries: Vec<(String, Fingerprint)>,
    keys: HashMap<String, usize>,
    buckets: HashMap<(usize, u64), Vec<usize>>,
}

impl NearDuplicateIndex {
    /// Creates an empty index; `max_distance` is clamped to 63
    pub fn new(max_distance: u32) -> Self {
        let max_distance = max_distance.min(BITS - 1);
        let block_count = max_distance + 1;
        let width = BITS / block_count;

        let blocks = (0..block_count)
            .map(|i| {
                let offset = i * width;
                let bits = if i == block_count - 1 {
                    BITS - offset
                } else {
                    width
                };
                let mask = if bits >= BITS {
                    u64::MAX
                } else {
                    (1u64 << bits) - 1
                };
                (offset, mask)
            })
            .collect();

        Self {
            max_distance,
            blocks,
            entries: Vec::new(),
            keys: HashMap::new(),
            buckets: HashMap::new(),
        }
    }

    /// Rebuilds an index from persisted `(page_key, fingerprint)` pairs
    pub fn from_entries<I>(max_distance: u32, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Fingerprint)>,
    {
        let mut index = Self::new(max_distance);
        for (key, fingerprint) in entries {
            index.insert(key, fingerprint);
        }
        index
    }

    fn bucket_keys(&self, fingerprint: Fingerprint) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .map(move |(i, &(offset, mask))| (i, (fingerprint.0 >> offset) & mask))
    }

    /// Returns the page key of an indexed entry within the distance threshold, if any
    pub fn find_near(&self, fingerprint: Fingerprint) -> Option<&str> {
        self.bucket_keys(fingerprint)
            .filter_map(|key| self.buckets.get(&key))
            .flatten()
            .map(|&slot| &self.entries[slot])
            .find(|(_, existing)| existing.hamming_distance(&fingerprint) <= self.max_distance)
            .map(|(key, _)| key.as_str())
    }

    /// Adds an entry; returns false if the page key is already indexed
    pub fn insert(&mut self, page_key: String, fingerprint: Fingerprint) -> bool {
        if self.keys.contains_key(&page_key) {
            return false;
        }

        let slot = self.entries.len();
        let bucket_keys: Vec<(usize, u64)> = self.bucket_keys(fingerprint).collect();
        for key in bucket_keys {
            self.buckets.entry(key).or_default().push(slot);
        }
        self.keys.insert(page_key.clone(), slot);
        self.entries.push((page_key, fingerprint));
        true
    }

    pub fn contains(&self, page_key: &str) -> bool {
        self.keys.contains_key(page_key)
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
