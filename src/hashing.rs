//! Deterministic hashing used to derive random number streams.
//!
//! Seeds must not depend on the process (the standard library hasher is randomly keyed), so
//! every stream seed is derived with `xxh3` from the base seed, the stream's name and, for the
//! per-tick streams, the day and agent index.

use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// A convenience method to compute the hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Hashes a `(day, index)` pair under the given stream seed.
pub fn hash_stream_key(stream_seed: u64, day: u64, index: u64) -> u64 {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&day.to_le_bytes());
    key[8..].copy_from_slice(&index.to_le_bytes());
    xxh3_64_with_seed(&key, stream_seed)
}
