// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use sha2::{Digest, Sha256};

/// Computes a deterministic, opaque cache key for `(cmd, env)`.
///
/// `env` is canonicalised by sorting on key before hashing so callers don't need to
/// pre-sort their environment vectors. Each field is length-prefixed with a 4-byte
/// little-endian length before its bytes, preventing ambiguous concatenation (e.g.
/// `("ab", "c")` vs. `("a", "bc")` hashing to the same digest).
pub fn compute_key(cmd: &str, env: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = env.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    hash_field(&mut hasher, cmd.as_bytes());
    for (key, value) in sorted {
        hash_field(&mut hasher, key.as_bytes());
        hash_field(&mut hasher, value.as_bytes());
    }

    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u32).to_le_bytes());
    hasher.update(bytes);
}
