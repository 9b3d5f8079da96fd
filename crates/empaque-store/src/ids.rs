// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Clock skew before 1970 collapses to 0.
#[must_use]
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Mints 24-hex-character record ids.
///
/// Hashes a process-local counter, the current time and the record name, so
/// ids are unique within a process and collisions across restarts need a
/// same-millisecond, same-name insert.
#[derive(Debug, Default)]
pub struct IdMinter {
    counter: AtomicU64,
}

impl IdMinter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mint(&self, name: &str) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(count.to_be_bytes());
        hasher.update(unix_millis().to_be_bytes());
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(24);
        for byte in &digest[..12] {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empaque_model::ProductId;

    #[test]
    fn minted_ids_are_valid_product_ids() {
        let minter = IdMinter::new();
        let id = minter.mint("Bolsa Camiseta");
        assert_eq!(id.len(), 24);
        assert!(ProductId::parse(&id).is_ok());
    }

    #[test]
    fn repeated_mints_differ_even_for_one_name() {
        let minter = IdMinter::new();
        let a = minter.mint("Bolsa");
        let b = minter.mint("Bolsa");
        assert_ne!(a, b);
    }
}
