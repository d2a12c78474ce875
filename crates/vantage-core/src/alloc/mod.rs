//! Allocation and collection types shared by the Vantage crates.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - SparseSet arena with generational handles

pub mod sparse_set;

pub use sparse_set::{IndexSlot, SparseSet};

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("key", "value");
        assert_eq!(map.get("key"), Some(&"value"));
    }
}
