//! SparseSet generational handle tests.
//!
//! These tests verify correct behavior of the generational SparseSet,
//! including generation counter increments, stale handle rejection,
//! and slot reuse.

use vantage_core::alloc::sparse_set::{IndexSlot, SparseSet};

#[test]
fn test_push_and_get() {
    let mut set = SparseSet::new();

    let idx = set.push(42);
    assert_eq!(set.get(idx), Some(&42));

    let idx2 = set.push(100);
    assert_eq!(set.get(idx2), Some(&100));

    // Original value should still be accessible
    assert_eq!(set.get(idx), Some(&42));
}

#[test]
fn test_get_mut() {
    let mut set = SparseSet::new();
    let idx = set.push(String::from("axis"));

    set.get_mut(idx).unwrap().push_str("-x");

    assert_eq!(set.get(idx).map(String::as_str), Some("axis-x"));
}

#[test]
fn test_get_after_remove_returns_none() {
    let mut set = SparseSet::new();
    let idx = set.push(1.5_f64);

    assert_eq!(set.remove(idx), Some(1.5));
    assert!(set.get(idx).is_none());
    assert!(set.get_mut(idx).is_none());
    assert!(!set.contains(idx));
}

#[test]
fn test_multiple_generation_increments() {
    let mut set = SparseSet::new();
    let mut idx = set.push(0u32);

    for round in 1..=5u32 {
        set.remove(idx);
        idx = set.push(round);
        assert_eq!(idx.index(), 0);
        assert_eq!(idx.generation(), round);
    }

    assert_eq!(set.get(IndexSlot::new(4, 0)), None);
    assert_eq!(set.get(idx), Some(&5));
}

#[test]
fn test_iteration_with_removed_elements() {
    let mut set = SparseSet::new();
    let handles: Vec<_> = (0..10).map(|i| set.push(i)).collect();

    for handle in handles.iter().step_by(2) {
        set.remove(*handle);
    }

    let remaining: Vec<_> = set.iter().map(|(_, value)| *value).collect();
    assert_eq!(remaining, vec![1, 3, 5, 7, 9]);

    for (handle, value) in set.iter() {
        assert_eq!(set.get(handle), Some(value));
    }
}

#[test]
fn test_clone_is_independent() {
    let mut set = SparseSet::new();
    let idx = set.push(7);

    let mut copy = set.clone();
    *copy.get_mut(idx).unwrap() = 8;

    assert_eq!(set.get(idx), Some(&7));
    assert_eq!(copy.get(idx), Some(&8));
}
