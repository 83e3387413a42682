//! Bounded tracker of the heaviest items seen in a stream.
//!
//! Backed by a min-heap of at most K items: the lightest held item sits at
//! the root and is the only replacement candidate. Items of equal weight are
//! held in no particular order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Anything ranked by a single unsigned weight.
pub trait Weighted {
    fn weight(&self) -> u64;
}

/// Heap slot ordered by weight only.
#[derive(Debug, Clone)]
struct ByWeight<T>(T);

impl<T: Weighted> PartialEq for ByWeight<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.weight() == other.0.weight()
    }
}

impl<T: Weighted> Eq for ByWeight<T> {}

impl<T: Weighted> PartialOrd for ByWeight<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Weighted> Ord for ByWeight<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.weight().cmp(&other.0.weight())
    }
}

/// Keeps the `capacity` heaviest items offered so far.
#[derive(Debug, Clone)]
pub struct TopK<T: Weighted> {
    capacity: usize,
    heap: BinaryHeap<Reverse<ByWeight<T>>>,
}

impl<T: Weighted> TopK<T> {
    /// A tracker holding at most `capacity` items. Zero disables tracking.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Weight of the lightest held item.
    pub fn min_weight(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(slot)| slot.0.weight())
    }

    /// Whether an item of `weight` would be kept if offered now.
    ///
    /// Lets callers skip building a candidate that would be rejected.
    pub fn admits(&self, weight: u64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            return true;
        }
        self.min_weight().is_some_and(|min| weight > min)
    }

    /// Offer a candidate. Returns whether it was kept.
    ///
    /// When full, the candidate replaces the lightest held item only if it is
    /// strictly heavier.
    pub fn offer(&mut self, candidate: T) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(ByWeight(candidate)));
            return true;
        }
        if let Some(mut lightest) = self.heap.peek_mut() {
            if candidate.weight() > lightest.0 .0.weight() {
                // The heap is repaired when `lightest` drops.
                *lightest = Reverse(ByWeight(candidate));
                return true;
            }
        }
        false
    }

    /// Held items, heaviest first, without consuming the tracker.
    pub fn sorted(&self) -> Vec<&T> {
        let mut items: Vec<&T> = self.heap.iter().map(|Reverse(slot)| &slot.0).collect();
        items.sort_by_key(|item| Reverse(item.weight()));
        items
    }

    /// Held items, heaviest first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        // Ascending order of `Reverse` is descending weight.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(slot)| slot.0)
            .collect()
    }
}
