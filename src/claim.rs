//! Shared claim state over the package set.
//!
//! Every ULD task reads and claims packages through one `ClaimBoard`. Each
//! package owns a single atomic slot holding the index of the ULD that
//! claimed it, and claiming is one compare-and-swap, so two ULDs can never
//! both win the same package.

use std::sync::atomic::{AtomicUsize, Ordering};

const UNCLAIMED: usize = usize::MAX;

/// Atomic claim slots, one per package in prioritized order.
#[derive(Debug)]
pub struct ClaimBoard {
    slots: Vec<AtomicUsize>,
}

impl ClaimBoard {
    /// Creates a board with `len` unclaimed slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicUsize::new(UNCLAIMED)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks whether some ULD already holds the package.
    ///
    /// Only a hint for skipping work; the authoritative check is `try_claim`.
    #[inline]
    pub fn is_claimed(&self, package: usize) -> bool {
        self.slots[package].load(Ordering::Acquire) != UNCLAIMED
    }

    /// Claims `package` for `uld`.
    ///
    /// Returns `true` if this call performed the claim and `false` if the
    /// package was already held, including by the same ULD.
    #[inline]
    pub fn try_claim(&self, package: usize, uld: usize) -> bool {
        debug_assert_ne!(uld, UNCLAIMED);
        self.slots[package]
            .compare_exchange(UNCLAIMED, uld, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns the index of the ULD holding `package`, if any.
    pub fn owner(&self, package: usize) -> Option<usize> {
        match self.slots[package].load(Ordering::Acquire) {
            UNCLAIMED => None,
            uld => Some(uld),
        }
    }

    /// Number of claimed packages.
    pub fn claimed_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_claimed(i)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn claim_succeeds_once() {
        let board = ClaimBoard::new(2);
        assert!(!board.is_claimed(0));
        assert!(board.try_claim(0, 3));
        assert!(!board.try_claim(0, 4));
        assert!(!board.try_claim(0, 3));
        assert_eq!(board.owner(0), Some(3));
        assert_eq!(board.owner(1), None);
        assert_eq!(board.claimed_count(), 1);
    }

    #[test]
    fn concurrent_claims_have_single_winner() {
        let board = ClaimBoard::new(64);

        let wins: Vec<usize> = (0..16usize)
            .into_par_iter()
            .map(|uld| (0..board.len()).filter(|&pkg| board.try_claim(pkg, uld)).count())
            .collect();

        assert_eq!(wins.iter().sum::<usize>(), 64);
        assert_eq!(board.claimed_count(), 64);
    }
}
