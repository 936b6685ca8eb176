//! In-flight guard preventing overlapping exports.
//!
//! The guard is owned by the caller (the component that offers the
//! export button) and passed to [`export`](crate::export) by reference.
//! A claim is an RAII token: the flag clears when it drops, whichever
//! path the export takes.

use std::cell::Cell;

/// Tracks whether an export is currently running.
///
/// Single-threaded by construction (`Cell`), matching the cooperative
/// event loop the pipeline runs on.
#[derive(Debug, Default)]
pub struct ExportGuard {
    in_flight: Cell<bool>,
}

impl ExportGuard {
    /// A guard with no export in flight.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_flight: Cell::new(false),
        }
    }

    /// Whether an export currently holds the guard.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Claim the guard, or return `None` if an export is already running.
    #[must_use]
    pub fn try_claim(&self) -> Option<InFlight<'_>> {
        if self.in_flight.replace(true) {
            None
        } else {
            Some(InFlight { guard: self })
        }
    }
}

/// Proof that the holder owns the in-flight flag.  Dropping it clears
/// the flag.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the claim is dropped"]
pub struct InFlight<'a> {
    guard: &'a ExportGuard,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_while_first_is_held() {
        let guard = ExportGuard::new();
        let first = guard.try_claim();
        assert!(first.is_some());
        assert!(guard.is_in_flight());
        assert!(guard.try_claim().is_none());
        // A refused claim must not clear the flag.
        assert!(guard.is_in_flight());
        drop(first);
        assert!(!guard.is_in_flight());
    }

    #[test]
    fn guard_is_reusable_after_release() {
        let guard = ExportGuard::default();
        {
            let _claim = guard.try_claim();
        }
        assert!(guard.try_claim().is_some());
    }
}
