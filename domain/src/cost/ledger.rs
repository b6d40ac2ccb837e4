//! Cost ledger
//!
//! Tracks outstanding reservations and realized spend against an optional
//! cap. The ledger knows nothing about protocols: callers reserve a
//! worst-case estimate before dispatching a phase and reconcile the real
//! cost afterwards.

use serde::{Deserialize, Serialize};

/// Running total of reserved and realized cost for one session
///
/// Realized cost never decreases. A reservation is refused when the
/// projected total (realized + outstanding reservations + the new estimate)
/// would exceed the cap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLedger {
    cap: Option<f64>,
    reserved: f64,
    realized: f64,
}

impl CostLedger {
    pub fn new(cap: Option<f64>) -> Self {
        Self {
            cap,
            reserved: 0.0,
            realized: 0.0,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn cap(&self) -> Option<f64> {
        self.cap
    }

    /// Estimates reserved but not yet reconciled
    pub fn reserved(&self) -> f64 {
        self.reserved
    }

    pub fn realized(&self) -> f64 {
        self.realized
    }

    /// Realized spend plus outstanding reservations
    pub fn projected(&self) -> f64 {
        self.realized + self.reserved
    }

    /// Cap minus projected spend, if capped
    pub fn headroom(&self) -> Option<f64> {
        self.cap.map(|cap| (cap - self.projected()).max(0.0))
    }

    /// Reserve budget for a phase.
    ///
    /// Returns `false` (reserving nothing) if the estimate would push the
    /// projected total over the cap. Without a cap this always succeeds.
    pub fn reserve(&mut self, estimate: f64) -> bool {
        let estimate = estimate.max(0.0);
        if let Some(cap) = self.cap
            && self.projected() + estimate > cap
        {
            return false;
        }
        self.reserved += estimate;
        true
    }

    /// Replace a reservation with the actual spend of the phase.
    ///
    /// The outstanding reservation never drops below zero and negative
    /// actuals are ignored, so realized cost only grows.
    pub fn reconcile(&mut self, estimate: f64, actual: f64) {
        self.reserved = (self.reserved - estimate.max(0.0)).max(0.0);
        self.realized += actual.max(0.0);
    }

    /// True once realized spend alone has reached the cap
    pub fn is_exhausted(&self) -> bool {
        self.cap.is_some_and(|cap| self.realized >= cap)
    }
}
