//! Budget gate for a session's spend

pub mod ledger;

pub use ledger::CostLedger;
