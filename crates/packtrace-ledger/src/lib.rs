//! Append-only change ledger for Packtrace.

mod ledger;

pub use ledger::{ChangeLedger, LedgerError, LedgerSnapshot};
