//! Derived attendance statistics (read-only views over the ledger).

pub mod summary;
