//! Utility modules providing cross-cutting functionality.
//!
//! Currently this covers conditional parallel processing support, so the
//! replication engine runs the same code with or without a thread pool.

pub mod parallel;
