// crates/augur-store/src/lib.rs
//
// augur-store: Keeper implementations for the Augur scoring engine.
//
// Provides an in-memory keeper for tests and one-shot runs, and a
// RocksDB-backed keeper that persists stakes, rosters, listening coefficients
// and the append-only score tables across runs. Both commit a round's writes
// all-or-nothing.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryKeeper;
pub use rocks::RocksKeeper;
