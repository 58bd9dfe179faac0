// crates/augur-core/src/lib.rs
//
// augur-core: Core types, identities, errors, and collaborator traits for the
// Augur scoring engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the round inputs (value bundles), the score and coefficient
// records, the typed participant identity, and the keeper traits through which
// the engine talks to the surrounding ledger.

pub mod bundle;
pub mod error;
pub mod identity;
pub mod score;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use augur_core::ValueBundle;`

// Round input types
pub use bundle::{ReputerValueBundle, ReputerValueBundles, ValueBundle, WorkerValue};

// Identity types
pub use identity::{Address, BlockHeight, TopicId, WorkerRoster};

// Score and state types
pub use score::{ListeningCoefficient, RoundWrites, Score, ScoreKind, Stake};

// Error type
pub use error::AugurError;

// Traits
pub use traits::{CoefficientStore, EmissionsKeeper, ScoreStore, StakeLedger, WorkerRegistry};
