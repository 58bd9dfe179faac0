// crates/augur-cli/src/commands/mod.rs
//
// Command module declarations for the augur CLI.

pub mod coefficient;
pub mod score;
pub mod scores;
