//! Subcommand modules for the `subplace` binary.

pub mod closest;
pub mod map;
pub mod place;
pub mod subtree;
pub mod tokens;
