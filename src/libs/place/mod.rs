//! Placement on local subtrees of a backbone tree.
//!
//! For each query: find the closest reference taxa, extract a bounded
//! subtree around them, hand it to a placement engine and map the engine's
//! subtree-local placement back onto the backbone.

pub mod assembler;
pub mod backbone;
pub mod context;
pub mod engine;
pub mod error;
pub mod extract;
pub mod frontier;
pub mod jplace;
pub mod mapper;
pub mod pipeline;

pub use assembler::Assembler;
pub use backbone::Backbone;
pub use context::RunContext;
pub use engine::{EngineError, EngineJob, PlacementEngine, PplacerEngine};
pub use error::{PlaceError, Stage};
pub use extract::{Subtree, SubtreeKind};
pub use jplace::{JplaceDocument, Placement, PlacementRecord};
pub use pipeline::{PlaceOptions, Pipeline};
