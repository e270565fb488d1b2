//! Local staging of fetched objects

mod scratch;

pub use scratch::{ScratchArea, StagedFile};
