//! Source-control change to affected-member detection (spec §2 component G,
//! §4.G): from a base revision, computes which workspace members changed,
//! then expands that set to every member that transitively depends on one of
//! them.

mod detect;
mod error;
mod expand;

pub use detect::{detect, AffectedSet};
pub use error::{Error, Result};
pub use expand::expand_with_dependents;
