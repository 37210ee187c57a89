//! Shared data model and error handling for the `zr` task runner.
//!
//! This crate has no knowledge of DAG construction, caching, process
//! supervision, or scheduling — it only defines the value types every other
//! crate in the workspace builds on top of: [`Configuration`] and its nested
//! types, the crate-wide [`Error`], environment merging, condition expression
//! evaluation, and the platform tag used by the fingerprinter.

pub mod condition;
pub mod env;
mod error;
mod model;
pub mod platform;

pub use error::{Error, Result};
pub use model::{
    CachePolicy, Configuration, Member, Profile, ResourceLimits, Stage, Task, Workflow, Workspace,
};
