//! The process supervisor (spec §2 component D, §4.D): spawns a task's
//! command in its own process group, streams its output line-by-line,
//! enforces timeouts/cancellation/best-effort resource ceilings, and
//! reports a structured result. See [`run`] for the entry point.

mod cancellation;
mod error;
mod limits;
mod output;
mod result;
mod spec;
mod stream;
mod supervisor;

pub use cancellation::CancellationHandle;
pub use error::{Error, Result};
pub use output::{channel, OutputLine, OutputReceiver, OutputSender, MAX_LINE_BYTES};
pub use result::{ProcessResult, ResourceEnforcement};
pub use spec::ProcessSpec;
pub use supervisor::run;
