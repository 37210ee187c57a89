//! Streamed output delivery.
//!
//! Spec §9 flags the teacher's "callback with opaque context" pattern for
//! output streaming as needing re-architecture, preferring "a message-passing
//! channel: the supervisor produces output lines, consumers subscribe." This
//! module is that channel: the supervisor owns an [`OutputSender`] and pushes
//! one [`OutputLine`] per completed line (spec §4.D); the caller owns the
//! matching [`OutputReceiver`].

use tokio::sync::mpsc;

/// One line of captured output from a running task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// The name of the task that produced this line.
    pub task_name: String,
    /// `true` if this came from stderr, `false` for stdout.
    pub is_stderr: bool,
    /// The line content, with its trailing newline stripped. Lines longer
    /// than the internal bound (spec §4.D: "e.g. 64 KiB") are split into
    /// multiple [`OutputLine`]s; `continued` marks all but the first chunk
    /// of such a line.
    pub content: String,
    /// `true` if this chunk continues a line split at the internal bound.
    pub continued: bool,
}

/// The internal per-line length bound (spec §4.D).
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// The supervisor's half of the output channel.
pub type OutputSender = mpsc::UnboundedSender<OutputLine>;
/// The caller's half of the output channel.
pub type OutputReceiver = mpsc::UnboundedReceiver<OutputLine>;

/// Creates a fresh, unbounded output channel.
#[must_use]
pub fn channel() -> (OutputSender, OutputReceiver) {
    mpsc::unbounded_channel()
}
