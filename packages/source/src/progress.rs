//! Progress reporting for slow pipeline stages.
//!
//! Library code reports through [`ProgressCallback`] and never touches the
//! terminal; the binary decides whether that means a spinner, log lines,
//! or nothing at all.

use std::sync::Arc;

/// Receives progress updates from long-running stages.
///
/// Implementations must be `Send + Sync` so a single reporter can be shared
/// through an `Arc` across the whole pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Replaces the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the stage complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_message(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
