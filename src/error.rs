//! Error kinds for session setup and payoff resolution.

use thiserror::Error;

/// Everything that can go wrong in the lottery core.
///
/// `InvalidConfiguration` is fatal at session-setup time and aborts session
/// creation. `MissingChoice` is recoverable: the caller re-prompts for the
/// missing row and retries. `AlreadyResolved` guards a finalized
/// participant-round against late mutation; repeated *resolution* is not an
/// error (the cached outcome is returned instead).
#[derive(Debug, Error)]
pub enum LotteryError {
    /// Malformed session configuration (bad row count, unknown role, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The resolver was invoked before a choice was recorded for the row
    /// that was drawn to pay. No random draw is performed on this path.
    #[error("no choice recorded for row {row}")]
    MissingChoice { row: u32 },

    /// Attempt to mutate a participant-round after its outcome was finalized.
    #[error("participant-round is already finalized")]
    AlreadyResolved,
}
