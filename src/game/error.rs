//! Error definitions for the game session

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No gamepad in the bound slot at startup
    #[error("No controller connected in slot {0}")]
    ControllerNotConnected(usize),

    /// Writing the prompt or verdict to the terminal failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
