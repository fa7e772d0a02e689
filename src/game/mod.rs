//! Reaction game built on top of the controller subsystem
//!
//! A [`Session`] owns everything that changes while playing: the score, the
//! current [`Challenge`] and the edge detector. It is driven one tick at a
//! time by its own fixed-rate loop.

pub mod challenge;
pub mod error;
pub mod score;
pub mod session;

pub use challenge::{Challenge, ChallengeGenerator};
pub use error::SessionError;
pub use score::ScoreState;
pub use session::Session;
