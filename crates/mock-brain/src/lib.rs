//! Mock brain implementations for testing.
//!
//! These brains implement [`brain_core::Brain`] without any network I/O:
//!
//! - [`ScriptedBrain`] - replies from a fixed script, recording every call
//! - [`EchoBrain`] - echoes the user message back, optionally prefixed
//! - [`FailingBrain`] - always fails, for exercising error paths

mod echo;
mod failing;
mod scripted;

pub use echo::EchoBrain;
pub use failing::FailingBrain;
pub use scripted::{CompletionCall, ScriptedBrain};
