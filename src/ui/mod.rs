//! User-facing build output
//!
//! Plain, line-oriented output that stays readable in build logs, with a
//! bold title and a spinner when attached to a terminal.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{Emitter, OutputBuffer};
pub use progress::TaskSpinner;
