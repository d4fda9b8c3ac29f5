//! Spinner for long-running steps, silent in CI

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A spinner shown only in interactive terminals
pub struct TaskSpinner {
    bar: Option<ProgressBar>,
}

impl TaskSpinner {
    /// Start a spinner with `message`; a no-op when not interactive
    pub fn start(ctx: &UiContext, message: &str) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("      {spinner:.cyan} {msg}")
            {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        Self { bar }
    }

    /// Remove the spinner from the terminal
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
