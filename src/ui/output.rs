//! Build log output
//!
//! Progress lines use a fixed indentation ladder that build platforms and
//! tests match on:
//!
//! ```text
//! <title>
//!   <process>
//!     <subprocess>
//!       <action>
//! ```

use super::context::UiContext;
use crate::report;
use crate::resolve::ResolvedRequest;
use console::style;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory sink, mainly for tests
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn write_line(&self, line: &str) {
        let mut bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
    }
}

#[derive(Debug, Clone)]
enum Sink {
    Stdout,
    Buffer(OutputBuffer),
}

/// Writes user-facing build progress
#[derive(Debug, Clone)]
pub struct Emitter {
    sink: Sink,
    ctx: UiContext,
}

impl Emitter {
    /// Emit to stdout
    pub fn stdout(ctx: UiContext) -> Self {
        Self {
            sink: Sink::Stdout,
            ctx,
        }
    }

    /// Emit into a buffer that can be inspected afterwards
    pub fn buffered() -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::default();
        let emitter = Self {
            sink: Sink::Buffer(buffer.clone()),
            ctx: UiContext::non_interactive(),
        };
        (emitter, buffer)
    }

    pub fn context(&self) -> &UiContext {
        &self.ctx
    }

    fn line(&self, line: &str) {
        match &self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", line).ok();
            }
            Sink::Buffer(buffer) => buffer.write_line(line),
        }
    }

    /// `<name> <version>` banner
    pub fn title(&self, name: &str, version: &str) {
        let text = format!("{} {}", name, version);
        if self.ctx.use_fancy_output() {
            self.line(&style(text).bold().to_string());
        } else {
            self.line(&text);
        }
    }

    pub fn process(&self, message: &str) {
        self.line(&format!("  {}", message));
    }

    pub fn subprocess(&self, message: &str) {
        self.line(&format!("    {}", message));
    }

    pub fn action(&self, message: &str) {
        self.line(&format!("      {}", message));
    }

    pub fn break_line(&self) {
        self.line("");
    }

    /// Candidate list at subprocess depth, followed by a blank line
    pub fn candidates(&self, request: &ResolvedRequest) {
        self.subprocess(report::CANDIDATES_HEADER);
        for line in report::candidate_lines(request) {
            self.action(&line);
        }
        self.break_line();
    }

    /// Selected version line, followed by a blank line
    pub fn selected(&self, display_name: &str, request: &ResolvedRequest, version: &str) {
        self.subprocess(&report::selected_line(display_name, request, version));
        self.break_line();
    }

    /// `Completed in 1.234s`
    pub fn completed_in(&self, elapsed: Duration) {
        self.action(&format!("Completed in {:.3}s", elapsed.as_secs_f64()));
    }
}
