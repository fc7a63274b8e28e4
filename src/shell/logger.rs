//! shell::logger
//!
//! Job-facing log lines emitted by a [`Shell`](super::Shell).
//!
//! These messages are part of the job output (they tell the reader of a
//! build log what the agent is doing), separate from the diagnostic
//! `tracing` events the library emits.

use std::io::Write;

use super::output::OutputSink;

/// Receives commentary, warnings, and errors about a shell's activity.
pub trait ShellLogger: Send + Sync {
    /// Informational commentary.
    fn commentary(&self, message: &str);

    /// Something went wrong but execution continues.
    fn warning(&self, message: &str);

    /// Something failed.
    fn error(&self, message: &str);
}

/// Forwards to `tracing` events. The default logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ShellLogger for TracingLogger {
    fn commentary(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardLogger;

impl ShellLogger for DiscardLogger {
    fn commentary(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

const GREY: &str = "\x1b[90m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Writes build-log style lines into an output sink.
///
/// ```text
/// # Cloning into /builds/agent
/// ⚠️ Warning: ssh does not support -G
/// 🚨 Error: checkout failed
/// ```
#[derive(Debug, Clone)]
pub struct WriterLogger {
    out: OutputSink,
    ansi: bool,
}

impl WriterLogger {
    pub fn new(out: OutputSink, ansi: bool) -> Self {
        Self { out, ansi }
    }

    fn line(&self, colour: &str, text: &str) {
        let mut out = self.out.clone();
        let result = if self.ansi {
            writeln!(out, "{colour}{text}{RESET}")
        } else {
            writeln!(out, "{text}")
        };
        if let Err(e) = result {
            tracing::debug!(error = %e, "failed to write log line");
        }
    }
}

impl ShellLogger for WriterLogger {
    fn commentary(&self, message: &str) {
        self.line(GREY, &format!("# {message}"));
    }

    fn warning(&self, message: &str) {
        self.line(YELLOW, &format!("⚠️ Warning: {message}"));
    }

    fn error(&self, message: &str) {
        self.line(RED, &format!("🚨 Error: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::output::CaptureBuffer;

    #[test]
    fn writer_logger_plain() {
        let capture = CaptureBuffer::new();
        let logger = WriterLogger::new(OutputSink::new(capture.clone()), false);
        logger.commentary("Cloning");
        logger.warning("careful");
        logger.error("broken");
        assert_eq!(
            capture.contents_string(),
            "# Cloning\n⚠️ Warning: careful\n🚨 Error: broken\n"
        );
    }

    #[test]
    fn writer_logger_ansi_wraps_lines() {
        let capture = CaptureBuffer::new();
        let logger = WriterLogger::new(OutputSink::new(capture.clone()), true);
        logger.commentary("hi");
        assert_eq!(capture.contents_string(), "\x1b[90m# hi\x1b[0m\n");
    }
}
