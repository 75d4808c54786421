// SPDX-License-Identifier: MIT

//! The captured-output sink an [`crate::execution::ExecutionRecord`]
//! streams stdout/stderr lines to.
//!
//! Failures to write are logged locally and never fail the task --
//! [`LogSink::write_line`] has no `Result` to propagate for that reason;
//! a sink that can fail (e.g. a file sink) should swallow and log its
//! own errors.

use async_trait::async_trait;
use cronmesh_core::task::SchedulerKey;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write_line(&self, scheduler_key: &SchedulerKey, stream: StreamKind, line: &str);
}

/// Default sink: forwards lines to `tracing` rather than persisting them
/// durably.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

#[async_trait]
impl LogSink for TracingLogSink {
    async fn write_line(&self, scheduler_key: &SchedulerKey, stream: StreamKind, line: &str) {
        match stream {
            StreamKind::Stdout => tracing::info!(scheduler_key = %scheduler_key, stream = "stdout", "{line}"),
            StreamKind::Stderr => tracing::warn!(scheduler_key = %scheduler_key, stream = "stderr", "{line}"),
        }
    }
}

/// Bounded capture of the most recent output lines, reported on
/// `task_finished` as `output_tail`.
pub struct TailBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl TailBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self { lines: VecDeque::with_capacity(max_lines), max_lines: max_lines.max(1) }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
