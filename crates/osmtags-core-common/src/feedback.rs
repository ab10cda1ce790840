//! Write-only channel for reporting progress and errors to the caller.

use log::{error, info, warn};

/// Receives error and info reports from a running operation.
///
/// A fatal report means the operation stopped without touching the layer.
/// Non-fatal reports concern a single feature and the operation carries on.
pub trait Feedback {
    /// Report an error.
    fn report_error(&mut self, message: &str, fatal: bool);

    /// Report an informational message.
    fn push_info(&mut self, message: &str);
}

/// Forwards every report to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn report_error(&mut self, message: &str, fatal: bool) {
        if fatal {
            error!("{message}");
        } else {
            warn!("{message}");
        }
    }

    fn push_info(&mut self, message: &str) {
        info!("{message}");
    }
}

/// One recorded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEntry {
    Error { message: String, fatal: bool },
    Info(String),
}

/// Records every report in order and also logs it.
#[derive(Debug, Default, Clone)]
pub struct CollectingFeedback {
    entries: Vec<FeedbackEntry>,
}

impl CollectingFeedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in the order they were reported.
    #[must_use]
    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    /// Messages of all error reports.
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                FeedbackEntry::Error { message, .. } => Some(message.as_str()),
                FeedbackEntry::Info(_) => None,
            })
            .collect()
    }

    /// Returns `true` if any fatal error was reported.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, FeedbackEntry::Error { fatal: true, .. }))
    }
}

impl Feedback for CollectingFeedback {
    fn report_error(&mut self, message: &str, fatal: bool) {
        LogFeedback.report_error(message, fatal);
        self.entries.push(FeedbackEntry::Error {
            message: message.to_string(),
            fatal,
        });
    }

    fn push_info(&mut self, message: &str) {
        LogFeedback.push_info(message);
        self.entries.push(FeedbackEntry::Info(message.to_string()));
    }
}
