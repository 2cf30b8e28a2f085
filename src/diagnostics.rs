//! Bounded diagnostic record log.
//!
//! Every fault that degrades to a no-op leaves a record here in addition
//! to its tracing line, so a session can be inspected after the fact
//! without scraping log output.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Records kept before the oldest ones are dropped.
pub const DIAGNOSTIC_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    pub timestamp: DateTime<Local>,
    pub module: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct DiagnosticLog {
    records: VecDeque<DiagnosticRecord>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module: &'static str, message: impl Into<String>) {
        if self.records.len() == DIAGNOSTIC_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(DiagnosticRecord {
            timestamp: Local::now(),
            module,
            message: message.into(),
        });
    }

    pub fn records(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
