//! Audit log collaborator
//!
//! State machines report every transition and balance update through the
//! [`AuditLog`] trait. Two implementations are provided:
//!
//! - [`TracingAuditLog`] forwards lines to `tracing`; the installed
//!   subscriber adds the timestamp and level.
//! - [`MemoryAuditLog`] keeps entries in memory, for tests and for callers
//!   that want to inspect the trail themselves.
//!
//! [`default_audit_log`] hands out one process-wide `TracingAuditLog`,
//! created on first use and shared by every machine built without an
//! explicit log.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// Severity of an audit line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Debug,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditLevel::Info => f.write_str("info"),
            AuditLevel::Debug => f.write_str("debug"),
        }
    }
}

/// Sink for human-readable audit lines
pub trait AuditLog: Send + Sync {
    /// Record one line at the given level
    fn log(&self, level: AuditLevel, message: &str);

    /// Record an info line
    fn info(&self, message: &str) {
        self.log(AuditLevel::Info, message);
    }

    /// Record a debug line
    fn debug(&self, message: &str) {
        self.log(AuditLevel::Debug, message);
    }
}

/// Audit log backed by `tracing` events on the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn log(&self, level: AuditLevel, message: &str) {
        match level {
            AuditLevel::Info => tracing::info!(target: "audit", "{}", message),
            AuditLevel::Debug => tracing::debug!(target: "audit", "{}", message),
        }
    }
}

/// One captured audit line
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub level: AuditLevel,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Audit log that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries recorded so far, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages of all entries at `level`, oldest first
    pub fn messages(&self, level: AuditLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }
}

impl AuditLog for MemoryAuditLog {
    fn log(&self, level: AuditLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(AuditEntry {
                level,
                timestamp: Utc::now(),
                message: message.to_string(),
            });
    }
}

static DEFAULT_AUDIT_LOG: OnceLock<Arc<TracingAuditLog>> = OnceLock::new();

/// The process-wide default audit log
///
/// Created on first call and shared for the lifetime of the process.
pub fn default_audit_log() -> Arc<dyn AuditLog> {
    DEFAULT_AUDIT_LOG
        .get_or_init(|| Arc::new(TracingAuditLog))
        .clone()
}
