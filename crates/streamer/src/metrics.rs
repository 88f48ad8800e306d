//! Session metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared between the scheduler and its emission task
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// Sessions started since construction
    sessions: AtomicU64,
    /// Samples generated
    ticks: AtomicU64,
    /// Envelopes delivered
    sent: AtomicU64,
    /// Send failures
    send_failures: AtomicU64,
    /// Ticks skipped because encoding failed
    encode_failures: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> u64 {
        self.sessions.load(Ordering::Relaxed)
    }

    pub fn inc_sessions(&self) {
        self.sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn inc_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn inc_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }

    pub fn inc_encode_failures(&self) {
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            sessions: self.sessions(),
            ticks: self.ticks(),
            sent: self.sent(),
            send_failures: self.send_failures(),
            encode_failures: self.encode_failures(),
        }
    }
}

/// Point-in-time copy of `SessionMetrics`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub sessions: u64,
    pub ticks: u64,
    pub sent: u64,
    pub send_failures: u64,
    pub encode_failures: u64,
}

impl std::fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sessions={} ticks={} sent={} send_failures={} encode_failures={}",
            self.sessions, self.ticks, self.sent, self.send_failures, self.encode_failures
        )
    }
}
