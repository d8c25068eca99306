//! Runtime counters, tracing span names and subscriber setup.
//!
//! Every turn emits `tracing` events; this module adds lock-free counters a
//! host can snapshot for debug overlays, and a one-call subscriber install
//! driven by [`LoggingConfig`].

use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

// ---------------------------------------------------------------------------
// Counters (lock-free)
// ---------------------------------------------------------------------------

/// Atomic counters for conversation events.
#[derive(Debug)]
pub struct ConversationCounters {
    /// Sessions started.
    pub sessions_started: AtomicU64,
    /// Sessions ended.
    pub sessions_ended: AtomicU64,
    /// LISTEN actions taken.
    pub listens: AtomicU64,
    /// SPEAK actions accepted.
    pub speaks: AtomicU64,
    /// SPEAK selections rejected.
    pub rejections: AtomicU64,
    /// Cards drawn into hands.
    pub cards_drawn: AtomicU64,
}

impl ConversationCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sessions_started: AtomicU64::new(0),
            sessions_ended: AtomicU64::new(0),
            listens: AtomicU64::new(0),
            speaks: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            cards_drawn: AtomicU64::new(0),
        }
    }

    /// Add `n` to a counter.
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_ended: self.sessions_ended.load(Ordering::Relaxed),
            listens: self.listens.load(Ordering::Relaxed),
            speaks: self.speaks.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            cards_drawn: self.cards_drawn.load(Ordering::Relaxed),
        }
    }
}

impl Default for ConversationCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Sessions started.
    pub sessions_started: u64,
    /// Sessions ended.
    pub sessions_ended: u64,
    /// LISTEN actions taken.
    pub listens: u64,
    /// SPEAK actions accepted.
    pub speaks: u64,
    /// SPEAK selections rejected.
    pub rejections: u64,
    /// Cards drawn into hands.
    pub cards_drawn: u64,
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::span!`.
pub mod spans {
    /// Session start.
    pub const SESSION_START: &str = "colloquy::session::start";
    /// Session end.
    pub const SESSION_END: &str = "colloquy::session::end";
    /// LISTEN action.
    pub const LISTEN: &str = "colloquy::listen";
    /// SPEAK action.
    pub const SPEAK: &str = "colloquy::speak";
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// Install a global `fmt` subscriber filtered at the configured level.
///
/// `RUST_LOG` wins over the configured level when set. Returns `false` when a
/// global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let counters = ConversationCounters::new();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
        ConversationCounters::add(&counters.listens, 2);
        ConversationCounters::add(&counters.cards_drawn, 5);
        let snap = counters.snapshot();
        assert_eq!(snap.listens, 2);
        assert_eq!(snap.cards_drawn, 5);
        assert_eq!(snap.speaks, 0);
    }

    #[test]
    fn second_init_is_a_noop() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn span_names_are_namespaced() {
        for name in [spans::SESSION_START, spans::SESSION_END, spans::LISTEN, spans::SPEAK] {
            assert!(name.starts_with("colloquy::"));
        }
    }
}
