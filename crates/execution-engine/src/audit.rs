//! Audit log: a capped in-memory ring, mirrored to durable storage when
//! one is backing the agent.
//!
//! Every applied decision is recorded into the ring regardless of
//! backend, so the read path always has something to fall back to when
//! the durable read fails.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use catalog::PricingStore;
use common::AuditLogEntry;

/// Default ring capacity.
pub const DEFAULT_CAPACITY: usize = 80;
/// Query limits are clamped to [1, MAX_QUERY_LIMIT].
pub const MAX_QUERY_LIMIT: usize = 100;

pub struct AuditLog {
    store: Arc<dyn PricingStore>,
    ring: VecDeque<AuditLogEntry>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(store: Arc<dyn PricingStore>, capacity: usize) -> Self {
        Self {
            store,
            ring: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Prepend an entry, evicting the oldest once past capacity.
    pub fn record(&mut self, entry: AuditLogEntry) {
        self.ring.push_front(entry);
        self.ring.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Most recent entries, newest first. Prefers the durable store and
    /// falls back to the ring on any read failure.
    pub async fn query(&self, limit: usize) -> Vec<AuditLogEntry> {
        let limit = limit.clamp(1, MAX_QUERY_LIMIT);
        match self.store.recent_logs(limit).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("durable audit read failed, serving in-memory log: {e}");
                self.ring.iter().take(limit).cloned().collect()
            }
        }
    }
}
