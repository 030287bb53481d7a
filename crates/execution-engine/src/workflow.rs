//! The two-phase pricing workflow.
//!
//! `analyze` stages decisions without touching product state; `apply`
//! commits the staged batch and records it in the audit log. The
//! immediate variant collapses both phases for the remote policy. The
//! workflow serializes access by ownership: all mutating calls take
//! `&mut self`, so a single driver task cannot interleave them.

use std::sync::Arc;

use tracing::{debug, info};

use catalog::{PricingStore, StoreError};
use common::{AuditLogEntry, Decision, MarketSignal, Product};
use llm_client::RemotePolicy;
use rule_engine::RulePolicy;
use signal_engine::{authoritative_signal, fallback_signal};

use crate::audit::AuditLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing staged.
    Idle,
    /// An analyze run is staged and waiting for apply.
    Analyzed,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("no pending decisions to apply")]
    NoPendingDecisions,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct PricingWorkflow {
    store: Arc<dyn PricingStore>,
    audit: AuditLog,
    pending: Vec<Decision>,
}

impl PricingWorkflow {
    pub fn new(store: Arc<dyn PricingStore>, audit_capacity: usize) -> Self {
        Self {
            audit: AuditLog::new(store.clone(), audit_capacity),
            store,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        if self.pending.is_empty() {
            WorkflowState::Idle
        } else {
            WorkflowState::Analyzed
        }
    }

    pub fn pending(&self) -> &[Decision] {
        &self.pending
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Signals for one product: authoritative sales history when the
    /// store has it, the deterministic fallback otherwise.
    async fn signal_for(&self, product: &Product) -> MarketSignal {
        match self.store.sum_quantity(product.id).await {
            Ok(total) => authoritative_signal(product, total),
            Err(e) => {
                debug!("sales history lookup failed for product {}: {e}", product.id);
                fallback_signal(product)
            }
        }
    }

    /// Run the rule policy across `products` and stage the result.
    ///
    /// Replaces any previously staged set; product state is not touched.
    pub async fn analyze(&mut self, products: &[Product], policy: &RulePolicy) -> Vec<Decision> {
        let mut decisions = Vec::with_capacity(products.len());
        for product in products {
            let signal = self.signal_for(product).await;
            decisions.push(policy.decide(product, &signal));
        }

        if !self.pending.is_empty() {
            debug!("discarding {} unapplied decisions", self.pending.len());
        }
        self.pending = decisions.clone();
        info!("analysis staged {} decisions", decisions.len());
        decisions
    }

    /// Commit the staged batch: write prices, finalize success flags,
    /// record audit entries, clear the pending set.
    ///
    /// On a store failure the pending set is left intact so the caller
    /// may retry.
    pub async fn apply(&mut self) -> Result<Vec<AuditLogEntry>, WorkflowError> {
        if self.pending.is_empty() {
            return Err(WorkflowError::NoPendingDecisions);
        }

        let entries: Vec<AuditLogEntry> = self
            .pending
            .iter()
            .cloned()
            .map(|decision| AuditLogEntry::new(decision.finalized()))
            .collect();

        self.store.apply_price_changes(&entries).await?;

        for entry in &entries {
            self.audit.record(entry.clone());
        }
        self.pending.clear();
        info!("applied {} pricing decisions", entries.len());
        Ok(entries)
    }

    /// The collapsed variant: remote policy decisions applied per
    /// product as they arrive, with no staging. All decisions — no-ops
    /// included — are recorded.
    pub async fn run_immediate(
        &mut self,
        products: &[Product],
        policy: &RemotePolicy,
    ) -> Result<Vec<AuditLogEntry>, WorkflowError> {
        let mut applied = Vec::with_capacity(products.len());
        for product in products {
            let signal = self.signal_for(product).await;
            let decision = policy.decide(product, &signal).await.finalized();

            if decision.success {
                self.store
                    .update_price(product.id, decision.after_price)
                    .await?;
            }

            let entry = AuditLogEntry::new(decision);
            self.store.insert_log(&entry).await?;
            self.audit.record(entry.clone());
            applied.push(entry);
        }
        info!("immediate run recorded {} decisions", applied.len());
        Ok(applied)
    }

    /// Most recent audit entries, newest first.
    pub async fn audit_log(&self, limit: usize) -> Vec<AuditLogEntry> {
        self.audit.query(limit).await
    }
}
