use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tokio::time::sleep;
use tracing::{error, info, warn};

use catalog::{MemoryCatalog, PgCatalog, PricingStore};
use execution_engine::PricingWorkflow;
use llm_client::{LlmClient, RemotePolicy};
use rule_engine::RulePolicy;

use crate::config::{AgentMode, AppConfig, StoreBackend};
use crate::journal::{now_iso, resolve_journal_dir, AgentJournal};

pub struct Agent {
    config: AppConfig,
    store: Arc<dyn PricingStore>,
    workflow: PricingWorkflow,
    rule_policy: RulePolicy,
    remote_policy: RemotePolicy,
    journal: AgentJournal,
}

impl Agent {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn PricingStore> = match config.store.backend {
            StoreBackend::Postgres => {
                match PgCatalog::connect(&config.store.database_url).await {
                    Ok(pg) => {
                        info!("Store backend: postgres");
                        Arc::new(pg)
                    }
                    Err(e) => {
                        warn!("Postgres unavailable ({e}); falling back to demo catalog");
                        Arc::new(MemoryCatalog::new())
                    }
                }
            }
            StoreBackend::Memory => {
                info!("Store backend: demo catalog");
                Arc::new(MemoryCatalog::new())
            }
        };

        let api_key = std::env::var("OPENROUTER_API_KEY").ok();
        if api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            warn!("OPENROUTER_API_KEY not set; remote decisions will degrade to no-ops");
        }
        let remote_policy = RemotePolicy::new(LlmClient::new(
            api_key,
            config.llm.api_base.clone(),
            config.llm.model.clone(),
            config.llm.timeout_ms,
        ));

        let rule_policy = RulePolicy::new(config.rules.clone());
        let workflow = PricingWorkflow::new(store.clone(), config.audit.capacity);

        let journal_dir = resolve_journal_dir();
        let mut journal = AgentJournal::open(journal_dir)?;
        journal.write_event(json!({
            "ts": now_iso(),
            "kind": "agent_start",
            "mode": match config.agent.mode {
                AgentMode::Rules => "rules",
                AgentMode::Remote => "remote",
            },
            "backend": match config.store.backend {
                StoreBackend::Memory => "memory",
                StoreBackend::Postgres => "postgres",
            },
            "model": config.llm.model,
            "llm_timeout_ms": config.llm.timeout_ms,
            "audit_capacity": config.audit.capacity
        }));
        info!("Journal path: {}", journal.dir().display());

        Ok(Self {
            config,
            store,
            workflow,
            rule_policy,
            remote_policy,
            journal,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Pricing agent running...");
        loop {
            if let Err(e) = self.run_cycle().await {
                error!("Cycle failed: {:?}", e);
            }
            sleep(Duration::from_millis(self.config.agent.loop_interval_ms)).await;
        }
    }

    async fn run_cycle(&mut self) -> Result<()> {
        if self.config.agent.simulate_sales {
            if let Err(e) = self.store.simulate_sales().await {
                warn!("sales simulation failed: {e}");
            }
        }

        let products = self.store.list_products().await?;
        if products.is_empty() {
            warn!("no products in the catalog; skipping cycle");
            return Ok(());
        }
        info!("Evaluating {} products", products.len());

        let applied = match self.config.agent.mode {
            AgentMode::Rules => {
                let decisions = self.workflow.analyze(&products, &self.rule_policy).await;
                self.journal.write_event(json!({
                    "ts": now_iso(),
                    "kind": "analysis_staged",
                    "decisions": decisions.len()
                }));
                self.workflow.apply().await?
            }
            AgentMode::Remote => {
                self.workflow
                    .run_immediate(&products, &self.remote_policy)
                    .await?
            }
        };

        let mutations = applied.iter().filter(|e| e.decision.success).count();
        for entry in &applied {
            self.journal.write_event(json!({
                "ts": now_iso(),
                "kind": "decision_applied",
                "product_id": entry.decision.product_id,
                "name": entry.decision.name,
                "action": entry.decision.action.as_str(),
                "magnitude": entry.decision.magnitude,
                "before_price": entry.decision.before_price,
                "after_price": entry.decision.after_price,
                "success": entry.decision.success,
                "reason": entry.decision.reason
            }));
        }

        let recent = self
            .workflow
            .audit_log(self.config.audit.query_limit)
            .await;
        self.journal.write_event(json!({
            "ts": now_iso(),
            "kind": "cycle_summary",
            "decisions": applied.len(),
            "mutations": mutations,
            "audit_entries": recent.len()
        }));
        info!(
            "Cycle complete: {} decisions, {} price mutations",
            applied.len(),
            mutations
        );
        Ok(())
    }
}
