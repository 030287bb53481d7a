mod agent;
mod config;
mod journal;

use anyhow::Result;
use tracing::info;

use agent::Agent;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load config
    let config = AppConfig::load_or_default("config.toml")?;
    info!("Loaded configuration: {:?}", config);

    // Initialize and run agent
    let mut agent = Agent::new(config).await?;
    agent.run().await?;

    Ok(())
}
