//! Health command implementation.

use crate::config::Settings;
use crate::rag::RagService;
use anyhow::Result;
use std::sync::Arc;

/// Print the health report; fails when the service is unhealthy.
pub async fn run_health(settings: Settings) -> Result<()> {
    let service = RagService::new(Arc::new(settings))?;
    let report = service.health_check().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_healthy() {
        anyhow::bail!("Service is unhealthy");
    }
    Ok(())
}
