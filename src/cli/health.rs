use anyhow::Result;
use serde::Serialize;

use super::{AppContext, OutputConfig};
use crate::http::Gateway;
use crate::render;

#[derive(Serialize)]
struct HealthOutput {
    gateway: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// An unreachable gateway is reported, not treated as a command failure.
pub async fn run(ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let result = ctx.gateway.health().await;
    if let Err(err) = &result {
        tracing::debug!(error = %err, "health probe failed");
    }

    if output.json {
        let json_output = match &result {
            Ok(h) => HealthOutput {
                gateway: ctx.gateway.base_url().to_string(),
                status: h.status.clone(),
                error: None,
            },
            Err(err) => HealthOutput {
                gateway: ctx.gateway.base_url().to_string(),
                status: "unreachable".to_string(),
                error: Some(err.to_string()),
            },
        };
        super::print_json(&json_output)?;
    } else if !output.quiet {
        println!("{}", render::health(result.as_ref().ok(), &ctx.theme.palette()));
        if output.verbose {
            println!("  Gateway: {}", ctx.gateway.base_url());
        }
    }

    Ok(())
}
