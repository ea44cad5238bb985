use anyhow::Result;
use clap::Args;

use super::{AppContext, OutputConfig};
use crate::render;

#[derive(Args)]
pub struct DigestArgs {
    /// Repository path on the gateway host (defaults to the configured path)
    path: Option<String>,

    /// Days to look back; empty, negative or non-numeric values mean 30
    #[arg(long, short = 'd', allow_hyphen_values = true)]
    days: Option<String>,
}

pub async fn run(args: DigestArgs, ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let (tools, mut notices) = ctx.tools();
    if let Some(path) = &args.path {
        tools.set_path(path);
    }
    if let Some(days) = &args.days {
        let value = tools.set_days(days);
        if value.to_string() != days.trim() {
            let input = tools.snapshot().days;
            tracing::debug!(raw = input.raw(), value, "digest window coerced");
        }
    }
    let inputs = tools.snapshot();

    let digest = tools.run_digest(&inputs.path, inputs.days.value()).await?;

    if output.json {
        super::print_json(digest.as_ref())?;
    } else if !output.quiet {
        println!("{}", render::digest(&digest, &ctx.theme.palette()));
    }
    super::print_notices(&mut notices, output);

    Ok(())
}
