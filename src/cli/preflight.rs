use anyhow::Result;
use clap::Args;

use super::{AppContext, OutputConfig};
use crate::render;

#[derive(Args)]
pub struct PreflightArgs {
    /// Repository path on the gateway host (defaults to the configured path)
    path: Option<String>,
}

pub async fn run(args: PreflightArgs, ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let (tools, mut notices) = ctx.tools();
    if let Some(path) = &args.path {
        tools.set_path(path);
    }
    let inputs = tools.snapshot();

    let pb = super::spinner(output, &format!("Running preflight for {}…", inputs.path));
    let result = tools.run_preflight(&inputs.path).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let report = result?;

    if output.json {
        super::print_json(report.as_ref())?;
    } else if !output.quiet {
        println!("{}", render::preflight(&report, &ctx.theme.palette()));
    }
    super::print_notices(&mut notices, output);

    Ok(())
}
