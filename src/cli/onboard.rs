use anyhow::Result;
use clap::Args;

use super::{AppContext, OutputConfig};
use crate::render;

#[derive(Args)]
pub struct OnboardArgs {
    /// Repository path on the gateway host (defaults to the configured path)
    path: Option<String>,

    /// Index the repository as part of onboarding
    #[arg(long)]
    index: bool,
}

pub async fn run(args: OnboardArgs, ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let (tools, mut notices) = ctx.tools();
    if let Some(path) = &args.path {
        tools.set_path(path);
    }
    if args.index {
        tools.set_index_on_onboard(true);
    }
    let inputs = tools.snapshot();

    let pb = super::spinner(output, &format!("Onboarding {}…", inputs.path));
    let result = tools
        .run_onboard(&inputs.path, inputs.index_on_onboard)
        .await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let plan = result?;

    if output.json {
        super::print_json(plan.as_ref())?;
    } else if !output.quiet {
        println!("{}", render::onboard(&plan, &ctx.theme.palette()));
    }
    super::print_notices(&mut notices, output);

    Ok(())
}
