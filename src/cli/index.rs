use anyhow::Result;
use clap::Args;

use super::{AppContext, OutputConfig};

#[derive(Args)]
pub struct IndexArgs {
    /// Folder to index on the gateway host (defaults to the configured path)
    path: Option<String>,
}

/// Index has no loading indicator; completion is reported by its notice.
pub async fn run(args: IndexArgs, ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let (tools, mut notices) = ctx.tools();
    if let Some(path) = &args.path {
        tools.set_path(path);
    }
    let inputs = tools.snapshot();

    let indexed = tools.index_folder(&inputs.path).await?;

    if output.json {
        super::print_json(indexed.as_ref())?;
    }
    super::print_notices(&mut notices, output);

    Ok(())
}
