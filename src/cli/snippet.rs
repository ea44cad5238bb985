use anyhow::Result;
use clap::Args;

use super::{AppContext, OutputConfig};
use crate::controller::{CitationPreviewCell, PreviewOutcome, PreviewView};
use crate::render;
use crate::types::Citation;

#[derive(Args)]
pub struct SnippetArgs {
    /// File path as reported in a citation
    file: String,

    /// First line of the range
    start: u32,

    /// Last line of the range
    end: u32,
}

pub async fn run(args: SnippetArgs, ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let citation = Citation {
        source: "cli".to_string(),
        file: args.file,
        start_line: args.start,
        end_line: args.end,
        url: None,
    };
    let cell = CitationPreviewCell::new(ctx.gateway.clone(), &citation);

    if let PreviewOutcome::FetchFailed(err) = cell.toggle().await {
        anyhow::bail!("Failed to fetch {}: {err}", cell.request());
    }

    let view = cell.view();
    if output.json {
        let text = match &view {
            PreviewView::Open(text) => Some(text.as_str()),
            _ => None,
        };
        super::print_json(&serde_json::json!({
            "file": citation.file,
            "start": citation.start_line,
            "end": citation.end_line,
            "url": ctx.gateway.snippet_url(cell.request()),
            "text": text,
        }))?;
    } else if !output.quiet {
        println!("{}", render::preview(cell.request(), &view, &ctx.theme.palette()));
    }

    Ok(())
}
