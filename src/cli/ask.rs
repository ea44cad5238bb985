use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use super::{AppContext, OutputConfig};
use crate::controller::{AskController, AskOutcome, PreviewOutcome, PreviewView};
use crate::render;
use crate::types::ExplainAnswer;

#[derive(Args)]
pub struct AskArgs {
    /// The question (words are joined with spaces)
    #[arg(trailing_var_arg = true)]
    question: Vec<String>,

    /// Also fetch the source excerpt of every citation
    #[arg(long)]
    preview: bool,
}

#[derive(Serialize)]
struct PreviewOutput {
    file: String,
    start: u32,
    end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    #[serde(flatten)]
    answer: &'a ExplainAnswer,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    previews: Vec<PreviewOutput>,
}

pub async fn run(args: AskArgs, ctx: &AppContext, output: OutputConfig) -> Result<()> {
    let question = args.question.join(" ");
    let controller = AskController::new(ctx.gateway.clone(), ctx.config.gateway.slot_policy);
    let palette = ctx.theme.palette();

    let result = match controller.ask(&question).await {
        AskOutcome::Skipped => {
            tracing::debug!("blank question ignored");
            return Ok(());
        }
        AskOutcome::Failed(message) => bail!("{message}"),
        AskOutcome::Answered(result) => result,
    };

    let mut previews = Vec::new();
    if args.preview {
        for cell in &result.previews {
            let text = match cell.toggle().await {
                PreviewOutcome::FetchFailed(err) => {
                    tracing::warn!(snippet = %cell.request(), error = %err, "excerpt unavailable");
                    None
                }
                _ => match cell.view() {
                    PreviewView::Open(text) => Some(text),
                    _ => None,
                },
            };
            if output.json {
                let req = cell.request();
                previews.push(PreviewOutput {
                    file: req.file.clone(),
                    start: req.start,
                    end: req.end,
                    text,
                });
            }
        }
    }

    if output.json {
        super::print_json(&AskOutput {
            answer: &result.answer,
            previews,
        })?;
    } else if !output.quiet {
        println!("{}", render::answer(&result.answer, &palette));
        if args.preview {
            for cell in &result.previews {
                println!();
                println!("{}", render::preview(cell.request(), &cell.view(), &palette));
            }
        }
    }

    Ok(())
}
