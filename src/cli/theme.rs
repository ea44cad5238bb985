use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{AppContext, OutputConfig};
use crate::theme::Theme;

#[derive(Args)]
pub struct ThemeArgs {
    /// "dark", "light" or "toggle"; omit to show the current theme
    value: Option<String>,
}

#[derive(Serialize)]
struct ThemeOutput {
    theme: String,
    changed: bool,
}

pub fn run(args: ThemeArgs, mut ctx: AppContext, output: OutputConfig) -> Result<()> {
    let before = ctx.theme.get();
    let after = match args.value.as_deref() {
        None => before,
        Some("toggle") => ctx.theme.toggle()?,
        Some(value) => {
            let theme: Theme = value.parse()?;
            ctx.theme.set(theme)?;
            theme
        }
    };

    if output.json {
        super::print_json(&ThemeOutput {
            theme: after.to_string(),
            changed: before != after,
        })?;
    } else if !output.quiet {
        let palette = ctx.theme.palette();
        println!("Theme: {}", palette.accent(&after.to_string()).bold());
    }

    Ok(())
}
