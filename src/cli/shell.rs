//! Interactive session.
//!
//! Every action is spawned onto the (single-threaded) runtime, so several
//! can be outstanding at once. Results are printed as they resolve, always
//! from the owning controller's slot rather than from the raw response.

use anyhow::Result;
use colored::Colorize;
use std::future::Future;
use std::io::{BufRead, IsTerminal, Write};
use tokio::sync::mpsc;

use super::{AppContext, OutputConfig};
use crate::controller::tools::ToolResult;
use crate::controller::{
    AskController, AskOutcome, AskPhase, CitationPreviewCell, Notice, PreviewOutcome,
    RepoToolsController, ToolError,
};
use crate::http::Gateway;
use crate::render;
use crate::types::{DigestResult, IndexResult, OnboardResult, PreflightResult};

const HELP: &str = "\
Commands:
  ask <question>          ask about the repository
  open <n>                toggle the excerpt of citation n
  path [<path>]           show or set the target path
  days [<n>]              show or set the digest window (negative/invalid = 30)
  flag [on|off]           index as part of onboarding
  preflight | index | digest | onboard
  show                    print every result slot
  health                  probe the gateway
  theme [dark|light|toggle]
  help | quit";

/// Completion of a spawned action
enum Event {
    Asked(AskOutcome),
    Preview(usize, CitationPreviewCell, PreviewOutcome),
    Preflight(ToolResult<PreflightResult>),
    Indexed(ToolResult<IndexResult>),
    Digest(ToolResult<DigestResult>),
    Onboard(ToolResult<OnboardResult>),
}

struct Shell {
    ctx: AppContext,
    ask: AskController,
    tools: RepoToolsController,
    events: mpsc::UnboundedSender<Event>,
    pending: usize,
    in_flight: InFlight,
    output: OutputConfig,
    interactive: bool,
}

/// Actions refused while one is running. Set before the task is spawned,
/// so lines already buffered behind the trigger see it.
#[derive(Debug, Default)]
struct InFlight {
    ask: bool,
    preflight: bool,
    onboard: bool,
}

pub async fn run(ctx: AppContext, output: OutputConfig) -> Result<()> {
    let (tools, mut notices) = ctx.tools();
    let ask = AskController::new(ctx.gateway.clone(), ctx.config.gateway.slot_policy);
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let mut shell = Shell {
        ctx,
        ask,
        tools,
        events: events_tx,
        pending: 0,
        in_flight: InFlight::default(),
        output,
        interactive: std::io::stdin().is_terminal(),
    };

    if !output.quiet {
        shell.health().await;
        if shell.interactive {
            println!("Type `help` for commands.");
        }
    }
    shell.prompt();

    let mut lines = read_lines();
    let mut stdin_open = true;

    // After stdin closes, keep draining until every spawned action settles.
    // Notices go out before the completion that follows them; buffered input
    // is handled before completions so in-flight refusals stay observable.
    while stdin_open || shell.pending > 0 {
        tokio::select! {
            biased;

            Some(notice) = notices.recv() => shell.print_notice(&notice),
            line = lines.recv(), if stdin_open => {
                match line.transpose()? {
                    Some(line) => {
                        if !shell.dispatch(line.trim()).await? {
                            break;
                        }
                        shell.prompt();
                    }
                    None => stdin_open = false,
                }
            }
            Some(event) = events.recv() => {
                shell.pending -= 1;
                shell.on_event(event);
                shell.prompt();
            }
        }
    }
    while let Ok(notice) = notices.try_recv() {
        shell.print_notice(&notice);
    }

    // Anything still in flight finishes on its own; its result is dropped.
    shell.ask.unmount();
    shell.tools.unmount();
    Ok(())
}

impl Shell {
    fn prompt(&self) {
        if self.interactive {
            print!("repoguide> ");
            let _ = std::io::stdout().flush();
        }
    }

    fn print_notice(&self, notice: &Notice) {
        tracing::debug!(kind = ?notice.kind, "notice");
        if self.output.human() {
            println!("{} {}", "✓".green(), notice.message);
        }
    }

    fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    async fn health(&self) {
        let status = self.ctx.gateway.health().await;
        if let Err(err) = &status {
            tracing::debug!(error = %err, "health probe failed");
        }
        println!(
            "{}",
            render::health(status.as_ref().ok(), &self.ctx.theme.palette())
        );
    }

    /// Handle one input line. Returns `false` when the session should end.
    async fn dispatch(&mut self, line: &str) -> Result<bool> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => return Ok(false),
            "help" => println!("{HELP}"),
            "ask" => self.ask_question(rest),
            "open" => self.open_preview(rest),
            "path" => {
                if !rest.is_empty() {
                    self.tools.set_path(rest);
                }
                println!("path = {}", self.tools.snapshot().path);
            }
            "days" => {
                if !rest.is_empty() {
                    self.tools.set_days(rest);
                }
                println!("days = {}", self.tools.snapshot().days.value());
            }
            "flag" => {
                match rest {
                    "on" | "true" | "yes" => self.tools.set_index_on_onboard(true),
                    "off" | "false" | "no" => self.tools.set_index_on_onboard(false),
                    _ => {}
                }
                println!(
                    "index as part of onboarding = {}",
                    self.tools.snapshot().index_on_onboard
                );
            }
            "preflight" => self.preflight(),
            "index" => self.index(),
            "digest" => self.digest(),
            "onboard" => self.onboard(),
            "show" => self.show(),
            "health" => self.health().await,
            "theme" => self.theme(rest)?,
            other => println!("Unknown command: {other} (try `help`)"),
        }
        Ok(true)
    }

    fn ask_question(&mut self, question: &str) {
        // Resubmission is gated here; the controller itself does not queue.
        if self.in_flight.ask || self.ask.is_loading() {
            println!("Still answering the previous question");
            return;
        }
        if question.is_empty() {
            return;
        }
        self.in_flight.ask = true;
        let ask = self.ask.clone();
        let question = question.to_string();
        self.spawn(async move { Event::Asked(ask.ask(&question).await) });
    }

    fn open_preview(&mut self, arg: &str) {
        let Some(n) = arg.parse::<usize>().ok().filter(|n| *n > 0) else {
            println!("Usage: open <citation number>");
            return;
        };
        let Some(cell) = self.ask.preview(n - 1) else {
            println!("No citation {n} in the current answer");
            return;
        };
        self.spawn(async move {
            let outcome = cell.toggle().await;
            Event::Preview(n, cell, outcome)
        });
    }

    fn preflight(&mut self) {
        if self.in_flight.preflight || self.tools.is_preflight_loading() {
            println!("Preflight is already running");
            return;
        }
        self.in_flight.preflight = true;
        let tools = self.tools.clone();
        let path = tools.snapshot().path;
        self.spawn(async move { Event::Preflight(tools.run_preflight(&path).await) });
    }

    fn index(&mut self) {
        let tools = self.tools.clone();
        let path = tools.snapshot().path;
        self.spawn(async move { Event::Indexed(tools.index_folder(&path).await) });
    }

    fn digest(&mut self) {
        let tools = self.tools.clone();
        let inputs = tools.snapshot();
        self.spawn(async move {
            Event::Digest(tools.run_digest(&inputs.path, inputs.days.value()).await)
        });
    }

    fn onboard(&mut self) {
        if self.in_flight.onboard || self.tools.is_onboard_loading() {
            println!("Onboarding is already running");
            return;
        }
        self.in_flight.onboard = true;
        let tools = self.tools.clone();
        let inputs = tools.snapshot();
        self.spawn(async move {
            Event::Onboard(
                tools
                    .run_onboard(&inputs.path, inputs.index_on_onboard)
                    .await,
            )
        });
    }

    fn theme(&mut self, arg: &str) -> Result<()> {
        match arg {
            "" => {}
            "toggle" => {
                self.ctx.theme.toggle()?;
            }
            value => match value.parse() {
                Ok(theme) => self.ctx.theme.set(theme)?,
                Err(err) => println!("{err}"),
            },
        }
        println!("theme = {}", self.ctx.theme.get());
        Ok(())
    }

    fn on_event(&mut self, event: Event) {
        match &event {
            Event::Asked(_) => self.in_flight.ask = false,
            Event::Preflight(_) => self.in_flight.preflight = false,
            Event::Onboard(_) => self.in_flight.onboard = false,
            _ => {}
        }

        let palette = self.ctx.theme.palette();
        match event {
            Event::Asked(AskOutcome::Skipped) => {}
            Event::Asked(_) => self.print_ask_phase(),
            Event::Preview(n, cell, outcome) => {
                if let PreviewOutcome::FetchFailed(err) = &outcome {
                    tracing::debug!(citation = n, error = %err, "excerpt unavailable");
                }
                println!(
                    "[{n}] {}",
                    render::preview(cell.request(), &cell.view(), &palette)
                );
            }
            Event::Preflight(result) => {
                if settled(result, "preflight") {
                    if let Some(report) = self.tools.preflight() {
                        println!("{}", render::preflight(&report, &palette));
                    }
                }
            }
            Event::Indexed(result) => {
                // Reported through its notice.
                settled(result, "index");
            }
            Event::Digest(result) => {
                if settled(result, "digest") {
                    if let Some(digest) = self.tools.digest() {
                        println!("{}", render::digest(&digest, &palette));
                    }
                }
            }
            Event::Onboard(result) => {
                if settled(result, "onboard") {
                    if let Some(plan) = self.tools.onboard() {
                        println!("{}", render::onboard(&plan, &palette));
                    }
                }
            }
        }
    }

    fn print_ask_phase(&self) {
        let palette = self.ctx.theme.palette();
        match self.ask.phase() {
            AskPhase::Idle => {}
            AskPhase::Loading => println!("{}", palette.muted("Thinking…")),
            AskPhase::Success(result) => println!("{}", render::answer(&result.answer, &palette)),
            AskPhase::Error(message) => println!("{} {message}", "Error:".red().bold()),
        }
    }

    fn show(&self) {
        let palette = self.ctx.theme.palette();
        let inputs = self.tools.snapshot();
        println!(
            "path = {}, days = {}, index on onboard = {}",
            inputs.path,
            inputs.days.value(),
            inputs.index_on_onboard
        );

        println!("\n{}", palette.heading("Answer"));
        if matches!(self.ask.phase(), AskPhase::Idle) {
            println!("{}", palette.muted("(none)"));
        } else {
            self.print_ask_phase();
        }

        println!("\n{}", palette.heading("Preflight"));
        match (self.tools.is_preflight_loading(), self.tools.preflight()) {
            (true, _) => println!("{}", palette.muted("Running…")),
            (false, Some(report)) => println!("{}", render::preflight(&report, &palette)),
            (false, None) => println!("{}", palette.muted("(none)")),
        }
        if self.tools.is_indexing() {
            println!("{}", palette.muted("Indexing in progress"));
        }

        println!("\n{}", palette.heading("Change digest"));
        match self.tools.digest() {
            Some(digest) => println!("{}", render::digest(&digest, &palette)),
            None => println!("{}", palette.muted("(none)")),
        }

        println!("\n{}", palette.heading("Onboarding"));
        match (self.tools.is_onboard_loading(), self.tools.onboard()) {
            (true, _) => println!("{}", palette.muted("Onboarding…")),
            (false, Some(plan)) => println!("{}", render::onboard(&plan, &palette)),
            (false, None) => println!("{}", palette.muted("(none)")),
        }
    }
}

/// Stdin lines from a plain thread; a blocking read left on the runtime's
/// pool would hold up shutdown.
fn read_lines() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Tool failures are only logged (the controller already warned); a busy
/// index is the one case worth telling the user about.
fn settled<T>(result: ToolResult<T>, action: &str) -> bool {
    match result {
        Ok(_) => true,
        Err(err @ ToolError::Busy(_)) => {
            println!("{err}");
            false
        }
        Err(err) => {
            tracing::debug!(action, error = %err, "action settled without a result");
            false
        }
    }
}
