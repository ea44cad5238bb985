//! Plain-text views of gateway results.
//!
//! Every renderer returns a `String` so the CLI and the interactive shell
//! print the same thing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use colored::Colorize;

use crate::controller::PreviewView;
use crate::theme::Palette;
use crate::types::{
    DigestResult, ExplainAnswer, HealthStatus, OnboardResult, PreflightResult, PreflightStatus,
    SnippetRequest,
};

/// Commit file lists are cut to this many entries
const MAX_COMMIT_FILES: usize = 6;

pub fn health(status: Option<&HealthStatus>, palette: &Palette) -> String {
    let value = match status {
        Some(h) => h.status.as_str().bold(),
        None => palette.muted("unreachable"),
    };
    format!("API health: {value}")
}

pub fn answer(answer: &ExplainAnswer, palette: &Palette) -> String {
    let mut lines = vec![palette.heading(&answer.summary).to_string()];

    if !answer.bullets.is_empty() {
        lines.push(String::new());
        for bullet in &answer.bullets {
            lines.push(format!("  • {bullet}"));
        }
    }

    if !answer.citations.is_empty() {
        lines.push(String::new());
        lines.push(palette.heading("Citations").to_string());
        for (i, c) in answer.citations.iter().enumerate() {
            let mut line = format!(
                "  [{}] {}:{}-{}",
                i + 1,
                palette.accent(&c.file),
                c.start_line,
                c.end_line
            );
            if let Some(url) = c.url.as_deref().filter(|u| !u.is_empty()) {
                line.push_str(&format!(" {}", palette.muted(url)));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

pub fn preview(request: &SnippetRequest, view: &PreviewView, palette: &Palette) -> String {
    let header = palette.accent(&request.to_string());
    match view {
        PreviewView::Closed => format!("{header} (closed)"),
        PreviewView::Loading => format!("{header} loading…"),
        PreviewView::Blank => format!("{header} {}", palette.muted("(unavailable)")),
        PreviewView::Open(text) => {
            let body: Vec<String> = text.lines().map(|l| format!("  │ {l}")).collect();
            if body.is_empty() {
                format!("{header}\n  │ {text}")
            } else {
                format!("{header}\n{}", body.join("\n"))
            }
        }
    }
}

fn status_label(status: PreflightStatus, palette: &Palette) -> String {
    let label = status.to_string().to_uppercase();
    let color = match status {
        PreflightStatus::Ok => palette.ok,
        PreflightStatus::Warn => palette.warn,
        PreflightStatus::Fail | PreflightStatus::Error => palette.fail,
    };
    label.color(color).bold().to_string()
}

pub fn preflight(report: &PreflightResult, palette: &Palette) -> String {
    let mut lines = vec![
        format!("{} {}", palette.heading("Path:"), report.path),
        format!("{} {}", palette.heading("Summary:"), report.summary),
    ];
    for check in &report.checks {
        let mut line = format!("  {} — {}", status_label(check.status, palette), check.name);
        if let Some(fix) = check.fix.as_deref().filter(|f| !f.is_empty()) {
            line.push_str(&format!(" • fix: {fix}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Render an ISO timestamp in local time; naive timestamps are read as local.
pub fn local_time(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string();
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map_or_else(
            || raw.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}

pub fn digest(digest: &DigestResult, palette: &Palette) -> String {
    let mut lines = vec![
        format!("{} {}", palette.heading("Since:"), digest.since),
        format!("{} {}", palette.heading("Commits:"), digest.commit_count),
    ];
    if let Some(note) = digest.note.as_deref().filter(|n| !n.is_empty()) {
        lines.push(palette.muted(note).italic().to_string());
    }

    if !digest.top_files.is_empty() {
        lines.push(String::new());
        lines.push(palette.heading("Top files").to_string());
        for f in &digest.top_files {
            let mut line = format!("  {}", f.file);
            if let Some(count) = f.count {
                line.push_str(&format!(" — {count} change(s)"));
            }
            if let Some(at) = f.modified_at.as_deref().filter(|a| !a.is_empty()) {
                line.push_str(&format!(" — {}", local_time(at)));
            }
            lines.push(line);
        }
    }

    if !digest.commits.is_empty() {
        lines.push(String::new());
        lines.push(palette.heading("Recent commits").to_string());
        for c in &digest.commits {
            lines.push(format!(
                "  {} — {} — {}",
                palette.accent(&c.hash),
                c.date,
                c.subject
            ));
            if !c.files.is_empty() {
                let shown: Vec<&str> = c
                    .files
                    .iter()
                    .take(MAX_COMMIT_FILES)
                    .map(String::as_str)
                    .collect();
                let more = if c.files.len() > MAX_COMMIT_FILES {
                    "…"
                } else {
                    ""
                };
                lines.push(
                    palette
                        .muted(&format!("      files: {}{more}", shown.join(", ")))
                        .to_string(),
                );
            }
        }
    }

    lines.join("\n")
}

pub fn onboard(plan: &OnboardResult, palette: &Palette) -> String {
    let mut lines = vec![
        palette.heading("Onboarding plan").to_string(),
        format!("{} {}", palette.heading("Path:"), plan.path),
        format!("{} {}", palette.heading("Chunks indexed:"), plan.chunks_indexed),
        String::new(),
        palette.heading("Quick links").to_string(),
    ];
    for (name, url) in &plan.links {
        lines.push(format!("  - {name}: {}", palette.accent(url)));
    }

    lines.push(String::new());
    lines.push(palette.heading("Next steps").to_string());
    for step in &plan.next_steps {
        let mut line = format!(
            "  {} — {}",
            step.status.to_string().to_uppercase().bold(),
            step.name
        );
        if let Some(detail) = step.detail.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!(" — {detail}"));
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(palette.heading("Preflight summary").to_string());
    lines.push(format!("  {}", plan.preflight.summary));

    lines.join("\n")
}
