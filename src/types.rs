use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A line range in a repository file, attached to an explain answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub source: String,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Citation {
    /// A citation must never describe an inverted range.
    pub fn is_well_formed(&self) -> bool {
        self.start_line <= self.end_line
    }

    /// Query triple for the gateway's snippet operation
    pub fn snippet_request(&self) -> SnippetRequest {
        SnippetRequest {
            file: self.file.clone(),
            start: self.start_line,
            end: self.end_line,
        }
    }
}

/// Parameters of a `/snippet` fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetRequest {
    pub file: String,
    pub start: u32,
    pub end: u32,
}

impl SnippetRequest {
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }
}

impl std::fmt::Display for SnippetRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.start, self.end)
    }
}

/// Answer to a natural-language question, with cited source excerpts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainAnswer {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Outcome of a single environment check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflightStatus {
    Ok,
    Warn,
    Fail,
    /// The gateway's spelling for a check that could not run; shown as-is
    Error,
}

impl std::fmt::Display for PreflightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreflightStatus::Ok => write!(f, "ok"),
            PreflightStatus::Warn => write!(f, "warn"),
            PreflightStatus::Fail => write!(f, "fail"),
            PreflightStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightCheck {
    pub name: String,
    pub status: PreflightStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightResult {
    pub path: String,
    pub summary: String,
    pub checks: Vec<PreflightCheck>,
}

/// Response from the `/index` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexResult {
    #[serde(default)]
    pub path: String,
    pub chunks_indexed: u64,
}

/// A file ranked in a change digest.
///
/// Git-backed digests carry `count`; the mtime fallback carries `modified_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitFileChange {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitEntry {
    pub hash: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestResult {
    pub path: String,
    pub since: String,
    pub commit_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub top_files: Vec<CommitFileChange>,
    pub commits: Vec<CommitEntry>,
}

/// Progress of an onboarding step. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepStatus {
    Done,
    Pending,
    Todo,
    Other(String),
}

impl From<String> for StepStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "done" => StepStatus::Done,
            "pending" => StepStatus::Pending,
            "todo" => StepStatus::Todo,
            _ => StepStatus::Other(value),
        }
    }
}

impl From<StepStatus> for String {
    fn from(value: StepStatus) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Done => write!(f, "done"),
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Todo => write!(f, "todo"),
            StepStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextStep {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Onboarding plan: preflight, optional indexing, links and next steps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardResult {
    pub path: String,
    pub chunks_indexed: u64,
    pub links: BTreeMap<String, String>,
    pub next_steps: Vec<NextStep>,
    pub preflight: PreflightResult,
}

/// Response from the `/health` probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qdrant_url: Option<String>,
}
