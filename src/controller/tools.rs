//! Preflight, index, change digest and onboarding actions.
//!
//! The four actions share one set of inputs but are otherwise independent:
//! each has its own slot, none waits for another, and overlapping calls of
//! the same action are resolved by the slot's [`SlotPolicy`].

use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::{lock, Mount, NoticeKind, Notifier, Slot, SlotPolicy};
use crate::http::{Gateway, GatewayError};
use crate::types::{DigestResult, IndexResult, OnboardResult, PreflightResult};

/// Window used whenever the days field is empty or not a number
pub const DEFAULT_DIGEST_DAYS: u32 = 30;

/// Why a tool action produced no result
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    #[error("{0} is already running")]
    Busy(&'static str),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("controller was unmounted before the {0} response arrived")]
    Unmounted(&'static str),
}

pub type ToolResult<T> = Result<Arc<T>, ToolError>;

/// Text of the digest-window field and the value it resolves to.
///
/// The value is resolved as soon as the text changes, not at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysInput {
    raw: String,
    value: u32,
}

impl DaysInput {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().parse().unwrap_or(DEFAULT_DIGEST_DAYS);
        Self {
            raw: raw.to_string(),
            value,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Default for DaysInput {
    fn default() -> Self {
        Self::parse(&DEFAULT_DIGEST_DAYS.to_string())
    }
}

/// Fields shared by all four actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInputs {
    pub path: String,
    pub days: DaysInput,
    pub index_on_onboard: bool,
}

impl ToolInputs {
    pub fn new(path: impl Into<String>, days: u32, index_on_onboard: bool) -> Self {
        Self {
            path: path.into(),
            days: DaysInput::parse(&days.to_string()),
            index_on_onboard,
        }
    }
}

#[derive(Debug)]
struct ToolsState {
    preflight: Slot<PreflightResult>,
    preflight_loading: bool,
    index_in_flight: bool,
    digest: Slot<DigestResult>,
    onboard: Slot<OnboardResult>,
    onboard_loading: bool,
}

/// Owns the repo tool actions, their slots and the shared input fields.
#[derive(Clone)]
pub struct RepoToolsController {
    gateway: Arc<dyn Gateway>,
    inputs: Arc<Mutex<ToolInputs>>,
    state: Arc<Mutex<ToolsState>>,
    notifier: Notifier,
    mount: Mount,
}

impl RepoToolsController {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        inputs: ToolInputs,
        policy: SlotPolicy,
        notifier: Notifier,
    ) -> Self {
        Self {
            gateway,
            inputs: Arc::new(Mutex::new(inputs)),
            state: Arc::new(Mutex::new(ToolsState {
                preflight: Slot::new(policy),
                preflight_loading: false,
                index_in_flight: false,
                digest: Slot::new(policy),
                onboard: Slot::new(policy),
                onboard_loading: false,
            })),
            notifier,
            mount: Mount::new(),
        }
    }

    // -- shared inputs --

    /// Copy of the inputs as they are right now. Actions read them once,
    /// at trigger time.
    pub fn snapshot(&self) -> ToolInputs {
        lock(&self.inputs).clone()
    }

    pub fn set_path(&self, path: &str) {
        lock(&self.inputs).path = path.to_string();
    }

    pub fn set_days(&self, raw: &str) -> u32 {
        let days = DaysInput::parse(raw);
        let value = days.value();
        lock(&self.inputs).days = days;
        value
    }

    pub fn set_index_on_onboard(&self, index: bool) {
        lock(&self.inputs).index_on_onboard = index;
    }

    // -- slots --

    pub fn preflight(&self) -> Option<Arc<PreflightResult>> {
        lock(&self.state).preflight.get()
    }

    pub fn digest(&self) -> Option<Arc<DigestResult>> {
        lock(&self.state).digest.get()
    }

    pub fn onboard(&self) -> Option<Arc<OnboardResult>> {
        lock(&self.state).onboard.get()
    }

    pub fn is_preflight_loading(&self) -> bool {
        lock(&self.state).preflight_loading
    }

    pub fn is_onboard_loading(&self) -> bool {
        lock(&self.state).onboard_loading
    }

    pub fn is_indexing(&self) -> bool {
        lock(&self.state).index_in_flight
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    // -- actions --

    pub async fn run_preflight(&self, path: &str) -> ToolResult<PreflightResult> {
        let ticket = {
            let mut state = lock(&self.state);
            state.preflight_loading = true;
            state.preflight.issue()
        };

        let result = self.gateway.preflight(path).await;

        let mut state = lock(&self.state);
        state.preflight_loading = false;
        let report = Arc::new(self.settled("preflight", result)?);
        if state.preflight.settle(ticket, report.clone()) {
            self.notifier
                .notify(NoticeKind::Preflight, report.summary.clone());
        }
        Ok(report)
    }

    /// Index a folder. At most one index request is outstanding at a time.
    pub async fn index_folder(&self, path: &str) -> ToolResult<IndexResult> {
        {
            let mut state = lock(&self.state);
            if state.index_in_flight {
                tracing::debug!(path, "index already in flight; ignoring");
                return Err(ToolError::Busy("index"));
            }
            state.index_in_flight = true;
        }

        let result = self.gateway.index(path).await;

        lock(&self.state).index_in_flight = false;
        let indexed = Arc::new(self.settled("index", result)?);
        self.notifier.notify(
            NoticeKind::Index,
            format!(
                "Indexed {} chunks from {}",
                indexed.chunks_indexed, indexed.path
            ),
        );
        Ok(indexed)
    }

    pub async fn run_digest(&self, path: &str, days: u32) -> ToolResult<DigestResult> {
        let ticket = lock(&self.state).digest.issue();

        let result = self.gateway.change_digest(path, days).await;

        let digest = Arc::new(self.settled("change digest", result)?);
        if lock(&self.state).digest.settle(ticket, digest.clone()) {
            self.notifier.notify(
                NoticeKind::Digest,
                format!(
                    "Change digest: {} commits since {}",
                    digest.commit_count, digest.since
                ),
            );
        }
        Ok(digest)
    }

    pub async fn run_onboard(&self, path: &str, index: bool) -> ToolResult<OnboardResult> {
        let ticket = {
            let mut state = lock(&self.state);
            state.onboard_loading = true;
            state.onboard.issue()
        };

        let result = self.gateway.onboard(path, index).await;

        let mut state = lock(&self.state);
        state.onboard_loading = false;
        let plan = Arc::new(self.settled("onboard", result)?);
        if state.onboard.settle(ticket, plan.clone()) {
            self.notifier
                .notify(NoticeKind::Onboard, plan.preflight.summary.clone());
        }
        Ok(plan)
    }

    /// Common completion path: failures are logged and handed back to the
    /// caller, never stored; late completions after unmount are dropped.
    fn settled<T>(
        &self,
        action: &'static str,
        result: Result<T, GatewayError>,
    ) -> Result<T, ToolError> {
        let value = result.map_err(|err| {
            tracing::warn!(action, error = %err, "tool action failed");
            ToolError::from(err)
        })?;
        if !self.mount.is_mounted() {
            tracing::debug!(action, "completion after unmount dropped");
            return Err(ToolError::Unmounted(action));
        }
        Ok(value)
    }
}
