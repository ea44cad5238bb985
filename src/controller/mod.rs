//! Client-side controllers and the primitives they share.
//!
//! Each controller owns its own result slots and in-flight flags; no
//! controller talks to another. State is only touched between suspension
//! points, so locks are never held across an `.await`.

pub mod ask;
pub mod preview;
pub mod tools;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use ask::{AskController, AskOutcome, AskPhase};
pub use preview::{CitationPreviewCell, PreviewOutcome, PreviewView};
pub use tools::{RepoToolsController, ToolError, ToolInputs};

/// How a slot treats completions of overlapping invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotPolicy {
    /// Whichever response arrives last overwrites the slot
    #[default]
    LastResolvedWins,
    /// Only the most recently issued invocation may write the slot
    LastSentWins,
}

/// Generation stamp handed out when an invocation starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Stored outcome of the most recently completed invocation of an action.
///
/// Values are opaque snapshots: a completion replaces the whole value.
#[derive(Debug)]
pub struct Slot<T> {
    value: Option<Arc<T>>,
    issued: u64,
    policy: SlotPolicy,
}

impl<T> Slot<T> {
    pub fn new(policy: SlotPolicy) -> Self {
        Self {
            value: None,
            issued: 0,
            policy,
        }
    }

    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Offer a completed value. Returns `false` when the policy rejects it.
    pub fn settle(&mut self, ticket: Ticket, value: Arc<T>) -> bool {
        match self.policy {
            SlotPolicy::LastResolvedWins => {}
            SlotPolicy::LastSentWins if ticket.0 == self.issued => {}
            SlotPolicy::LastSentWins => return false,
        }
        self.value = Some(value);
        true
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.value.clone()
    }
}

/// Liveness of the component that owns a controller.
///
/// Requests are never cancelled; once unmounted, late completions are
/// dropped instead of applied.
#[derive(Debug, Clone)]
pub struct Mount(Arc<AtomicBool>);

impl Mount {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

/// Which action produced a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Preflight,
    Index,
    Digest,
    Onboard,
}

/// Transient, success-only notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Sending half of the notice channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        // Nobody listening is fine; notices are fire-and-forget.
        let _ = self.tx.send(Notice {
            kind,
            message: message.into(),
        });
    }
}

/// Lock a controller's state. A poisoned lock still holds consistent
/// snapshots, so the guard is recovered rather than propagated.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scriptable gateway for controller tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::http::{Gateway, GatewayError};
    use crate::types::{
        DigestResult, ExplainAnswer, HealthStatus, IndexResult, OnboardResult, PreflightResult,
        SnippetRequest,
    };

    type Reply = Result<serde_json::Value, GatewayError>;

    /// A fake gateway. Each call records itself, then either answers from a
    /// queued canned reply or waits on a oneshot the test resolves later.
    #[derive(Default)]
    pub struct FakeGateway {
        calls: Mutex<Vec<String>>,
        canned: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
        gated: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<Reply>>>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(&self, op: &'static str, reply: Reply) {
            super::lock(&self.canned)
                .entry(op)
                .or_default()
                .push_back(reply);
        }

        /// Queue a reply the test releases through the returned sender.
        pub fn gate(&self, op: &'static str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            super::lock(&self.gated).entry(op).or_default().push_back(rx);
            tx
        }

        pub fn calls(&self) -> Vec<String> {
            super::lock(&self.calls).clone()
        }

        pub fn call_count(&self, op: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.split(' ').next() == Some(op))
                .count()
        }

        async fn respond(&self, op: &'static str, call: String) -> Reply {
            super::lock(&self.calls).push(call);
            let gated = super::lock(&self.gated)
                .get_mut(op)
                .and_then(VecDeque::pop_front);
            if let Some(rx) = gated {
                return rx.await.unwrap_or_else(|_| {
                    Err(GatewayError::Transport {
                        url: op.to_string(),
                        message: "gate dropped".into(),
                    })
                });
            }
            super::lock(&self.canned)
                .get_mut(op)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(GatewayError::from_status(500, "")))
        }

        async fn call<T: serde::de::DeserializeOwned>(
            &self,
            op: &'static str,
            call: String,
        ) -> Result<T, GatewayError> {
            let value = self.respond(op, call).await?;
            serde_json::from_value(value).map_err(|e| GatewayError::Decode {
                what: op,
                message: e.to_string(),
            })
        }
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn health(&self) -> Result<HealthStatus, GatewayError> {
            self.call("health", "health".into()).await
        }

        async fn explain(&self, question: &str) -> Result<ExplainAnswer, GatewayError> {
            self.call("explain", format!("explain {question}")).await
        }

        async fn preflight(&self, path: &str) -> Result<PreflightResult, GatewayError> {
            self.call("preflight", format!("preflight {path}")).await
        }

        async fn index(&self, path: &str) -> Result<IndexResult, GatewayError> {
            self.call("index", format!("index {path}")).await
        }

        async fn change_digest(
            &self,
            path: &str,
            days: u32,
        ) -> Result<DigestResult, GatewayError> {
            self.call("digest", format!("digest {path} {days}")).await
        }

        async fn onboard(&self, path: &str, index: bool) -> Result<OnboardResult, GatewayError> {
            self.call("onboard", format!("onboard {path} {index}")).await
        }

        async fn snippet(&self, request: &SnippetRequest) -> Result<String, GatewayError> {
            let call = format!(
                "snippet file={}&start={}&end={}",
                request.file, request.start, request.end
            );
            let value = self.respond("snippet", call).await?;
            Ok(value.as_str().unwrap_or_default().to_string())
        }
    }
}
