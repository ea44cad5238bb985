//! Lazy, fetch-once source excerpt attached to a single citation.

use std::sync::{Arc, Mutex};

use super::{lock, Mount};
use crate::http::{Gateway, GatewayError};
use crate::types::{Citation, SnippetRequest};

/// Displayed in place of an excerpt whose body came back empty
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

/// What the view should draw for a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    Closed,
    Loading,
    /// Open with no cached text (last fetch failed)
    Blank,
    Open(String),
}

/// Result of one [`CitationPreviewCell::toggle`]
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    Closed,
    /// Opened without fetching: cached, or a fetch is already outstanding
    Opened,
    Fetched,
    /// The fetch failed; the cell stays uncached so the next open retries
    FetchFailed(GatewayError),
}

#[derive(Debug, Default)]
struct PreviewState {
    open: bool,
    loading: bool,
    cache: Option<String>,
}

/// Per-citation preview with its own visibility, in-flight flag and cache.
///
/// The cache is filled at most once and never invalidated. Clones share
/// the same cell.
#[derive(Clone)]
pub struct CitationPreviewCell {
    gateway: Arc<dyn Gateway>,
    request: SnippetRequest,
    state: Arc<Mutex<PreviewState>>,
    mount: Mount,
}

impl std::fmt::Debug for CitationPreviewCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationPreviewCell")
            .field("request", &self.request)
            .field("state", &*lock(&self.state))
            .finish_non_exhaustive()
    }
}

impl CitationPreviewCell {
    pub fn new(gateway: Arc<dyn Gateway>, citation: &Citation) -> Self {
        Self {
            gateway,
            request: citation.snippet_request(),
            state: Arc::new(Mutex::new(PreviewState::default())),
            mount: Mount::new(),
        }
    }

    pub fn request(&self) -> &SnippetRequest {
        &self.request
    }

    /// Flip visibility, fetching the excerpt the first time it opens.
    pub async fn toggle(&self) -> PreviewOutcome {
        {
            let mut state = lock(&self.state);
            state.open = !state.open;
            if !state.open {
                return PreviewOutcome::Closed;
            }
            if state.cache.is_some() || state.loading {
                return PreviewOutcome::Opened;
            }
            state.loading = true;
        }

        let result = self.gateway.snippet(&self.request).await;

        let mut state = lock(&self.state);
        state.loading = false;
        match result {
            Ok(text) => {
                if self.mount.is_mounted() {
                    state.cache = Some(text);
                } else {
                    tracing::debug!(snippet = %self.request, "preview fetched after unmount");
                }
                PreviewOutcome::Fetched
            }
            Err(err) => {
                tracing::debug!(snippet = %self.request, error = %err, "preview fetch failed");
                PreviewOutcome::FetchFailed(err)
            }
        }
    }

    pub fn view(&self) -> PreviewView {
        let state = lock(&self.state);
        if !state.open {
            return PreviewView::Closed;
        }
        match (&state.cache, state.loading) {
            (Some(text), _) if text.is_empty() => PreviewView::Open(EMPTY_PLACEHOLDER.to_string()),
            (Some(text), _) => PreviewView::Open(text.clone()),
            (None, true) => PreviewView::Loading,
            (None, false) => PreviewView::Blank,
        }
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        lock(&self.state).cache.is_some()
    }

    pub(crate) fn unmount(&self) {
        self.mount.unmount();
    }
}
