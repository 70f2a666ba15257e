//! Grant page extraction with supersede-and-cancel semantics.
//!
//! At most one extraction result is ever delivered: starting a new extraction
//! or calling [`GrantExtractor::cancel`] turns every older in-flight call into
//! [`ExtractionError::Cancelled`], even if the server answers afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gw_core::error::{ApiError, ApiErrorKind, ExtractionCategory};
use gw_core::grant::{parse_source_url, ExtractGrantRequest, GrantContext};
use gw_core::ports::GrantsPort;
use tokio::sync::Notify;
use tracing::{debug, info_span, warn, Instrument};

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("grant url is not a valid http(s) address")]
    InvalidUrl,
    #[error("grant extraction failed ({category:?})")]
    Failed {
        category: ExtractionCategory,
        #[source]
        source: ApiError,
    },
    #[error("grant extraction was cancelled")]
    Cancelled,
}

pub struct GrantExtractor {
    grants: Arc<dyn GrantsPort>,
    sequence: AtomicU64,
    cancelled: Notify,
}

impl GrantExtractor {
    pub fn new(grants: Arc<dyn GrantsPort>) -> Self {
        Self {
            grants,
            sequence: AtomicU64::new(0),
            cancelled: Notify::new(),
        }
    }

    pub async fn extract(
        &self,
        url: &str,
        name: Option<&str>,
    ) -> Result<GrantContext, ExtractionError> {
        let Some(source_url) = parse_source_url(url) else {
            return Err(ExtractionError::InvalidUrl);
        };
        let request = ExtractGrantRequest {
            source_url: source_url.to_string(),
            name: name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        };

        // Supersede whatever was running before this call.
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancelled.notify_waiters();

        let cancelled = self.cancelled.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let span = info_span!("usecase.extract_grant.execute", url = %request.source_url);
        let outcome = async {
            tokio::select! {
                _ = &mut cancelled => None,
                result = self.grants.extract_grant(&request) => Some(result),
            }
        }
        .instrument(span)
        .await;

        if self.sequence.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "extraction superseded");
            return Err(ExtractionError::Cancelled);
        }

        match outcome {
            None => Err(ExtractionError::Cancelled),
            Some(Ok(context)) => Ok(context.normalized()),
            Some(Err(source)) => {
                let category = categorize(&source);
                warn!(?category, error = %source, "grant extraction failed");
                Err(ExtractionError::Failed { category, source })
            }
        }
    }

    /// Cancels the in-flight extraction, if any. Never blocks.
    pub fn cancel(&self) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        self.cancelled.notify_waiters();
    }
}

/// Maps a failed extraction call onto the category shown to the user.
pub fn categorize(error: &ApiError) -> ExtractionCategory {
    match error.http_status {
        Some(404) => return ExtractionCategory::NotFound,
        Some(401) => return ExtractionCategory::AuthConfig,
        Some(403) => return ExtractionCategory::Blocked,
        Some(408 | 504) => return ExtractionCategory::Timeout,
        Some(502 | 503) => return ExtractionCategory::ServerUnavailable,
        _ => {}
    }

    let message = error.message.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|needle| message.contains(*needle));
    if mentions(&["timed out", "timeout"][..]) {
        ExtractionCategory::Timeout
    } else if mentions(&["blocked", "forbidden", "captcha"][..]) {
        ExtractionCategory::Blocked
    } else if mentions(&["not found"][..]) {
        ExtractionCategory::NotFound
    } else if mentions(&["unreachable", "could not resolve", "dns", "connection refused"][..]) {
        ExtractionCategory::Unreachable
    } else if mentions(&["api key", "credentials", "not configured"][..]) {
        ExtractionCategory::AuthConfig
    } else if error.kind == ApiErrorKind::Transport {
        ExtractionCategory::ServerUnavailable
    } else {
        ExtractionCategory::Other
    }
}
