use std::sync::Arc;

use gw_core::credits::CreditStatus;
use gw_core::error::ApiError;
use gw_core::ports::PaymentsPort;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps the last known credit status for display.
///
/// Decisions are always made on a freshly loaded status; this cache only
/// feeds badges and the paywall copy.
pub struct CreditTracker {
    payments: Arc<dyn PaymentsPort>,
    latest: RwLock<Option<CreditStatus>>,
}

impl CreditTracker {
    pub fn new(payments: Arc<dyn PaymentsPort>) -> Self {
        Self {
            payments,
            latest: RwLock::new(None),
        }
    }

    pub async fn refresh(&self) -> Result<CreditStatus, ApiError> {
        let status = self.payments.credit_status().await?;
        debug!(
            free_available = status.free_available,
            bundle_credits = status.bundle_credits,
            "credit status refreshed"
        );
        *self.latest.write().await = Some(status.clone());
        Ok(status)
    }

    pub async fn latest(&self) -> Option<CreditStatus> {
        self.latest.read().await.clone()
    }
}
