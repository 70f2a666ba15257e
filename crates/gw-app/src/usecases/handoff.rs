//! Typed access to the storage that survives a full-page redirect.
//!
//! Entries are only removed by an explicit `take` or `clear`. Reads of a
//! corrupt entry fail and leave the entry where it is.

use std::sync::Arc;

use gw_core::evaluation::EvaluationRequest;
use gw_core::handoff::{
    ResumeTicket, StoredEvaluation, TicketKind, PENDING_EVALUATION_KEY, PENDING_GRANT_NAME_KEY,
    PENDING_GRANT_URL_KEY, PENDING_PAYMENT_TYPE_KEY, PENDING_REFINEMENT_EVALUATION_ID_KEY,
};
use gw_core::ids::{EvaluationId, PaymentReference};
use gw_core::payment::PaymentType;
use gw_core::ports::HandoffStorePort;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("handoff store failed: {0}")]
    Store(#[source] anyhow::Error),
    #[error("handoff entry `{key}` is corrupt: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

pub struct PersistentHandoff {
    store: Arc<dyn HandoffStorePort>,
}

impl PersistentHandoff {
    pub fn new(store: Arc<dyn HandoffStorePort>) -> Self {
        Self { store }
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), HandoffError> {
        self.store.put(key, value).await.map_err(HandoffError::Store)
    }

    /// Reads and removes `key` in one step.
    pub async fn take(&self, key: &str) -> Result<Option<String>, HandoffError> {
        self.store.take(key).await.map_err(HandoffError::Store)
    }

    pub async fn peek(&self, key: &str) -> Result<Option<String>, HandoffError> {
        self.store.peek(key).await.map_err(HandoffError::Store)
    }

    pub async fn stash(&self, ticket: &ResumeTicket) -> Result<(), HandoffError> {
        debug!(kind = ?ticket.kind(), "stashing resume ticket");
        match ticket {
            ResumeTicket::PendingEvaluation {
                request,
                payment_type,
            } => self.stash_evaluation(request, *payment_type).await,
            ResumeTicket::PendingRefinement { evaluation_id } => {
                self.stash_refinement(*evaluation_id).await
            }
            ResumeTicket::PendingLandingGrant {
                grant_url,
                grant_name,
            } => {
                self.stash_landing_grant(grant_url, grant_name.as_deref())
                    .await
            }
        }
    }

    pub async fn stash_evaluation(
        &self,
        request: &EvaluationRequest,
        payment_type: PaymentType,
    ) -> Result<(), HandoffError> {
        let json = serde_json::to_string(request).map_err(|err| HandoffError::Corrupt {
            key: PENDING_EVALUATION_KEY,
            reason: err.to_string(),
        })?;
        self.put(PENDING_PAYMENT_TYPE_KEY, payment_type.as_str())
            .await?;
        self.put(PENDING_EVALUATION_KEY, &json).await
    }

    pub async fn stash_refinement(&self, evaluation_id: EvaluationId) -> Result<(), HandoffError> {
        self.put(
            PENDING_REFINEMENT_EVALUATION_ID_KEY,
            &evaluation_id.to_string(),
        )
        .await
    }

    pub async fn stash_landing_grant(
        &self,
        grant_url: &str,
        grant_name: Option<&str>,
    ) -> Result<(), HandoffError> {
        self.put(PENDING_GRANT_URL_KEY, grant_url).await?;
        match grant_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.put(PENDING_GRANT_NAME_KEY, name).await,
            None => self
                .store
                .remove(PENDING_GRANT_NAME_KEY)
                .await
                .map_err(HandoffError::Store),
        }
    }

    /// Stores the fallback reference for a payment-bearing ticket.
    pub async fn stash_reference(
        &self,
        kind: TicketKind,
        reference: &PaymentReference,
    ) -> Result<(), HandoffError> {
        match kind.reference_key() {
            Some(key) => self.put(key, reference.as_str()).await,
            None => Ok(()),
        }
    }

    /// Reads the pending evaluation. A ticket without a stored payment type
    /// was bought as a standard assessment.
    pub async fn peek_evaluation(&self) -> Result<Option<StoredEvaluation>, HandoffError> {
        let Some(raw) = self.peek(PENDING_EVALUATION_KEY).await? else {
            return Ok(None);
        };
        let request: EvaluationRequest =
            serde_json::from_str(&raw).map_err(|err| HandoffError::Corrupt {
                key: PENDING_EVALUATION_KEY,
                reason: err.to_string(),
            })?;
        let payment_type = match self.peek(PENDING_PAYMENT_TYPE_KEY).await? {
            None => PaymentType::Standard,
            Some(raw) => PaymentType::parse(&raw).ok_or_else(|| HandoffError::Corrupt {
                key: PENDING_PAYMENT_TYPE_KEY,
                reason: format!("unknown payment type `{raw}`"),
            })?,
        };
        Ok(Some(StoredEvaluation {
            request,
            payment_type,
        }))
    }

    pub async fn peek_refinement(&self) -> Result<Option<EvaluationId>, HandoffError> {
        let Some(raw) = self.peek(PENDING_REFINEMENT_EVALUATION_ID_KEY).await? else {
            return Ok(None);
        };
        raw.parse()
            .map(Some)
            .map_err(|err: std::num::ParseIntError| HandoffError::Corrupt {
                key: PENDING_REFINEMENT_EVALUATION_ID_KEY,
                reason: err.to_string(),
            })
    }

    pub async fn peek_landing_grant(&self) -> Result<Option<ResumeTicket>, HandoffError> {
        let Some(grant_url) = self.peek(PENDING_GRANT_URL_KEY).await? else {
            return Ok(None);
        };
        let grant_name = self.peek(PENDING_GRANT_NAME_KEY).await?;
        Ok(Some(ResumeTicket::PendingLandingGrant {
            grant_url,
            grant_name,
        }))
    }

    pub async fn peek_reference(
        &self,
        kind: TicketKind,
    ) -> Result<Option<PaymentReference>, HandoffError> {
        let Some(key) = kind.reference_key() else {
            return Ok(None);
        };
        Ok(self
            .peek(key)
            .await?
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PaymentReference::from))
    }

    /// Removes every key of the ticket kind.
    pub async fn clear(&self, kind: TicketKind) -> Result<(), HandoffError> {
        for key in kind.keys() {
            self.store.remove(key).await.map_err(HandoffError::Store)?;
        }
        debug!(?kind, "resume ticket cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_core::ids::GrantId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait::async_trait]
    impl HandoffStorePort for MapStore {
        async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn take(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.entries.lock().unwrap().remove(key))
        }

        async fn peek(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }
    }

    fn handoff() -> (Arc<MapStore>, PersistentHandoff) {
        let store = Arc::new(MapStore::default());
        (store.clone(), PersistentHandoff::new(store))
    }

    #[tokio::test]
    async fn test_evaluation_ticket_round_trips_with_payment_type() {
        let (_, handoff) = handoff();
        let request = EvaluationRequest::for_indexed(GrantId::new(42), None);

        handoff
            .stash_evaluation(&request, PaymentType::Bundle)
            .await
            .unwrap();

        let stored = handoff.peek_evaluation().await.unwrap().unwrap();
        assert_eq!(stored.request, request);
        assert_eq!(stored.payment_type, PaymentType::Bundle);
    }

    #[tokio::test]
    async fn test_evaluation_ticket_is_stored_as_flat_request() {
        let (store, handoff) = handoff();
        let request = EvaluationRequest::for_indexed(GrantId::new(42), None);

        handoff
            .stash_evaluation(&request, PaymentType::Bundle)
            .await
            .unwrap();

        let raw = store.peek(PENDING_EVALUATION_KEY).await.unwrap().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&raw).unwrap(),
            serde_json::json!({"grant_id": 42})
        );
        assert_eq!(
            store.peek(PENDING_PAYMENT_TYPE_KEY).await.unwrap().as_deref(),
            Some("bundle")
        );
    }

    #[tokio::test]
    async fn test_bare_request_without_payment_type_reads_as_standard() {
        let (store, handoff) = handoff();
        store
            .put(PENDING_EVALUATION_KEY, r#"{"grant_id":42}"#)
            .await
            .unwrap();

        let stored = handoff.peek_evaluation().await.unwrap().unwrap();

        assert_eq!(
            stored.request,
            EvaluationRequest::for_indexed(GrantId::new(42), None)
        );
        assert_eq!(stored.payment_type, PaymentType::Standard);
    }

    #[tokio::test]
    async fn test_take_is_read_once() {
        let (_, handoff) = handoff();
        handoff.put("k", "v").await.unwrap();

        assert_eq!(handoff.take("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(handoff.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_reported_and_kept() {
        let (store, handoff) = handoff();
        store
            .put(PENDING_REFINEMENT_EVALUATION_ID_KEY, "seven")
            .await
            .unwrap();

        let err = handoff.peek_refinement().await.unwrap_err();
        assert!(matches!(err, HandoffError::Corrupt { .. }));
        assert!(store
            .peek(PENDING_REFINEMENT_EVALUATION_ID_KEY)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_clear_removes_reference_with_ticket() {
        let (store, handoff) = handoff();
        handoff.stash_refinement(EvaluationId::new(7)).await.unwrap();
        handoff
            .stash_reference(TicketKind::Refinement, &"r-1".into())
            .await
            .unwrap();

        handoff.clear(TicketKind::Refinement).await.unwrap();

        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_landing_grant_without_name() {
        let (_, handoff) = handoff();
        handoff
            .stash(&ResumeTicket::PendingLandingGrant {
                grant_url: "https://foo/grant".to_string(),
                grant_name: None,
            })
            .await
            .unwrap();

        let ticket = handoff.peek_landing_grant().await.unwrap();
        assert_eq!(
            ticket,
            Some(ResumeTicket::PendingLandingGrant {
                grant_url: "https://foo/grant".to_string(),
                grant_name: None
            })
        );
    }
}
