//! Payment initialization, verification and return-leg inspection.

use std::sync::Arc;

use gw_core::error::ApiError;
use gw_core::ids::PaymentReference;
use gw_core::payment::return_url::{has_payment_params, strip_payment_params};
use gw_core::payment::{
    find_succeeded, InitializePaymentRequest, PaymentIntent, PaymentRecord, PaymentReturn,
    PaymentStatus, PaymentType,
};
use gw_core::ports::{PageLocationPort, PaymentsPort};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Succeeded(PaymentRecord),
    /// Not (yet) in the history as succeeded for this type.
    Pending,
}

pub struct PaymentBroker {
    payments: Arc<dyn PaymentsPort>,
    location: Arc<dyn PageLocationPort>,
    country_code: Option<String>,
}

impl PaymentBroker {
    pub fn new(
        payments: Arc<dyn PaymentsPort>,
        location: Arc<dyn PageLocationPort>,
        country_code: Option<String>,
    ) -> Self {
        Self {
            payments,
            location,
            country_code,
        }
    }

    pub async fn initialize(&self, payment_type: PaymentType) -> Result<PaymentIntent, ApiError> {
        let request = InitializePaymentRequest {
            country_code: self.country_code.clone(),
            payment_type,
        };
        let initialized = self.payments.initialize_payment(&request).await?;
        if initialized.authorization_url.trim().is_empty() {
            warn!(
                reference = initialized.reference.as_str(),
                "payment initialized without an authorization url"
            );
            return Err(ApiError::transport(
                "payment provider returned no authorization url",
            ));
        }
        info!(
            payment_type = payment_type.as_str(),
            reference = initialized.reference.as_str(),
            "payment initialized"
        );
        Ok(PaymentIntent {
            payment_type,
            reference: initialized.reference,
            authorization_url: initialized.authorization_url,
            status: PaymentStatus::Initialized,
        })
    }

    /// Looks the reference up in the payment history.
    ///
    /// The outcome hint in the return URL is never trusted; only a succeeded
    /// history record of the same type counts.
    pub async fn verify(
        &self,
        reference: &PaymentReference,
        payment_type: PaymentType,
    ) -> Result<VerificationOutcome, ApiError> {
        let history = self.payments.payment_history().await?;
        match find_succeeded(&history, reference, payment_type) {
            Some(record) => {
                info!(reference = reference.as_str(), "payment verified");
                Ok(VerificationOutcome::Succeeded(record.clone()))
            }
            None => {
                debug!(
                    reference = reference.as_str(),
                    records = history.len(),
                    "payment not verified yet"
                );
                Ok(VerificationOutcome::Pending)
            }
        }
    }

    /// Reads the payment parameters of the current URL and strips them from
    /// the address bar.
    pub fn inspect_return(&self) -> PaymentReturn {
        let current = self.location.current_url();
        let parsed = PaymentReturn::parse(&current);
        if has_payment_params(&current) {
            self.location.replace_url(strip_payment_params(&current));
        }
        if parsed.is_present() {
            debug!(hint = ?parsed.hint, has_reference = parsed.reference.is_some(), "payment return detected");
        }
        parsed
    }

    pub fn redirect(&self, authorization_url: &str) {
        if authorization_url.trim().is_empty() {
            warn!("refusing to redirect to an empty authorization url");
            return;
        }
        info!("redirecting to payment provider");
        self.location.navigate_away(authorization_url);
    }
}
