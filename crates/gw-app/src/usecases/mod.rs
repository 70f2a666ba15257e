//! Business logic use cases

pub mod assessment;
pub mod catalog;
pub mod credits;
pub mod evaluations;
pub mod extract_grant;
pub mod handoff;
pub mod payment;
pub mod show_assessment;

pub use assessment::{AssessmentError, AssessmentOrchestrator};
pub use catalog::{Catalog, CatalogError};
pub use credits::CreditTracker;
pub use evaluations::{EvaluationStore, WatchSettings};
pub use extract_grant::{ExtractionError, GrantExtractor};
pub use handoff::{HandoffError, PersistentHandoff};
pub use payment::{PaymentBroker, VerificationOutcome};
pub use show_assessment::ShowAssessment;
