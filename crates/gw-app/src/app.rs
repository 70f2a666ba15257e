use std::sync::Arc;

use crate::usecases::{
    AssessmentOrchestrator, Catalog, CreditTracker, EvaluationStore, GrantExtractor,
    PaymentBroker, PersistentHandoff, ShowAssessment, WatchSettings,
};
use crate::AppDeps;

/// Resolved runtime settings the use cases need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub watch: WatchSettings,
    /// Sent with payment initialization for local-currency pricing.
    pub country_code: Option<String>,
}

/// The application runtime: every use case wired over one set of ports.
pub struct App {
    pub orchestrator: Arc<AssessmentOrchestrator>,
    /// Used by the landing page to hand a grant over before sign-in.
    pub handoff: Arc<PersistentHandoff>,
    pub evaluations: Arc<EvaluationStore>,
    pub credits: Arc<CreditTracker>,
    pub catalog: Arc<Catalog>,
    pub show_assessment: Arc<ShowAssessment>,
}

impl App {
    /// This constructor signature is the dependency manifest.
    pub fn new(deps: AppDeps, settings: AppSettings) -> Self {
        let extractor = Arc::new(GrantExtractor::new(deps.grants.clone()));
        let handoff = Arc::new(PersistentHandoff::new(deps.handoff_store));
        let credits = Arc::new(CreditTracker::new(deps.payments.clone()));
        let broker = Arc::new(PaymentBroker::new(
            deps.payments.clone(),
            deps.location,
            settings.country_code,
        ));
        let evaluations = Arc::new(EvaluationStore::new(deps.evaluations, settings.watch));

        let orchestrator = Arc::new(AssessmentOrchestrator::new(
            extractor,
            handoff.clone(),
            credits.clone(),
            broker,
            evaluations.clone(),
            deps.auth,
            deps.events,
        ));
        let catalog = Arc::new(Catalog::new(
            deps.projects.clone(),
            deps.grants,
            deps.payments,
            deps.dashboard,
        ));
        let show_assessment = Arc::new(ShowAssessment::new(evaluations.clone(), deps.projects));

        Self {
            orchestrator,
            handoff,
            evaluations,
            credits,
            catalog,
            show_assessment,
        }
    }
}
