//! Assessment orchestrator.
//!
//! Drives [`OrchestrationStateMachine`] and runs the side effects it asks
//! for. Every state change is emitted through [`OrchestrationEventPort`]
//! before the actions of that transition run, so the host always renders
//! the state the actions belong to.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::StreamExt;
use gw_core::error::{ApiError, ExtractionCategory};
use gw_core::evaluation::RefineEvaluationRequest;
use gw_core::grant::GrantContext;
use gw_core::handoff::{ResumeTicket, TicketKind};
use gw_core::ids::{EvaluationId, GrantId, PaymentReference, ProjectId};
use gw_core::orchestration::{
    Journey, OrchestrationAction, OrchestrationEvent, OrchestrationState,
    OrchestrationStateMachine, ResumeSnapshot,
};
use gw_core::payment::{PaymentEvent, PaymentType};
use gw_core::ports::{AuthSessionPort, OrchestrationEventPort};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::usecases::assessment::context::AssessmentContext;
use crate::usecases::credits::CreditTracker;
use crate::usecases::evaluations::EvaluationStore;
use crate::usecases::extract_grant::{ExtractionError, GrantExtractor};
use crate::usecases::handoff::{HandoffError, PersistentHandoff};
use crate::usecases::payment::{PaymentBroker, VerificationOutcome};

/// Errors produced by the assessment orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    /// A submission-like event arrived while another one was in flight.
    #[error("another assessment step is already in progress")]
    Busy,
}

pub struct AssessmentOrchestrator {
    context: Arc<AssessmentContext>,

    extractor: Arc<GrantExtractor>,
    handoff: Arc<PersistentHandoff>,
    credits: Arc<CreditTracker>,
    broker: Arc<PaymentBroker>,
    evaluations: Arc<EvaluationStore>,
    auth: Arc<dyn AuthSessionPort>,
    events: Arc<dyn OrchestrationEventPort>,
}

impl AssessmentOrchestrator {
    pub fn new(
        extractor: Arc<GrantExtractor>,
        handoff: Arc<PersistentHandoff>,
        credits: Arc<CreditTracker>,
        broker: Arc<PaymentBroker>,
        evaluations: Arc<EvaluationStore>,
        auth: Arc<dyn AuthSessionPort>,
        events: Arc<dyn OrchestrationEventPort>,
    ) -> Self {
        Self {
            context: AssessmentContext::default().arc(),
            extractor,
            handoff,
            credits,
            broker,
            evaluations,
            auth,
            events,
        }
    }

    pub async fn state(&self) -> OrchestrationState {
        self.context.get_state().await
    }

    /// Inspects the page on load: payment return parameters and persisted
    /// tickets decide where the flow resumes.
    pub async fn mount(&self) -> Result<OrchestrationState, AssessmentError> {
        let returned = self.broker.inspect_return();
        let event = match self.resume_snapshot(returned.reference).await {
            Ok(snapshot) => OrchestrationEvent::Resumed { snapshot },
            Err(err) => {
                error!(error = %err, "resume tickets unreadable");
                OrchestrationEvent::Fault {
                    message: err.to_string(),
                }
            }
        };
        self.dispatch(event).await
    }

    async fn resume_snapshot(
        &self,
        url_reference: Option<PaymentReference>,
    ) -> Result<ResumeSnapshot, HandoffError> {
        let landing = self.handoff.peek_landing_grant().await?;
        let from_landing = landing.is_some();

        let pending = match self.handoff.peek_evaluation().await? {
            Some(stored) => Some((
                Journey::evaluation(stored.request, from_landing),
                stored.payment_type,
                TicketKind::Evaluation,
            )),
            None => self.handoff.peek_refinement().await?.map(|evaluation_id| {
                (
                    Journey::refinement(evaluation_id),
                    PaymentType::Refinement,
                    TicketKind::Refinement,
                )
            }),
        };

        if let Some((journey, payment_type, kind)) = pending {
            let reference = match url_reference.clone() {
                Some(reference) => Some(reference),
                None => self.handoff.peek_reference(kind).await?,
            };
            match reference {
                Some(reference) => {
                    info!(?kind, reference = reference.as_str(), "resuming payment return");
                    return Ok(ResumeSnapshot::PaymentReturn {
                        journey,
                        payment_type,
                        reference,
                    });
                }
                None => debug!(?kind, "resume ticket without a payment reference ignored"),
            }
        } else if url_reference.is_some() {
            warn!("payment reference in url without a resume ticket");
        }

        Ok(match landing {
            Some(ResumeTicket::PendingLandingGrant {
                grant_url,
                grant_name,
            }) => ResumeSnapshot::LandingGrant {
                grant_url,
                grant_name,
            },
            _ => ResumeSnapshot::Fresh,
        })
    }

    pub async fn begin_assessment(
        &self,
        project_id: Option<ProjectId>,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::BeginAssessment { project_id })
            .await
    }

    pub async fn begin_refinement(
        &self,
        evaluation_id: EvaluationId,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::BeginRefinement { evaluation_id })
            .await
    }

    pub async fn select_project(
        &self,
        project_id: Option<ProjectId>,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::SelectProject { project_id })
            .await
    }

    pub async fn choose_indexed(&self) -> Result<OrchestrationState, AssessmentError> {
        self.extractor.cancel();
        self.dispatch(OrchestrationEvent::ChooseIndexed).await
    }

    pub async fn choose_url_entry(&self) -> Result<OrchestrationState, AssessmentError> {
        self.extractor.cancel();
        self.dispatch(OrchestrationEvent::ChooseUrlEntry).await
    }

    /// Starts extraction of `url`. Resolves once extraction finished, failed
    /// or was cancelled.
    pub async fn submit_url(
        &self,
        url: impl Into<String>,
        name: Option<String>,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::SubmitUrl {
            url: url.into(),
            name,
        })
        .await
    }

    pub async fn enter_manually(&self) -> Result<OrchestrationState, AssessmentError> {
        self.extractor.cancel();
        self.dispatch(OrchestrationEvent::EnterManually).await
    }

    pub async fn edit_grant(
        &self,
        context: GrantContext,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::EditGrant { context }).await
    }

    pub async fn submit_grant(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::SubmitGrant).await
    }

    pub async fn skip_with_defaults(&self) -> Result<OrchestrationState, AssessmentError> {
        self.extractor.cancel();
        self.dispatch(OrchestrationEvent::SkipWithDefaults).await
    }

    pub async fn pick_grant(
        &self,
        grant_id: GrantId,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::PickGrant { grant_id })
            .await
    }

    pub async fn close_composer(&self) -> Result<OrchestrationState, AssessmentError> {
        self.extractor.cancel();
        self.dispatch(OrchestrationEvent::CloseComposer).await
    }

    pub async fn choose_payment_type(
        &self,
        payment_type: PaymentType,
    ) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(PaymentEvent::ChooseType { payment_type }.into())
            .await
    }

    /// Confirms the paywall: persists the ticket, initializes the payment and
    /// leaves the page for the processor.
    pub async fn confirm_payment(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(PaymentEvent::Confirm.into()).await
    }

    pub async fn cancel_payment(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(PaymentEvent::Cancel.into()).await
    }

    pub async fn retry_verification(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(PaymentEvent::RetryVerification.into()).await
    }

    /// Hides the pending-payment banner. The ticket stays for a later reload.
    pub async fn dismiss_payment(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(PaymentEvent::Dismiss.into()).await
    }

    pub async fn abandon_payment(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(PaymentEvent::Abandon.into()).await
    }

    pub async fn restart(&self) -> Result<OrchestrationState, AssessmentError> {
        self.dispatch(OrchestrationEvent::Restart).await
    }

    /// Stops following the current evaluation. Does not wait for the
    /// dispatch lock; the running watch observes the cancellation and
    /// settles the state itself.
    pub async fn detach(&self) {
        if self.context.cancel_watch().await {
            info!("evaluation watch detached");
        }
    }

    async fn dispatch(
        &self,
        event: OrchestrationEvent,
    ) -> Result<OrchestrationState, AssessmentError> {
        let _dispatch_guard = if event.is_conflicting() {
            self.context.try_acquire_dispatch_lock().map_err(|_| {
                warn!(event = event.name(), "assessment dispatch rejected: busy");
                AssessmentError::Busy
            })?
        } else {
            self.context.acquire_dispatch_lock().await
        };

        let span = info_span!("usecase.assessment_orchestrator.dispatch", event = event.name());
        async {
            let mut current = self.context.get_state().await;
            let mut pending_events = VecDeque::from([event]);

            while let Some(event) = pending_events.pop_front() {
                let from = current.clone();
                let event_name = event.name();
                let (next, actions) = OrchestrationStateMachine::transition(current, event);
                info!(from = ?from, to = ?next, event = event_name, "assessment state transition");
                if next != from {
                    self.set_state_and_emit(next.clone()).await;
                }
                current = next;
                pending_events.extend(self.execute_actions(actions).await);
            }

            Ok(current)
        }
        .instrument(span)
        .await
    }

    async fn set_state_and_emit(&self, state: OrchestrationState) {
        self.context.set_state(state.clone()).await;
        self.events.emit_state_changed(state).await;
    }

    /// Runs actions in order and collects their follow-up events. A `Fault`
    /// aborts the rest of the batch.
    async fn execute_actions(&self, actions: Vec<OrchestrationAction>) -> Vec<OrchestrationEvent> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, "assessment executing action");
            if let Some(event) = self.execute_action(action).await {
                let fault = matches!(event, OrchestrationEvent::Fault { .. });
                follow_up_events.push(event);
                if fault {
                    break;
                }
            }
        }
        follow_up_events
    }

    async fn execute_action(&self, action: OrchestrationAction) -> Option<OrchestrationEvent> {
        match action {
            OrchestrationAction::ExtractGrant { url, name } => {
                Some(match self.extractor.extract(&url, name.as_deref()).await {
                    Ok(context) => OrchestrationEvent::ExtractionSucceeded { context },
                    Err(ExtractionError::Cancelled) => OrchestrationEvent::ExtractionCancelled,
                    Err(ExtractionError::Failed { category, source }) => {
                        if source.is_auth() {
                            self.auth.session_expired().await;
                        }
                        OrchestrationEvent::ExtractionFailed { category }
                    }
                    Err(ExtractionError::InvalidUrl) => OrchestrationEvent::ExtractionFailed {
                        category: ExtractionCategory::Other,
                    },
                })
            }
            OrchestrationAction::CancelExtraction => {
                self.extractor.cancel();
                None
            }
            OrchestrationAction::LoadCreditStatus => Some(match self.credits.refresh().await {
                Ok(status) => OrchestrationEvent::CreditStatusLoaded { status },
                Err(error) => OrchestrationEvent::CreditStatusFailed { error },
            }),
            OrchestrationAction::PersistTicket(ticket) => self
                .handoff
                .stash(&ticket)
                .await
                .err()
                .map(|err| fault("persist resume ticket", err)),
            OrchestrationAction::InitializePayment { payment_type } => {
                Some(match self.broker.initialize(payment_type).await {
                    Ok(intent) => PaymentEvent::Initialized {
                        authorization_url: intent.authorization_url,
                        reference: intent.reference,
                    }
                    .into(),
                    Err(error) => {
                        warn!(error = %error, "payment initialization failed");
                        if error.is_auth() {
                            self.auth.session_expired().await;
                        }
                        PaymentEvent::InitializationFailed {
                            message: error.message,
                        }
                        .into()
                    }
                })
            }
            OrchestrationAction::PersistFallbackReference { ticket, reference } => self
                .handoff
                .stash_reference(ticket, &reference)
                .await
                .err()
                .map(|err| fault("persist payment reference", err)),
            OrchestrationAction::Redirect { authorization_url } => {
                self.broker.redirect(&authorization_url);
                None
            }
            OrchestrationAction::VerifyPayment {
                payment_type,
                reference,
            } => Some(
                match self.broker.verify(&reference, payment_type).await {
                    Ok(VerificationOutcome::Succeeded(_)) => PaymentEvent::VerificationSucceeded,
                    Ok(VerificationOutcome::Pending) => {
                        PaymentEvent::VerificationPending { message: None }
                    }
                    Err(error) => {
                        warn!(error = %error, "payment verification failed");
                        if error.is_auth() {
                            self.auth.session_expired().await;
                        }
                        PaymentEvent::VerificationPending {
                            message: Some(error.message),
                        }
                    }
                }
                .into(),
            ),
            OrchestrationAction::CreateEvaluation(request) => {
                let reference = request.payment_reference.clone();
                if let Some(event) = self.guard_redeemed(reference.as_ref()).await {
                    return Some(event);
                }
                Some(match self.evaluations.create(&request).await {
                    Ok(evaluation) => {
                        self.redeem(reference).await;
                        OrchestrationEvent::EvaluationCreated {
                            evaluation_id: evaluation.id,
                            terminal: evaluation.is_terminal(),
                        }
                    }
                    Err(error) => submission_failed(error),
                })
            }
            OrchestrationAction::RefineEvaluation {
                evaluation_id,
                payment_reference,
            } => {
                if let Some(event) = self.guard_redeemed(Some(&payment_reference)).await {
                    return Some(event);
                }
                let request = RefineEvaluationRequest {
                    evaluation_id,
                    payment_reference,
                };
                Some(match self.evaluations.refine(&request).await {
                    Ok(evaluation) => {
                        self.redeem(Some(request.payment_reference)).await;
                        OrchestrationEvent::EvaluationCreated {
                            evaluation_id: evaluation.id,
                            terminal: evaluation.is_terminal(),
                        }
                    }
                    Err(error) => submission_failed(error),
                })
            }
            OrchestrationAction::ClearTickets { kinds } => {
                for kind in kinds {
                    if let Err(err) = self.handoff.clear(kind).await {
                        warn!(?kind, error = %err, "failed to clear resume ticket");
                    }
                }
                None
            }
            OrchestrationAction::RefreshCredits => {
                if let Err(err) = self.credits.refresh().await {
                    warn!(error = %err, "credit status refresh failed");
                }
                None
            }
            OrchestrationAction::WatchEvaluation { evaluation_id } => {
                Some(self.watch(evaluation_id).await)
            }
            OrchestrationAction::ReportSessionExpired => {
                self.auth.session_expired().await;
                None
            }
        }
    }

    async fn guard_redeemed(
        &self,
        reference: Option<&PaymentReference>,
    ) -> Option<OrchestrationEvent> {
        let reference = reference?;
        if self.context.is_redeemed(reference).await {
            error!(
                reference = reference.as_str(),
                "payment reference already redeemed"
            );
            return Some(OrchestrationEvent::Fault {
                message: format!("payment reference {} was already used", reference.as_str()),
            });
        }
        None
    }

    async fn redeem(&self, reference: Option<PaymentReference>) {
        if let Some(reference) = reference {
            self.context.mark_redeemed(reference).await;
        }
    }

    /// Follows `evaluation_id` until it turns terminal, fails, is detached
    /// or the overlay ceiling elapses.
    async fn watch(&self, evaluation_id: EvaluationId) -> OrchestrationEvent {
        let token = self.context.begin_watch().await;
        let ceiling = self.evaluations.settings().overlay_ceiling;
        let mut snapshots = self.evaluations.watch(evaluation_id);

        let drive = async {
            while let Some(snapshot) = snapshots.next().await {
                match snapshot {
                    Ok(evaluation) if evaluation.is_terminal() => {
                        return Some(Ok(evaluation.id));
                    }
                    Ok(_) => continue,
                    Err(error) => return Some(Err(error)),
                }
            }
            None
        };

        let span = info_span!("usecase.assessment_orchestrator.watch", evaluation_id = %evaluation_id);
        let event = async {
            tokio::select! {
                _ = token.cancelled() => OrchestrationEvent::WatchDetached { evaluation_id },
                outcome = tokio::time::timeout(ceiling, drive) => match outcome {
                    Ok(Some(Ok(_))) => OrchestrationEvent::EvaluationCompleted { evaluation_id },
                    Ok(Some(Err(error))) => OrchestrationEvent::WatchFailed { evaluation_id, error },
                    Ok(None) => {
                        debug!("evaluation watch ended without a terminal snapshot");
                        OrchestrationEvent::WatchDetached { evaluation_id }
                    }
                    Err(_) => {
                        info!(ceiling_secs = ceiling.as_secs(), "overlay ceiling elapsed");
                        self.evaluations.release_overlay(evaluation_id).await;
                        OrchestrationEvent::OverlayCeilingElapsed { evaluation_id }
                    }
                },
            }
        }
        .instrument(span)
        .await;

        self.context.end_watch().await;
        event
    }
}

fn submission_failed(error: ApiError) -> OrchestrationEvent {
    if error.is_payment_required() {
        info!(message = %error.message, "server requires payment");
    } else {
        warn!(error = %error, "submission failed");
    }
    OrchestrationEvent::SubmissionFailed { error }
}

fn fault(step: &str, err: HandoffError) -> OrchestrationEvent {
    error!(step, error = %err, "assessment action failed");
    OrchestrationEvent::Fault {
        message: format!("{step}: {err}"),
    }
}
