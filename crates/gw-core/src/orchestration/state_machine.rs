//! Assessment orchestration state machine.
//!
//! Composes grant composition, the credit policy and the payment broker into
//! one pure transition function. Payment events are delegated to
//! [`PaymentStateMachine`] and its actions lifted into orchestration actions.

use crate::credits::{CreditDecision, CreditPolicy, RequestKind};
use crate::error::{ApiError, ApiErrorKind, FailureKind};
use crate::evaluation::{EvaluationRequest, GrantTarget};
use crate::grant::{parse_source_url, GrantContext};
use crate::handoff::{ResumeTicket, TicketKind};
use crate::ids::{EvaluationId, PaymentReference, ProjectId};
use crate::payment::{
    PaymentAction, PaymentEvent, PaymentFlowState, PaymentStateMachine, PaymentType,
};

use super::{
    ComposeError, ComposeStep, Journey, JourneyKind, OrchestrationAction, OrchestrationEvent,
    OrchestrationState, ResumeSnapshot,
};

type Transition = (OrchestrationState, Vec<OrchestrationAction>);

/// Pure assessment state machine.
pub struct OrchestrationStateMachine;

impl OrchestrationStateMachine {
    pub fn transition(state: OrchestrationState, event: OrchestrationEvent) -> Transition {
        use OrchestrationEvent as E;
        use OrchestrationState as S;

        match (state, event) {
            (_, E::Fault { message }) => (
                S::Failed {
                    kind: FailureKind::fatal(message),
                    evaluation_id: None,
                },
                Vec::new(),
            ),
            (S::Start, E::Resumed { snapshot }) => resume(snapshot),
            (
                S::Start | S::Terminal { .. } | S::OverlayReleased { .. } | S::Failed { .. },
                E::BeginAssessment { project_id },
            ) => (
                composing(project_id, false, ComposeStep::entering("", None)),
                Vec::new(),
            ),
            (
                S::Start | S::Terminal { .. } | S::OverlayReleased { .. } | S::Failed { .. },
                E::BeginRefinement { evaluation_id },
            ) => (
                S::Deciding {
                    journey: Journey::refinement(evaluation_id),
                },
                vec![OrchestrationAction::LoadCreditStatus],
            ),
            (
                S::Composing {
                    from_landing, step, ..
                },
                E::SelectProject { project_id },
            ) => (composing(project_id, from_landing, step), Vec::new()),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step,
                },
                E::ChooseIndexed,
            ) => (
                composing(
                    project_id,
                    from_landing,
                    ComposeStep::PickingIndexed { error: None },
                ),
                cancel_if_extracting(&step),
            ),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step,
                },
                E::ChooseUrlEntry,
            ) => (
                composing(project_id, from_landing, ComposeStep::entering("", None)),
                cancel_if_extracting(&step),
            ),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::EnteringUrl { .. },
                },
                E::SubmitUrl { url, name },
            ) => {
                let url = url.trim().to_string();
                if parse_source_url(&url).is_none() {
                    return (
                        composing(
                            project_id,
                            from_landing,
                            ComposeStep::EnteringUrl {
                                url,
                                name,
                                error: Some(ComposeError::InvalidUrl),
                            },
                        ),
                        Vec::new(),
                    );
                }
                (
                    composing(
                        project_id,
                        from_landing,
                        ComposeStep::Extracting {
                            url: url.clone(),
                            name: name.clone(),
                        },
                    ),
                    vec![OrchestrationAction::ExtractGrant { url, name }],
                )
            }
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::EnteringUrl { url, name, .. },
                },
                E::EnterManually,
            ) => (enter_manually(project_id, from_landing, url, name), Vec::new()),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::Extracting { url, name },
                },
                E::EnterManually,
            ) => (
                enter_manually(project_id, from_landing, url, name),
                vec![OrchestrationAction::CancelExtraction],
            ),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::Extracting { url, name },
                },
                E::ExtractionSucceeded { context },
            ) => {
                let mut context = context.normalized();
                if !context.has_name() {
                    context.name = name;
                }
                (
                    composing(
                        project_id,
                        from_landing,
                        ComposeStep::ReviewingExtracted {
                            url,
                            context,
                            error: None,
                        },
                    ),
                    Vec::new(),
                )
            }
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::Extracting { url, name },
                },
                E::ExtractionFailed { category },
            ) => (
                composing(
                    project_id,
                    from_landing,
                    ComposeStep::EnteringUrl {
                        url,
                        name,
                        error: Some(ComposeError::Extraction { category }),
                    },
                ),
                Vec::new(),
            ),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::Extracting { url, name },
                },
                E::ExtractionCancelled,
            ) => (
                composing(project_id, from_landing, ComposeStep::entering(url, name)),
                Vec::new(),
            ),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::ReviewingExtracted { url, .. },
                },
                E::EditGrant { context },
            ) => (
                composing(
                    project_id,
                    from_landing,
                    ComposeStep::ReviewingExtracted {
                        url,
                        context,
                        error: None,
                    },
                ),
                Vec::new(),
            ),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::ReviewingExtracted { url, context, .. },
                },
                E::SubmitGrant,
            ) => {
                if !context.has_name() {
                    return (
                        composing(
                            project_id,
                            from_landing,
                            ComposeStep::ReviewingExtracted {
                                url,
                                context,
                                error: Some(ComposeError::MissingGrantName),
                            },
                        ),
                        Vec::new(),
                    );
                }
                let request = EvaluationRequest::for_url(url, context, project_id);
                decide(Journey::evaluation(request, from_landing))
            }
            (
                S::Composing {
                    project_id,
                    from_landing: true,
                    step,
                },
                E::SkipWithDefaults,
            ) => skip_with_defaults(project_id, step),
            (
                S::Composing {
                    project_id,
                    from_landing,
                    step: ComposeStep::PickingIndexed { .. },
                },
                E::PickGrant { grant_id },
            ) => {
                let request = EvaluationRequest::for_indexed(grant_id, project_id);
                decide(Journey::evaluation(request, from_landing))
            }
            (
                S::Composing {
                    from_landing, step, ..
                },
                E::CloseComposer,
            ) => {
                let mut actions = cancel_if_extracting(&step);
                if from_landing {
                    actions.push(OrchestrationAction::ClearTickets {
                        kinds: vec![TicketKind::Landing],
                    });
                }
                (S::Start, actions)
            }
            (S::Deciding { journey }, E::CreditStatusLoaded { status }) => {
                let kind = match journey.kind {
                    JourneyKind::Evaluation(_) => RequestKind::for_evaluation(&status),
                    JourneyKind::Refinement { .. } => RequestKind::Refinement,
                };
                match CreditPolicy::decide(&status, kind) {
                    CreditDecision::UseFree | CreditDecision::UseBundleCredit => {
                        submit(journey, None)
                    }
                    CreditDecision::RequirePayment(payment_type) => {
                        start_payment(journey, payment_type)
                    }
                }
            }
            (S::Deciding { .. }, E::CreditStatusFailed { error }) => fail(&error, None),
            (S::AwaitingPayment { journey, payment }, E::Payment(event)) => {
                payment_step(journey, payment, event)
            }
            (
                S::Submitting { release, .. },
                E::EvaluationCreated {
                    evaluation_id,
                    terminal,
                },
            ) => {
                let mut actions = Vec::new();
                if !release.is_empty() {
                    actions.push(OrchestrationAction::ClearTickets { kinds: release });
                }
                actions.push(OrchestrationAction::RefreshCredits);
                if terminal {
                    (S::Terminal { evaluation_id }, actions)
                } else {
                    actions.push(OrchestrationAction::WatchEvaluation { evaluation_id });
                    (S::Watching { evaluation_id }, actions)
                }
            }
            (
                S::Submitting {
                    journey,
                    payment_reference,
                    ..
                },
                E::SubmissionFailed { error },
            ) => submission_failed(journey, payment_reference, error),
            (S::Watching { evaluation_id }, E::EvaluationCompleted { evaluation_id: done })
                if evaluation_id == done =>
            {
                (S::Terminal { evaluation_id }, Vec::new())
            }
            (
                S::Watching { evaluation_id },
                E::OverlayCeilingElapsed {
                    evaluation_id: released,
                },
            ) if evaluation_id == released => (S::OverlayReleased { evaluation_id }, Vec::new()),
            (
                S::Watching { evaluation_id },
                E::WatchFailed {
                    evaluation_id: failed,
                    error,
                },
            ) if evaluation_id == failed => fail(&error, Some(evaluation_id)),
            (
                S::Watching { evaluation_id },
                E::WatchDetached {
                    evaluation_id: detached,
                },
            ) if evaluation_id == detached => (S::Start, Vec::new()),
            (
                S::Start | S::Terminal { .. } | S::OverlayReleased { .. } | S::Failed { .. },
                E::Restart,
            ) => (S::Start, Vec::new()),
            (state, _event) => (state, Vec::new()),
        }
    }
}

fn composing(
    project_id: Option<ProjectId>,
    from_landing: bool,
    step: ComposeStep,
) -> OrchestrationState {
    OrchestrationState::Composing {
        project_id,
        from_landing,
        step,
    }
}

fn cancel_if_extracting(step: &ComposeStep) -> Vec<OrchestrationAction> {
    match step {
        ComposeStep::Extracting { .. } => vec![OrchestrationAction::CancelExtraction],
        _ => Vec::new(),
    }
}

fn resume(snapshot: ResumeSnapshot) -> Transition {
    match snapshot {
        ResumeSnapshot::Fresh => (OrchestrationState::Start, Vec::new()),
        ResumeSnapshot::PaymentReturn {
            journey,
            payment_type,
            reference,
        } => {
            let (payment, actions) = PaymentStateMachine::transition(
                PaymentFlowState::Idle,
                PaymentEvent::Returned {
                    payment_type,
                    reference,
                },
            );
            lift(journey, payment, actions)
        }
        ResumeSnapshot::LandingGrant {
            grant_url,
            grant_name,
        } => (
            composing(None, true, ComposeStep::entering(grant_url, grant_name)),
            Vec::new(),
        ),
    }
}

fn enter_manually(
    project_id: Option<ProjectId>,
    from_landing: bool,
    url: String,
    name: Option<String>,
) -> OrchestrationState {
    if parse_source_url(&url).is_none() {
        return composing(
            project_id,
            from_landing,
            ComposeStep::EnteringUrl {
                url,
                name,
                error: Some(ComposeError::InvalidUrl),
            },
        );
    }
    let context = name.map(GrantContext::named).unwrap_or_default();
    composing(
        project_id,
        from_landing,
        ComposeStep::ReviewingExtracted {
            url: url.trim().to_string(),
            context,
            error: None,
        },
    )
}

/// Landing handoff shortcut: the URL is evaluated as-is, without a project
/// and without requiring a grant name.
fn skip_with_defaults(project_id: Option<ProjectId>, step: ComposeStep) -> Transition {
    let mut actions = cancel_if_extracting(&step);
    let (url, context) = match step {
        ComposeStep::EnteringUrl { url, name, .. } | ComposeStep::Extracting { url, name } => {
            (url, name.map(GrantContext::named).unwrap_or_default())
        }
        ComposeStep::ReviewingExtracted { url, context, .. } => (url, context),
        step @ ComposeStep::PickingIndexed { .. } => {
            return (composing(project_id, true, step), Vec::new());
        }
    };
    if parse_source_url(&url).is_none() {
        return (
            composing(
                project_id,
                true,
                ComposeStep::EnteringUrl {
                    url,
                    name: context.name,
                    error: Some(ComposeError::InvalidUrl),
                },
            ),
            actions,
        );
    }
    let request = EvaluationRequest::for_url(url.trim(), context, None);
    let (state, decide_actions) = decide(Journey::evaluation(request, true));
    actions.extend(decide_actions);
    (state, actions)
}

fn decide(journey: Journey) -> Transition {
    (
        OrchestrationState::Deciding { journey },
        vec![OrchestrationAction::LoadCreditStatus],
    )
}

fn submit(journey: Journey, payment_reference: Option<PaymentReference>) -> Transition {
    let mut release = Vec::new();
    if payment_reference.is_some() {
        release.push(journey.ticket_kind());
    }
    if journey.from_landing {
        release.push(TicketKind::Landing);
    }

    let (journey, action) = match (journey.kind, payment_reference.clone()) {
        (JourneyKind::Evaluation(request), reference) => {
            let request = EvaluationRequest {
                payment_reference: reference,
                ..request
            };
            (
                Journey {
                    kind: JourneyKind::Evaluation(request.clone()),
                    from_landing: journey.from_landing,
                },
                OrchestrationAction::CreateEvaluation(request),
            )
        }
        (JourneyKind::Refinement { evaluation_id }, Some(payment_reference)) => (
            Journey::refinement(evaluation_id),
            OrchestrationAction::RefineEvaluation {
                evaluation_id,
                payment_reference,
            },
        ),
        (JourneyKind::Refinement { .. }, None) => {
            return (
                OrchestrationState::Failed {
                    kind: FailureKind::fatal("refinement submitted without a verified payment"),
                    evaluation_id: None,
                },
                Vec::new(),
            );
        }
    };

    (
        OrchestrationState::Submitting {
            journey,
            payment_reference,
            release,
        },
        vec![action],
    )
}

fn start_payment(journey: Journey, payment_type: PaymentType) -> Transition {
    let (payment, actions) = PaymentStateMachine::transition(
        PaymentFlowState::Idle,
        PaymentEvent::Start { payment_type },
    );
    lift(journey, payment, actions)
}

fn payment_step(journey: Journey, payment: PaymentFlowState, event: PaymentEvent) -> Transition {
    let initialization_error = match &event {
        PaymentEvent::InitializationFailed { message } => Some(message.clone()),
        _ => None,
    };
    let (next, actions) = PaymentStateMachine::transition(payment, event);

    match next {
        PaymentFlowState::VerifiedSucceeded { reference, .. } => {
            let (state, submit_actions) = submit(journey, Some(reference));
            let mut actions = vec![OrchestrationAction::RefreshCredits];
            actions.extend(submit_actions);
            (state, actions)
        }
        PaymentFlowState::Idle => {
            let actions = lift_actions(&journey, actions);
            let state = match initialization_error {
                Some(message) => OrchestrationState::Failed {
                    kind: FailureKind::PaymentInitialization { message },
                    evaluation_id: None,
                },
                None => OrchestrationState::Start,
            };
            (state, actions)
        }
        next => lift(journey, next, actions),
    }
}

fn lift(journey: Journey, payment: PaymentFlowState, actions: Vec<PaymentAction>) -> Transition {
    let actions = lift_actions(&journey, actions);
    (
        OrchestrationState::AwaitingPayment { journey, payment },
        actions,
    )
}

fn lift_actions(journey: &Journey, actions: Vec<PaymentAction>) -> Vec<OrchestrationAction> {
    actions
        .into_iter()
        .map(|action| match action {
            PaymentAction::PersistTicket { payment_type } => {
                OrchestrationAction::PersistTicket(ticket_for(journey, payment_type))
            }
            PaymentAction::InitializePayment { payment_type } => {
                OrchestrationAction::InitializePayment { payment_type }
            }
            PaymentAction::PersistFallbackReference { reference } => {
                OrchestrationAction::PersistFallbackReference {
                    ticket: journey.ticket_kind(),
                    reference,
                }
            }
            PaymentAction::Redirect { authorization_url } => {
                OrchestrationAction::Redirect { authorization_url }
            }
            PaymentAction::VerifyPayment {
                payment_type,
                reference,
            } => OrchestrationAction::VerifyPayment {
                payment_type,
                reference,
            },
            PaymentAction::DiscardTicket => OrchestrationAction::ClearTickets {
                kinds: vec![journey.ticket_kind()],
            },
        })
        .collect()
}

fn ticket_for(journey: &Journey, payment_type: PaymentType) -> ResumeTicket {
    match &journey.kind {
        JourneyKind::Evaluation(request) => ResumeTicket::PendingEvaluation {
            request: request.clone(),
            payment_type,
        },
        JourneyKind::Refinement { evaluation_id } => ResumeTicket::PendingRefinement {
            evaluation_id: *evaluation_id,
        },
    }
}

fn submission_failed(
    journey: Journey,
    payment_reference: Option<PaymentReference>,
    error: ApiError,
) -> Transition {
    let unpaid_evaluation =
        payment_reference.is_none() && matches!(journey.kind, JourneyKind::Evaluation(_));

    match error.kind {
        // The server is authoritative on credit consumption: show the paywall.
        ApiErrorKind::PaymentRequired if unpaid_evaluation => {
            let (state, mut actions) = start_payment(journey, PaymentType::Standard);
            actions.push(OrchestrationAction::RefreshCredits);
            (state, actions)
        }
        ApiErrorKind::Validation if unpaid_evaluation => {
            let JourneyKind::Evaluation(request) = journey.kind else {
                return fail(&error, None);
            };
            let error = Some(ComposeError::Validation {
                message: error.message,
            });
            let step = match request.target {
                GrantTarget::Indexed { .. } => ComposeStep::PickingIndexed { error },
                GrantTarget::Url { grant_url, context } => ComposeStep::ReviewingExtracted {
                    url: grant_url,
                    context,
                    error,
                },
            };
            (
                composing(request.project_id, journey.from_landing, step),
                Vec::new(),
            )
        }
        _ => fail(&error, None),
    }
}

fn fail(error: &ApiError, evaluation_id: Option<EvaluationId>) -> Transition {
    let actions = if error.is_auth() {
        vec![OrchestrationAction::ReportSessionExpired]
    } else {
        Vec::new()
    };
    (
        OrchestrationState::Failed {
            kind: FailureKind::from(error),
            evaluation_id,
        },
        actions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credits::CreditStatus;
    use crate::error::ExtractionCategory;
    use crate::ids::GrantId;

    fn status(free_available: bool, bundle_credits: u32) -> CreditStatus {
        CreditStatus {
            free_available,
            bundle_credits,
            has_converted_refinement: false,
        }
    }

    fn run(
        state: OrchestrationState,
        events: Vec<OrchestrationEvent>,
    ) -> (OrchestrationState, Vec<OrchestrationAction>) {
        let mut state = state;
        let mut all = Vec::new();
        for event in events {
            let (next, actions) = OrchestrationStateMachine::transition(state, event);
            state = next;
            all.extend(actions);
        }
        (state, all)
    }

    fn reviewing(context: GrantContext) -> OrchestrationState {
        composing(
            None,
            false,
            ComposeStep::ReviewingExtracted {
                url: "https://example.org/g1".to_string(),
                context,
                error: None,
            },
        )
    }

    #[test]
    fn submit_url_starts_extraction() {
        let (state, actions) = run(
            OrchestrationState::Start,
            vec![
                OrchestrationEvent::BeginAssessment { project_id: None },
                OrchestrationEvent::SubmitUrl {
                    url: " https://example.org/g1 ".to_string(),
                    name: None,
                },
            ],
        );
        assert!(matches!(
            state,
            OrchestrationState::Composing {
                step: ComposeStep::Extracting { .. },
                ..
            }
        ));
        assert_eq!(
            actions,
            vec![OrchestrationAction::ExtractGrant {
                url: "https://example.org/g1".to_string(),
                name: None
            }]
        );
    }

    #[test]
    fn invalid_url_stays_on_entry_with_error() {
        let (state, actions) = run(
            composing(None, false, ComposeStep::entering("", None)),
            vec![OrchestrationEvent::SubmitUrl {
                url: "not a url".to_string(),
                name: None,
            }],
        );
        assert!(actions.is_empty());
        assert!(matches!(
            state,
            OrchestrationState::Composing {
                step: ComposeStep::EnteringUrl {
                    error: Some(ComposeError::InvalidUrl),
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn extraction_failure_returns_to_entry_with_category() {
        let extracting = composing(
            None,
            false,
            ComposeStep::Extracting {
                url: "https://example.org/g1".to_string(),
                name: None,
            },
        );
        let (state, _) = run(
            extracting,
            vec![OrchestrationEvent::ExtractionFailed {
                category: ExtractionCategory::Blocked,
            }],
        );
        assert!(matches!(
            state,
            OrchestrationState::Composing {
                step: ComposeStep::EnteringUrl {
                    error: Some(ComposeError::Extraction {
                        category: ExtractionCategory::Blocked
                    }),
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn submit_without_name_is_rejected_inline() {
        let (state, actions) = run(
            reviewing(GrantContext::default()),
            vec![OrchestrationEvent::SubmitGrant],
        );
        assert!(actions.is_empty());
        assert!(matches!(
            state,
            OrchestrationState::Composing {
                step: ComposeStep::ReviewingExtracted {
                    error: Some(ComposeError::MissingGrantName),
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn free_credit_short_circuits_to_submitting() {
        let (state, actions) = run(
            reviewing(GrantContext::named("G1")),
            vec![
                OrchestrationEvent::SubmitGrant,
                OrchestrationEvent::CreditStatusLoaded {
                    status: status(true, 0),
                },
            ],
        );
        assert!(matches!(
            state,
            OrchestrationState::Submitting {
                payment_reference: None,
                ..
            }
        ));
        let create = actions
            .iter()
            .find_map(|action| match action {
                OrchestrationAction::CreateEvaluation(request) => Some(request),
                _ => None,
            })
            .expect("create action");
        assert_eq!(create.payment_reference, None);
        assert_eq!(create.grant_url(), Some("https://example.org/g1"));
    }

    #[test]
    fn no_credits_opens_paywall_and_confirm_persists_ticket() {
        let picking = composing(None, false, ComposeStep::PickingIndexed { error: None });
        let (state, actions) = run(
            picking,
            vec![
                OrchestrationEvent::PickGrant {
                    grant_id: GrantId::new(42),
                },
                OrchestrationEvent::CreditStatusLoaded {
                    status: status(false, 0),
                },
                OrchestrationEvent::Payment(PaymentEvent::Confirm),
            ],
        );

        assert!(matches!(
            state,
            OrchestrationState::AwaitingPayment {
                payment: PaymentFlowState::Initializing {
                    payment_type: PaymentType::Standard
                },
                ..
            }
        ));
        assert_eq!(
            actions[1..],
            [
                OrchestrationAction::PersistTicket(ResumeTicket::PendingEvaluation {
                    request: EvaluationRequest::for_indexed(GrantId::new(42), None),
                    payment_type: PaymentType::Standard,
                }),
                OrchestrationAction::InitializePayment {
                    payment_type: PaymentType::Standard
                },
            ]
        );
    }

    #[test]
    fn verified_payment_submits_with_reference_and_releases_ticket() {
        let journey =
            Journey::evaluation(EvaluationRequest::for_indexed(GrantId::new(42), None), false);
        let (state, actions) = run(
            OrchestrationState::Start,
            vec![
                OrchestrationEvent::Resumed {
                    snapshot: ResumeSnapshot::PaymentReturn {
                        journey,
                        payment_type: PaymentType::Standard,
                        reference: "abc123".into(),
                    },
                },
                OrchestrationEvent::Payment(PaymentEvent::VerificationSucceeded),
            ],
        );

        let (payment_reference, release) = match state {
            OrchestrationState::Submitting {
                payment_reference,
                release,
                ..
            } => (payment_reference, release),
            other => panic!("expected submitting, got {other:?}"),
        };
        assert_eq!(payment_reference, Some("abc123".into()));
        assert_eq!(release, vec![TicketKind::Evaluation]);
        assert!(actions.contains(&OrchestrationAction::CreateEvaluation(
            EvaluationRequest::for_indexed(GrantId::new(42), None)
                .with_payment_reference("abc123".into())
        )));
        assert!(actions.contains(&OrchestrationAction::RefreshCredits));
    }

    #[test]
    fn payment_required_without_reference_goes_to_paywall() {
        let (state, actions) = run(
            reviewing(GrantContext::named("G1")),
            vec![
                OrchestrationEvent::SubmitGrant,
                OrchestrationEvent::CreditStatusLoaded {
                    status: status(true, 0),
                },
                OrchestrationEvent::SubmissionFailed {
                    error: ApiError::payment_required("credit required"),
                },
            ],
        );
        assert!(matches!(
            state,
            OrchestrationState::AwaitingPayment {
                payment: PaymentFlowState::AwaitingConfirmation { .. },
                ..
            }
        ));
        assert_eq!(actions.last(), Some(&OrchestrationAction::RefreshCredits));
    }

    #[test]
    fn payment_required_with_reference_fails() {
        let submitting = OrchestrationState::Submitting {
            journey: Journey::refinement(EvaluationId::new(7)),
            payment_reference: Some("r".into()),
            release: vec![TicketKind::Refinement],
        };
        let (state, actions) = run(
            submitting,
            vec![OrchestrationEvent::SubmissionFailed {
                error: ApiError::payment_required("no"),
            }],
        );
        assert_eq!(
            state,
            OrchestrationState::Failed {
                kind: FailureKind::PaymentRequired,
                evaluation_id: None
            }
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn refinement_always_goes_through_paywall() {
        let (state, _) = run(
            OrchestrationState::Start,
            vec![
                OrchestrationEvent::BeginRefinement {
                    evaluation_id: EvaluationId::new(7),
                },
                OrchestrationEvent::CreditStatusLoaded {
                    status: status(true, 4),
                },
            ],
        );
        assert!(matches!(
            state,
            OrchestrationState::AwaitingPayment {
                payment: PaymentFlowState::AwaitingConfirmation {
                    payment_type: PaymentType::Refinement
                },
                ..
            }
        ));
    }

    #[test]
    fn created_pending_evaluation_is_watched() {
        let submitting = OrchestrationState::Submitting {
            journey: Journey::evaluation(
                EvaluationRequest::for_indexed(GrantId::new(1), None),
                false,
            ),
            payment_reference: None,
            release: Vec::new(),
        };
        let (state, actions) = run(
            submitting,
            vec![OrchestrationEvent::EvaluationCreated {
                evaluation_id: EvaluationId::new(11),
                terminal: false,
            }],
        );
        assert_eq!(
            state,
            OrchestrationState::Watching {
                evaluation_id: EvaluationId::new(11)
            }
        );
        assert_eq!(
            actions,
            vec![
                OrchestrationAction::RefreshCredits,
                OrchestrationAction::WatchEvaluation {
                    evaluation_id: EvaluationId::new(11)
                },
            ]
        );
    }

    #[test]
    fn auth_failure_reports_session_expired() {
        let deciding = OrchestrationState::Deciding {
            journey: Journey::refinement(EvaluationId::new(7)),
        };
        let (state, actions) = run(
            deciding,
            vec![OrchestrationEvent::CreditStatusFailed {
                error: ApiError::auth("expired"),
            }],
        );
        assert!(matches!(
            state,
            OrchestrationState::Failed {
                kind: FailureKind::Auth,
                ..
            }
        ));
        assert_eq!(actions, vec![OrchestrationAction::ReportSessionExpired]);
    }

    #[test]
    fn landing_close_clears_landing_ticket() {
        let (state, actions) = run(
            OrchestrationState::Start,
            vec![
                OrchestrationEvent::Resumed {
                    snapshot: ResumeSnapshot::LandingGrant {
                        grant_url: "https://foo/grant".to_string(),
                        grant_name: None,
                    },
                },
                OrchestrationEvent::CloseComposer,
            ],
        );
        assert_eq!(state, OrchestrationState::Start);
        assert_eq!(
            actions,
            vec![OrchestrationAction::ClearTickets {
                kinds: vec![TicketKind::Landing]
            }]
        );
    }

    #[test]
    fn skip_with_defaults_ignored_outside_landing() {
        let entering = composing(None, false, ComposeStep::entering("https://foo/grant", None));
        let (state, actions) = run(entering.clone(), vec![OrchestrationEvent::SkipWithDefaults]);
        assert_eq!(state, entering);
        assert!(actions.is_empty());
    }

    #[test]
    fn stale_watch_events_are_ignored() {
        let watching = OrchestrationState::Watching {
            evaluation_id: EvaluationId::new(11),
        };
        let (state, _) = run(
            watching.clone(),
            vec![OrchestrationEvent::EvaluationCompleted {
                evaluation_id: EvaluationId::new(12),
            }],
        );
        assert_eq!(state, watching);
    }
}
