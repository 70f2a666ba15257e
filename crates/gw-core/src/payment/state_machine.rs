//! Payment broker state machine.
//!
//! Defines a pure state transition function for the redirect-and-return
//! payment flow. The machine never performs IO; it returns the actions the
//! executor must run, in order.

use serde::{Deserialize, Serialize};

use super::{PaymentIntent, PaymentStatus, PaymentType};
use crate::ids::PaymentReference;

/// Payment flow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentFlowState {
    Idle,
    /// Paywall shown; the user may switch between standard and bundle.
    AwaitingConfirmation { payment_type: PaymentType },
    Initializing { payment_type: PaymentType },
    /// Ticket and fallback reference are persisted; the page is leaving.
    Redirecting { intent: PaymentIntent },
    ReturnedWithReference {
        payment_type: PaymentType,
        reference: PaymentReference,
    },
    VerifiedSucceeded {
        payment_type: PaymentType,
        reference: PaymentReference,
    },
    /// History has no succeeded record yet. The ticket is kept.
    VerifiedPendingOrFailed {
        payment_type: PaymentType,
        reference: PaymentReference,
        message: Option<String>,
    },
}

/// Events that drive the payment flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PaymentEvent {
    Start { payment_type: PaymentType },
    ChooseType { payment_type: PaymentType },
    Confirm,
    Cancel,
    Initialized {
        authorization_url: String,
        reference: PaymentReference,
    },
    InitializationFailed { message: String },
    /// The page was loaded again with a reference for a persisted ticket.
    Returned {
        payment_type: PaymentType,
        reference: PaymentReference,
    },
    VerificationSucceeded,
    VerificationPending { message: Option<String> },
    RetryVerification,
    /// Closes the pending banner and keeps the ticket for a later reload.
    Dismiss,
    /// Gives up on the journey and discards the ticket.
    Abandon,
}

/// Side-effects produced by payment transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentAction {
    PersistTicket { payment_type: PaymentType },
    InitializePayment { payment_type: PaymentType },
    PersistFallbackReference { reference: PaymentReference },
    Redirect { authorization_url: String },
    VerifyPayment {
        payment_type: PaymentType,
        reference: PaymentReference,
    },
    DiscardTicket,
}

/// Pure payment state machine.
pub struct PaymentStateMachine;

impl PaymentStateMachine {
    pub fn transition(
        state: PaymentFlowState,
        event: PaymentEvent,
    ) -> (PaymentFlowState, Vec<PaymentAction>) {
        match (state, event) {
            (PaymentFlowState::Idle, PaymentEvent::Start { payment_type }) => (
                PaymentFlowState::AwaitingConfirmation { payment_type },
                Vec::new(),
            ),
            (
                PaymentFlowState::AwaitingConfirmation { payment_type },
                PaymentEvent::ChooseType {
                    payment_type: chosen,
                },
            ) => {
                // Refinement is fixed by the journey; only standard and bundle
                // are interchangeable on the paywall.
                let payment_type = match (payment_type, chosen) {
                    (PaymentType::Refinement, _) | (_, PaymentType::Refinement) => payment_type,
                    (_, chosen) => chosen,
                };
                (
                    PaymentFlowState::AwaitingConfirmation { payment_type },
                    Vec::new(),
                )
            }
            (PaymentFlowState::AwaitingConfirmation { payment_type }, PaymentEvent::Confirm) => (
                PaymentFlowState::Initializing { payment_type },
                vec![
                    PaymentAction::PersistTicket { payment_type },
                    PaymentAction::InitializePayment { payment_type },
                ],
            ),
            (PaymentFlowState::AwaitingConfirmation { .. }, PaymentEvent::Cancel) => {
                (PaymentFlowState::Idle, Vec::new())
            }
            (
                PaymentFlowState::Initializing { payment_type },
                PaymentEvent::Initialized {
                    authorization_url,
                    reference,
                },
            ) => (
                PaymentFlowState::Redirecting {
                    intent: PaymentIntent {
                        payment_type,
                        reference: reference.clone(),
                        authorization_url: authorization_url.clone(),
                        status: PaymentStatus::Initialized,
                    },
                },
                vec![
                    PaymentAction::PersistFallbackReference { reference },
                    PaymentAction::Redirect { authorization_url },
                ],
            ),
            (PaymentFlowState::Initializing { .. }, PaymentEvent::InitializationFailed { .. }) => {
                (PaymentFlowState::Idle, vec![PaymentAction::DiscardTicket])
            }
            (
                PaymentFlowState::Idle,
                PaymentEvent::Returned {
                    payment_type,
                    reference,
                },
            ) => verify(payment_type, reference),
            (
                PaymentFlowState::ReturnedWithReference {
                    payment_type,
                    reference,
                },
                PaymentEvent::VerificationSucceeded,
            ) => (
                PaymentFlowState::VerifiedSucceeded {
                    payment_type,
                    reference,
                },
                Vec::new(),
            ),
            (
                PaymentFlowState::ReturnedWithReference {
                    payment_type,
                    reference,
                },
                PaymentEvent::VerificationPending { message },
            ) => (
                PaymentFlowState::VerifiedPendingOrFailed {
                    payment_type,
                    reference,
                    message,
                },
                Vec::new(),
            ),
            (
                PaymentFlowState::VerifiedPendingOrFailed {
                    payment_type,
                    reference,
                    ..
                },
                PaymentEvent::RetryVerification,
            ) => verify(payment_type, reference),
            (PaymentFlowState::VerifiedPendingOrFailed { .. }, PaymentEvent::Dismiss) => {
                (PaymentFlowState::Idle, Vec::new())
            }
            (PaymentFlowState::VerifiedPendingOrFailed { .. }, PaymentEvent::Abandon) => {
                (PaymentFlowState::Idle, vec![PaymentAction::DiscardTicket])
            }
            (state, _) => (state, Vec::new()),
        }
    }
}

fn verify(
    payment_type: PaymentType,
    reference: PaymentReference,
) -> (PaymentFlowState, Vec<PaymentAction>) {
    (
        PaymentFlowState::ReturnedWithReference {
            payment_type,
            reference: reference.clone(),
        },
        vec![PaymentAction::VerifyPayment {
            payment_type,
            reference,
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn awaiting(payment_type: PaymentType) -> PaymentFlowState {
        PaymentFlowState::AwaitingConfirmation { payment_type }
    }

    #[test]
    fn confirm_persists_ticket_before_initializing() {
        let (next, actions) =
            PaymentStateMachine::transition(awaiting(PaymentType::Standard), PaymentEvent::Confirm);

        assert_eq!(
            next,
            PaymentFlowState::Initializing {
                payment_type: PaymentType::Standard
            }
        );
        assert_eq!(
            actions,
            vec![
                PaymentAction::PersistTicket {
                    payment_type: PaymentType::Standard
                },
                PaymentAction::InitializePayment {
                    payment_type: PaymentType::Standard
                },
            ]
        );
    }

    #[test]
    fn initialized_persists_fallback_before_redirect() {
        let (next, actions) = PaymentStateMachine::transition(
            PaymentFlowState::Initializing {
                payment_type: PaymentType::Standard,
            },
            PaymentEvent::Initialized {
                authorization_url: "https://pay.test/auth".to_string(),
                reference: "abc123".into(),
            },
        );

        assert!(matches!(next, PaymentFlowState::Redirecting { .. }));
        assert_eq!(
            actions,
            vec![
                PaymentAction::PersistFallbackReference {
                    reference: "abc123".into()
                },
                PaymentAction::Redirect {
                    authorization_url: "https://pay.test/auth".to_string()
                },
            ]
        );
    }

    #[test]
    fn initialization_failure_discards_ticket() {
        let (next, actions) = PaymentStateMachine::transition(
            PaymentFlowState::Initializing {
                payment_type: PaymentType::Bundle,
            },
            PaymentEvent::InitializationFailed {
                message: "processor down".to_string(),
            },
        );
        assert_eq!(next, PaymentFlowState::Idle);
        assert_eq!(actions, vec![PaymentAction::DiscardTicket]);
    }

    #[test]
    fn refinement_type_cannot_be_switched() {
        let (next, _) = PaymentStateMachine::transition(
            awaiting(PaymentType::Refinement),
            PaymentEvent::ChooseType {
                payment_type: PaymentType::Bundle,
            },
        );
        assert_eq!(next, awaiting(PaymentType::Refinement));

        let (next, _) = PaymentStateMachine::transition(
            awaiting(PaymentType::Standard),
            PaymentEvent::ChooseType {
                payment_type: PaymentType::Bundle,
            },
        );
        assert_eq!(next, awaiting(PaymentType::Bundle));
    }

    #[test]
    fn pending_verification_can_be_retried() {
        let returned = PaymentEvent::Returned {
            payment_type: PaymentType::Standard,
            reference: "abc123".into(),
        };
        let (state, actions) = PaymentStateMachine::transition(PaymentFlowState::Idle, returned);
        assert_eq!(actions.len(), 1);

        let (state, actions) = PaymentStateMachine::transition(
            state,
            PaymentEvent::VerificationPending { message: None },
        );
        assert!(matches!(state, PaymentFlowState::VerifiedPendingOrFailed { .. }));
        assert!(actions.is_empty());

        let (state, actions) =
            PaymentStateMachine::transition(state, PaymentEvent::RetryVerification);
        assert!(matches!(state, PaymentFlowState::ReturnedWithReference { .. }));
        assert!(matches!(actions[0], PaymentAction::VerifyPayment { .. }));
    }

    #[test]
    fn dismiss_keeps_ticket_and_abandon_discards_it() {
        let pending = PaymentFlowState::VerifiedPendingOrFailed {
            payment_type: PaymentType::Standard,
            reference: "abc123".into(),
            message: None,
        };
        let (_, actions) = PaymentStateMachine::transition(pending.clone(), PaymentEvent::Dismiss);
        assert!(actions.is_empty());

        let (_, actions) = PaymentStateMachine::transition(pending, PaymentEvent::Abandon);
        assert_eq!(actions, vec![PaymentAction::DiscardTicket]);
    }

    #[test]
    fn unrelated_events_leave_state_untouched() {
        let (next, actions) =
            PaymentStateMachine::transition(PaymentFlowState::Idle, PaymentEvent::Confirm);
        assert_eq!(next, PaymentFlowState::Idle);
        assert!(actions.is_empty());
    }
}
