use crate::domain::session::{AuthorizationResult, PaymentToken, SessionEvent, SessionOutcome};
use crate::error::PurchaseError;

/// Why a flow ended in [`FlowState::Errored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFailure {
    ProviderUnavailable,
    SessionFailed,
    SessionCancelled,
}

impl From<FlowFailure> for PurchaseError {
    fn from(failure: FlowFailure) -> Self {
        match failure {
            FlowFailure::ProviderUnavailable => PurchaseError::ProviderUnavailable,
            FlowFailure::SessionFailed => PurchaseError::SessionFailed,
            FlowFailure::SessionCancelled => PurchaseError::SessionCancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingAuthorization {
        token: Option<PaymentToken>,
    },
    Finalizing {
        token: PaymentToken,
    },
    Completed,
    Errored(FlowFailure),
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Completed | FlowState::Errored(_))
    }
}

/// Everything that can move a flow forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowInput {
    SessionOpened,
    SessionUnavailable,
    Session(SessionEvent),
    /// The provider stopped reporting without a `Finished` event.
    SessionClosed,
    /// The purchase record was handed to the account store.
    Persisted,
}

/// Work the controller performs on behalf of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RespondToAuthorization(AuthorizationResult),
    DismissSession,
    PersistPurchase(PaymentToken),
    PresentSuccess,
    NotifyDelegate,
    DonateInteraction,
    RegisterSuggestion,
    ScheduleNotification,
    PresentError(FlowFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: FlowState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: FlowState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn stay(state: &FlowState) -> Self {
        Self::to(state.clone(), Vec::new())
    }
}

/// The purchase flow state machine.
///
/// Pure: the same state and input always yield the same transition. Inputs
/// that make no sense in the current state leave it untouched and produce no
/// effects, which is what keeps persistence at most once per flow.
pub fn transition(state: &FlowState, input: FlowInput) -> Transition {
    match (state, input) {
        (FlowState::Idle, FlowInput::SessionOpened) => {
            Transition::to(FlowState::AwaitingAuthorization { token: None }, Vec::new())
        }
        (FlowState::Idle, FlowInput::SessionUnavailable) => Transition::to(
            FlowState::Errored(FlowFailure::ProviderUnavailable),
            vec![Effect::PresentError(FlowFailure::ProviderUnavailable)],
        ),
        (
            FlowState::AwaitingAuthorization { .. },
            FlowInput::Session(SessionEvent::Authorized(token)),
        ) => Transition::to(
            FlowState::AwaitingAuthorization { token: Some(token) },
            vec![Effect::RespondToAuthorization(AuthorizationResult::Accepted)],
        ),
        (
            FlowState::AwaitingAuthorization { token },
            FlowInput::Session(SessionEvent::Finished(outcome)),
        ) => match (outcome, token) {
            (SessionOutcome::Success, Some(token)) => Transition::to(
                FlowState::Finalizing {
                    token: token.clone(),
                },
                vec![Effect::DismissSession, Effect::PersistPurchase(token.clone())],
            ),
            // A successful finish without a token means nothing was authorized.
            (SessionOutcome::Success, None) | (SessionOutcome::Failure, _) => Transition::to(
                FlowState::Errored(FlowFailure::SessionFailed),
                vec![Effect::DismissSession],
            ),
            (SessionOutcome::Cancelled, _) => Transition::to(
                FlowState::Errored(FlowFailure::SessionCancelled),
                vec![Effect::DismissSession],
            ),
        },
        (FlowState::AwaitingAuthorization { .. }, FlowInput::SessionClosed) => Transition::to(
            FlowState::Errored(FlowFailure::SessionFailed),
            vec![Effect::DismissSession],
        ),
        (FlowState::Finalizing { .. }, FlowInput::Persisted) => Transition::to(
            FlowState::Completed,
            vec![
                Effect::PresentSuccess,
                Effect::NotifyDelegate,
                Effect::DonateInteraction,
                Effect::RegisterSuggestion,
                Effect::ScheduleNotification,
            ],
        ),
        (state, _) => Transition::stay(state),
    }
}
