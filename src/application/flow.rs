use super::state::{Effect, FlowInput, FlowState, Transition, transition};
use crate::domain::merchant::MerchantConfig;
use crate::domain::ports::{
    AccountStoreBox, NotificationSchedulerRef, PaymentProviderBox, PaymentSession, PresenterRef,
    PurchaseFlowDelegate, ShortcutRegistryRef,
};
use crate::domain::product::Product;
use crate::domain::purchase::{Purchase, PurchaseRecord};
use crate::domain::screen::{Screen, SuccessAction};
use crate::error::{PurchaseError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Collaborators a flow needs besides its presenter and account store.
pub struct FlowServices {
    pub provider: PaymentProviderBox,
    pub notifications: NotificationSchedulerRef,
    pub shortcuts: ShortcutRegistryRef,
}

/// Handles to the best-effort tasks started after a successful purchase.
///
/// The flow never waits on these. Callers that need the work to have happened
/// (tests, a CLI about to exit) can `join` them.
#[derive(Default)]
pub struct FanOut {
    handles: Vec<JoinHandle<()>>,
}

impl FanOut {
    fn push(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Post-purchase task did not complete");
            }
        }
    }
}

/// Drives one purchase attempt from payment sheet to success screen.
///
/// A controller is single use: once it reaches `Completed` or `Errored` a new
/// purchase needs a new controller.
pub struct PurchaseFlowController {
    purchase: Purchase,
    merchant: MerchantConfig,
    presenter: PresenterRef,
    account_store: AccountStoreBox,
    provider: PaymentProviderBox,
    notifications: NotificationSchedulerRef,
    shortcuts: ShortcutRegistryRef,
    delegate: Option<Arc<dyn PurchaseFlowDelegate>>,
    state: FlowState,
    record: Option<PurchaseRecord>,
    fan_out: FanOut,
}

impl PurchaseFlowController {
    /// Creates a controller for the given products.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::InvalidPurchase`] if `products` is empty.
    pub fn new(
        presenter: PresenterRef,
        products: Vec<Product>,
        account_store: AccountStoreBox,
        services: FlowServices,
    ) -> Result<Self> {
        Ok(Self {
            purchase: Purchase::new(products)?,
            merchant: MerchantConfig::default(),
            presenter,
            account_store,
            provider: services.provider,
            notifications: services.notifications,
            shortcuts: services.shortcuts,
            delegate: None,
            state: FlowState::Idle,
            record: None,
            fan_out: FanOut::default(),
        })
    }

    pub fn with_merchant(mut self, merchant: MerchantConfig) -> Self {
        self.merchant = merchant;
        self
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn PurchaseFlowDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn purchase(&self) -> &Purchase {
        &self.purchase
    }

    /// The record handed to the account store, once the flow got that far.
    pub fn record(&self) -> Option<&PurchaseRecord> {
        self.record.as_ref()
    }

    pub fn take_fan_out(&mut self) -> FanOut {
        std::mem::take(&mut self.fan_out)
    }

    /// Presents the payment sheet and runs the flow to a terminal state.
    ///
    /// Session failures and cancellations are not errors from the caller's
    /// point of view: they come back as `Ok(FlowState::Errored(..))`.
    ///
    /// # Errors
    ///
    /// [`PurchaseError::ProviderUnavailable`] if no payment sheet could be
    /// shown, [`PurchaseError::FlowAlreadyStarted`] if called twice.
    pub async fn start(&mut self) -> Result<FlowState> {
        if self.state != FlowState::Idle {
            return Err(PurchaseError::FlowAlreadyStarted);
        }

        let request = self.purchase.payment_request(&self.merchant);
        let mut session = match self.provider.present(request).await {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Payment sheet could not be presented");
                self.dispatch(FlowInput::SessionUnavailable, &mut None).await;
                return Err(PurchaseError::ProviderUnavailable);
            }
        };
        self.dispatch(FlowInput::SessionOpened, &mut session).await;

        while matches!(self.state, FlowState::AwaitingAuthorization { .. }) {
            let Some(active) = session.as_mut() else {
                break;
            };
            let input = match active.next_event().await {
                Some(event) => FlowInput::Session(event),
                None => FlowInput::SessionClosed,
            };
            self.dispatch(input, &mut session).await;
        }

        Ok(self.state.clone())
    }

    /// Handles a button on the success screen.
    ///
    /// # Errors
    ///
    /// [`PurchaseError::InvalidAction`] unless the flow has completed.
    pub async fn handle_success_action(&self, action: SuccessAction) -> Result<()> {
        if self.state != FlowState::Completed {
            return Err(PurchaseError::InvalidAction(format!(
                "{action:?} requires a completed purchase"
            )));
        }

        match action {
            SuccessAction::AddToAutomation => {
                let suggestion = self.purchase.automation_suggestion();
                self.presenter.present(Screen::AddShortcut(suggestion)).await;
            }
            SuccessAction::EnableNotifications => {
                let granted = self.notifications.request_authorization(false).await?;
                tracing::info!(granted, "Notification authorization requested");
            }
        }
        Ok(())
    }

    /// Closes the add-shortcut screen, whether the user saved or cancelled.
    pub async fn shortcut_editor_finished(&self) {
        self.presenter.dismiss().await;
    }

    async fn dispatch(&mut self, input: FlowInput, session: &mut Option<Box<dyn PaymentSession>>) {
        let mut pending = VecDeque::from([input]);
        while let Some(input) = pending.pop_front() {
            if self.state.is_terminal() {
                tracing::debug!(?input, state = ?self.state, "Ignoring input after flow ended");
            }
            let Transition { next, effects } = transition(&self.state, input);
            tracing::debug!(from = ?self.state, to = ?next, "Purchase flow transition");
            self.state = next;

            for effect in effects {
                if let Some(follow_up) = self.execute(effect, session).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    async fn execute(
        &mut self,
        effect: Effect,
        session: &mut Option<Box<dyn PaymentSession>>,
    ) -> Option<FlowInput> {
        match effect {
            Effect::RespondToAuthorization(result) => {
                if let Some(active) = session.as_mut() {
                    active.complete_authorization(result).await;
                }
            }
            Effect::DismissSession => {
                if let Some(mut active) = session.take() {
                    active.dismiss().await;
                }
            }
            Effect::PersistPurchase(token) => {
                let record = self.purchase.record(&token, &self.merchant.currency_code);
                // Persistence is fire-and-forget: a failed write does not
                // change what the user sees.
                if let Err(e) = self.account_store.store(record.clone()).await {
                    tracing::error!(
                        error = %e,
                        transaction = %record.transaction_identifier,
                        "Failed to store purchase"
                    );
                }
                self.record = Some(record);
                return Some(FlowInput::Persisted);
            }
            Effect::PresentSuccess => {
                if let Some(record) = &self.record {
                    self.presenter.present(Screen::Success(record.clone())).await;
                }
            }
            Effect::NotifyDelegate => {
                if let (Some(delegate), Some(record)) = (&self.delegate, &self.record) {
                    delegate.on_success_screen_presented(record);
                }
            }
            Effect::DonateInteraction => {
                let shortcuts = Arc::clone(&self.shortcuts);
                let interaction = self.purchase.interaction();
                self.fan_out.push(tokio::spawn(async move {
                    if let Err(e) = shortcuts.donate(&interaction).await {
                        tracing::warn!(error = %e, "Interaction donation error");
                    }
                }));
            }
            Effect::RegisterSuggestion => {
                let shortcuts = Arc::clone(&self.shortcuts);
                let suggestion = self.purchase.automation_suggestion();
                self.fan_out.push(tokio::spawn(async move {
                    // No suggestion is an acceptable outcome.
                    let _ = shortcuts.set_suggestions(vec![suggestion]).await;
                }));
            }
            Effect::ScheduleNotification => {
                let notifications = Arc::clone(&self.notifications);
                if let Some(record) = self.record.clone() {
                    self.fan_out.push(tokio::spawn(async move {
                        let _ = notifications.schedule(&record).await;
                    }));
                }
            }
            Effect::PresentError(failure) => {
                self.presenter.present_error(&PurchaseError::from(failure));
            }
        }
        None
    }
}
