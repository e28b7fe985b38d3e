use super::purchase::{AutomationSuggestion, Interaction, PaymentRequest, PurchaseRecord};
use super::screen::Screen;
use super::session::{AuthorizationResult, SessionEvent};
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Persists completed purchases.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, purchase: PurchaseRecord) -> Result<()>;
    async fn purchases(&self) -> Result<Vec<PurchaseRecord>>;
}

/// Schedules reminders derived from a purchase.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(&self, purchase: &PurchaseRecord) -> Result<()>;
    /// Returns whether the user granted permission.
    async fn request_authorization(&self, provisional: bool) -> Result<bool>;
}

/// Receives donated and suggested automations.
#[async_trait]
pub trait ShortcutRegistry: Send + Sync {
    async fn donate(&self, interaction: &Interaction) -> Result<()>;
    async fn set_suggestions(&self, suggestions: Vec<AutomationSuggestion>) -> Result<()>;
}

/// A payment sheet that is currently on screen.
///
/// Callbacks are serialized by the provider, so a session is driven by a single
/// task through `&mut self`.
#[async_trait]
pub trait PaymentSession: Send {
    /// `None` once the provider has nothing more to report.
    async fn next_event(&mut self) -> Option<SessionEvent>;
    async fn complete_authorization(&mut self, result: AuthorizationResult);
    async fn dismiss(&mut self);
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Fails with [`PurchaseError::ProviderUnavailable`] when no payment sheet
    /// can be shown in this environment.
    async fn present(&self, request: PaymentRequest) -> Result<Box<dyn PaymentSession>>;
}

/// The UI host the flow presents its own screens on.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, screen: Screen);
    async fn dismiss(&self);

    /// Hook for surfacing fatal flow errors. Does nothing unless the host
    /// provides its own rendering.
    fn present_error(&self, _error: &PurchaseError) {}
}

pub trait PurchaseFlowDelegate: Send + Sync {
    fn on_success_screen_presented(&self, purchase: &PurchaseRecord);
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type AccountStoreFactory = Box<dyn Fn() -> AccountStoreBox + Send + Sync>;
pub type NotificationSchedulerRef = Arc<dyn NotificationScheduler>;
pub type ShortcutRegistryRef = Arc<dyn ShortcutRegistry>;
pub type PaymentProviderBox = Box<dyn PaymentProvider>;
pub type PresenterRef = Arc<dyn Presenter>;
