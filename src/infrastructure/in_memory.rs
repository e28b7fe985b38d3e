use crate::domain::ports::{
    AccountStore, NotificationScheduler, Presenter, PurchaseFlowDelegate, ShortcutRegistry,
};
use crate::domain::purchase::{AutomationSuggestion, Interaction, PurchaseRecord};
use crate::domain::screen::Screen;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A thread-safe in-memory store for completed purchases.
///
/// Purchases are kept in insertion order. `Clone` shares the underlying list,
/// so a clone handed to a flow can be inspected afterwards.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    purchases: Arc<RwLock<Vec<PurchaseRecord>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, purchase: PurchaseRecord) -> Result<()> {
        let mut purchases = self.purchases.write().await;
        purchases.push(purchase);
        Ok(())
    }

    async fn purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let purchases = self.purchases.read().await;
        Ok(purchases.clone())
    }
}

/// Records scheduled reminders and permission prompts instead of showing them.
#[derive(Default)]
pub struct InMemoryNotificationScheduler {
    scheduled: Mutex<Vec<PurchaseRecord>>,
    authorization_requests: Mutex<Vec<bool>>,
    denies_permission: bool,
}

impl InMemoryNotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler whose permission prompt is always declined.
    pub fn denying() -> Self {
        Self {
            denies_permission: true,
            ..Self::default()
        }
    }

    pub fn scheduled(&self) -> Vec<PurchaseRecord> {
        lock(&self.scheduled).clone()
    }

    /// The `provisional` flag of every permission prompt, in order.
    pub fn authorization_requests(&self) -> Vec<bool> {
        lock(&self.authorization_requests).clone()
    }
}

#[async_trait]
impl NotificationScheduler for InMemoryNotificationScheduler {
    async fn schedule(&self, purchase: &PurchaseRecord) -> Result<()> {
        lock(&self.scheduled).push(purchase.clone());
        Ok(())
    }

    async fn request_authorization(&self, provisional: bool) -> Result<bool> {
        lock(&self.authorization_requests).push(provisional);
        Ok(!self.denies_permission)
    }
}

/// Records donations and suggestions. Can be told to reject every call, in
/// which case the attempt is still recorded.
#[derive(Default)]
pub struct InMemoryShortcutRegistry {
    donations: Mutex<Vec<Interaction>>,
    suggestions: Mutex<Vec<AutomationSuggestion>>,
    failing: bool,
}

impl InMemoryShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn donations(&self) -> Vec<Interaction> {
        lock(&self.donations).clone()
    }

    pub fn suggestions(&self) -> Vec<AutomationSuggestion> {
        lock(&self.suggestions).clone()
    }

    fn outcome(&self) -> Result<()> {
        if self.failing {
            Err(PurchaseError::InternalError(Box::new(std::io::Error::other(
                "shortcut registry unavailable",
            ))))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ShortcutRegistry for InMemoryShortcutRegistry {
    async fn donate(&self, interaction: &Interaction) -> Result<()> {
        lock(&self.donations).push(interaction.clone());
        self.outcome()
    }

    async fn set_suggestions(&self, suggestions: Vec<AutomationSuggestion>) -> Result<()> {
        lock(&self.suggestions).extend(suggestions);
        self.outcome()
    }
}

/// A headless presenter that remembers what it was asked to show.
#[derive(Default)]
pub struct RecordingPresenter {
    screens: Mutex<Vec<Screen>>,
    dismissals: Mutex<usize>,
    errors: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screens(&self) -> Vec<Screen> {
        lock(&self.screens).clone()
    }

    pub fn dismissals(&self) -> usize {
        *lock(&self.dismissals)
    }

    /// Messages of every error passed to the error hook.
    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn present(&self, screen: Screen) {
        lock(&self.screens).push(screen);
    }

    async fn dismiss(&self) {
        *lock(&self.dismissals) += 1;
    }

    fn present_error(&self, error: &PurchaseError) {
        lock(&self.errors).push(error.to_string());
    }
}

#[derive(Default)]
pub struct RecordingDelegate {
    presented: Mutex<Vec<PurchaseRecord>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> Vec<PurchaseRecord> {
        lock(&self.presented).clone()
    }
}

impl PurchaseFlowDelegate for RecordingDelegate {
    fn on_success_screen_presented(&self, purchase: &PurchaseRecord) {
        lock(&self.presented).push(purchase.clone());
    }
}
