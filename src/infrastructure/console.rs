//! Adapters for running a flow from a terminal.
//!
//! Screens are described on stderr so that stdout stays free for the
//! purchase report.

use crate::domain::ports::{
    NotificationScheduler, Presenter, PurchaseFlowDelegate, ShortcutRegistry,
};
use crate::domain::purchase::{AutomationSuggestion, Interaction, PurchaseRecord};
use crate::domain::screen::Screen;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePresenter;

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn present(&self, screen: Screen) {
        match screen {
            Screen::Success(record) => eprintln!(
                "Purchase complete: {} item(s), total {} {}",
                record.items.len(),
                record.total,
                record.currency_code
            ),
            Screen::AddShortcut(suggestion) => eprintln!(
                "Add shortcut \"{}\" (say \"{}\")",
                suggestion.title, suggestion.invocation_phrase
            ),
        }
    }

    async fn dismiss(&self) {
        tracing::debug!("Dismissed screen");
    }

    fn present_error(&self, error: &PurchaseError) {
        eprintln!("Error: {error}");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDelegate;

impl PurchaseFlowDelegate for LoggingDelegate {
    fn on_success_screen_presented(&self, purchase: &PurchaseRecord) {
        tracing::info!(
            transaction = %purchase.transaction_identifier,
            "Success screen presented"
        );
    }
}

/// Logs reminders instead of scheduling them with an OS service.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotificationScheduler;

#[async_trait]
impl NotificationScheduler for LoggingNotificationScheduler {
    async fn schedule(&self, purchase: &PurchaseRecord) -> Result<()> {
        tracing::info!(
            transaction = %purchase.transaction_identifier,
            "Scheduled purchase reminder"
        );
        Ok(())
    }

    async fn request_authorization(&self, provisional: bool) -> Result<bool> {
        tracing::info!(provisional, "Notification authorization granted");
        Ok(true)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingShortcutRegistry;

#[async_trait]
impl ShortcutRegistry for LoggingShortcutRegistry {
    async fn donate(&self, interaction: &Interaction) -> Result<()> {
        tracing::info!(title = %interaction.suggestion.title, "Donated interaction");
        Ok(())
    }

    async fn set_suggestions(&self, suggestions: Vec<AutomationSuggestion>) -> Result<()> {
        tracing::info!(count = suggestions.len(), "Registered shortcut suggestions");
        Ok(())
    }
}
