use super::purchase::{AutomationSuggestion, PurchaseRecord};

/// Screens the flow asks its presenter to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Success(PurchaseRecord),
    AddShortcut(AutomationSuggestion),
}

/// Optional actions the user can take from the success screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessAction {
    AddToAutomation,
    EnableNotifications,
}
