use serde::{Deserialize, Serialize};

/// Opaque proof of authorization issued by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentToken {
    pub transaction_identifier: String,
}

impl PaymentToken {
    pub fn new(transaction_identifier: impl Into<String>) -> Self {
        Self {
            transaction_identifier: transaction_identifier.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Success,
    Failure,
    Cancelled,
}

/// Events emitted by a payment session, in the order the provider reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Authorized(PaymentToken),
    Finished(SessionOutcome),
}

/// Answer given to the provider after an `Authorized` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationResult {
    Accepted,
    Rejected,
}
