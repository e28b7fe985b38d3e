use crate::domain::ports::{PaymentProvider, PaymentSession};
use crate::domain::purchase::PaymentRequest;
use crate::domain::session::{AuthorizationResult, SessionEvent};
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// What the flow did with the sessions it was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLog {
    pub requests: Vec<PaymentRequest>,
    pub authorization_results: Vec<AuthorizationResult>,
    pub dismissals: usize,
}

/// A payment provider that replays a fixed sequence of session events.
///
/// Each presented session gets its own producer task feeding the events
/// through a channel, the way a real provider delivers callbacks one at a
/// time. `Clone` shares the log, so a copy kept by the caller sees what the
/// flow did.
#[derive(Clone)]
pub struct ScriptedPaymentProvider {
    events: Vec<SessionEvent>,
    available: bool,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedPaymentProvider {
    pub fn new(events: Vec<SessionEvent>) -> Self {
        Self {
            events,
            available: true,
            log: Arc::default(),
        }
    }

    /// A provider that cannot show a payment sheet in this environment.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn log(&self) -> SessionLog {
        lock(&self.log).clone()
    }
}

fn lock(log: &Mutex<SessionLog>) -> MutexGuard<'_, SessionLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PaymentProvider for ScriptedPaymentProvider {
    async fn present(&self, request: PaymentRequest) -> Result<Box<dyn PaymentSession>> {
        if !self.available {
            return Err(PurchaseError::ProviderUnavailable);
        }
        lock(&self.log).requests.push(request);

        let (tx, rx) = mpsc::channel(8);
        let events = self.events.clone();
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    // Session was dismissed before the script ran out.
                    break;
                }
            }
        });

        Ok(Box::new(ScriptedSession {
            events: rx,
            log: Arc::clone(&self.log),
        }))
    }
}

struct ScriptedSession {
    events: mpsc::Receiver<SessionEvent>,
    log: Arc<Mutex<SessionLog>>,
}

#[async_trait]
impl PaymentSession for ScriptedSession {
    async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    async fn complete_authorization(&mut self, result: AuthorizationResult) {
        lock(&self.log).authorization_results.push(result);
    }

    async fn dismiss(&mut self) {
        self.events.close();
        lock(&self.log).dismissals += 1;
    }
}
