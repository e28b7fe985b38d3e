#![allow(dead_code)]

use async_trait::async_trait;
use milkshakr_purchase::application::flow::{FlowServices, PurchaseFlowController};
use milkshakr_purchase::domain::ports::{AccountStore, AccountStoreBox};
use milkshakr_purchase::domain::product::{Price, Product};
use milkshakr_purchase::domain::purchase::PurchaseRecord;
use milkshakr_purchase::error::{PurchaseError, Result};
use milkshakr_purchase::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryNotificationScheduler, InMemoryShortcutRegistry,
    RecordingDelegate, RecordingPresenter,
};
use milkshakr_purchase::infrastructure::scripted::ScriptedPaymentProvider;
use rand::Rng;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn vanilla_shake() -> Product {
    Product::new(
        "vanilla",
        "Vanilla Shake",
        Price::new(Decimal::new(500, 2)).unwrap(),
    )
}

/// Random catalog items with prices between 0.00 and 20.00.
pub fn random_products(rng: &mut impl Rng, count: usize) -> Vec<Product> {
    (0..count)
        .map(|i| {
            let cents: i64 = rng.gen_range(0..=2000);
            Product::new(
                format!("item-{i}"),
                format!("Item {i}"),
                Price::new(Decimal::new(cents, 2)).unwrap(),
            )
        })
        .collect()
}

pub fn write_products_csv(path: &Path, rows: &[(&str, &str, &str)]) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["identifier", "name", "price"])?;
    for (identifier, name, price) in rows {
        wtr.write_record([identifier, name, price])?;
    }

    wtr.flush()?;
    Ok(())
}

/// An account store that counts writes and rejects every one of them.
#[derive(Default, Clone)]
pub struct FailingAccountStore {
    attempts: Arc<AtomicUsize>,
}

impl FailingAccountStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for FailingAccountStore {
    async fn store(&self, _purchase: PurchaseRecord) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PurchaseError::InternalError(Box::new(std::io::Error::other(
            "disk full",
        ))))
    }

    async fn purchases(&self) -> Result<Vec<PurchaseRecord>> {
        Ok(Vec::new())
    }
}

/// Test doubles for every collaborator of a flow.
pub struct Doubles {
    pub store: InMemoryAccountStore,
    pub presenter: Arc<RecordingPresenter>,
    pub delegate: Arc<RecordingDelegate>,
    pub notifications: Arc<InMemoryNotificationScheduler>,
    pub shortcuts: Arc<InMemoryShortcutRegistry>,
    pub provider: ScriptedPaymentProvider,
}

impl Doubles {
    pub fn new(provider: ScriptedPaymentProvider) -> Self {
        Self {
            store: InMemoryAccountStore::new(),
            presenter: Arc::new(RecordingPresenter::new()),
            delegate: Arc::new(RecordingDelegate::new()),
            notifications: Arc::new(InMemoryNotificationScheduler::new()),
            shortcuts: Arc::new(InMemoryShortcutRegistry::new()),
            provider,
        }
    }

    pub fn with_shortcuts(mut self, shortcuts: InMemoryShortcutRegistry) -> Self {
        self.shortcuts = Arc::new(shortcuts);
        self
    }

    pub fn controller(&self, products: Vec<Product>) -> Result<PurchaseFlowController> {
        self.controller_with_store(products, Box::new(self.store.clone()))
    }

    pub fn controller_with_store(
        &self,
        products: Vec<Product>,
        store: AccountStoreBox,
    ) -> Result<PurchaseFlowController> {
        let controller = PurchaseFlowController::new(
            self.presenter.clone(),
            products,
            store,
            FlowServices {
                provider: Box::new(self.provider.clone()),
                notifications: self.notifications.clone(),
                shortcuts: self.shortcuts.clone(),
            },
        )?;
        Ok(controller.with_delegate(self.delegate.clone()))
    }
}
