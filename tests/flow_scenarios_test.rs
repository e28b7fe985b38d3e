mod common;

use common::{Doubles, FailingAccountStore, random_products, vanilla_shake};
use milkshakr_purchase::application::state::{FlowFailure, FlowState};
use milkshakr_purchase::domain::merchant::MerchantConfig;
use milkshakr_purchase::domain::ports::AccountStore;
use milkshakr_purchase::domain::purchase::Purchase;
use milkshakr_purchase::domain::screen::Screen;
use milkshakr_purchase::domain::session::{PaymentToken, SessionEvent, SessionOutcome};
use milkshakr_purchase::error::PurchaseError;
use milkshakr_purchase::infrastructure::in_memory::InMemoryShortcutRegistry;
use milkshakr_purchase::infrastructure::scripted::ScriptedPaymentProvider;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal_macros::dec;

fn authorized_success() -> ScriptedPaymentProvider {
    ScriptedPaymentProvider::new(vec![
        SessionEvent::Authorized(PaymentToken::new("tok-vanilla")),
        SessionEvent::Finished(SessionOutcome::Success),
    ])
}

#[tokio::test]
async fn test_vanilla_shake_purchase_succeeds() {
    let doubles = Doubles::new(authorized_success());
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    let state = controller.start().await.unwrap();
    controller.take_fan_out().join().await;

    assert_eq!(state, FlowState::Completed);

    let stored = doubles.store.purchases().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].total.value(), dec!(5.00));
    assert_eq!(stored[0].items.len(), 1);
    assert_eq!(stored[0].transaction_identifier, "tok-vanilla");

    let screens = doubles.presenter.screens();
    assert_eq!(screens, vec![Screen::Success(stored[0].clone())]);
    assert_eq!(doubles.delegate.presented(), stored);

    assert_eq!(doubles.shortcuts.donations().len(), 1);
    assert_eq!(doubles.shortcuts.suggestions().len(), 1);
    assert_eq!(doubles.notifications.scheduled(), stored);
    assert_eq!(doubles.provider.log().dismissals, 1);
}

#[tokio::test]
async fn test_cancelled_before_authorization() {
    let provider =
        ScriptedPaymentProvider::new(vec![SessionEvent::Finished(SessionOutcome::Cancelled)]);
    let doubles = Doubles::new(provider);
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    let state = controller.start().await.unwrap();

    assert_eq!(state, FlowState::Errored(FlowFailure::SessionCancelled));
    assert!(controller.take_fan_out().is_empty());
    assert!(doubles.store.purchases().await.unwrap().is_empty());
    assert!(doubles.presenter.screens().is_empty());
    assert!(doubles.presenter.errors().is_empty());
    assert!(doubles.delegate.presented().is_empty());
    assert!(doubles.shortcuts.donations().is_empty());
    assert!(doubles.notifications.scheduled().is_empty());
    assert!(doubles.provider.log().authorization_results.is_empty());
    assert_eq!(doubles.provider.log().dismissals, 1);
}

#[tokio::test]
async fn test_cancelled_after_authorization_is_not_persisted() {
    let provider = ScriptedPaymentProvider::new(vec![
        SessionEvent::Authorized(PaymentToken::new("tok")),
        SessionEvent::Finished(SessionOutcome::Cancelled),
    ]);
    let doubles = Doubles::new(provider);
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    let state = controller.start().await.unwrap();

    assert_eq!(state, FlowState::Errored(FlowFailure::SessionCancelled));
    assert!(doubles.store.purchases().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_unavailable() {
    let doubles = Doubles::new(ScriptedPaymentProvider::unavailable());
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    let result = controller.start().await;

    assert!(matches!(result, Err(PurchaseError::ProviderUnavailable)));
    assert_eq!(
        controller.state(),
        &FlowState::Errored(FlowFailure::ProviderUnavailable)
    );
    assert_eq!(
        doubles.presenter.errors(),
        vec!["payment provider is not available on this device".to_string()]
    );
    assert!(controller.take_fan_out().is_empty());
    assert!(doubles.store.purchases().await.unwrap().is_empty());
    assert!(doubles.presenter.screens().is_empty());
    assert!(doubles.shortcuts.donations().is_empty());
    assert!(doubles.shortcuts.suggestions().is_empty());
    assert!(doubles.notifications.scheduled().is_empty());
}

#[tokio::test]
async fn test_duplicate_finish_events_store_once() {
    let provider = ScriptedPaymentProvider::new(vec![
        SessionEvent::Authorized(PaymentToken::new("tok")),
        SessionEvent::Finished(SessionOutcome::Success),
        SessionEvent::Finished(SessionOutcome::Success),
    ]);
    let doubles = Doubles::new(provider);
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    controller.start().await.unwrap();
    controller.take_fan_out().join().await;

    assert_eq!(doubles.store.purchases().await.unwrap().len(), 1);
    assert_eq!(doubles.presenter.screens().len(), 1);
    assert_eq!(doubles.provider.log().dismissals, 1);
}

#[tokio::test]
async fn test_shortcut_failures_do_not_affect_flow() {
    let doubles =
        Doubles::new(authorized_success()).with_shortcuts(InMemoryShortcutRegistry::failing());
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    let state = controller.start().await.unwrap();
    controller.take_fan_out().join().await;

    assert_eq!(state, FlowState::Completed);
    assert_eq!(doubles.shortcuts.donations().len(), 1);
    assert_eq!(doubles.shortcuts.suggestions().len(), 1);
    assert_eq!(doubles.notifications.scheduled().len(), 1);
    assert!(doubles.presenter.errors().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_fire_and_forget() {
    let doubles = Doubles::new(authorized_success());
    let store = FailingAccountStore::default();
    let mut controller = doubles
        .controller_with_store(vec![vanilla_shake()], Box::new(store.clone()))
        .unwrap();

    let state = controller.start().await.unwrap();
    controller.take_fan_out().join().await;

    assert_eq!(state, FlowState::Completed);
    assert_eq!(store.attempts(), 1);
    assert_eq!(doubles.presenter.screens().len(), 1);
    assert_eq!(doubles.notifications.scheduled().len(), 1);
}

#[tokio::test]
async fn test_fan_out_runs_concurrently_with_caller() {
    let doubles = Doubles::new(authorized_success());
    let mut controller = doubles.controller(vec![vanilla_shake()]).unwrap();

    controller.start().await.unwrap();
    let fan_out = controller.take_fan_out();

    assert_eq!(fan_out.len(), 3);
    fan_out.join().await;
    assert_eq!(doubles.notifications.scheduled().len(), 1);
}

#[test]
fn test_random_purchases_total_their_items() {
    let mut rng = StdRng::seed_from_u64(7);
    let merchant = MerchantConfig::default();

    for count in 1..=25 {
        let products = random_products(&mut rng, count);
        let expected: rust_decimal::Decimal = products.iter().map(|p| p.price.value()).sum();
        let purchase = Purchase::new(products.clone()).unwrap();

        let request = purchase.payment_request(&merchant);

        assert_eq!(request.total.value(), expected);
        assert_eq!(request.line_items.len(), products.len());
        for (line, product) in request.line_items.iter().zip(&products) {
            assert_eq!(line.label, product.name);
            assert_eq!(line.amount, product.price);
        }
    }
}
