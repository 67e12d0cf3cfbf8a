mod common;

use chrono::{Datelike, NaiveDate};
use common::{ana, basic_plan, context};
use openpay_sync::domain::charge::Charge;
use openpay_sync::domain::subscription::Subscription;
use openpay_sync::error::SyncError;
use openpay_sync::infrastructure::mock_gateway::MockGateway;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_customer_save_assigns_remote_identity() {
    let ctx = context();
    let saved = ctx.service.save_customer(ana()).await.unwrap();

    assert!(saved.remote_id.is_some());
    let creation = saved.creation_date.unwrap();
    // The mock stamps 2016-05-12T11:10:09-05:00; the local copy is UTC.
    assert_eq!(creation.year(), 2016);
    assert_eq!(creation.month(), 5);
}

#[tokio::test]
async fn test_customer_pull_after_push_round_trips_fields() {
    let ctx = context();
    let saved = ctx.service.save_customer(ana()).await.unwrap();
    let pulled = ctx.service.refresh_customer(saved.id).await.unwrap();

    assert_eq!(pulled.first_name, saved.first_name);
    assert_eq!(pulled.last_name, saved.last_name);
    assert_eq!(pulled.email, saved.email);
    assert_eq!(pulled.phone_number, saved.phone_number);
    assert_eq!(pulled.creation_date, saved.creation_date);
}

#[tokio::test]
async fn test_customer_update_push_reaches_remote() {
    let ctx = context();
    let mut saved = ctx.service.save_customer(ana()).await.unwrap();
    saved.first_name = "Anita".to_string();
    ctx.service.save_customer(saved.clone()).await.unwrap();

    let pulled = ctx.service.refresh_customer(saved.id).await.unwrap();
    assert_eq!(pulled.first_name, "Anita");
}

#[tokio::test]
async fn test_retrieve_without_remote_id_never_touches_gateway() {
    let gateway = MockGateway::new();
    let mut customer = ana();
    let err = customer.retrieve(&gateway).await.unwrap_err();
    assert!(matches!(err, SyncError::NotSynchronized));
    assert_eq!(gateway.request_count(), 0);

    let mut plan = basic_plan();
    assert!(matches!(
        plan.retrieve(&gateway).await.unwrap_err(),
        SyncError::NotSynchronized
    ));
    assert_eq!(gateway.request_count(), 0);
}

#[tokio::test]
async fn test_child_retrieve_without_customer_linkage_fails_first() {
    let gateway = MockGateway::new();
    // Customer never pushed, so it has no remote identifier.
    let parentless = ana();

    let mut subscription = Subscription::new(1, 1, 1);
    let err = subscription.retrieve(&gateway, &parentless).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingCustomer));

    let mut charge = Charge::new("order", dec!(10.00), 1, 1, 1);
    let err = charge.retrieve(&gateway, &parentless).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingCustomer));

    // A tokenized card with its own remote id still fails on the parent check.
    let ctx = context();
    let pushed = ctx.service.save_customer(ana()).await.unwrap();
    let mut card = ctx
        .service
        .add_card(
            pushed.remote_id.as_ref().unwrap(),
            "tok_test",
            "dev_session_test",
            "",
        )
        .await
        .unwrap();
    assert!(card.remote_id.is_some());
    let err = card.retrieve(&gateway, &parentless).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingCustomer));
    let err = card.pull(&gateway, &parentless).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingCustomer));

    assert_eq!(gateway.request_count(), 0);
}

#[tokio::test]
async fn test_plan_amount_survives_round_trip_exactly() {
    let ctx = context();
    let saved = ctx.service.save_plan(basic_plan()).await.unwrap();
    assert_eq!(saved.repeat_every, 1);

    let pulled = ctx.service.refresh_plan(saved.id).await.unwrap();
    assert_eq!(pulled.amount, dec!(199.00));
    assert_eq!(pulled.amount.to_string(), "199.00");
}

#[tokio::test]
async fn test_plan_update_only_touches_mutable_subset() {
    let ctx = context();
    let mut saved = ctx.service.save_plan(basic_plan()).await.unwrap();
    saved.name = "basic v2".to_string();
    saved.trial_days = 14;
    // Amount edits are silently ignored by the gateway's update path.
    saved.amount = dec!(999.99);
    ctx.service.save_plan(saved.clone()).await.unwrap();

    let pulled = ctx.service.refresh_plan(saved.id).await.unwrap();
    assert_eq!(pulled.name, "basic v2");
    assert_eq!(pulled.trial_days, 14);
    assert_eq!(pulled.amount, dec!(199.00));
}

#[tokio::test]
async fn test_subscription_lifecycle() {
    let ctx = context();
    let (customer, card, plan, _) = common::charged_setup(&ctx).await;

    let mut subscription = Subscription::new(customer.id, card.id, plan.id);
    subscription.trial_end_date = NaiveDate::from_ymd_opt(2026, 9, 30);
    subscription.cancel_at_period_end = true;
    let saved = ctx.service.save_subscription(subscription).await.unwrap();
    assert!(saved.remote_id.is_some());
    assert!(saved.cancel_at_period_end);

    let pulled = ctx.service.refresh_subscription(saved.id).await.unwrap();
    assert_eq!(pulled.trial_end_date, NaiveDate::from_ymd_opt(2026, 9, 30));
    assert!(pulled.cancel_at_period_end);

    ctx.service.delete_subscription(saved.id).await.unwrap();
    assert!(ctx.service.refresh_subscription(saved.id).await.is_err());
}

#[tokio::test]
async fn test_subscription_push_requires_pushed_card() {
    let ctx = context();
    let customer = ctx.service.save_customer(ana()).await.unwrap();
    let plan = ctx.service.save_plan(basic_plan()).await.unwrap();
    // A card row the store has never seen.
    let subscription = Subscription::new(customer.id, 42, plan.id);
    assert!(matches!(
        ctx.service.save_subscription(subscription).await.unwrap_err(),
        SyncError::NotFound("card", 42)
    ));
}

#[tokio::test]
async fn test_delete_customer_removes_remote_counterpart() {
    let ctx = context();
    let saved = ctx.service.save_customer(ana()).await.unwrap();
    let remote_id = saved.remote_id.clone().unwrap();

    ctx.service.delete_customer(saved.id).await.unwrap();

    use openpay_sync::domain::ports::CustomerGateway;
    assert!(ctx.gateway.retrieve_customer(&remote_id).await.is_err());
}

#[tokio::test]
async fn test_local_row_is_not_persisted_when_push_fails() {
    use openpay_sync::domain::ports::CustomerStore;

    let ctx = context();
    let mut customer = ana();
    // A remote id the gateway has never issued makes the update push fail.
    customer.remote_id = Some(openpay_sync::domain::remote::RemoteId::new("cus_bogus"));
    assert!(ctx.service.save_customer(customer).await.is_err());
    assert!(ctx.store.customers().await.unwrap().is_empty());
}
