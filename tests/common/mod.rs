use openpay_sync::application::sync::SyncService;
use openpay_sync::domain::card::Card;
use openpay_sync::domain::charge::Charge;
use openpay_sync::domain::customer::{Address, Customer};
use openpay_sync::domain::plan::Plan;
use openpay_sync::infrastructure::in_memory::InMemoryStore;
use openpay_sync::infrastructure::mock_gateway::MockGateway;
use rust_decimal_macros::dec;

pub struct TestContext {
    pub service: SyncService,
    pub gateway: MockGateway,
    pub store: InMemoryStore,
}

/// Service wired to a shared mock gateway and in-memory store, so tests can
/// inspect both sides of a synchronization.
pub fn context() -> TestContext {
    let gateway = MockGateway::new();
    let store = InMemoryStore::new();
    let service = SyncService::new(Box::new(store.clone()), Box::new(gateway.clone()))
        .with_device_session("dev_session_test");
    TestContext {
        service,
        gateway,
        store,
    }
}

pub fn ana() -> Customer {
    Customer::new(
        "Ana",
        Some("Ruiz".to_string()),
        "ana@example.com",
        Some("5512345678".to_string()),
        Address::new("Av. Reforma 222", "Ciudad de Mexico", "CDMX", 6600),
    )
}

pub fn basic_plan() -> Plan {
    Plan::new("basic", dec!(199.00))
}

/// Saves a customer, tokenizes a card, pushes a plan and creates a charge,
/// returning everything with assigned local and remote ids.
pub async fn charged_setup(ctx: &TestContext) -> (Customer, Card, Plan, Charge) {
    let customer = ctx.service.save_customer(ana()).await.unwrap();
    let customer_remote = customer.remote_id.clone().unwrap();
    let card = ctx
        .service
        .add_card(&customer_remote, "tok_test", "dev_session_test", "main card")
        .await
        .unwrap();
    let plan = ctx.service.save_plan(basic_plan()).await.unwrap();
    let charge = ctx
        .service
        .save_charge(Charge::new(
            "order 42",
            dec!(350.00),
            customer.id,
            card.id,
            plan.id,
        ))
        .await
        .unwrap();
    (customer, card, plan, charge)
}
