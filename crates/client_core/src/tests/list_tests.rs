use shared::domain::{ProductId, UserId};

use super::*;
use crate::{
    controller::{FormMode, SubmitOutcome},
    fields::ProductField,
    resource::{Products, Users},
    test_support::{product_record, user_record, Op, ScriptedConfirm, ScriptedGateway},
};

fn seeded_gateway() -> Arc<ScriptedGateway<Products>> {
    ScriptedGateway::seeded(vec![
        product_record(1, "Wireless Headphones", 199.99, &["audio", "wireless"]),
        product_record(2, "Coffee Mug", 12.5, &["kitchen"]),
        product_record(3, "Notebook", 4.0, &[]),
    ])
}

async fn loaded_list(
    gateway: &Arc<ScriptedGateway<Products>>,
    answer: bool,
) -> (Arc<ListController<Products>>, Arc<ScriptedConfirm>) {
    let confirm = ScriptedConfirm::answering(answer);
    let list = ListController::<Products>::new(
        Arc::clone(gateway) as Arc<dyn Gateway<Products>>,
        Arc::clone(&confirm) as Arc<dyn Confirm>,
    );
    list.load().await;
    (list, confirm)
}

fn ids(state: &ListState<shared::protocol::Product>) -> Vec<i64> {
    state.entities.iter().map(|product| product.id.0).collect()
}

#[tokio::test]
async fn load_replaces_collection_and_clears_status() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;
    let state = list.snapshot().await;
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert_eq!(state.status, ListStatus::Idle);
    assert_eq!(state.mode, ListMode::Viewing);
}

#[tokio::test]
async fn failed_load_keeps_previous_collection() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;

    gateway.fail(Op::List).await;
    list.load().await;

    let state = list.snapshot().await;
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert_eq!(state.error(), Some("Failed to fetch products"));

    gateway.recover(Op::List).await;
    list.load().await;
    assert_eq!(list.snapshot().await.status, ListStatus::Idle);
}

#[tokio::test]
async fn collection_stays_visible_while_reloading() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;

    let gate = gateway.hold().await;
    let reload = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.load().await }
    });
    gateway.wait_for_calls(2).await;

    let state = list.snapshot().await;
    assert!(state.is_loading());
    assert_eq!(ids(&state), vec![1, 2, 3]);

    gate.notify_one();
    reload.await.expect("join");
    assert_eq!(list.snapshot().await.status, ListStatus::Idle);
}

#[tokio::test]
async fn start_create_and_start_edit_switch_mode() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;

    let form = list.start_create().await;
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(list.snapshot().await.mode, ListMode::Editing(None));

    let entity = list.snapshot().await.entities[1].clone();
    let form = list.start_edit(&entity).await;
    assert_eq!(form.mode(), FormMode::Edit(ProductId(2)));
    assert_eq!(list.snapshot().await.mode, ListMode::Editing(Some(entity)));
}

#[tokio::test]
async fn edit_copy_is_independent_of_the_list() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;
    let entity = list.snapshot().await.entities[0].clone();

    let form = list.start_edit(&entity).await;
    form.set_field(ProductField::Name, "Renamed")
        .await
        .expect("set name");

    assert_eq!(form.snapshot().await.fields.name, "Renamed");
    assert_eq!(list.snapshot().await.entities[0].name, "Wireless Headphones");
}

#[tokio::test]
async fn confirmed_remove_drops_exactly_that_entity() {
    let gateway = seeded_gateway();
    let (list, confirm) = loaded_list(&gateway, true).await;

    assert_eq!(list.remove(ProductId(2)).await, RemoveOutcome::Removed);

    let state = list.snapshot().await;
    assert_eq!(ids(&state), vec![1, 3]);
    assert_eq!(gateway.count(Op::Delete).await, 1);
    // No reload after a delete.
    assert_eq!(gateway.count(Op::List).await, 1);
    assert_eq!(
        confirm.prompts().await,
        vec!["Are you sure you want to delete this product?"]
    );
}

#[tokio::test]
async fn declined_remove_is_a_no_op() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, false).await;
    let before = list.snapshot().await;

    assert_eq!(list.remove(ProductId(2)).await, RemoveOutcome::Declined);

    assert_eq!(list.snapshot().await, before);
    assert_eq!(gateway.count(Op::Delete).await, 0);
    assert_eq!(gateway.calls().await.len(), 1);
}

#[tokio::test]
async fn failed_remove_keeps_collection_and_reports() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;
    gateway.fail(Op::Delete).await;

    assert_eq!(list.remove(ProductId(1)).await, RemoveOutcome::Failed);

    let state = list.snapshot().await;
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert_eq!(state.error(), Some("Failed to delete product"));
}

#[tokio::test]
async fn create_round_trip_reloads_with_server_assigned_id() {
    let gateway = ScriptedGateway::<Products>::new();
    let (list, _) = loaded_list(&gateway, true).await;
    assert!(list.snapshot().await.entities.is_empty());

    let form = list.start_create().await;
    form.set_field(ProductField::Name, "Standing Desk").await.expect("name");
    form.set_field(ProductField::Description, "Electric").await.expect("description");
    form.set_field(ProductField::Price, "399.00").await.expect("price");
    form.set_field(ProductField::Category, "Furniture").await.expect("category");
    form.set_field(ProductField::Tags, "office, ergonomic, ").await.expect("tags");

    let SubmitOutcome::Committed(created) = form.submit().await else {
        panic!("submission should commit");
    };

    let state = list.snapshot().await;
    assert_eq!(state.mode, ListMode::Viewing);
    assert_eq!(state.entities.len(), 1);
    let stored = &state.entities[0];
    assert_eq!(stored.id, created.id);
    assert!(stored.id.0 > 0);
    assert_eq!(stored.name, "Standing Desk");
    assert_eq!(stored.description, "Electric");
    assert_eq!(stored.price, 399.0);
    assert_eq!(stored.category, "Furniture");
    assert_eq!(stored.tags, vec!["office", "ergonomic"]);
    assert!(stored.in_stock);
    assert_eq!(gateway.count(Op::List).await, 2);
}

#[tokio::test]
async fn cancel_returns_to_viewing_without_gateway_calls() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;
    let before = list.snapshot().await.entities;

    let form = list.start_create().await;
    form.set_field(ProductField::Name, "Draft").await.expect("name");
    form.cancel().await.expect("cancel from idle");

    let state = list.snapshot().await;
    assert_eq!(state.mode, ListMode::Viewing);
    assert_eq!(state.entities, before);
    assert_eq!(gateway.calls().await.len(), 1);
}

#[tokio::test]
async fn stale_reload_landing_last_wins_over_delete() {
    // No ordering token: an older listing that resolves after a delete
    // brings the deleted entity back.
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;

    let listing_gate = gateway.hold().await;
    let reload = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.load().await }
    });
    gateway.wait_for_calls(2).await;

    let remove_gate = gateway.hold().await;
    remove_gate.notify_one();
    assert_eq!(list.remove(ProductId(1)).await, RemoveOutcome::Removed);
    assert_eq!(ids(&list.snapshot().await), vec![2, 3]);

    listing_gate.notify_one();
    reload.await.expect("join");
    assert_eq!(ids(&list.snapshot().await), vec![1, 2, 3]);
}

#[tokio::test]
async fn closing_the_list_aborts_an_in_flight_load() {
    let gateway = seeded_gateway();
    let (list, _) = loaded_list(&gateway, true).await;

    let _gate = gateway.hold().await;
    let reload = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.load().await }
    });
    gateway.wait_for_calls(2).await;

    list.close();
    reload.await.expect("join");

    let state = list.snapshot().await;
    assert_eq!(state.status, ListStatus::Idle);
    assert_eq!(ids(&state), vec![1, 2, 3]);

    list.load().await;
    assert_eq!(gateway.count(Op::List).await, 2);
}

async fn loaded_users(
    gateway: &Arc<ScriptedGateway<Users>>,
    answer: bool,
) -> (Arc<ListController<Users>>, Arc<ScriptedConfirm>) {
    let confirm = ScriptedConfirm::answering(answer);
    let list = ListController::<Users>::new(
        Arc::clone(gateway) as Arc<dyn Gateway<Users>>,
        Arc::clone(&confirm) as Arc<dyn Confirm>,
    );
    list.load().await;
    (list, confirm)
}

fn seeded_users() -> Arc<ScriptedGateway<Users>> {
    ScriptedGateway::seeded(vec![
        user_record(1, "Ada", "ada@example.com", "secret-1"),
        user_record(2, "Grace", "grace@example.com", "secret-2"),
    ])
}

#[tokio::test]
async fn failed_user_load_reports_the_user_message() {
    let gateway = seeded_users();
    let (list, _) = loaded_users(&gateway, true).await;

    gateway.fail(Op::List).await;
    list.load().await;

    let state = list.snapshot().await;
    assert_eq!(state.entities.len(), 2);
    assert_eq!(state.error(), Some("Failed to fetch users"));
}

#[tokio::test]
async fn user_remove_asks_with_the_user_prompt() {
    let gateway = seeded_users();
    let (list, confirm) = loaded_users(&gateway, true).await;

    assert_eq!(list.remove(UserId(1)).await, RemoveOutcome::Removed);

    let state = list.snapshot().await;
    let ids: Vec<i64> = state.entities.iter().map(|user| user.id.0).collect();
    assert_eq!(ids, vec![2]);
    assert_eq!(
        confirm.prompts().await,
        vec!["Are you sure you want to delete this user?"]
    );
}

#[tokio::test]
async fn failed_user_remove_reports_the_user_message() {
    let gateway = seeded_users();
    let (list, _) = loaded_users(&gateway, true).await;
    gateway.fail(Op::Delete).await;

    assert_eq!(list.remove(UserId(2)).await, RemoveOutcome::Failed);

    let state = list.snapshot().await;
    assert_eq!(state.entities.len(), 2);
    assert_eq!(state.error(), Some("Failed to delete user"));
}
