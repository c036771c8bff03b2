use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(engine)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        request = request.header("x-actor-id", actor.to_string());
    }
    let request = match body {
        Some(body) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": name, "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

/// Alice, Bob and Carol in one group created by Alice.
async fn seeded() -> (Router, i64, [i64; 3]) {
    let app = app().await;
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let carol = register(&app, "Carol", "carol@example.com").await;

    let (status, group) = send(&app, "POST", "/groups", Some(alice), Some(json!({ "name": "Trip" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_i64().unwrap();

    for email in ["bob@example.com", "carol@example.com"] {
        let (status, _) = send(
            &app,
            "POST",
            "/groups/add-member",
            Some(alice),
            Some(json!({ "group_id": group_id, "email": email })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    (app, group_id, [alice, bob, carol])
}

#[tokio::test]
async fn expense_flow_produces_balances_and_plan() {
    let (app, group_id, [alice, bob, carol]) = seeded().await;

    let (status, expense) = send(
        &app,
        "POST",
        "/expenses",
        Some(alice),
        Some(json!({
            "group_id": group_id,
            "description": "Dinner",
            "amount_minor": 30000,
            "split_between": [alice, bob, carol],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["payer_name"], "Alice");
    assert_eq!(expense["shares"].as_array().unwrap().len(), 3);

    let (status, balances) = send(&app, "GET", &format!("/balances?group_id={group_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let balances = balances["balances"].as_array().unwrap();
    assert_eq!(balances.len(), 3);
    let total: i64 = balances.iter().map(|b| b["balance_minor"].as_i64().unwrap()).sum();
    assert_eq!(total, 0);

    let (status, plan) = send(
        &app,
        "GET",
        &format!("/settlements/simplify?group_id={group_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let plan = plan.as_array().unwrap();
    assert_eq!(plan.len(), 2);
    assert!(plan.iter().all(|s| s["payee_name"] == "Alice"));
    assert!(plan.iter().all(|s| s["amount_minor"] == 10000));

    let (status, graph) = send(
        &app,
        "GET",
        &format!("/settlements/graph?group_id={group_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graph["links"].as_array().unwrap().len(), 2);
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn recorded_settlements_clear_the_plan() {
    let (app, group_id, [alice, bob, _carol]) = seeded().await;

    send(
        &app,
        "POST",
        "/expenses",
        None,
        Some(json!({
            "group_id": group_id,
            "payer_id": alice,
            "description": "Taxi",
            "amount_minor": 4000,
            "shares": [{ "participant_id": bob, "amount_minor": 4000 }],
        })),
    )
    .await;

    let (status, settlement) = send(
        &app,
        "POST",
        "/settlements",
        Some(bob),
        Some(json!({ "payee_id": alice, "amount_minor": 4000, "group_id": group_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(settlement["payer_id"], bob);

    let (_, plan) = send(
        &app,
        "GET",
        &format!("/settlements/simplify?group_id={group_id}"),
        None,
        None,
    )
    .await;
    assert!(plan.as_array().unwrap().is_empty());

    let (status, listed) = send(&app, "GET", &format!("/settlements?group_id={group_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn engine_errors_map_to_status_codes() {
    let (app, group_id, [alice, bob, _carol]) = seeded().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": "Alice", "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(alice),
        Some(json!({
            "group_id": group_id,
            "description": "Dinner",
            "amount_minor": 1000,
            "shares": [{ "participant_id": bob, "amount_minor": 900 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", "/balances?group_id=9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/settlements",
        None,
        Some(json!({ "payee_id": alice, "amount_minor": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/users/9999/stats", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ledger_entries_can_be_marked_settled() {
    let (app, group_id, [alice, bob, _carol]) = seeded().await;

    send(
        &app,
        "POST",
        "/expenses",
        Some(alice),
        Some(json!({
            "group_id": group_id,
            "description": "Coffee",
            "amount_minor": 500,
            "shares": [{ "participant_id": bob, "amount_minor": 500 }],
        })),
    )
    .await;

    let (status, entries) = send(&app, "GET", &format!("/ledger?group_id={group_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entry_id = entries[0]["id"].as_i64().unwrap();

    let (status, entry) = send(
        &app,
        "PATCH",
        &format!("/ledger/{entry_id}"),
        Some(alice),
        Some(json!({ "settled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["settled"], true);

    let (_, balances) = send(&app, "GET", &format!("/balances?group_id={group_id}"), None, None).await;
    assert!(balances["balances"].as_array().unwrap().is_empty());

    let (_, stats) = send(&app, "GET", &format!("/users/{bob}/stats"), None, None).await;
    assert_eq!(stats["total_you_owe_minor"], 0);
    assert_eq!(stats["active_groups"], 1);
}

#[tokio::test]
async fn groups_are_listed_per_user() {
    let (app, _group_id, [_alice, _bob, carol]) = seeded().await;

    let (status, groups) = send(&app, "GET", &format!("/groups?user_id={carol}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["members"].as_array().unwrap().len(), 3);
    assert_eq!(groups[0]["members"][0]["role"], "admin");

    let (status, users) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn replaying_a_group_plan_clears_it() {
    let (app, group_id, [alice, bob, carol]) = seeded().await;

    send(
        &app,
        "POST",
        "/expenses",
        Some(alice),
        Some(json!({
            "group_id": group_id,
            "description": "Hotel",
            "amount_minor": 9000,
            "split_between": [alice, bob, carol],
        })),
    )
    .await;

    let plan_uri = format!("/settlements/simplify?group_id={group_id}");
    let (_, plan) = send(&app, "GET", &plan_uri, None, None).await;
    let plan = plan.as_array().unwrap().clone();
    assert_eq!(plan.len(), 2);
    assert!(plan.iter().all(|s| s["group_id"] == group_id));

    for suggestion in &plan {
        let (status, _) = send(
            &app,
            "POST",
            "/settlements",
            None,
            Some(json!({
                "payer_id": suggestion["payer_id"],
                "payee_id": suggestion["payee_id"],
                "amount_minor": suggestion["amount_minor"],
                "group_id": suggestion["group_id"],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, replanned) = send(&app, "GET", &plan_uri, None, None).await;
    assert!(replanned.as_array().unwrap().is_empty());
    let (_, everywhere) = send(&app, "GET", "/settlements/simplify", None, None).await;
    assert!(everywhere.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn settlements_without_group_only_clear_the_global_plan() {
    let (app, group_id, [alice, bob, _carol]) = seeded().await;

    send(
        &app,
        "POST",
        "/expenses",
        Some(alice),
        Some(json!({
            "group_id": group_id,
            "description": "Taxi",
            "amount_minor": 2000,
            "shares": [{ "participant_id": bob, "amount_minor": 2000 }],
        })),
    )
    .await;

    let (status, settlement) = send(
        &app,
        "POST",
        "/settlements",
        Some(bob),
        Some(json!({ "payee_id": alice, "amount_minor": 2000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(settlement["group_id"].is_null());

    let (_, global) = send(&app, "GET", "/settlements/simplify", None, None).await;
    assert!(global.as_array().unwrap().is_empty());

    let (_, group_plan) = send(
        &app,
        "GET",
        &format!("/settlements/simplify?group_id={group_id}"),
        None,
        None,
    )
    .await;
    let group_plan = group_plan.as_array().unwrap();
    assert_eq!(group_plan.len(), 1);
    assert_eq!(group_plan[0]["payer_id"], bob);
    assert_eq!(group_plan[0]["amount_minor"], 2000);
}

#[tokio::test]
async fn outsiders_cannot_settle_inside_a_group() {
    let (app, group_id, [alice, _bob, _carol]) = seeded().await;
    let oscar = register(&app, "Oscar", "oscar@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/settlements",
        Some(oscar),
        Some(json!({ "payee_id": alice, "amount_minor": 500, "group_id": group_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, balances) = send(&app, "GET", &format!("/balances?group_id={group_id}"), None, None).await;
    assert!(balances["balances"].as_array().unwrap().is_empty());
}
