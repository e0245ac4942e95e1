//! End-to-end tests of the HTTP API over in-memory stores.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect
#![allow(clippy::panic)] // Tests are allowed to panic on failures

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use todo_kv_core::{JobStatus, ListRepository, TodoItem, TodoList};
use todo_kv_testing::{init_test_tracing, memory_job_runner, memory_repository, FailingKeyValueStore};
use todo_kv_web::dto::{JobQueuedResponse, JobStatusResponse};
use todo_kv_web::{build_router, AppState, CORRELATION_ID_HEADER};

fn server_with(lists: ListRepository) -> TestServer {
    init_test_tracing();
    let state = AppState::new(lists, memory_job_runner());
    TestServer::new(build_router(state)).expect("Failed to start test server")
}

fn server() -> TestServer {
    server_with(memory_repository())
}

async fn wait_for_job(server: &TestServer, path: &str) -> JobStatusResponse {
    for _ in 0..200 {
        let status: JobStatusResponse = server.get(path).await.json();
        if matches!(status.status, JobStatus::Finished | JobStatus::Failed) {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job at {path} did not finish in time");
}

#[tokio::test]
async fn test_root_and_health() {
    let server = server();

    let root = server.get("/").await;
    root.assert_status_ok();
    assert_eq!(
        root.json::<Value>(),
        json!({"message": "TodoList API is running"})
    );

    let health = server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");
    assert!(health.headers().contains_key(CORRELATION_ID_HEADER));

    server.get("/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_groceries_scenario() {
    let server = server();

    let created = server
        .post("/api/todolists")
        .json(&json!({"name": "Groceries"}))
        .await;
    created.assert_status(StatusCode::CREATED);
    let list: TodoList = created.json();
    assert_eq!(list.id.get(), 1);
    assert!(list.items.is_empty());

    let milk = server
        .post("/api/todolists/1/items")
        .json(&json!({"title": "Milk"}))
        .await;
    milk.assert_status(StatusCode::CREATED);
    let milk: TodoItem = milk.json();
    assert_eq!(milk.id.get(), 1);
    assert!(!milk.completed);

    let duplicate = server
        .post("/api/todolists/1/items")
        .json(&json!({"title": "milk"}))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        duplicate.json::<Value>()["message"],
        "A task with title 'milk' already exists in this list"
    );

    let toggled = server.patch("/api/todolists/1/items/1/toggle").await;
    toggled.assert_status_ok();
    assert!(toggled.json::<TodoItem>().completed);

    let queued = server.post("/api/todolists/1/items/complete-all").await;
    queued.assert_status(StatusCode::ACCEPTED);
    let queued: JobQueuedResponse = queued.json();
    let job = wait_for_job(&server, &queued.check_status).await;
    assert_eq!(job.status, JobStatus::Finished);
    assert_eq!(job.result.unwrap()["completed"], 0);

    server
        .delete("/api/todolists/1/items/1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let items: Vec<TodoItem> = server.get("/api/todolists/1/items").await.json();
    assert!(items.is_empty());

    server
        .delete("/api/todolists/1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let missing = server.get("/api/todolists/1").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        missing.json::<Value>(),
        json!({"code": "NOT_FOUND", "message": "TodoList with id 1 not found"})
    );
}

#[tokio::test]
async fn test_complete_all_job_completes_items() {
    let server = server();
    server
        .post("/api/todolists")
        .json(&json!({"name": "Weekend"}))
        .await;
    for title in ["Laundry", "Groceries", "Gym"] {
        server
            .post("/api/todolists/1/items")
            .json(&json!({"title": title}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let queued: JobQueuedResponse = server
        .post("/api/todolists/1/items/complete-all")
        .await
        .json();
    assert_eq!(queued.message, "queued job");
    assert_eq!(queued.todo_list_id.get(), 1);
    assert_eq!(queued.check_status, format!("/api/jobs/{}", queued.job_id));

    let job = wait_for_job(&server, &queued.check_status).await;
    assert_eq!(job.id, queued.job_id);
    assert_eq!(job.status, JobStatus::Finished);
    assert_eq!(
        job.result,
        Some(json!({"completed": 3, "message": "Completed 3 tasks"}))
    );
    assert!(job.error.is_none());

    let items: Vec<TodoItem> = server.get("/api/todolists/1/items").await.json();
    assert!(items.iter().all(|item| item.completed));
}

#[tokio::test]
async fn test_complete_all_on_missing_list_is_accepted_then_fails() {
    let server = server();

    let queued = server.post("/api/todolists/77/items/complete-all").await;
    queued.assert_status(StatusCode::ACCEPTED);
    let queued: JobQueuedResponse = queued.json();

    let job = wait_for_job(&server, &queued.check_status).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("TodoList with id 77 not found"));
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let server = server();
    let response = server.get("/api/jobs/not-a-job").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_list_names() {
    let server = server();
    server
        .post("/api/todolists")
        .json(&json!({"name": "Groceries"}))
        .await
        .assert_status(StatusCode::CREATED);

    let duplicate = server
        .post("/api/todolists")
        .json(&json!({"name": "  groceries "}))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        duplicate.json::<Value>(),
        json!({
            "code": "BAD_REQUEST",
            "message": "A list with the name '  groceries ' already exists",
        })
    );

    server
        .post("/api/todolists")
        .json(&json!({"name": "Hardware"}))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .put("/api/todolists/2")
        .json(&json!({"name": "GROCERIES"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let renamed = server
        .put("/api/todolists/1")
        .json(&json!({"name": "Food"}))
        .await;
    renamed.assert_status_ok();
    assert_eq!(renamed.json::<TodoList>().name, "Food");

    server
        .put("/api/todolists/9")
        .json(&json!({"name": "Nothing"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_unprocessable() {
    let server = server();

    for body in [json!({}), json!({"name": ""}), json!({"name": "   "}), json!({"name": 5})] {
        let response = server.post("/api/todolists").json(&body).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
    }

    server
        .post("/api/todolists")
        .json(&json!({"name": "Chores"}))
        .await;
    server
        .post("/api/todolists/1/items")
        .json(&json!({"description": "no title"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    server
        .post("/api/todolists/1/items")
        .json(&json!({"title": "Sweep"}))
        .await;
    server
        .put("/api/todolists/1/items/1")
        .json(&json!({"title": ""}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_item_updates() {
    let server = server();
    server
        .post("/api/todolists")
        .json(&json!({"name": "Chores"}))
        .await;
    server
        .post("/api/todolists/1/items")
        .json(&json!({"title": "Sweep", "description": "Kitchen"}))
        .await;
    server
        .post("/api/todolists/1/items")
        .json(&json!({"title": "Mop", "completed": true}))
        .await;

    let updated = server
        .put("/api/todolists/1/items/1")
        .json(&json!({"completed": true}))
        .await;
    updated.assert_status_ok();
    let updated: TodoItem = updated.json();
    assert_eq!(updated.title, "Sweep");
    assert_eq!(updated.description.as_deref(), Some("Kitchen"));
    assert!(updated.completed);

    // Same title, different case, on the same item is allowed
    server
        .put("/api/todolists/1/items/1")
        .json(&json!({"title": "SWEEP"}))
        .await
        .assert_status_ok();

    let clash = server
        .put("/api/todolists/1/items/1")
        .json(&json!({"title": "mop"}))
        .await;
    clash.assert_status(StatusCode::BAD_REQUEST);

    let fetched: TodoItem = server.get("/api/todolists/1/items/1").await.json();
    assert_eq!(fetched.title, "SWEEP");

    let items: Vec<TodoItem> = server.get("/api/todolists/1/items").await.json();
    let ids: Vec<u64> = items.iter().map(|item| item.id.get()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_missing_items_and_lists() {
    let server = server();

    server
        .get("/api/todolists/5/items")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/todolists/5/items")
        .json(&json!({"title": "Orphan"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/api/todolists/5")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/todolists")
        .json(&json!({"name": "Empty"}))
        .await;

    let missing_item = server.get("/api/todolists/1/items/3").await;
    missing_item.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        missing_item.json::<Value>()["message"],
        "Item with id 3 not found in TodoList 1"
    );
    server
        .patch("/api/todolists/1/items/3/toggle")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put("/api/todolists/1/items/3")
        .json(&json!({"completed": true}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/api/todolists/1/items/3")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let server = server_with(ListRepository::new(Arc::new(FailingKeyValueStore::new())));

    let response = server.get("/api/todolists").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({"code": "INTERNAL_SERVER_ERROR", "message": "An internal error occurred"})
    );

    server
        .get("/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_absent_without_exporter() {
    let server = server();
    server
        .get("/metrics")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
