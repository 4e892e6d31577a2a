// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use axum::http::StatusCode;
use ideaminer::domain::models::coordinator::CoordinatorKind;
use ideaminer::domain::models::task::TaskStatus;
use ideaminer::domain::repositories::task_repository::TaskRepository;
use serde_json::{json, Value};

async fn create_batch(app: &super::helpers::TestApp, body: Value) -> (StatusCode, Value) {
    let response = app.server.post("/v1/batches").json(&body).await;
    (response.status_code(), response.json())
}

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");

    let response = app.server.get("/v1/version").await;
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

/// 创建批次后可按批次ID查询任务
#[tokio::test]
async fn test_create_and_inspect_batch() {
    let app = create_test_app().await;

    let (status, body) = create_batch(
        &app,
        json!({ "targetDate": "2024-06-01", "industryIds": [1, 2, 3] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tasksCreated"], 3);

    let batch_id = body["batchId"].as_str().unwrap().to_string();
    let response = app.server.get(&format!("/v1/batches/{}", batch_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let tasks: Vec<Value> = response.json();
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t["status"] == "pending_scrape"));
    assert!(tasks.iter().all(|t| t["targetDate"] == "2024-06-01"));

    let response = app.server.get("/v1/batches/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_batch_returns_conflict() {
    let app = create_test_app().await;

    let (status, _) = create_batch(
        &app,
        json!({ "targetDate": "2024-06-01", "industryIds": [1, 2, 3] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_batch(
        &app,
        json!({ "targetDate": "2024-06-01", "industryIds": [3, 2, 9] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflictingIndustries"], json!([2, 3]));
    assert!(body["error"].is_string());

    let (status, body) = create_batch(
        &app,
        json!({ "targetDate": "2024-06-01", "industryIds": [3, 2, 9], "forceCreate": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tasksCreated"], 3);
}

#[tokio::test]
async fn test_invalid_batch_requests_are_rejected() {
    let app = create_test_app().await;

    for body in [
        json!({ "targetDate": "2024-6-1", "industryIds": [1] }),
        json!({ "targetDate": "2099-01-01", "industryIds": [1] }),
        json!({ "targetDate": "2023-12-31", "industryIds": [1] }),
        json!({ "targetDate": "2024-06-01", "industryIds": [] }),
        json!({ "targetDate": "2024-06-01", "industryIds": [-4] }),
    ] {
        let (status, response) = create_batch(&app, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "request {}", body);
        assert!(response["error"].is_string());
    }

    assert_eq!(
        app.task_repo
            .count_by_status(TaskStatus::PendingScrape)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_coordinator_run_and_worker_report() {
    let app = create_test_app().await;

    let (_, body) = create_batch(
        &app,
        json!({ "targetDate": "2024-06-01", "industryIds": [1, 2, 3] }),
    )
    .await;
    let batch_id = body["batchId"].as_str().unwrap().to_string();

    let response = app.server.post("/v1/coordinators/scraper/run").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["tasksProcessed"], 2);
    assert_eq!(report["skippedBusy"], false);

    let dispatched = app.workers.calls_for(CoordinatorKind::Scraper);
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].batch_id, batch_id);
    let task_id = dispatched[0].task_ids[0];

    let report_body = json!({ "stage": "scrape", "outcome": "succeeded", "posts_scraped": 25 });
    let url = format!("/v1/tasks/{}/report", task_id);

    let response = app.server.post(&url).json(&report_body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["applied"], true);

    let response = app.server.post(&url).json(&report_body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["applied"], false);

    let task = app.task_repo.find_by_id(task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::CompleteScrape);
    assert_eq!(task.posts_scraped, 25);
}

#[tokio::test]
async fn test_report_errors() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/tasks/4242/report")
        .json(&json!({ "stage": "analysis", "outcome": "failed" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post("/v1/tasks/1/report")
        .json(&json!({ "stage": "scrape", "outcome": "succeeded", "posts_scraped": -1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_coordinator_is_not_found() {
    let app = create_test_app().await;

    let response = app.server.post("/v1/coordinators/renderer/run").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.server.post("/v1/coordinators/analyzer/run").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["tasksProcessed"], 0);
}

/// 登记的行业即为省略 industryIds 时的默认集合
#[tokio::test]
async fn test_registered_industries_back_default_batches() {
    let app = create_test_app().await;

    let (status, body) = create_batch(&app, json!({ "targetDate": "2024-06-01" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    for (id, name) in [(2, "fintech"), (1, "healthcare")] {
        let response = app
            .server
            .post("/v1/industries")
            .json(&json!({ "id": id, "name": name }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["name"], name);
    }

    let response = app.server.get("/v1/industries").await;
    let listed: Vec<Value> = response.json();
    assert_eq!(
        listed.iter().map(|i| i["id"].clone()).collect::<Vec<_>>(),
        vec![json!(1), json!(2)]
    );

    let (status, body) = create_batch(&app, json!({ "targetDate": "2024-06-01" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tasksCreated"], 2);
}

#[tokio::test]
async fn test_invalid_industry_registrations_are_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/industries")
        .json(&json!({ "id": 1, "name": "healthcare" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .post("/v1/industries")
        .json(&json!({ "id": 4, "name": "healthcare" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    for body in [json!({ "id": 0, "name": "retail" }), json!({ "id": 5, "name": "" })] {
        let response = app.server.post("/v1/industries").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "request {}", body);
    }
}
