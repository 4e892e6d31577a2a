// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::date;
use ideaminer::config::settings::DispatchSettings;
use ideaminer::domain::models::coordinator::CoordinatorKind;
use ideaminer::domain::models::dispatch::DispatchPayload;
use ideaminer::domain::services::worker_dispatcher::{DispatchError, WorkerDispatcher};
use ideaminer::infrastructure::services::http_worker_dispatcher::HttpWorkerDispatcher;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> DispatchPayload {
    DispatchPayload {
        industry_ids: vec![1, 2],
        target_date: date(2024, 1, 15),
        task_ids: vec![10, 11],
        batch_id: "b-1".to_string(),
    }
}

fn dispatcher(server: &MockServer, ack_timeout_ms: u64) -> HttpWorkerDispatcher {
    let settings = DispatchSettings {
        ack_timeout_ms,
        request_timeout_secs: 30,
    };
    HttpWorkerDispatcher::new(
        &format!("{}/scrape", server.uri()),
        &format!("{}/analyze", server.uri()),
        &settings,
    )
    .unwrap()
}

#[tokio::test]
async fn test_dispatch_posts_payload_to_worker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(header("X-Ideaminer-Coordinator", "analyzer"))
        .and(body_json(json!({
            "industry_ids": [1, 2],
            "target_date": "2024-01-15",
            "task_ids": [10, 11],
            "batch_id": "b-1"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher(&server, 2000)
        .dispatch(CoordinatorKind::Analyzer, &payload())
        .await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = dispatcher(&server, 2000)
        .dispatch(CoordinatorKind::Scraper, &payload())
        .await;
    assert_eq!(result, Err(DispatchError::Rejected { status: 500 }));
}

#[tokio::test]
async fn test_slow_worker_counts_as_submitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let result = dispatcher(&server, 100)
        .dispatch(CoordinatorKind::Scraper, &payload())
        .await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_unreachable_worker_is_transport_error() {
    let settings = DispatchSettings {
        ack_timeout_ms: 2000,
        request_timeout_secs: 5,
    };
    let dispatcher =
        HttpWorkerDispatcher::new("http://127.0.0.1:1/scrape", "http://127.0.0.1:1/analyze", &settings)
            .unwrap();

    let result = dispatcher
        .dispatch(CoordinatorKind::Scraper, &payload())
        .await;
    assert!(matches!(result, Err(DispatchError::Transport(_))));
}
