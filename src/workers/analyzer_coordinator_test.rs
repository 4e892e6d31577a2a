// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::coordinator::CoordinatorReport;
use crate::domain::models::task::TaskStatus;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::utils::testing::{
    coordinator, insert_task, minutes_ago, setup_db, RecordingDispatcher, TaskSeed,
};
use std::sync::Arc;

fn scraped(industry_id: i32, scraped_minutes_ago: i64) -> TaskSeed {
    TaskSeed {
        industry_id,
        status: TaskStatus::CompleteScrape,
        created_at: minutes_ago(120),
        updated_at: minutes_ago(scraped_minutes_ago),
        ..Default::default()
    }
}

fn failed_analysis(error_message: &str) -> TaskSeed {
    TaskSeed {
        status: TaskStatus::Failed,
        failed_from: Some(TaskStatus::Analyzing),
        error_message: Some(error_message.to_string()),
        completed_at: Some(minutes_ago(61)),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_dispatches_oldest_scrape_completions_first() {
    let db = setup_db().await;
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let analyzer = coordinator(db.clone(), default_profile(), dispatcher.clone());

    for (industry_id, minutes) in [(1, 5), (2, 50), (3, 20), (4, 40), (5, 30)] {
        insert_task(&db, scraped(industry_id, minutes)).await;
    }

    let report = analyzer.coordinate().await.unwrap();
    assert_eq!(report.tasks_processed, CONCURRENCY_CAP as u32);

    let calls = dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, CoordinatorKind::Analyzer);
    assert_eq!(calls[0].1.industry_ids, vec![2, 4, 5, 3]);
}

#[tokio::test]
async fn test_analysis_timeout_uses_ten_minute_budget() {
    let db = setup_db().await;
    let repo = TaskRepositoryImpl::new(db.clone());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let analyzer = coordinator(db.clone(), default_profile(), dispatcher.clone());

    let recent = insert_task(
        &db,
        TaskSeed {
            status: TaskStatus::Analyzing,
            started_at: Some(minutes_ago(8)),
            ..Default::default()
        },
    )
    .await;
    let stuck = insert_task(
        &db,
        TaskSeed {
            industry_id: 2,
            status: TaskStatus::Analyzing,
            started_at: Some(minutes_ago(11)),
            ..Default::default()
        },
    )
    .await;

    let report = analyzer.coordinate().await.unwrap();
    assert_eq!(report.timeouts_handled, 1);

    let task = repo.find_by_id(recent).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Analyzing);
    assert_eq!(task.retry_count, 0);

    // Recycled into complete_scrape then claimed again in the same run
    let task = repo.find_by_id(stuck).await.unwrap().unwrap();
    assert_eq!(task.retry_count, 1);
    assert_eq!(task.status, TaskStatus::Analyzing);
    assert_eq!(
        task.error_message.as_deref(),
        Some("Analysis timed out after 10 minutes (attempt 1 of 3)")
    );
}

#[tokio::test]
async fn test_no_posts_failures_are_never_retried() {
    let db = setup_db().await;
    let repo = TaskRepositoryImpl::new(db.clone());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let analyzer = coordinator(db.clone(), default_profile(), dispatcher.clone());

    let permanent = insert_task(&db, failed_analysis("No posts to analyze for industry 1")).await;
    let transient = insert_task(
        &db,
        TaskSeed {
            industry_id: 2,
            ..failed_analysis("OpenAI request timed out")
        },
    )
    .await;

    let report = analyzer.coordinate().await.unwrap();
    assert_eq!(report.retries_handled, 1);

    let task = repo.find_by_id(permanent).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.retry_count, 0);

    let task = repo.find_by_id(transient).await.unwrap().unwrap();
    assert_eq!(task.retry_count, 1);
    assert_eq!(task.status, TaskStatus::Analyzing);
}

#[tokio::test]
async fn test_failure_without_message_is_retryable() {
    let db = setup_db().await;
    let repo = TaskRepositoryImpl::new(db.clone());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let analyzer = coordinator(db.clone(), default_profile(), dispatcher.clone());

    let id = insert_task(
        &db,
        TaskSeed {
            error_message: None,
            ..failed_analysis("")
        },
    )
    .await;

    let report = analyzer.coordinate().await.unwrap();
    assert_eq!(report.retries_handled, 1);
    assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().retry_count, 1);
}

#[tokio::test]
async fn test_ignores_scrape_stage_work() {
    let db = setup_db().await;
    let repo = TaskRepositoryImpl::new(db.clone());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let analyzer = coordinator(db.clone(), default_profile(), dispatcher.clone());

    let pending = insert_task(&db, TaskSeed::default()).await;
    let scrape_failure = insert_task(
        &db,
        TaskSeed {
            failed_from: Some(TaskStatus::Scraping),
            ..failed_analysis("Reddit API returned 500")
        },
    )
    .await;

    let report = analyzer.coordinate().await.unwrap();
    assert_eq!(report, CoordinatorReport::default());

    assert_eq!(
        repo.find_by_id(pending).await.unwrap().unwrap().status,
        TaskStatus::PendingScrape
    );
    assert_eq!(
        repo.find_by_id(scrape_failure).await.unwrap().unwrap().status,
        TaskStatus::Failed
    );
    assert!(dispatcher.calls().is_empty());
}
