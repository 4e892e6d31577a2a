// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use ideaminer::application::usecases::create_batch::CreateBatchCommand;
use ideaminer::domain::models::completion::{Outcome, Stage, WorkerReport};
use ideaminer::domain::models::coordinator::{CoordinatorKind, CoordinatorReport};
use ideaminer::domain::models::task::TaskStatus;
use ideaminer::domain::repositories::task_repository::TaskRepository;

fn succeeded(stage: Stage) -> WorkerReport {
    WorkerReport {
        stage,
        outcome: Outcome::Succeeded,
        posts_scraped: 12,
        posts_processed: 12,
        ideas_generated: 3,
        error_message: None,
    }
}

/// 三个行业的批次走完抓取与分析两个阶段
#[tokio::test]
async fn test_batch_flows_through_both_stages() {
    let app = create_test_app().await;
    let components = &app.components;

    let created = components
        .create_batch
        .execute(CreateBatchCommand {
            target_date: "2024-06-01".to_string(),
            industry_ids: Some(vec![1, 2, 3]),
            force_create: false,
        })
        .await
        .unwrap();

    let scraper = &components.coordinators.scraper;
    let analyzer = &components.coordinators.analyzer;

    let first = scraper.coordinate().await.unwrap();
    assert_eq!(first.tasks_processed, 2);

    // Cap of two scrapes in flight blocks the third
    let capped = scraper.coordinate().await.unwrap();
    assert_eq!(capped.tasks_processed, 0);

    for payload in app.workers.calls_for(CoordinatorKind::Scraper) {
        for id in payload.task_ids {
            assert!(components
                .report_completion
                .execute(id, succeeded(Stage::Scrape))
                .await
                .unwrap());
        }
    }

    assert_eq!(scraper.coordinate().await.unwrap().tasks_processed, 1);
    assert_eq!(analyzer.coordinate().await.unwrap().tasks_processed, 2);

    let third = app.workers.calls_for(CoordinatorKind::Scraper)[1].task_ids[0];
    assert!(components
        .report_completion
        .execute(third, succeeded(Stage::Scrape))
        .await
        .unwrap());
    assert_eq!(analyzer.coordinate().await.unwrap().tasks_processed, 1);

    for payload in app.workers.calls_for(CoordinatorKind::Analyzer) {
        for id in payload.task_ids {
            assert!(components
                .report_completion
                .execute(id, succeeded(Stage::Analysis))
                .await
                .unwrap());
        }
    }

    let tasks = app.task_repo.find_by_batch(&created.batch_id).await.unwrap();
    assert_eq!(tasks.len(), 3);
    for task in tasks {
        assert_eq!(task.status, TaskStatus::CompleteAnalysis);
        assert_eq!(task.ideas_generated, 3);
        assert!(task.completed_at.is_some());
    }
}

/// 派发持续失败时任务最多重试 max_retries 次后进入失败
#[tokio::test]
async fn test_retry_budget_bounds_dispatch_failures() {
    let app = create_test_app().await;
    let components = &app.components;
    app.workers.reject_all(true);

    let created = components
        .create_batch
        .execute(CreateBatchCommand {
            target_date: "2024-06-01".to_string(),
            industry_ids: Some(vec![7]),
            force_create: false,
        })
        .await
        .unwrap();
    let scraper = &components.coordinators.scraper;

    for attempt in 1..=3 {
        let report = scraper.coordinate().await.unwrap();
        assert_eq!(report.dispatch_failures, 1);

        let task = &app.task_repo.find_by_batch(&created.batch_id).await.unwrap()[0];
        assert_eq!(task.status, TaskStatus::PendingScrape);
        assert_eq!(task.retry_count, attempt);
        assert!(task.started_at.is_none());
    }

    let report = scraper.coordinate().await.unwrap();
    assert_eq!(report.dispatch_failures, 1);

    let task = &app.task_repo.find_by_batch(&created.batch_id).await.unwrap()[0];
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.retry_count, 3);
    assert_eq!(task.failed_from, Some(TaskStatus::Scraping));

    // Exhausted tasks stay failed
    app.workers.reject_all(false);
    assert_eq!(
        scraper.coordinate().await.unwrap(),
        CoordinatorReport::default()
    );
    assert_eq!(app.workers.calls().len(), 4);
}

/// 迟到的回报不能复活已被回收的任务
#[tokio::test]
async fn test_late_report_after_failure_is_ignored() {
    let app = create_test_app().await;
    let components = &app.components;

    components
        .create_batch
        .execute(CreateBatchCommand {
            target_date: "2024-06-01".to_string(),
            industry_ids: Some(vec![1]),
            force_create: false,
        })
        .await
        .unwrap();
    components.coordinators.scraper.coordinate().await.unwrap();
    let id = app.workers.calls()[0].1.task_ids[0];

    let failure = WorkerReport {
        outcome: Outcome::Failed,
        error_message: Some("Reddit API returned 429".to_string()),
        ..succeeded(Stage::Scrape)
    };
    assert!(components
        .report_completion
        .execute(id, failure)
        .await
        .unwrap());
    assert!(!components
        .report_completion
        .execute(id, succeeded(Stage::Scrape))
        .await
        .unwrap());

    let task = app.task_repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error_message.as_deref(), Some("Reddit API returned 429"));
}
