// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试共用的数据库夹具与测试替身

use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::models::dispatch::DispatchPayload;
use crate::domain::models::task::{TaskId, TaskStatus};
use crate::domain::services::lease_manager::{LeaseManager, LOCK_TIMEOUT_SECS};
use crate::domain::services::worker_dispatcher::{DispatchError, WorkerDispatcher};
use crate::infrastructure::database::entities::task as task_entity;
use crate::infrastructure::repositories::lease_repo_impl::LeaseRepositoryImpl;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::workers::coordinator::{Coordinator, CoordinatorProfile};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use parking_lot::Mutex;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::sync::Arc;

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();
    db
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn minutes_ago(minutes: i64) -> DateTime<FixedOffset> {
    (Utc::now() - Duration::minutes(minutes)).into()
}

pub fn lease_manager(db: Arc<DatabaseConnection>) -> LeaseManager {
    LeaseManager::new(
        Arc::new(LeaseRepositoryImpl::new(db)),
        Duration::seconds(LOCK_TIMEOUT_SECS),
    )
}

pub fn coordinator(
    db: Arc<DatabaseConnection>,
    profile: CoordinatorProfile,
    dispatcher: Arc<RecordingDispatcher>,
) -> Coordinator {
    Coordinator::new(
        profile,
        Arc::new(TaskRepositoryImpl::new(db.clone())),
        lease_manager(db),
        dispatcher,
    )
}

/// 直接写入任务行，绕过状态机，用于构造任意初始状态
#[derive(Debug, Clone)]
pub struct TaskSeed {
    pub industry_id: i32,
    pub target_date: NaiveDate,
    pub status: TaskStatus,
    pub batch_id: String,
    pub retry_count: i32,
    pub max_retries: i32,
    pub error_message: Option<String>,
    pub failed_from: Option<TaskStatus>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
}

impl Default for TaskSeed {
    fn default() -> Self {
        let now = Utc::now().into();
        Self {
            industry_id: 1,
            target_date: date(2024, 1, 15),
            status: TaskStatus::PendingScrape,
            batch_id: "batch-1".to_string(),
            retry_count: 0,
            max_retries: 3,
            error_message: None,
            failed_from: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }
}

impl TaskSeed {
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

pub async fn insert_task(db: &DatabaseConnection, seed: TaskSeed) -> TaskId {
    let model = task_entity::ActiveModel {
        industry_id: Set(seed.industry_id),
        target_date: Set(seed.target_date),
        status: Set(seed.status.to_string()),
        batch_id: Set(seed.batch_id),
        posts_scraped: Set(0),
        posts_processed: Set(0),
        ideas_generated: Set(0),
        retry_count: Set(seed.retry_count),
        max_retries: Set(seed.max_retries),
        error_message: Set(seed.error_message),
        failed_from: Set(seed.failed_from.map(|s| s.to_string())),
        created_at: Set(seed.created_at),
        updated_at: Set(seed.updated_at),
        started_at: Set(seed.started_at),
        completed_at: Set(seed.completed_at),
        ..Default::default()
    };

    model.insert(db).await.unwrap().id
}

/// 记录派发调用的派发器，可配置为总是失败
#[derive(Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<(CoordinatorKind, DispatchPayload)>>,
    failure: Option<DispatchError>,
}

impl RecordingDispatcher {
    pub fn failing(error: DispatchError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn calls(&self) -> Vec<(CoordinatorKind, DispatchPayload)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WorkerDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        kind: CoordinatorKind,
        payload: &DispatchPayload,
    ) -> Result<(), DispatchError> {
        self.calls.lock().push((kind, payload.clone()));
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
