// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::NaiveDate;
use ideaminer::config::settings::Settings;
use ideaminer::domain::models::coordinator::CoordinatorKind;
use ideaminer::domain::models::dispatch::DispatchPayload;
use ideaminer::domain::services::worker_dispatcher::{DispatchError, WorkerDispatcher};
use ideaminer::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use ideaminer::presentation::routes::{self, AppComponents};
use migration::{Migrator, MigratorTrait};
use parking_lot::Mutex;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

/// 记录派发调用的假工作器
#[derive(Default)]
pub struct FakeWorkers {
    calls: Mutex<Vec<(CoordinatorKind, DispatchPayload)>>,
    reject: Mutex<bool>,
}

impl FakeWorkers {
    pub fn calls(&self) -> Vec<(CoordinatorKind, DispatchPayload)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, kind: CoordinatorKind) -> Vec<DispatchPayload> {
        self.calls()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, payload)| payload)
            .collect()
    }

    /// 之后的派发全部以 503 拒绝
    pub fn reject_all(&self, reject: bool) {
        *self.reject.lock() = reject;
    }
}

#[async_trait]
impl WorkerDispatcher for FakeWorkers {
    async fn dispatch(
        &self,
        kind: CoordinatorKind,
        payload: &DispatchPayload,
    ) -> Result<(), DispatchError> {
        self.calls.lock().push((kind, payload.clone()));
        if *self.reject.lock() {
            return Err(DispatchError::Rejected { status: 503 });
        }
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db_pool: Arc<DatabaseConnection>,
    pub task_repo: Arc<TaskRepositoryImpl>,
    pub workers: Arc<FakeWorkers>,
    pub components: AppComponents,
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();
    db
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::new().expect("default settings load");
    settings.scheduler.enabled = false;
    settings.metrics.enabled = false;
    settings.tasks.min_target_date = date(2024, 1, 1);
    settings
}

pub async fn create_test_app() -> TestApp {
    let db_pool = setup_db().await;
    let settings = test_settings();
    let workers = Arc::new(FakeWorkers::default());

    let components = AppComponents::new(db_pool.clone(), &settings, workers.clone());
    let server = TestServer::new(routes::routes(components.clone())).unwrap();

    TestApp {
        server,
        task_repo: Arc::new(TaskRepositoryImpl::new(db_pool.clone())),
        db_pool,
        workers,
        components,
    }
}
