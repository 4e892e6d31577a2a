// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::usecases::create_batch::CreateBatchUseCase;
use crate::application::usecases::report_completion::ReportCompletionUseCase;
use crate::config::settings::Settings;
use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::repositories::industry_repository::IndustryRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::lease_manager::LeaseManager;
use crate::domain::services::worker_dispatcher::WorkerDispatcher;
use crate::infrastructure::repositories::industry_repo_impl::IndustryRepositoryImpl;
use crate::infrastructure::repositories::lease_repo_impl::LeaseRepositoryImpl;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::presentation::handlers::{
    batch_handler, coordinator_handler, industry_handler, report_handler,
};
use crate::workers::{analyzer_coordinator, scraper_coordinator, Coordinator};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use chrono::Duration;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 两种协调器的共享句柄
#[derive(Clone)]
pub struct Coordinators {
    pub scraper: Arc<Coordinator>,
    pub analyzer: Arc<Coordinator>,
}

impl Coordinators {
    pub fn get(&self, kind: CoordinatorKind) -> &Arc<Coordinator> {
        match kind {
            CoordinatorKind::Scraper => &self.scraper,
            CoordinatorKind::Analyzer => &self.analyzer,
        }
    }
}

/// 路由所需的全部组件
#[derive(Clone)]
pub struct AppComponents {
    pub tasks: Arc<dyn TaskRepository>,
    pub industries: Arc<dyn IndustryRepository>,
    pub create_batch: Arc<CreateBatchUseCase>,
    pub report_completion: Arc<ReportCompletionUseCase>,
    pub coordinators: Coordinators,
}

impl AppComponents {
    /// 根据数据库连接与配置组装仓库、租约管理器、协调器和用例
    pub fn new(
        db: Arc<DatabaseConnection>,
        settings: &Settings,
        dispatcher: Arc<dyn WorkerDispatcher>,
    ) -> Self {
        let tasks: Arc<dyn TaskRepository> = Arc::new(TaskRepositoryImpl::new(db.clone()));
        let industries: Arc<dyn IndustryRepository> =
            Arc::new(IndustryRepositoryImpl::new(db.clone()));
        let leases = LeaseManager::new(
            Arc::new(LeaseRepositoryImpl::new(db)),
            Duration::seconds(settings.lease.timeout_secs),
        );

        let scraper = Coordinator::new(
            scraper_coordinator::profile(&settings.scraper),
            tasks.clone(),
            leases.clone(),
            dispatcher.clone(),
        );
        let analyzer = Coordinator::new(
            analyzer_coordinator::profile(&settings.analyzer),
            tasks.clone(),
            leases.clone(),
            dispatcher,
        );

        Self {
            create_batch: Arc::new(CreateBatchUseCase::new(
                tasks.clone(),
                industries.clone(),
                leases,
                &settings.tasks,
            )),
            report_completion: Arc::new(ReportCompletionUseCase::new(tasks.clone())),
            tasks,
            industries,
            coordinators: Coordinators {
                scraper: Arc::new(scraper),
                analyzer: Arc::new(analyzer),
            },
        }
    }
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(components: AppComponents) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route(
            "/v1/industries",
            get(industry_handler::list_industries).post(industry_handler::upsert_industry),
        )
        .route("/v1/batches", post(batch_handler::create_batch))
        .route("/v1/batches/{batch_id}", get(batch_handler::get_batch))
        .route(
            "/v1/tasks/{id}/report",
            post(report_handler::report_completion),
        )
        .route(
            "/v1/coordinators/{kind}/run",
            post(coordinator_handler::run_coordinator),
        )
        .layer(Extension(components.tasks))
        .layer(Extension(components.industries))
        .layer(Extension(components.create_batch))
        .layer(Extension(components.report_completion))
        .layer(Extension(components.coordinators));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
