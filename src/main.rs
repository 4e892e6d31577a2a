// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use ideaminer::config::settings::Settings;
use ideaminer::infrastructure::database::connection;
use ideaminer::infrastructure::metrics;
use ideaminer::infrastructure::services::http_worker_dispatcher::HttpWorkerDispatcher;
use ideaminer::presentation::routes::{self, AppComponents};
use ideaminer::queue::scheduler::CoordinatorScheduler;
use ideaminer::utils::telemetry;
use ideaminer::workers::Worker;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.log);
    info!("Starting ideaminer...");

    // Initialize Prometheus Metrics
    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = connection::connect(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize Components
    let dispatcher = Arc::new(HttpWorkerDispatcher::new(
        &settings.scraper.worker_url,
        &settings.analyzer.worker_url,
        &settings.dispatch,
    )?);
    let components = AppComponents::new(db.clone(), &settings, dispatcher);

    // 5. Start coordinator scheduler
    let scheduler_handles = if settings.scheduler.enabled {
        let workers: Vec<Arc<dyn Worker>> = vec![
            components.coordinators.scraper.clone(),
            components.coordinators.analyzer.clone(),
        ];
        CoordinatorScheduler::new(workers, Duration::from_secs(settings.scheduler.interval_secs))
            .start()
    } else {
        info!("Coordinator scheduler disabled");
        Vec::new()
    };

    // 6. Start HTTP server
    let app = routes::routes(components);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for handle in scheduler_handles {
        handle.abort();
    }
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
