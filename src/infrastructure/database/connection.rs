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

use crate::config::settings::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// 连接任务数据库
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接过程中出现的错误
pub async fn connect(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let options = connect_options(settings);
    info!(
        max_connections = ?options.get_max_connections(),
        sqlx_logging = options.get_sqlx_logging(),
        "Connecting to task database"
    );
    Database::connect(options).await
}

/// 把配置映射为连接池参数，未配置的项沿用 sea-orm 默认值
pub fn connect_options(settings: &DatabaseSettings) -> ConnectOptions {
    let secs = |value: Option<u64>| value.map(Duration::from_secs);
    let mut options = ConnectOptions::new(settings.url.clone());

    if let Some(max) = settings.max_connections {
        options.max_connections(max);
    }
    if let Some(min) = settings.min_connections {
        options.min_connections(min);
    }
    if let Some(timeout) = secs(settings.connect_timeout) {
        options.connect_timeout(timeout);
    }
    if let Some(timeout) = secs(settings.acquire_timeout.or(settings.connect_timeout)) {
        options.acquire_timeout(timeout);
    }
    if let Some(idle) = secs(settings.idle_timeout) {
        options.idle_timeout(idle);
    }
    if let Some(lifetime) = secs(settings.max_lifetime) {
        options.max_lifetime(lifetime);
    }

    options.sqlx_logging(settings.sqlx_logging);
    options
}
