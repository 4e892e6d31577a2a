// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LogSettings;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 配置中的过滤指令无法解析时的兜底
pub const DEFAULT_FILTER: &str = "info,ideaminer=debug";

/// 初始化全局日志订阅者
///
/// `RUST_LOG` 优先于配置中的 `log.filter`；`log.json` 打开时输出结构化 JSON
pub fn init_telemetry(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter(&settings.filter));
    let json = settings.json.then(|| fmt::layer().json());
    let plain = (!settings.json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Invalid log.filter {:?} ({}), using {}", directives, e, DEFAULT_FILTER);
        EnvFilter::new(DEFAULT_FILTER)
    })
}
