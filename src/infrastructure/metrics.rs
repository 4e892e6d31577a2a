// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

pub const TASKS_DISPATCHED: &str = "ideaminer_tasks_dispatched_total";
pub const TIMEOUTS: &str = "ideaminer_timeouts_total";
pub const RETRIES: &str = "ideaminer_retries_total";
pub const DISPATCH_FAILURES: &str = "ideaminer_dispatch_failures_total";
pub const LEASE_BUSY: &str = "ideaminer_lease_busy_total";
pub const TASKS_IN_FLIGHT: &str = "ideaminer_tasks_in_flight";

pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}
