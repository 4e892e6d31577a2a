// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DispatchSettings;
use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::models::dispatch::DispatchPayload;
use crate::domain::services::worker_dispatcher::{DispatchError, WorkerDispatcher};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

/// 派发请求中标识协调器类型的请求头
pub const COORDINATOR_HEADER: &str = "X-Ideaminer-Coordinator";

/// 基于 HTTP 的工作器派发实现
///
/// 请求在独立任务中发送，调用方只等待 `ack_timeout`。
/// 窗口内收到传输错误或非 2xx 响应视为派发失败；
/// 窗口内没有结果则视为已提交，之后的结果只记录日志。
pub struct HttpWorkerDispatcher {
    /// HTTP 客户端
    client: reqwest::Client,
    scraper_url: Url,
    analyzer_url: Url,
    ack_timeout: Duration,
}

impl HttpWorkerDispatcher {
    /// 创建新的派发实现
    ///
    /// # 参数
    ///
    /// * `scraper_url` - 抓取工作器地址
    /// * `analyzer_url` - 分析工作器地址
    /// * `settings` - 派发配置
    pub fn new(
        scraper_url: &str,
        analyzer_url: &str,
        settings: &DispatchSettings,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .unwrap_or_default();

        Ok(Self {
            client,
            scraper_url: parse_endpoint(scraper_url)?,
            analyzer_url: parse_endpoint(analyzer_url)?,
            ack_timeout: settings.ack_timeout(),
        })
    }

    fn endpoint(&self, kind: CoordinatorKind) -> &Url {
        match kind {
            CoordinatorKind::Scraper => &self.scraper_url,
            CoordinatorKind::Analyzer => &self.analyzer_url,
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, DispatchError> {
    let url = Url::parse(raw).map_err(|e| DispatchError::InvalidEndpoint(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DispatchError::InvalidEndpoint(format!(
            "{}: unsupported scheme {}",
            raw, scheme
        ))),
    }
}

#[async_trait]
impl WorkerDispatcher for HttpWorkerDispatcher {
    async fn dispatch(
        &self,
        kind: CoordinatorKind,
        payload: &DispatchPayload,
    ) -> Result<(), DispatchError> {
        let endpoint = self.endpoint(kind).clone();
        let client = self.client.clone();
        let body = payload.clone();
        let (ack_tx, ack_rx) = oneshot::channel();

        tokio::spawn(async move {
            let sent = client
                .post(endpoint)
                .header(COORDINATOR_HEADER, kind.as_str())
                .json(&body)
                .send()
                .await;

            let outcome = match sent {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => Err(DispatchError::Rejected {
                    status: response.status().as_u16(),
                }),
                Err(e) => Err(DispatchError::Transport(e.to_string())),
            };

            // The coordinator has stopped waiting; only log the late result
            if let Err(late) = ack_tx.send(outcome) {
                match late {
                    Ok(()) => debug!(%kind, batch_id = %body.batch_id, "Worker accepted dispatch"),
                    Err(e) => warn!(
                        %kind,
                        batch_id = %body.batch_id,
                        "Worker failed after dispatch was considered submitted: {}",
                        e
                    ),
                }
            }
        });

        match tokio::time::timeout(self.ack_timeout, ack_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(DispatchError::Transport(
                "dispatch task ended without a response".to_string(),
            )),
            Err(_) => {
                debug!(%kind, batch_id = %payload.batch_id, "No worker answer within ack window, treating as submitted");
                Ok(())
            }
        }
    }
}
