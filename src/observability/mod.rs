//! 可观测性模块
//!
//! 提供计数器指标、结构化日志和健康检查。

use axum::{Json, Router, response::IntoResponse, routing::get};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::config::LoggingConfig;

// ===== Simple Metrics =====

/// 应用指标
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub http_requests_total: AtomicU64,
    pub http_request_duration_sum: AtomicU64,
    pub ask_requests_total: AtomicU64,
    pub answers_unidentified_total: AtomicU64,
    pub answers_not_found_total: AtomicU64,
    pub upstream_fetches_total: AtomicU64,
    pub upstream_failures_total: AtomicU64,
    pub upstream_empty_total: AtomicU64,
    pub cache_hits_total: AtomicU64,
    pub cache_misses_total: AtomicU64,
}

/// 问答结果分类，用于指标统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Answered,
    Prompt,
    NoData,
    Unidentified,
    NotFound,
}

/// 上游拉取结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    CacheHit,
    Fetched,
    Empty,
    Failed,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    /// 记录一次问答
    pub fn record_answer(&self, kind: AnswerKind) {
        self.ask_requests_total.fetch_add(1, Ordering::Relaxed);
        match kind {
            AnswerKind::Unidentified => {
                self.answers_unidentified_total
                    .fetch_add(1, Ordering::Relaxed);
            }
            AnswerKind::NotFound => {
                self.answers_not_found_total.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// 记录一次目录获取
    pub fn record_fetch(&self, kind: FetchKind) {
        match kind {
            FetchKind::CacheHit => {
                self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
            }
            FetchKind::Fetched | FetchKind::Empty | FetchKind::Failed => {
                self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
                self.upstream_fetches_total.fetch_add(1, Ordering::Relaxed);
                if kind == FetchKind::Empty {
                    self.upstream_empty_total.fetch_add(1, Ordering::Relaxed);
                }
                if kind == FetchKind::Failed {
                    self.upstream_failures_total
                        .fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP ask_requests_total Total questions answered
# TYPE ask_requests_total counter
ask_requests_total {}
# HELP answers_unidentified_total Questions with no identifiable member
# TYPE answers_unidentified_total counter
answers_unidentified_total {}
# HELP answers_not_found_total Questions naming an unknown member
# TYPE answers_not_found_total counter
answers_not_found_total {}
# HELP upstream_fetches_total Calls to the messages API
# TYPE upstream_fetches_total counter
upstream_fetches_total {}
# HELP upstream_failures_total Failed calls to the messages API
# TYPE upstream_failures_total counter
upstream_failures_total {}
# HELP upstream_empty_total Successful calls that returned no messages
# TYPE upstream_empty_total counter
upstream_empty_total {}
# HELP cache_hits_total Directory cache hits
# TYPE cache_hits_total counter
cache_hits_total {}
# HELP cache_misses_total Directory cache misses
# TYPE cache_misses_total counter
cache_misses_total {}
"#,
            self.http_requests_total.load(Ordering::Relaxed),
            self.http_request_duration_sum.load(Ordering::Relaxed) as f64 / 1000.0,
            self.http_requests_total.load(Ordering::Relaxed),
            self.ask_requests_total.load(Ordering::Relaxed),
            self.answers_unidentified_total.load(Ordering::Relaxed),
            self.answers_not_found_total.load(Ordering::Relaxed),
            self.upstream_fetches_total.load(Ordering::Relaxed),
            self.upstream_failures_total.load(Ordering::Relaxed),
            self.upstream_empty_total.load(Ordering::Relaxed),
            self.cache_hits_total.load(Ordering::Relaxed),
            self.cache_misses_total.load(Ordering::Relaxed),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
}

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: Arc<AppMetrics>) -> Self {
        Self {
            metrics,
            start_time: Utc::now(),
            version,
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}

/// Prometheus 指标端点
pub async fn metrics(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let output = state.metrics.gather();
    (axum::http::StatusCode::OK, output)
}

/// 版本信息端点
pub async fn version(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化日志
///
/// `RUST_LOG` 优先于配置中的级别。配置了 `log_dir` 时同时按天滚动写入文件，
/// 返回的 guard 需要在进程退出前保持存活。
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},{}={}", config.level, service_name, config.level))
    });

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true);

    let result = match (writer, config.structured) {
        (Some(writer), true) => builder.json().with_writer(writer).try_init(),
        (Some(writer), false) => builder.with_ansi(false).with_writer(writer).try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    guard
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    axum::extract::State(metrics): axum::extract::State<Arc<AppMetrics>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    metrics.record_http_request(duration_ms);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_gather() {
        let metrics = AppMetrics::default();
        metrics.record_http_request(100);
        metrics.record_answer(AnswerKind::Answered);
        metrics.record_answer(AnswerKind::Unidentified);
        metrics.record_fetch(FetchKind::Failed);
        metrics.record_fetch(FetchKind::CacheHit);

        let output = metrics.gather();
        assert!(output.contains("http_requests_total 1"));
        assert!(output.contains("ask_requests_total 2"));
        assert!(output.contains("answers_unidentified_total 1"));
        assert!(output.contains("upstream_failures_total 1"));
        assert!(output.contains("upstream_empty_total 0"));
        assert!(output.contains("cache_hits_total 1"));
    }

    #[test]
    fn test_failure_and_empty_are_distinct() {
        let metrics = AppMetrics::default();
        metrics.record_fetch(FetchKind::Empty);
        metrics.record_fetch(FetchKind::Failed);
        metrics.record_fetch(FetchKind::Failed);

        assert_eq!(metrics.upstream_fetches_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.upstream_empty_total.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.upstream_failures_total.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_health_status_structure() {
        let status = HealthStatus {
            status: "healthy".to_string(),
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value, serde_json::json!({"status": "healthy"}));
    }
}
