//! 成员目录获取服务
//!
//! 从消息源拉取消息并按作者分组。失败时返回空目录而不是错误，
//! 但上游失败与上游无数据在日志和指标中分开记录。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::config::{CacheConfig, DirectoryConfig};
use crate::error::Result;
use crate::models::directory::AuthorDirectory;
use crate::models::message::{MessagePage, MessageRecord};
use crate::observability::{AppMetrics, FetchKind};
use crate::services::cache::{CacheStats, DirectoryCache, Lookup};
use crate::services::source::MessageSource;

/// 一次目录获取的结果
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub directory: Arc<AuthorDirectory>,
    pub kind: FetchKind,
}

impl FetchOutcome {
    pub fn upstream_ok(&self) -> bool {
        self.kind != FetchKind::Failed
    }
}

#[async_trait]
pub trait DirectoryFetcher: Send + Sync {
    /// 获取成员目录，失败时返回空目录
    async fn fetch(&self) -> Arc<AuthorDirectory> {
        self.fetch_outcome().await.directory
    }

    /// 获取成员目录并附带来源分类
    async fn fetch_outcome(&self) -> FetchOutcome;

    /// 直接获取上游原始分页数据，不经过缓存
    async fn fetch_page(&self) -> Result<MessagePage>;

    /// 清空缓存
    fn invalidate(&self);

    fn cache_stats(&self) -> Option<CacheStats>;

    fn source_description(&self) -> String;
}

pub struct DirectoryFetcherImpl {
    source: Arc<dyn MessageSource>,
    cache: Option<DirectoryCache>,
    metrics: Arc<AppMetrics>,
    sort_by_timestamp: bool,
}

impl DirectoryFetcherImpl {
    pub fn new(
        source: Arc<dyn MessageSource>,
        cache: Option<DirectoryCache>,
        metrics: Arc<AppMetrics>,
        sort_by_timestamp: bool,
    ) -> Self {
        Self {
            source,
            cache,
            metrics,
            sort_by_timestamp,
        }
    }

    /// 访问上游并构建目录；失败返回 None
    async fn load(&self) -> Option<AuthorDirectory> {
        match self.source.fetch_messages().await {
            Ok(page) => {
                let records = page.items.into_iter().map(MessageRecord::from);
                let directory = AuthorDirectory::from_records(records, self.sort_by_timestamp);
                if directory.is_empty() {
                    info!(
                        "Messages API returned no usable messages (reported total: {})",
                        page.total
                    );
                } else {
                    debug!(
                        "Built directory with {} members and {} messages",
                        directory.len(),
                        directory.total_messages()
                    );
                }
                Some(directory)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    upstream = e.is_upstream(),
                    "Failed to fetch messages from {}",
                    self.source.describe()
                );
                None
            }
        }
    }

    fn classify(directory: Option<AuthorDirectory>) -> FetchOutcome {
        match directory {
            Some(directory) if directory.is_empty() => FetchOutcome {
                directory: Arc::new(directory),
                kind: FetchKind::Empty,
            },
            Some(directory) => FetchOutcome {
                directory: Arc::new(directory),
                kind: FetchKind::Fetched,
            },
            None => FetchOutcome {
                directory: Arc::new(AuthorDirectory::new()),
                kind: FetchKind::Failed,
            },
        }
    }
}

#[async_trait]
impl DirectoryFetcher for DirectoryFetcherImpl {
    async fn fetch_outcome(&self) -> FetchOutcome {
        let outcome = match &self.cache {
            Some(cache) => match cache.get_or_refresh(|| self.load()).await {
                Lookup::Hit(directory) => FetchOutcome {
                    directory,
                    kind: FetchKind::CacheHit,
                },
                Lookup::Loaded(directory) => FetchOutcome {
                    kind: if directory.is_empty() {
                        FetchKind::Empty
                    } else {
                        FetchKind::Fetched
                    },
                    directory,
                },
                Lookup::Failed => Self::classify(None),
            },
            None => Self::classify(self.load().await),
        };

        self.metrics.record_fetch(outcome.kind);
        outcome
    }

    async fn fetch_page(&self) -> Result<MessagePage> {
        self.source.fetch_messages().await
    }

    fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            info!("Invalidating member directory cache");
            cache.invalidate();
        }
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(DirectoryCache::stats)
    }

    fn source_description(&self) -> String {
        self.source.describe()
    }
}

pub fn create_directory_fetcher(
    source: Arc<dyn MessageSource>,
    cache_config: &CacheConfig,
    directory_config: &DirectoryConfig,
    metrics: Arc<AppMetrics>,
) -> Box<dyn DirectoryFetcher> {
    let cache = cache_config.enabled.then(|| {
        let ttl = (cache_config.ttl_secs > 0).then(|| Duration::from_secs(cache_config.ttl_secs));
        DirectoryCache::new(ttl)
    });

    Box::new(DirectoryFetcherImpl::new(
        source,
        cache,
        metrics,
        directory_config.sort_by_timestamp,
    ))
}
