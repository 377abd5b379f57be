//! 消息源
//!
//! 上游 messages API 的访问抽象。`HttpMessageSource` 访问远程服务，
//! `StaticMessageSource` 提供内存数据，用于离线运行和测试。

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::config::{SourceConfig, SourceMode};
use crate::error::{AppError, Result};
use crate::models::message::{MessageItem, MessagePage};

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// 取回完整的消息列表
    async fn fetch_messages(&self) -> Result<MessagePage>;

    /// 数据源描述，用于日志和调试接口
    fn describe(&self) -> String;
}

/// 远程 messages API 客户端
pub struct HttpMessageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMessageSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn fetch_messages(&self) -> Result<MessagePage> {
        let url = self.messages_url();
        debug!("Fetching messages from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "messages API returned {}: {}",
                status, error_text
            )));
        }

        let bytes = response.bytes().await?;
        let page: MessagePage = serde_json::from_slice(&bytes)?;
        debug!("Messages API returned {} items", page.items.len());

        Ok(page)
    }

    fn describe(&self) -> String {
        self.messages_url()
    }
}

/// 内存消息源
pub struct StaticMessageSource {
    page: MessagePage,
}

impl StaticMessageSource {
    pub fn new(page: MessagePage) -> Self {
        Self { page }
    }

    /// 内置样例成员数据
    pub fn sample() -> Self {
        let rows = [
            (
                "Sophia Al-Farsi",
                "Please book a private jet to Paris for this Friday.",
                "2024-01-15T10:30:00",
            ),
            (
                "Sophia Al-Farsi",
                "I need to visit London next month for business meetings.",
                "2024-01-10T14:20:00",
            ),
            (
                "Layla Kawaguchi",
                "Planning my trip to London in June. So excited!",
                "2024-01-12T09:15:00",
            ),
            ("Layla Kawaguchi", "Looking for good restaurants in London.", "2024-01-13T16:45:00"),
            (
                "Vikram Desai",
                "I just bought my second car yesterday. Now I have 2 cars.",
                "2024-01-08T11:00:00",
            ),
            ("Vikram Desai", "My new car is electric and amazing!", "2024-01-09T13:30:00"),
            (
                "Amina Van Den Berg",
                "My favorite restaurants are 'Bella Italia' and 'Spice Garden'.",
                "2024-01-14T12:00:00",
            ),
            (
                "Amina Van Den Berg",
                "Love trying new restaurants every weekend.",
                "2024-01-15T19:30:00",
            ),
        ];

        let items: Vec<MessageItem> = rows
            .iter()
            .enumerate()
            .map(|(i, (name, message, timestamp))| MessageItem {
                id: format!("sample-{}", i + 1),
                user_id: format!("user-{}", name.to_lowercase().replace(' ', "-")),
                user_name: name.to_string(),
                timestamp: timestamp.to_string(),
                message: message.to_string(),
            })
            .collect();

        Self::new(MessagePage::new(items.len() as u64, items))
    }
}

#[async_trait]
impl MessageSource for StaticMessageSource {
    async fn fetch_messages(&self) -> Result<MessagePage> {
        Ok(self.page.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} items)", self.page.items.len())
    }
}

/// `/messages/` 在上游不可用时返回的固定数据
pub fn fallback_page() -> MessagePage {
    MessagePage::new(
        3349,
        vec![
            MessageItem {
                id: "mock-1".into(),
                user_id: "user-1".into(),
                user_name: "Sophia Al-Farsi".into(),
                timestamp: "2024-01-15T10:30:00Z".into(),
                message: "Please book a private jet to Paris for this Friday.".into(),
            },
            MessageItem {
                id: "mock-2".into(),
                user_id: "user-2".into(),
                user_name: "Layla Kawaguchi".into(),
                timestamp: "2024-01-12T09:15:00Z".into(),
                message: "Planning my trip to London in June. So excited!".into(),
            },
        ],
    )
}

pub fn create_message_source(config: &SourceConfig) -> Result<Box<dyn MessageSource>> {
    match config.mode {
        SourceMode::Remote => {
            let source = HttpMessageSource::new(
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Box::new(source))
        }
        SourceMode::Mock => Ok(Box::new(StaticMessageSource::sample())),
    }
}
