use serde::{Deserialize, Serialize};

/// 上游 messages API 返回的单条消息
///
/// 所有字段都允许缺失，单条记录格式不完整时不影响整页解析。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageItem {
    /// 消息 ID
    pub id: String,
    /// 作者 ID
    pub user_id: String,
    /// 作者显示名
    pub user_name: String,
    /// ISO-8601 时间戳（不保证可解析）
    pub timestamp: String,
    /// 消息正文
    pub message: String,
}

/// 上游 messages API 的分页响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePage {
    /// 上游报告的消息总数
    pub total: u64,
    /// 消息列表
    pub items: Vec<MessageItem>,
}

impl MessagePage {
    pub fn new(total: u64, items: Vec<MessageItem>) -> Self {
        Self { total, items }
    }

    /// 按 skip/limit 截取一页，保留上游的 total
    pub fn paginate(&self, skip: usize, limit: usize) -> MessagePage {
        let items = self.items.iter().skip(skip).take(limit).cloned().collect();
        MessagePage {
            total: self.total,
            items,
        }
    }
}

/// 作者的一条消息
///
/// 取回后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// 作者显示名
    pub author: String,
    /// 消息正文
    pub body: String,
    /// 原始时间戳字符串
    pub timestamp: String,
    /// 上游消息 ID
    pub id: Option<String>,
    /// 上游作者 ID
    pub user_id: Option<String>,
}

impl MessageRecord {
    pub fn new(author: &str, body: &str, timestamp: &str) -> Self {
        Self {
            author: author.to_string(),
            body: body.to_string(),
            timestamp: timestamp.to_string(),
            id: None,
            user_id: None,
        }
    }
}

impl From<MessageItem> for MessageRecord {
    fn from(item: MessageItem) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        Self {
            author: item.user_name,
            body: item.message,
            timestamp: item.timestamp,
            id: non_empty(item.id),
            user_id: non_empty(item.user_id),
        }
    }
}
