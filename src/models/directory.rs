use serde::Serialize;
use std::collections::HashMap;

use crate::models::message::MessageRecord;

/// 成员记录
///
/// 一个作者及其全部消息；消息列表永不为空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    /// 显示名
    pub name: String,
    /// 消息列表（目录顺序，首条视为最新）
    pub messages: Vec<MessageRecord>,
}

impl AuthorRecord {
    /// 名字的第一个词
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// 按目录顺序的最新一条消息
    pub fn latest_message(&self) -> Option<&MessageRecord> {
        self.messages.first()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// 成员目录
///
/// 按作者分组的消息集合。作者按在数据源中首次出现的顺序排列，
/// 每条消息恰好属于一个作者，没有消息的作者不会出现。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorDirectory {
    authors: Vec<AuthorRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AuthorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按作者分组构建目录
    ///
    /// 作者名为空的记录会被丢弃。`sort_by_timestamp` 为真时每个作者的消息
    /// 按时间戳字符串倒序排列（稳定排序），否则保持数据源顺序。
    pub fn from_records<I>(records: I, sort_by_timestamp: bool) -> Self
    where
        I: IntoIterator<Item = MessageRecord>,
    {
        let mut directory = Self::new();

        for record in records {
            if record.author.trim().is_empty() {
                continue;
            }
            directory.push(record);
        }

        if sort_by_timestamp {
            for author in &mut directory.authors {
                author
                    .messages
                    .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            }
        }

        directory
    }

    fn push(&mut self, record: MessageRecord) {
        match self.index.get(&record.author) {
            Some(&slot) => self.authors[slot].messages.push(record),
            None => {
                self.index.insert(record.author.clone(), self.authors.len());
                self.authors.push(AuthorRecord {
                    name: record.author.clone(),
                    messages: vec![record],
                });
            }
        }
    }

    /// 作者数量
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// 按目录顺序返回所有作者
    pub fn authors(&self) -> &[AuthorRecord] {
        &self.authors
    }

    /// 按目录顺序返回所有显示名
    pub fn names(&self) -> Vec<String> {
        self.authors.iter().map(|a| a.name.clone()).collect()
    }

    /// 按显示名精确查找
    pub fn get(&self, name: &str) -> Option<&AuthorRecord> {
        self.index.get(name).map(|&slot| &self.authors[slot])
    }

    /// 所有作者的消息总数
    pub fn total_messages(&self) -> usize {
        self.authors.iter().map(AuthorRecord::message_count).sum()
    }
}
