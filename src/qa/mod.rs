//! 问答管线
//!
//! 姓名解析 → 成员匹配 → 话题抽取 → 回答模板。

pub mod formatter;
pub mod matcher;
pub mod resolver;
pub mod topics;

pub use matcher::{MatchRule, match_member};
pub use resolver::{NameResolver, Resolution, ResolutionSource};
pub use topics::{Question, TopicAnswer, TopicExtractor, TopicHandler};
