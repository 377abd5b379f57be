//! 成员 DTO

use serde::{Deserialize, Serialize};

/// 成员列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct MembersResponse {
    /// 成员显示名
    pub members: Vec<String>,
    /// 成员数量
    pub total: usize,
}
