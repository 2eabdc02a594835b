// 通用的数据结构定义

use serde::{Deserialize, Serialize};

/// 服务端错误响应体，形如 {"error": "..."}
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// 提取可展示的错误信息
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

/// 分页响应
///
/// 旧版服务端不返回 hasMore，此时按 page * pageSize < total 推算。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl<T> PaginatedResponse<T> {
    pub fn has_more(&self) -> bool {
        self.has_more
            .unwrap_or_else(|| u64::from(self.page) * u64::from(self.page_size) < self.total)
    }
}
