use serde::{Deserialize, Serialize};

/// 持久化的令牌记录
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PersistedToken {
    pub token: String,
    pub saved_at: i64, // Unix timestamp
}

impl PersistedToken {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            saved_at: chrono::Utc::now().timestamp(),
        }
    }
}

// 令牌属于凭据，不输出明文
impl std::fmt::Debug for PersistedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedToken")
            .field("token", &"<redacted>")
            .field("saved_at", &self.saved_at)
            .finish()
    }
}
