use std::sync::{Arc, PoisonError, RwLock};

use crate::cache::operations::token::TokenStorage;
use crate::error::Result;
use crate::utils::is_token_expired;

/// 当前会话令牌
///
/// 内存中保存一份，同时写入持久化存储。会话 store 和 HTTP 客户端共享同一个实例，
/// 所以任一方清除令牌后另一方立即可见。
pub struct SessionToken {
    storage: Arc<dyn TokenStorage>,
    current: RwLock<Option<String>>,
}

impl SessionToken {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// 从持久化存储恢复令牌，已过期的 JWT 直接丢弃
    pub async fn hydrate(&self) -> Result<Option<String>> {
        let token = match self.storage.load().await? {
            Some(token) if is_token_expired(&token, chrono::Utc::now().timestamp()) => {
                tracing::info!("Persisted token has expired, discarding it");
                self.storage.clear().await?;
                None
            }
            other => other,
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = token.clone();
        Ok(token)
    }

    /// 设置新令牌，内存状态总是更新，持久化失败时返回错误
    pub async fn set(&self, token: String) -> Result<()> {
        let persisted = self.storage.save(&token).await;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        persisted
    }

    /// 清除令牌，先清内存再清存储
    pub async fn clear(&self) -> Result<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.storage.clear().await
    }

    /// 当前令牌仍是 `sent` 时才清除，返回是否清除
    pub async fn clear_if(&self, sent: &str) -> Result<bool> {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if current.as_deref() != Some(sent) {
                return Ok(false);
            }
            *current = None;
        }
        self.storage.clear().await?;
        Ok(true)
    }
}
