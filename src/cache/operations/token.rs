use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::auth_token_key;
use crate::cache::models::token::PersistedToken;
use crate::error::Result;
use crate::utils::token_expiration;

/// 令牌持久化接口
///
/// 只保存一个令牌，读写都针对同一个固定键。
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, token: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// 文件存储，JSON 格式
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedToken = serde_json::from_str(&content)?;
        Ok(Some(persisted.token).filter(|token| !token.is_empty()))
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string(&PersistedToken::new(token))?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!("Token written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 内存存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_string())),
        }
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Redis 存储
pub struct RedisTokenStorage {
    redis: Arc<RedisClient>,
    key: String,
}

impl RedisTokenStorage {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self {
            redis,
            key: auth_token_key(),
        }
    }
}

#[async_trait]
impl TokenStorage for RedisTokenStorage {
    async fn load(&self) -> Result<Option<String>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(&self.key).await?;
        match result {
            Some(json) => {
                let persisted: PersistedToken = serde_json::from_str(&json)?;
                Ok(Some(persisted.token).filter(|token| !token.is_empty()))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(&PersistedToken::new(token))?;

        // JWT 带过期时间时，键的过期时间与令牌一致
        let ttl = token_expiration(token).map(|exp| exp - chrono::Utc::now().timestamp());
        match ttl {
            Some(ttl) if ttl > 0 => {
                let _: () = conn.set_ex(&self.key, json, ttl as u64).await?;
            }
            _ => {
                let _: () = conn.set(&self.key, json).await?;
            }
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(&self.key).await?;
        Ok(())
    }
}
