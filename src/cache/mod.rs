// 令牌持久化模块
// 包含存储键、持久化数据结构和读写操作

pub mod keys;
pub mod models;
pub mod operations;

use std::sync::Arc;

use crate::config::{Config, TokenBackend};
use crate::error::{AppError, Result};

// 重新导出常用类型，方便其他模块使用
pub use models::token::PersistedToken;
pub use operations::session::SessionToken;
pub use operations::token::{
    FileTokenStorage, MemoryTokenStorage, RedisTokenStorage, TokenStorage,
};

/// 按配置打开令牌存储
pub fn open_storage(config: &Config) -> Result<Arc<dyn TokenStorage>> {
    let storage: Arc<dyn TokenStorage> = match config.token_backend {
        TokenBackend::File => Arc::new(FileTokenStorage::new(config.token_path.clone())),
        TokenBackend::Memory => Arc::new(MemoryTokenStorage::default()),
        TokenBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                AppError::Config("使用 redis 存储令牌时必须设置 LOTTERY_REDIS_URL".to_string())
            })?;
            let client = redis::Client::open(url)?;
            Arc::new(RedisTokenStorage::new(Arc::new(client)))
        }
    };
    tracing::debug!("Token storage opened: {:?}", config.token_backend);
    Ok(storage)
}
