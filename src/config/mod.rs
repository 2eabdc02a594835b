use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TOKEN_PATH: &str = ".lottery/auth_token.json";
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 令牌持久化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBackend {
    File,
    Redis,
    Memory,
}

impl FromStr for TokenBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(TokenBackend::File),
            "redis" => Ok(TokenBackend::Redis),
            "memory" => Ok(TokenBackend::Memory),
            other => Err(AppError::Config(format!(
                "LOTTERY_TOKEN_BACKEND 不支持的取值: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub token_backend: TokenBackend,
    pub token_path: PathBuf,
    pub redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_backend: TokenBackend::File,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            redis_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，缺省项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let page_size = match lookup("LOTTERY_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| AppError::Config(format!("LOTTERY_PAGE_SIZE 无效: {}", raw)))?,
            None => defaults.page_size,
        };

        let request_timeout_secs = match lookup("LOTTERY_REQUEST_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .trim_end_matches('s')
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| AppError::Config(format!("LOTTERY_REQUEST_TIMEOUT 无效: {}", raw)))?,
            None => defaults.request_timeout_secs,
        };

        let token_backend = match lookup("LOTTERY_TOKEN_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.token_backend,
        };

        let redis_url = lookup("LOTTERY_REDIS_URL").filter(|url| !url.is_empty());
        if token_backend == TokenBackend::Redis && redis_url.is_none() {
            return Err(AppError::Config(
                "使用 redis 存储令牌时必须设置 LOTTERY_REDIS_URL".to_string(),
            ));
        }

        Ok(Config {
            api_base_url: lookup("LOTTERY_API_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_base_url),
            page_size,
            request_timeout_secs,
            token_backend,
            token_path: lookup("LOTTERY_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_path),
            redis_url,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
