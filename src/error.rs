use thiserror::Error;

/// 客户端统一错误类型
///
/// 各 store 不会把它抛给调用方，而是转成字符串记录在自身状态里。
#[derive(Error, Debug)]
pub enum AppError {
    /// 网络或传输层失败
    #[error("网络错误: {0}")]
    Network(#[from] reqwest::Error),

    /// 服务端返回 401
    #[error("未授权访问: {0}")]
    Unauthorized(String),

    /// 其他非 2xx 响应
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    /// 响应体无法解析
    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("令牌存储错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("令牌存储错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("令牌存储错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
