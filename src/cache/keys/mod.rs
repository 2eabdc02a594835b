/// 存储键模块
/// 提供令牌持久化使用的键

pub mod token_keys;

pub use token_keys::{AUTH_TOKEN_KEY, auth_token_key};
