/// 令牌的固定存储键
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Redis 键前缀
const LOTTERY_PREFIX: &str = "lottery:";

/// 生成 Redis 中的令牌键
pub fn auth_token_key() -> String {
    format!("{}{}", LOTTERY_PREFIX, AUTH_TOKEN_KEY)
}
