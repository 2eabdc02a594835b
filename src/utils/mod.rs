use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::api::models::{NumberGroups, Recommendation};

/// 客户端只关心过期时间，其余声明忽略
#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// 读取 JWT 的 exp 声明，不校验签名；非 JWT 令牌返回 None
pub fn token_expiration(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

/// 令牌是否已过期，无法判断时视为未过期
pub fn is_token_expired(token: &str, now: i64) -> bool {
    token_expiration(token).is_some_and(|exp| exp <= now)
}

// 以下为命令行展示用的格式化函数

pub fn draw_status_label(recommendation: &Recommendation) -> &'static str {
    if recommendation.is_drawn() {
        "已开奖"
    } else {
        "未开奖"
    }
}

pub fn win_amount_label(recommendation: &Recommendation) -> String {
    match recommendation.outcome() {
        Some(outcome) if outcome.win_amount > 0.0 => format!("¥{}", outcome.win_amount),
        Some(_) => "未中奖".to_string(),
        None => "-".to_string(),
    }
}

pub fn format_numbers(groups: &NumberGroups) -> String {
    let main = groups.main.join(" ");
    if groups.special.is_empty() {
        main
    } else {
        format!("{} | {}", main, groups.special.join(" "))
    }
}
