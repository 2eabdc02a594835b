use reqwest::{Response, StatusCode};
use tracing::{debug, error, warn};

use super::auth::SentAuth;
use crate::api::models::ErrorBody;
use crate::error::{AppError, Result};

/// 检查响应状态
///
/// 2xx 原样返回；401 时若请求带了令牌且该令牌仍是当前令牌则清除会话；
/// 401/403 转为 `AppError::Unauthorized`，其余非 2xx 转为 `AppError::Rejected`。
pub async fn check_response(
    response: Response,
    auth: Option<&SentAuth<'_>>,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to read error response body: {}", e);
            String::new()
        }
    };
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("请求失败")
            .to_string()
    });

    if status.is_server_error() {
        error!("Server error occurred - Status: {}, Body: {}", status, body);
    } else {
        warn!("Request rejected - Status: {}, Message: {}", status, message);
    }

    match status {
        StatusCode::UNAUTHORIZED => {
            if let Some(SentAuth {
                session,
                token: Some(sent),
            }) = auth
            {
                match session.clear_if(sent).await {
                    Ok(true) => warn!("Session rejected by server, cleared stored token"),
                    Ok(false) => debug!("Rejected token was already replaced, keeping session"),
                    Err(e) => error!("Failed to clear stored token: {}", e),
                }
            }
            Err(AppError::Unauthorized(message))
        }
        // 令牌有效但无权限，不清除会话
        StatusCode::FORBIDDEN => Err(AppError::Unauthorized(message)),
        _ => Err(AppError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

/// 从错误响应体中提取信息
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
}
