use tracing::debug;

use super::{ApiClient, decode};
use crate::api::models::{LoginRequest, LoginResponse};
use crate::error::{AppError, Result};
use crate::middleware::check_response;

impl ApiClient {
    pub(super) async fn post_login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        debug!("Sending login request");

        let response = self.http.post(self.url("/login")).json(req).send().await?;
        // 登录接口的 401 只是凭据错误，不清除现有会话
        let response = check_response(response, None).await?;

        let body: LoginResponse = decode(response).await?;
        if body.token.is_empty() {
            return Err(AppError::Decode("登录响应缺少 token".to_string()));
        }
        Ok(body)
    }
}
