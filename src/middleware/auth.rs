use reqwest::{RequestBuilder, header::AUTHORIZATION};

use crate::cache::SessionToken;

/// 请求发出时附加的令牌
///
/// 响应返回 401 时只清除这个令牌；期间重新登录得到的新令牌不受影响。
pub struct SentAuth<'a> {
    pub session: &'a SessionToken,
    pub token: Option<String>,
}

/// 有令牌时附加 Authorization: Bearer 头，没有令牌时原样发送
pub fn with_bearer(
    request: RequestBuilder,
    session: &SessionToken,
) -> (RequestBuilder, SentAuth<'_>) {
    let token = session.get();
    let request = match &token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
        None => request,
    };
    (request, SentAuth { session, token })
}
