// 请求/响应钩子
// 发送前附加 Bearer 令牌，收到响应后统一分类错误

mod auth;
mod error_handler;

pub use auth::{SentAuth, with_bearer};
pub use error_handler::{check_response, error_message};
