use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::api::LotteryApi;
use crate::api::models::LoginRequest;
use crate::cache::SessionToken;

#[derive(Debug, Default)]
struct SessionState {
    is_loading: bool,
    error: Option<String>,
}

/// 会话 store
///
/// 令牌本身存放在共享的 `SessionToken` 中，是否已登录由令牌是否存在推导。
pub struct SessionStore {
    api: Arc<dyn LotteryApi>,
    token: Arc<SessionToken>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn LotteryApi>, token: Arc<SessionToken>) -> Self {
        Self {
            api,
            token,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 启动时从持久化存储恢复令牌
    pub async fn hydrate(&self) -> bool {
        match self.token.hydrate().await {
            Ok(Some(_)) => {
                info!("Restored persisted session");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to restore persisted session: {}", e);
                false
            }
        }
    }

    /// 登录，成功返回 true
    ///
    /// 上一次登录尚未返回时直接返回 false，不发请求。
    pub async fn login(&self, username: &str, password: &str) -> bool {
        {
            let mut state = self.lock();
            if state.is_loading {
                debug!("Login already in flight, ignoring");
                return false;
            }
            state.is_loading = true;
            state.error = None;
        }

        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.api.login(&req).await {
            Ok(resp) => {
                if let Err(e) = self.token.set(resp.token).await {
                    // 内存中的令牌仍然有效，只是重启后需要重新登录
                    warn!("Failed to persist token: {}", e);
                }
                self.lock().is_loading = false;
                info!("Login succeeded");
                true
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                let mut state = self.lock();
                state.is_loading = false;
                state.error = Some(e.to_string());
                false
            }
        }
    }

    /// 仅清除本地令牌，不调用远端
    pub async fn logout(&self) {
        if let Err(e) = self.token.clear().await {
            warn!("Failed to remove persisted token: {}", e);
        }
        info!("Logged out");
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_present()
    }

    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }
}
