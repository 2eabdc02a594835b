use std::sync::Arc;

use api::{ApiClient, LotteryApi};
use cache::SessionToken;
use config::Config;
use error::Result;
use store::{LotteryStore, SessionStore};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod store;
pub mod utils;

/// 应用状态，持有两个 store
///
/// 两个 store 通过同一个 `ApiClient` 访问服务端，客户端从共享的 `SessionToken` 读取令牌。
pub struct LotteryApp {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub lottery: Arc<LotteryStore>,
}

impl LotteryApp {
    pub async fn from_config(config: Config) -> Result<Self> {
        let storage = cache::open_storage(&config)?;
        let token = Arc::new(SessionToken::new(storage));
        let api: Arc<dyn LotteryApi> = Arc::new(ApiClient::new(&config, token.clone())?);

        let session = Arc::new(SessionStore::new(api.clone(), token));
        session.hydrate().await;
        let lottery = Arc::new(LotteryStore::new(api, config.page_size));

        tracing::debug!("Lottery client ready, api: {}", config.api_base_url);
        Ok(Self {
            config,
            session,
            lottery,
        })
    }
}
