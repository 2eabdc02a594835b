// API 调用模块
// LotteryApi 是 store 依赖的接口，ApiClient 是基于 reqwest 的实现

mod lottery;
mod user;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::models::{
    LoginRequest, LoginResponse, LotteryType, RecommendationFilter, RecommendationPage,
};
use crate::cache::SessionToken;
use crate::config::Config;
use crate::error::{AppError, Result};

/// 推荐服务的四个接口
#[async_trait]
pub trait LotteryApi: Send + Sync {
    /// POST /login
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse>;

    /// GET /lottery-types
    async fn lottery_types(&self) -> Result<Vec<LotteryType>>;

    /// GET /recommendations?page&pageSize
    async fn recommendations(
        &self,
        page: u32,
        page_size: u32,
        filter: &RecommendationFilter,
    ) -> Result<RecommendationPage>;

    /// PUT /recommendations/{id}/purchase
    async fn update_purchase(&self, id: i64, is_purchased: bool) -> Result<()>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionToken>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionToken>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Decode(e.to_string()))
}

#[async_trait]
impl LotteryApi for ApiClient {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        self.post_login(req).await
    }

    async fn lottery_types(&self) -> Result<Vec<LotteryType>> {
        self.get_lottery_types().await
    }

    async fn recommendations(
        &self,
        page: u32,
        page_size: u32,
        filter: &RecommendationFilter,
    ) -> Result<RecommendationPage> {
        self.get_recommendations(page, page_size, filter).await
    }

    async fn update_purchase(&self, id: i64, is_purchased: bool) -> Result<()> {
        self.put_purchase(id, is_purchased).await
    }
}
