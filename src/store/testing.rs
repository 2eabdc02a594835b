// 单元测试用的 LotteryApi 替身

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::api::LotteryApi;
use crate::api::models::{
    LoginRequest, LoginResponse, LotteryType, Recommendation, RecommendationFilter,
    RecommendationPage,
};
use crate::error::{AppError, Result};

/// 预设的响应：立即返回，或等测试方通过 oneshot 放行
pub enum Reply<T> {
    Now(Result<T>),
    Later(oneshot::Receiver<Result<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Reply::Now(result) => result,
            Reply::Later(rx) => rx
                .await
                .unwrap_or_else(|_| Err(AppError::Decode("reply dropped".to_string()))),
        }
    }
}

pub fn deferred<T>() -> (oneshot::Sender<Result<T>>, Reply<T>) {
    let (tx, rx) = oneshot::channel();
    (tx, Reply::Later(rx))
}

pub fn rejected(status: u16, message: &str) -> AppError {
    AppError::Rejected {
        status,
        message: message.to_string(),
    }
}

#[derive(Default)]
pub struct MockApi {
    pub credentials: Option<(String, String, String)>,
    pub login_replies: Mutex<VecDeque<Reply<LoginResponse>>>,
    pub page_replies: Mutex<VecDeque<Reply<RecommendationPage>>>,
    pub purchase_replies: Mutex<VecDeque<Reply<()>>>,
    pub types: Vec<LotteryType>,
    pub login_calls: AtomicUsize,
    pub type_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub purchase_calls: AtomicUsize,
    pub requested_pages: Mutex<Vec<(u32, u32, RecommendationFilter)>>,
}

impl MockApi {
    pub fn with_credentials(username: &str, password: &str, token: &str) -> Self {
        Self {
            credentials: Some((username.into(), password.into(), token.into())),
            ..Default::default()
        }
    }

    pub fn push_login(&self, reply: Reply<LoginResponse>) {
        self.login_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_page(&self, reply: Reply<RecommendationPage>) {
        self.page_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_purchase(&self, reply: Reply<()>) {
        self.purchase_replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LotteryApi for MockApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.login_replies.lock().unwrap().pop_front();
        if let Some(reply) = scripted {
            return reply.resolve().await;
        }
        match &self.credentials {
            Some((user, pass, token)) if *user == req.username && *pass == req.password => {
                Ok(LoginResponse {
                    token: token.clone(),
                })
            }
            _ => Err(AppError::Unauthorized("用户名或密码错误".to_string())),
        }
    }

    async fn lottery_types(&self) -> Result<Vec<LotteryType>> {
        self.type_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.types.clone())
    }

    async fn recommendations(
        &self,
        page: u32,
        page_size: u32,
        filter: &RecommendationFilter,
    ) -> Result<RecommendationPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_pages
            .lock()
            .unwrap()
            .push((page, page_size, filter.clone()));
        let reply = self.page_replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(rejected(500, "no scripted page")),
        }
    }

    async fn update_purchase(&self, _id: i64, _is_purchased: bool) -> Result<()> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.purchase_replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(()),
        }
    }
}

pub fn recommendation(id: i64) -> Recommendation {
    let created = Utc.with_ymd_and_hms(2025, 3, 7, 15, 0, 0).unwrap();
    Recommendation {
        id,
        lottery_type_id: 1,
        numbers: "01,02,03,04,05,06+07".to_string(),
        model_name: "deepseek".to_string(),
        draw_time: None,
        expected_draw_time: Utc.with_ymd_and_hms(2025, 3, 9, 13, 15, 0).unwrap(),
        draw_number: format!("2025{:03}", id),
        is_purchased: false,
        draw_result: String::new(),
        win_status: String::new(),
        win_amount: 0.0,
        created_at: created,
        updated_at: created,
    }
}

pub fn page_of(ids: &[i64], page: u32, page_size: u32, total: u64, has_more: bool) -> RecommendationPage {
    RecommendationPage {
        data: ids.iter().copied().map(recommendation).collect(),
        total,
        page,
        page_size,
        has_more: Some(has_more),
    }
}

pub fn lottery_type(id: i64, code: &str, name: &str) -> LotteryType {
    LotteryType {
        id,
        code: code.to_string(),
        name: name.to_string(),
        schedule_cron: "0 21 * * 2,4,7".to_string(),
        model_name: "deepseek".to_string(),
        is_active: true,
        caipiao_id: 11,
    }
}
