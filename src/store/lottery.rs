use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::api::LotteryApi;
use crate::api::models::{LotteryType, Recommendation, RecommendationFilter};

/// 分页游标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// 下一次要请求的页码，从 1 开始
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
    pub total: u64,
}

/// 一次拉取的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { count: usize },
    /// 未发请求：已有请求在途、没有更多数据或已有缓存
    Skipped,
    Failed,
}

// 某条记录上尚未返回的购买状态更新
#[derive(Debug)]
struct PendingPurchase {
    seq: u64,
    // 服务端最后确认的值，失败时回滚到这里
    confirmed: Option<bool>,
}

#[derive(Debug)]
struct LotteryState {
    items: Vec<Recommendation>,
    cursor: Cursor,
    is_loading: bool,
    error: Option<String>,
    filter: RecommendationFilter,
    generation: u64,

    lottery_types: Vec<LotteryType>,
    is_loading_types: bool,
    types_error: Option<String>,

    purchases: HashMap<i64, PendingPurchase>,
    purchase_seq: u64,
}

impl LotteryState {
    fn set_purchased(&mut self, id: i64, value: bool) {
        if let Some(item) = self.items.iter_mut().find(|r| r.id == id) {
            item.is_purchased = value;
        }
    }
}

/// 推荐列表 store：分页、购买状态、彩票类型缓存
pub struct LotteryStore {
    api: Arc<dyn LotteryApi>,
    state: Mutex<LotteryState>,
}

impl LotteryStore {
    pub fn new(api: Arc<dyn LotteryApi>, page_size: u32) -> Self {
        Self {
            api,
            state: Mutex::new(LotteryState {
                items: Vec::new(),
                cursor: Cursor {
                    page: 1,
                    page_size: page_size.max(1),
                    has_more: false,
                    total: 0,
                },
                is_loading: false,
                error: None,
                filter: RecommendationFilter::default(),
                generation: 0,
                lottery_types: Vec::new(),
                is_loading_types: false,
                types_error: None,
                purchases: HashMap::new(),
                purchase_seq: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LotteryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 拉取一页推荐
    ///
    /// `reset` 为 true 时从第 1 页开始并在成功后替换已有列表，否则追加下一页。
    /// 已有请求在途，或没有更多数据且不是重置时，不发请求。
    pub async fn fetch_page(&self, reset: bool) -> FetchOutcome {
        let (page, page_size, filter, generation) = {
            let mut state = self.lock();
            if state.is_loading || (!reset && !state.cursor.has_more) {
                debug!(
                    "Skipping page fetch (loading: {}, has_more: {})",
                    state.is_loading, state.cursor.has_more
                );
                return FetchOutcome::Skipped;
            }
            state.is_loading = true;
            state.error = None;

            let page = if reset { 1 } else { state.cursor.page };
            (page, state.cursor.page_size, state.filter.clone(), state.generation)
        };

        let result = self.api.recommendations(page, page_size, &filter).await;

        let mut state = self.lock();
        state.is_loading = false;
        if state.generation != generation {
            debug!("Filter changed while page {} was loading, dropping it", page);
            return FetchOutcome::Skipped;
        }

        match result {
            Ok(response) => {
                let has_more = response.has_more();
                let total = response.total;
                let count = response.data.len();

                if reset {
                    state.items = response.data;
                } else {
                    state.items.extend(response.data);
                }
                state.cursor.page = page + 1;
                state.cursor.has_more = has_more;
                state.cursor.total = total;

                debug!(
                    "Loaded page {} ({} items, {} accumulated, has_more: {})",
                    page,
                    count,
                    state.items.len(),
                    has_more
                );
                FetchOutcome::Loaded { count }
            }
            Err(e) => {
                warn!("Failed to fetch recommendations page {}: {}", page, e);
                state.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// 更新购买状态，成功返回 true
    ///
    /// 本地立即改为新值；失败时回滚到服务端最后确认的值。同一条记录以最后发出的
    /// 更新为准，较早请求的响应不会覆盖它。
    pub async fn update_purchase_flag(&self, id: i64, value: bool) -> bool {
        let seq = {
            let mut state = self.lock();
            state.purchase_seq += 1;
            let seq = state.purchase_seq;

            let current = state.items.iter().find(|r| r.id == id).map(|r| r.is_purchased);
            state
                .purchases
                .entry(id)
                .and_modify(|pending| pending.seq = seq)
                .or_insert(PendingPurchase {
                    seq,
                    confirmed: current,
                });
            state.set_purchased(id, value);
            state.error = None;
            seq
        };

        let result = self.api.update_purchase(id, value).await;

        let mut state = self.lock();
        let is_latest = state.purchases.get(&id).is_some_and(|p| p.seq == seq);

        match result {
            Ok(()) => {
                if is_latest {
                    state.purchases.remove(&id);
                    state.set_purchased(id, value);
                } else if let Some(pending) = state.purchases.get_mut(&id) {
                    pending.confirmed = Some(value);
                }
                info!("Recommendation {} purchase flag set to {}", id, value);
                true
            }
            Err(e) => {
                warn!("Failed to update purchase flag of {}: {}", id, e);
                if is_latest {
                    if let Some(pending) = state.purchases.remove(&id) {
                        if let Some(previous) = pending.confirmed {
                            state.set_purchased(id, previous);
                        }
                    }
                    state.error = Some(e.to_string());
                }
                false
            }
        }
    }

    /// 获取彩票类型，已有缓存时不重复请求
    pub async fn fetch_lottery_types(&self) -> FetchOutcome {
        {
            let mut state = self.lock();
            if !state.lottery_types.is_empty() || state.is_loading_types {
                return FetchOutcome::Skipped;
            }
            state.is_loading_types = true;
            state.types_error = None;
        }

        let result = self.api.lottery_types().await;

        let mut state = self.lock();
        state.is_loading_types = false;
        match result {
            Ok(types) => {
                let count = types.len();
                state.lottery_types = types;
                FetchOutcome::Loaded { count }
            }
            Err(e) => {
                warn!("Failed to fetch lottery types: {}", e);
                state.types_error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// 按 id 查彩票类型名称，找不到时返回占位文本
    pub fn lookup_type_name(&self, type_id: i64) -> String {
        self.lock()
            .lottery_types
            .iter()
            .find(|t| t.id == type_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("类型 {}", type_id))
    }

    /// 修改查询条件，清空列表并回到第 1 页，调用方随后应执行 `fetch_page(true)`
    pub fn set_filter(&self, filter: RecommendationFilter) {
        let mut state = self.lock();
        if state.filter == filter {
            return;
        }
        state.filter = filter;
        state.generation += 1;
        state.items.clear();
        state.cursor.page = 1;
        state.cursor.has_more = false;
        state.cursor.total = 0;
    }

    pub fn clear_error(&self) {
        let mut state = self.lock();
        state.error = None;
        state.types_error = None;
    }

    pub fn items(&self) -> Vec<Recommendation> {
        self.lock().items.clone()
    }

    pub fn item(&self, id: i64) -> Option<Recommendation> {
        self.lock().items.iter().find(|r| r.id == id).cloned()
    }

    pub fn cursor(&self) -> Cursor {
        self.lock().cursor
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn lottery_types(&self) -> Vec<LotteryType> {
        self.lock().lottery_types.clone()
    }

    pub fn types_error(&self) -> Option<String> {
        self.lock().types_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::RecommendationPage;
    use crate::store::testing::{
        MockApi, Reply, deferred, lottery_type, page_of, rejected,
    };

    fn store_with(api: &Arc<MockApi>, page_size: u32) -> LotteryStore {
        LotteryStore::new(api.clone(), page_size)
    }

    #[tokio::test]
    async fn test_first_load_needs_reset() {
        let api = Arc::new(MockApi::default());
        let store = store_with(&api, 20);

        assert_eq!(store.fetch_page(false).await, FetchOutcome::Skipped);
        assert_eq!(MockApi::calls(&api.page_calls), 0);
    }

    #[tokio::test]
    async fn test_reset_then_no_more_pages() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[1, 2], 1, 20, 2, false))));
        let store = store_with(&api, 20);

        assert_eq!(store.fetch_page(true).await, FetchOutcome::Loaded { count: 2 });
        let ids: Vec<i64> = store.items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!store.cursor().has_more);
        assert_eq!(store.cursor().total, 2);

        // hasMore=false 时继续加载不发请求
        assert_eq!(store.fetch_page(false).await, FetchOutcome::Skipped);
        assert_eq!(MockApi::calls(&api.page_calls), 1);
    }

    #[tokio::test]
    async fn test_pages_append_and_cursor_advances() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[1, 2], 1, 2, 5, true))));
        api.push_page(Reply::Now(Ok(page_of(&[3, 4], 2, 2, 5, true))));
        api.push_page(Reply::Now(Ok(page_of(&[5], 3, 2, 5, false))));
        let store = store_with(&api, 2);

        assert_eq!(store.fetch_page(true).await, FetchOutcome::Loaded { count: 2 });
        let mut last_len = store.items().len();
        let mut last_page = store.cursor().page;

        while store.cursor().has_more {
            assert!(matches!(store.fetch_page(false).await, FetchOutcome::Loaded { .. }));
            assert!(store.items().len() > last_len);
            assert_eq!(store.cursor().page, last_page + 1);
            last_len = store.items().len();
            last_page = store.cursor().page;
        }

        let ids: Vec<i64> = store.items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let pages: Vec<u32> = api
            .requested_pages
            .lock()
            .unwrap()
            .iter()
            .map(|(page, size, _)| {
                assert_eq!(*size, 2);
                *page
            })
            .collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_reset_replaces_items_regardless_of_has_more() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[1, 2], 1, 2, 2, false))));
        api.push_page(Reply::Now(Ok(page_of(&[9], 1, 2, 1, false))));
        let store = store_with(&api, 2);

        store.fetch_page(true).await;
        assert_eq!(store.fetch_page(true).await, FetchOutcome::Loaded { count: 1 });

        let ids: Vec<i64> = store.items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9]);
        assert_eq!(store.cursor().page, 2);
        assert_eq!(api.requested_pages.lock().unwrap()[1].0, 1);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_items() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[1, 2], 1, 2, 4, true))));
        api.push_page(Reply::Now(Err(rejected(500, "获取推荐记录失败"))));
        let store = store_with(&api, 2);

        store.fetch_page(true).await;
        assert_eq!(store.fetch_page(false).await, FetchOutcome::Failed);

        assert_eq!(store.items().len(), 2);
        assert_eq!(store.cursor().page, 2);
        assert!(store.cursor().has_more);
        assert!(store.error().unwrap().contains("获取推荐记录失败"));
        assert!(!store.is_loading());

        store.clear_error();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_no_second_fetch_while_loading() {
        let api = Arc::new(MockApi::default());
        let (tx, reply) = deferred::<RecommendationPage>();
        api.push_page(reply);
        let store = Arc::new(store_with(&api, 2));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_page(true).await }
        });
        while MockApi::calls(&api.page_calls) == 0 {
            tokio::task::yield_now().await;
        }

        assert!(store.is_loading());
        assert_eq!(store.fetch_page(true).await, FetchOutcome::Skipped);
        assert_eq!(store.fetch_page(false).await, FetchOutcome::Skipped);

        tx.send(Ok(page_of(&[1], 1, 2, 1, false))).unwrap();
        assert_eq!(first.await.unwrap(), FetchOutcome::Loaded { count: 1 });
        assert_eq!(MockApi::calls(&api.page_calls), 1);
    }

    #[tokio::test]
    async fn test_set_filter_resets_and_is_sent() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[1, 2], 1, 2, 4, true))));
        api.push_page(Reply::Now(Ok(page_of(&[7], 1, 2, 1, false))));
        let store = store_with(&api, 2);

        store.fetch_page(true).await;
        let filter = RecommendationFilter {
            code: Some("fc_ssq".to_string()),
            ..Default::default()
        };
        store.set_filter(filter.clone());
        assert!(store.items().is_empty());
        assert_eq!(store.cursor().page, 1);

        store.fetch_page(true).await;
        assert_eq!(api.requested_pages.lock().unwrap()[1].2, filter);
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_success_patches_item() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[41, 42], 1, 20, 2, false))));
        let store = store_with(&api, 20);
        store.fetch_page(true).await;

        assert!(store.update_purchase_flag(42, true).await);
        assert!(store.item(42).unwrap().is_purchased);
        assert!(!store.item(41).unwrap().is_purchased);
        assert_eq!(MockApi::calls(&api.purchase_calls), 1);
        // 不重新拉取列表
        assert_eq!(MockApi::calls(&api.page_calls), 1);
    }

    #[tokio::test]
    async fn test_purchase_failure_rolls_back() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[42], 1, 20, 1, false))));
        api.push_purchase(Reply::Now(Err(rejected(500, "更新购买状态失败"))));
        let store = store_with(&api, 20);
        store.fetch_page(true).await;

        assert!(!store.update_purchase_flag(42, true).await);
        assert!(!store.item(42).unwrap().is_purchased);
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn test_optimistic_value_visible_while_pending() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[42], 1, 20, 1, false))));
        let (tx, reply) = deferred::<()>();
        api.push_purchase(reply);
        let store = Arc::new(store_with(&api, 20));
        store.fetch_page(true).await;

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.update_purchase_flag(42, true).await }
        });
        while MockApi::calls(&api.purchase_calls) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(store.item(42).unwrap().is_purchased);

        tx.send(Err(rejected(500, "更新购买状态失败"))).unwrap();
        assert!(!pending.await.unwrap());
        assert!(!store.item(42).unwrap().is_purchased);
    }

    #[tokio::test]
    async fn test_stale_purchase_response_does_not_override_newer_toggle() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[42], 1, 20, 1, false))));
        let (first_tx, first_reply) = deferred::<()>();
        let (second_tx, second_reply) = deferred::<()>();
        api.push_purchase(first_reply);
        api.push_purchase(second_reply);
        let store = Arc::new(store_with(&api, 20));
        store.fetch_page(true).await;

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.update_purchase_flag(42, true).await }
        });
        while MockApi::calls(&api.purchase_calls) < 1 {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.update_purchase_flag(42, false).await }
        });
        while MockApi::calls(&api.purchase_calls) < 2 {
            tokio::task::yield_now().await;
        }

        // 后发的请求先返回，先发的请求后返回
        second_tx.send(Ok(())).unwrap();
        assert!(second.await.unwrap());
        assert!(!store.item(42).unwrap().is_purchased);

        first_tx.send(Ok(())).unwrap();
        assert!(first.await.unwrap());
        assert!(!store.item(42).unwrap().is_purchased);
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_roll_back_newer_toggle() {
        let api = Arc::new(MockApi::default());
        api.push_page(Reply::Now(Ok(page_of(&[42], 1, 20, 1, false))));
        let (first_tx, first_reply) = deferred::<()>();
        api.push_purchase(first_reply);
        api.push_purchase(Reply::Now(Ok(())));
        let store = Arc::new(store_with(&api, 20));
        store.fetch_page(true).await;

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.update_purchase_flag(42, true).await }
        });
        while MockApi::calls(&api.purchase_calls) < 1 {
            tokio::task::yield_now().await;
        }
        assert!(store.update_purchase_flag(42, true).await);

        first_tx.send(Err(rejected(500, "timeout"))).unwrap();
        assert!(!first.await.unwrap());
        assert!(store.item(42).unwrap().is_purchased);
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_purchase_of_unlisted_item_still_sent() {
        let api = Arc::new(MockApi::default());
        let store = store_with(&api, 20);

        assert!(store.update_purchase_flag(7, true).await);
        assert_eq!(MockApi::calls(&api.purchase_calls), 1);
        assert!(store.item(7).is_none());
    }

    #[tokio::test]
    async fn test_lottery_types_fetched_once() {
        let api = Arc::new(MockApi {
            types: vec![lottery_type(1, "fc_ssq", "双色球"), lottery_type(2, "tc_dlt", "大乐透")],
            ..Default::default()
        });
        let store = store_with(&api, 20);

        assert_eq!(store.fetch_lottery_types().await, FetchOutcome::Loaded { count: 2 });
        assert_eq!(store.fetch_lottery_types().await, FetchOutcome::Skipped);
        assert_eq!(MockApi::calls(&api.type_calls), 1);

        assert_eq!(store.lookup_type_name(2), "大乐透");
        assert_eq!(store.lookup_type_name(99), "类型 99");
    }

    #[test]
    fn test_lookup_without_types_uses_fallback() {
        let store = LotteryStore::new(Arc::new(MockApi::default()), 20);
        assert_eq!(store.lookup_type_name(3), "类型 3");
    }
}
