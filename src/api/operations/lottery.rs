use tracing::debug;

use super::{ApiClient, decode};
use crate::api::models::{LotteryType, PurchaseRequest, RecommendationFilter, RecommendationPage};
use crate::error::Result;
use crate::middleware::{check_response, with_bearer};

impl ApiClient {
    pub(super) async fn get_lottery_types(&self) -> Result<Vec<LotteryType>> {
        let (request, auth) = with_bearer(self.http.get(self.url("/lottery-types")), &self.session);
        let response = check_response(request.send().await?, Some(&auth)).await?;

        let types: Vec<LotteryType> = decode(response).await?;
        debug!("Fetched {} lottery types", types.len());
        Ok(types)
    }

    pub(super) async fn get_recommendations(
        &self,
        page: u32,
        page_size: u32,
        filter: &RecommendationFilter,
    ) -> Result<RecommendationPage> {
        let mut query = vec![("page", page.to_string()), ("pageSize", page_size.to_string())];
        query.extend(filter.query_pairs());

        let (request, auth) = with_bearer(
            self.http.get(self.url("/recommendations")).query(&query),
            &self.session,
        );
        let response = check_response(request.send().await?, Some(&auth)).await?;

        let page_data: RecommendationPage = decode(response).await?;
        debug!(
            "Fetched recommendations page {} ({} items, total {})",
            page,
            page_data.data.len(),
            page_data.total
        );
        Ok(page_data)
    }

    pub(super) async fn put_purchase(&self, id: i64, is_purchased: bool) -> Result<()> {
        let (request, auth) = with_bearer(
            self.http
                .put(self.url(&format!("/recommendations/{}/purchase", id)))
                .json(&PurchaseRequest { is_purchased }),
            &self.session,
        );
        // 成功时响应体不做要求
        check_response(request.send().await?, Some(&auth)).await?;
        Ok(())
    }
}
