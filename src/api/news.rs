//! News retrieval endpoints. Read-only; routed through the same authorized
//! client so a 401 here invalidates the session like anywhere else.
use crate::api::client::{ApiClient, ApiError};
use crate::api::types::{Article, Envelope, NewsPayload, NewsQuery, SummaryPayload, SummaryRequest};

impl ApiClient {
    /// `GET /news` with optional category/page/pageSize parameters.
    pub async fn get_news(&self, query: &NewsQuery) -> Result<Vec<Article>, ApiError> {
        let request = self.get("/news").query(&query.to_pairs());
        let envelope: Envelope<NewsPayload> = self.execute(request).await?;
        Ok(envelope.data.map(|p| p.articles).unwrap_or_default())
    }

    /// `GET /news/search?q=`.
    pub async fn search_news(&self, q: &str, query: &NewsQuery) -> Result<Vec<Article>, ApiError> {
        let mut pairs = vec![("q", q.to_string())];
        pairs.extend(query.to_pairs());
        let request = self.get("/news/search").query(&pairs);
        let envelope: Envelope<NewsPayload> = self.execute(request).await?;
        Ok(envelope.data.map(|p| p.articles).unwrap_or_default())
    }

    /// `GET /news/categories/{category}`.
    pub async fn get_by_category(
        &self,
        category: &str,
        query: &NewsQuery,
    ) -> Result<Vec<Article>, ApiError> {
        let path = format!("/news/categories/{}", category);
        let request = self.get(&path).query(&query.to_pairs());
        let envelope: Envelope<NewsPayload> = self.execute(request).await?;
        Ok(envelope.data.map(|p| p.articles).unwrap_or_default())
    }

    /// `POST /news/summary` — server-side summary of an article URL.
    pub async fn get_summary(&self, article_url: &str) -> Result<String, ApiError> {
        let body = SummaryRequest {
            url: article_url.to_string(),
        };
        let envelope: Envelope<SummaryPayload> =
            self.execute(self.post("/news/summary").json(&body)).await?;
        Ok(envelope.data.map(|p| p.summary).unwrap_or_default())
    }
}
