use std::sync::{Arc, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    category::{self, CategoryStore},
    rakuten::{GatewayError, RakutenClient},
};

pub const LOADING_MESSAGE: &str = "カテゴリデータをロード中...";
pub const READY_MESSAGE: &str = "ボタンを押して献立をゲット！";
pub const EMPTY_MESSAGE: &str = "カテゴリデータ取得失敗。";

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<CategoryStore>),
    Failed(String),
}

impl LoadState {
    pub fn status_message(&self) -> String {
        match self {
            Self::Loading => LOADING_MESSAGE.to_string(),
            Self::Ready(_) => READY_MESSAGE.to_string(),
            Self::Failed(message) => message.clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Category load outcome shared between the loader task and request handlers.
///
/// The loader is the only writer and writes once; handlers only read.
#[derive(Debug)]
pub struct AppState {
    load: RwLock<LoadState>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            load: RwLock::new(LoadState::Loading),
        }
    }

    pub fn snapshot(&self) -> LoadState {
        self.load
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self) -> Option<Arc<CategoryStore>> {
        match self.snapshot() {
            LoadState::Ready(store) => Some(store),
            _ => None,
        }
    }

    /// Publish the result of the category load. Only the first call has an
    /// effect, later ones are ignored.
    pub fn finish_loading(&self, result: Result<CategoryStore, GatewayError>) {
        let next = match result {
            Ok(store) if store.medium_count() == 0 || store.small_ids().is_empty() => {
                error!(
                    "category data is empty, medium: {}, small: {}",
                    store.medium_count(),
                    store.small_count()
                );
                LoadState::Failed(EMPTY_MESSAGE.to_string())
            }
            Ok(store) => {
                info!(
                    "category data loaded, small categories: {}",
                    store.small_ids().len()
                );
                LoadState::Ready(Arc::new(store))
            }
            Err(e) => {
                error!("fail to load category data: {e}");
                LoadState::Failed(format!("カテゴリロードエラー。詳細: {e}"))
            }
        };

        let mut load = self.load.write().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*load, LoadState::Loading) {
            warn!("category data already published, ignoring new result");
            return;
        }
        *load = next;
    }

    pub async fn load_categories(&self, gateway: &RakutenClient) {
        let result = category::load_all(gateway).await;
        self.finish_loading(result);
    }
}

/// Run the one-shot category load in the background.
pub fn spawn_category_load(state: Arc<AppState>, gateway: RakutenClient) -> JoinHandle<()> {
    tokio::spawn(async move {
        state.load_categories(&gateway).await;
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::category::tests::sample_store;
    use crate::rakuten::GatewaySettingsBuilder;

    fn gateway_for(server: &MockServer) -> RakutenClient {
        let settings = GatewaySettingsBuilder::default()
            .application_id("test-app")
            .category_list_url(format!("{}/list", server.uri()))
            .category_ranking_url(format!("{}/ranking", server.uri()))
            .request_interval(Duration::ZERO)
            .build()
            .unwrap();
        RakutenClient::new(settings).unwrap()
    }

    #[test]
    fn test_starts_loading() {
        let state = AppState::new();
        assert!(matches!(state.snapshot(), LoadState::Loading));
        assert_eq!(state.snapshot().status_message(), LOADING_MESSAGE);
        assert!(state.store().is_none());
    }

    #[test]
    fn test_first_result_wins() {
        let state = AppState::new();
        state.finish_loading(Ok(sample_store(1)));
        state.finish_loading(Err(GatewayError::Status {
            url: "http://x".to_string(),
            status: 500,
            body: String::new(),
        }));
        assert!(state.snapshot().is_ready());
        assert_eq!(state.snapshot().status_message(), READY_MESSAGE);
    }

    #[tokio::test]
    async fn test_load_success_publishes_store() {
        let server = MockServer::start().await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "medium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "medium": [
                    { "categoryId": 10, "categoryName": "Soup", "parentCategoryId": "1" }
                ] }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "small"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "small": [
                    { "categoryId": 101, "categoryName": "Miso", "parentCategoryId": 10 }
                ] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::new();
        state.load_categories(&gateway_for(&server)).await;

        let store = state.store().unwrap();
        assert_eq!(store.small_ids(), ["101".to_string()]);
        assert_eq!(store.resolve_full_path("101").as_deref(), Some("1-10-101"));
    }

    #[tokio::test]
    async fn test_load_http_error_fails() {
        let server = MockServer::start().await;
        Mock::given(path("/list"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let state = Arc::new(AppState::new());
        spawn_category_load(state.clone(), gateway_for(&server))
            .await
            .unwrap();

        match state.snapshot() {
            LoadState::Failed(message) => {
                assert!(message.starts_with("カテゴリロードエラー。"), "{message}");
                assert!(message.contains("500"), "{message}");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_small_table_fails() {
        let server = MockServer::start().await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "medium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "medium": [] }
            })))
            .mount(&server)
            .await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "small"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "small": [] }
            })))
            .mount(&server)
            .await;

        let state = AppState::new();
        state.load_categories(&gateway_for(&server)).await;
        assert_eq!(state.snapshot().status_message(), EMPTY_MESSAGE);
        assert!(state.store().is_none());
    }

    #[tokio::test]
    async fn test_empty_medium_table_fails() {
        let server = MockServer::start().await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "medium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": {} })))
            .mount(&server)
            .await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "small"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "small": [
                    { "categoryId": 101, "categoryName": "Miso", "parentCategoryId": 10 }
                ] }
            })))
            .mount(&server)
            .await;

        let state = AppState::new();
        state.load_categories(&gateway_for(&server)).await;
        assert!(!state.snapshot().is_ready());
        assert_eq!(state.snapshot().status_message(), EMPTY_MESSAGE);
        assert!(state.store().is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_large_parent_never_resolves() {
        let server = MockServer::start().await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "medium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "medium": [
                    { "categoryId": 10, "categoryName": "Soup", "parentCategoryId": "abc" }
                ] }
            })))
            .mount(&server)
            .await;
        Mock::given(path("/list"))
            .and(query_param("categoryType", "small"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "small": [
                    { "categoryId": 101, "categoryName": "Miso", "parentCategoryId": 10 }
                ] }
            })))
            .mount(&server)
            .await;

        let state = AppState::new();
        state.load_categories(&gateway_for(&server)).await;
        let store = state.store().unwrap();
        assert_eq!(store.resolve_full_path("101"), None);
    }
}
