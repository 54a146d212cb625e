//! Helpers shared by unit tests: a throwaway HTTP backend and client wiring.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Timeouts;
use crate::storage::{MemoryStorage, SessionStorage};

/// Serve `router` on an ephemeral local port; returns its base URL.
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Client against `base_url` backed by fresh in-memory storage.
pub(crate) fn client(base_url: &str) -> (Arc<ApiClient>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let client = client_with_storage(base_url, storage.clone());
    (client, storage)
}

pub(crate) fn client_with_storage(base_url: &str, storage: Arc<dyn SessionStorage>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(base_url, Timeouts::default(), storage).unwrap())
}
