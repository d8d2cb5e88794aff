use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ClientSettings;
use core_types::{CatalogItem, Message};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub mod error;
pub mod view;

// --- Public API ---
pub use view::{ClientView, ViewLine};

/// The read operations the client view needs from the message board API.
/// Implemented over HTTP by [`BoardClient`]; tests substitute their own.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /api/messages`
    async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError>;

    /// `GET /api/products`
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ApiError>;
}

/// An HTTP implementation of [`BoardApi`].
#[derive(Clone, Debug)]
pub struct BoardClient {
    client: reqwest::Client,
    base_url: String,
}

impl BoardClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiError> {
        Self::new(&settings.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "Fetching.");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            Err(ApiError::Status { status: status.as_u16(), body: text })
        }
    }
}

#[async_trait]
impl BoardApi for BoardClient {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
        self.get_json("/api/messages").await
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.get_json("/api/products").await
    }
}

/// Builds the catalog view with a single request to `api`.
pub async fn catalog_view(api: &dyn BoardApi) -> ClientView<CatalogItem> {
    let mut view = ClientView::new("Pharmaceutical Catalog");
    view.load(api.fetch_catalog()).await;
    view
}

/// Builds the message list view with a single request to `api`.
pub async fn messages_view(api: &dyn BoardApi) -> ClientView<Message> {
    let mut view = ClientView::new("Messages");
    view.load(api.fetch_messages()).await;
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers exactly one HTTP request with `status` and `body`.
    async fn one_shot_server(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn fetches_and_renders_the_catalog() {
        let base = one_shot_server("200 OK", r#"[{"id":1,"name":"Aspirin","price":"4.50"}]"#).await;
        let client = BoardClient::new(&base).unwrap();

        let view = catalog_view(&client).await;
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.render(), "Pharmaceutical Catalog\n  Aspirin - $4.50\n");
    }

    #[tokio::test]
    async fn error_status_becomes_an_api_error() {
        let base = one_shot_server("500 Internal Server Error", r#"{"error":"Failed to fetch messages"}"#).await;
        let client = BoardClient::new(&base).unwrap();

        let err = client.fetch_messages().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_renders_an_empty_list() {
        // Port 1 on loopback is never listening in the test environment.
        let client = BoardClient::new("http://127.0.0.1:1").unwrap();

        let view = messages_view(&client).await;
        assert!(view.items().is_empty());
        assert_eq!(view.render(), "Messages\n");
    }
}
