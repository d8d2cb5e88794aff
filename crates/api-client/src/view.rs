use crate::error::ApiError;
use core_types::{CatalogItem, Message};
use std::fmt::Write;
use std::future::Future;

/// How one item is rendered as a line of text.
pub trait ViewLine {
    fn line(&self) -> String;
}

impl ViewLine for CatalogItem {
    fn line(&self) -> String {
        format!("{} - ${}", self.name, self.price)
    }
}

impl ViewLine for Message {
    fn line(&self) -> String {
        format!("{} <{}>: {}", self.name, self.email, self.message)
    }
}

/// A heading and the list fetched for it. The list starts empty and is
/// filled by a single [`ClientView::load`].
#[derive(Debug, Clone)]
pub struct ClientView<T> {
    heading: &'static str,
    items: Vec<T>,
}

impl<T: ViewLine> ClientView<T> {
    pub fn new(heading: &'static str) -> Self {
        Self { heading, items: Vec::new() }
    }

    /// Awaits `request` once. On failure the error is logged and the view
    /// is left empty; there is no retry.
    pub async fn load<F>(&mut self, request: F)
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        match request.await {
            Ok(items) => self.items = items,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching data.");
                self.items.clear();
            }
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.heading);
        for item in &self.items {
            let _ = writeln!(out, "  {}", item.line());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i32, name: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "message": "hello",
            "created_at": "2024-05-01T12:00:00",
        }))
        .unwrap()
    }

    #[test]
    fn catalog_line_shows_name_and_price() {
        let item = CatalogItem { id: 7, name: "Ibuprofen".to_string(), price: "12.99".parse().unwrap() };
        assert_eq!(item.line(), "Ibuprofen - $12.99");
    }

    #[tokio::test]
    async fn loaded_messages_render_one_line_each() {
        let mut view = ClientView::new("Messages");
        view.load(async { Ok(vec![message(2, "Jane"), message(1, "John")]) })
            .await;

        assert_eq!(
            view.render(),
            "Messages\n  Jane <jane@example.com>: hello\n  John <john@example.com>: hello\n"
        );
    }

    #[tokio::test]
    async fn failed_load_leaves_the_view_empty() {
        let mut view: ClientView<Message> = ClientView::new("Messages");
        view.load(async { Ok(vec![message(1, "John")]) }).await;
        view.load(async { Err(ApiError::Deserialization("unexpected token".to_string())) })
            .await;

        assert!(view.items().is_empty());
        assert_eq!(view.render(), "Messages\n");
    }
}
