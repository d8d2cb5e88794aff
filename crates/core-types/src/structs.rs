use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `messages` table.
///
/// `id` and `created_at` are assigned by the store on insert and never change.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    /// `TIMESTAMP` without time zone, as the column is declared.
    pub created_at: NaiveDateTime,
}

/// A message that has passed validation and may be written to the store.
///
/// The fields are private: the only ways to get one are
/// [`CreateMessageRequest::validate`](crate::CreateMessageRequest::validate)
/// and [`NewMessage::samples`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    name: String,
    email: String,
    message: String,
}

impl NewMessage {
    pub(crate) fn new(name: String, email: String, message: String) -> Self {
        Self { name, email, message }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The two rows seeded into an empty `messages` table on first start.
    pub fn samples() -> [NewMessage; 2] {
        [
            Self::new(
                "John Doe".to_string(),
                "john@example.com".to_string(),
                "Hello, this is a test message!".to_string(),
            ),
            Self::new(
                "Jane Smith".to_string(),
                "jane@example.com".to_string(),
                "The application is working great!".to_string(),
            ),
        ]
    }
}

/// A row from the pre-existing `products` table. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn message_serializes_with_flat_fields() {
        let created_at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let message = Message {
            id: 3,
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            message: "hi".to_string(),
            created_at,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["created_at"], "2024-05-01T12:30:00");
    }

    #[test]
    fn samples_are_the_two_fixed_seed_rows() {
        let [first, second] = NewMessage::samples();
        assert_eq!(first.name(), "John Doe");
        assert_eq!(first.email(), "john@example.com");
        assert_eq!(second.name(), "Jane Smith");
        assert_eq!(second.message(), "The application is working great!");
    }

    #[test]
    fn catalog_item_price_keeps_its_scale() {
        let item = CatalogItem { id: 1, name: "Aspirin".to_string(), price: dec!(4.50) };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"4.50\""));

        let back: CatalogItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.price, dec!(4.50));
    }
}
