//! Purchase models: orders and the replies of order/account actions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum OrderStatus {
    Unpaid,
    Paid,
    #[serde(other)]
    Other,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unpaid => "unpaid",
            OrderStatus::Paid => "paid",
            OrderStatus::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Order {
    pub order_number: String,
    /// Course id.
    pub course: i64,
    pub price: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub created_at: String,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }
}

/// Body of `POST /order/create`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreate {
    pub course_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of `POST /order/confirm`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirm {
    pub order_number: String,
    pub payment_method: String,
}

/// Reply of order creation and confirmation.
///
/// A refused action still comes back with a success status; `success` is
/// false and `message` says why. An existing unpaid order for the same
/// course is reported with its `order_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OrderReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub order_number: Option<String>,
}

/// Generic `{success, message}` reply of account actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ActionResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_list() {
        let json = r#"[
            {"order_number": "A1", "course": 3, "price": 99.0, "status": "paid", "payment_method": "alipay", "created_at": "2024-05-01"},
            {"order_number": "A2", "course": 4, "price": 10.5, "status": "unpaid"},
            {"order_number": "A3", "course": 5, "price": 1.0, "status": "refunded"}
        ]"#;
        let orders: Vec<Order> = serde_json::from_str(json).unwrap();
        assert_eq!(orders.len(), 3);
        assert!(orders[0].is_paid());
        assert_eq!(orders[1].status, OrderStatus::Unpaid);
        assert!(orders[1].payment_method.is_empty());
        assert_eq!(orders[2].status, OrderStatus::Other);
    }

    #[test]
    fn test_order_create_omits_empty_note() {
        let body = serde_json::to_value(OrderCreate { course_id: 9, note: None }).unwrap();
        assert_eq!(body, serde_json::json!({"course_id": 9}));
    }

    #[test]
    fn test_parse_refused_receipt() {
        let json = r#"{"success": false, "message": "unpaid order exists", "order_number": "X9"}"#;
        let receipt: OrderReceipt = serde_json::from_str(json).unwrap();
        assert!(!receipt.success);
        assert_eq!(receipt.order_number.as_deref(), Some("X9"));
    }
}
