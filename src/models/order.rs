use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Order life cycle. Serialized as snake_case strings in MongoDB and JSON.
/// `cancelled` is only reachable from `pending`/`confirmed` via the cancel
/// operation; the admin status-update path is a plain overwrite with no
/// transition guard.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "preparing" => Some(OrderStatus::Preparing),
            "out_for_delivery" => Some(OrderStatus::OutForDelivery),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Customer-facing label for tracking screens.
    pub fn display_text(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order Placed",
            OrderStatus::Confirmed => "Order Confirmed",
            OrderStatus::Preparing => "Preparing Your Food",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// An order can only be cancelled before the kitchen starts on it.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Online,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Online => "online",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

/// Line item snapshot stored on the order. Name/price are copied from the
/// menu at checkout so later menu edits don't rewrite order history.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

/// Postal fields default to empty so a campus checkout can omit them; the
/// address validation decides which set is required.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct DeliveryAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub landmark: String,
    /// "regular" or "university"
    #[serde(default = "default_address_type")]
    pub address_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
}

fn default_address_type() -> String {
    "regular".to_string()
}

impl DeliveryAddress {
    pub fn is_university(&self) -> bool {
        self.address_type == "university"
    }
}

/// Computed once at checkout, never recomputed.
/// Invariant: total == subtotal + delivery_fee + platform_fee + taxes.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct Pricing {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub platform_fee: f64,
    pub taxes: f64,
    pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    /// Authenticated subject that placed the order; queried by the
    /// tracking subscription.
    pub auth_uid: String,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    pub contact_number: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub special_instructions: String,
    pub pricing: Pricing,
    pub status: OrderStatus,
    pub order_number: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
}

impl Order {
    pub fn id_hex(&self) -> String {
        self.id.map(|oid| oid.to_hex()).unwrap_or_default()
    }

    /// JSON view with a plain string `id` instead of the raw ObjectId.
    pub fn to_public_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("_id");
            obj.insert("id".to_string(), serde_json::json!(self.id_hex()));
            obj.insert(
                "status_text".to_string(),
                serde_json::json!(self.status.display_text()),
            );
        }
        value
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PlaceOrderRequest {
    pub delivery_address: DeliveryAddress,
    pub contact_number: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub special_instructions: String,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::CashOnDelivery
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub pricing: Pricing,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub message: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderStatus::OutForDelivery);
        assert_eq!(OrderStatus::parse("delivered"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn cancellable_only_before_preparing() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(!OrderStatus::Preparing.is_cancellable());
        assert!(!OrderStatus::OutForDelivery.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn payment_method_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(json, "\"cash_on_delivery\"");
    }

    #[test]
    fn university_address_deserializes_without_postal_fields() {
        // Campus checkouts send only the campus keys
        let address: DeliveryAddress = serde_json::from_str(
            r#"{"address_type":"university","university":"cusat","location":"Main Gate","department":"CS","building_number":"4"}"#,
        )
        .unwrap();

        assert!(address.is_university());
        assert!(address.street.is_empty());
        assert!(address.pincode.is_empty());
        assert_eq!(address.university.as_deref(), Some("cusat"));
    }
}
