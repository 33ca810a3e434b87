use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_veg: bool,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub popular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_veg: bool,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub popular: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MenuQuery {
    pub category: Option<String>,
    /// When true, unavailable items are included (admin views).
    #[serde(default)]
    pub include_unavailable: bool,
}
