use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Static promotional code shown on the offers page. Display only — codes
/// are not applied to pricing at checkout.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Offer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOfferRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default = "default_active")]
    pub active: bool,
}
