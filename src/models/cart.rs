use serde::{Deserialize, Serialize};

/// One cart document per user, replaced wholesale on every mutation.
/// Concurrent writers race with last-write-wins semantics.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cart {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty(user_id: &str) -> Self {
        Cart {
            user_id: user_id.to_string(),
            items: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct CartItem {
    pub menu_item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddCartItemRequest {
    pub menu_item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CartResponse {
    pub success: bool,
    pub items: Vec<CartItem>,
}
