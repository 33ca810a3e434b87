use crate::{
    database::MongoDB,
    models::{CreateMenuItemRequest, MenuItem, MenuQuery},
    utils::cache,
};
use futures::TryStreamExt;
use mongodb::bson::doc;

const POPULAR_CACHE_KEY: &str = "popular_menu";

pub async fn list_menu(db: &MongoDB, query: &MenuQuery) -> Result<Vec<MenuItem>, String> {
    let collection = db.collection::<MenuItem>("menu_items");

    let mut filter = doc! {};
    if !query.include_unavailable {
        filter.insert("available", true);
    }
    if let Some(category) = &query.category {
        filter.insert("category", category);
    }

    let items: Vec<MenuItem> = collection
        .find(filter)
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .try_collect()
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(items)
}

pub async fn get_menu_item(db: &MongoDB, item_id: &str) -> Result<MenuItem, String> {
    let oid = mongodb::bson::oid::ObjectId::parse_str(item_id)
        .map_err(|_| format!("Invalid menu item id: {}", item_id))?;

    db.collection::<MenuItem>("menu_items")
        .find_one(doc! { "_id": oid })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "Menu item not found".to_string())
}

/// Home-page highlights. Cached for a minute — the list changes only when
/// an admin edits the menu.
pub async fn popular_items(db: &MongoDB) -> Result<Vec<MenuItem>, String> {
    if let Some(cached) = cache::get_cached(POPULAR_CACHE_KEY) {
        if let Ok(items) = serde_json::from_str::<Vec<MenuItem>>(&cached) {
            return Ok(items);
        }
    }

    let collection = db.collection::<MenuItem>("menu_items");

    let items: Vec<MenuItem> = collection
        .find(doc! { "popular": true, "available": true })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .try_collect()
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    if let Ok(json) = serde_json::to_string(&items) {
        cache::set_cache(POPULAR_CACHE_KEY.to_string(), json);
    }

    Ok(items)
}

pub async fn create_menu_item(
    db: &MongoDB,
    request: &CreateMenuItemRequest,
) -> Result<MenuItem, String> {
    if request.name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if request.price <= 0.0 {
        return Err("Price must be positive".to_string());
    }

    let mut item = MenuItem {
        id: None,
        name: request.name.clone(),
        description: request.description.clone(),
        price: request.price,
        image: request.image.clone(),
        category: request.category.clone(),
        is_veg: request.is_veg,
        available: request.available,
        popular: request.popular,
        rating: None,
        delivery_time: None,
    };

    let result = db
        .collection::<MenuItem>("menu_items")
        .insert_one(&item)
        .await
        .map_err(|e| format!("Failed to create menu item: {}", e))?;

    item.id = result.inserted_id.as_object_id();
    cache::invalidate(POPULAR_CACHE_KEY);

    log::info!("🍽️  Menu item created: {}", item.name);

    Ok(item)
}
