use crate::{
    database::MongoDB,
    models::{Cart, CartItem},
};
use mongodb::bson::doc;

/// Merge a line into the cart: adding an item already present sums the
/// quantities instead of creating a duplicate line.
pub fn merge_item(items: &mut Vec<CartItem>, menu_item_id: &str, quantity: u32) {
    let quantity = quantity.max(1);
    match items.iter_mut().find(|i| i.menu_item_id == menu_item_id) {
        Some(existing) => existing.quantity += quantity,
        None => items.push(CartItem {
            menu_item_id: menu_item_id.to_string(),
            quantity,
        }),
    }
}

pub async fn get_cart(db: &MongoDB, user_id: &str) -> Result<Cart, String> {
    let collection = db.collection::<Cart>("carts");

    let cart = collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .unwrap_or_else(|| Cart::empty(user_id));

    Ok(cart)
}

/// Every mutation rewrites the whole document. Concurrent writers race
/// with last-write-wins; there is no optimistic concurrency.
async fn save_cart(db: &MongoDB, cart: &Cart) -> Result<(), String> {
    db.collection::<Cart>("carts")
        .replace_one(doc! { "user_id": &cart.user_id }, cart)
        .upsert(true)
        .await
        .map_err(|e| format!("Failed to save cart: {}", e))?;
    Ok(())
}

pub async fn add_item(
    db: &MongoDB,
    user_id: &str,
    menu_item_id: &str,
    quantity: u32,
) -> Result<Cart, String> {
    let mut cart = get_cart(db, user_id).await?;
    merge_item(&mut cart.items, menu_item_id, quantity);
    save_cart(db, &cart).await?;
    Ok(cart)
}

/// Set a line's quantity. Zero is clamped to one — removal is its own
/// operation.
pub async fn update_item_quantity(
    db: &MongoDB,
    user_id: &str,
    menu_item_id: &str,
    quantity: u32,
) -> Result<Cart, String> {
    let mut cart = get_cart(db, user_id).await?;

    let item = cart
        .items
        .iter_mut()
        .find(|i| i.menu_item_id == menu_item_id)
        .ok_or_else(|| "Item not in cart".to_string())?;

    item.quantity = quantity.max(1);
    save_cart(db, &cart).await?;
    Ok(cart)
}

pub async fn remove_item(
    db: &MongoDB,
    user_id: &str,
    menu_item_id: &str,
) -> Result<Cart, String> {
    let mut cart = get_cart(db, user_id).await?;
    cart.items.retain(|i| i.menu_item_id != menu_item_id);
    save_cart(db, &cart).await?;
    Ok(cart)
}

pub async fn clear_cart(db: &MongoDB, user_id: &str) -> Result<(), String> {
    save_cart(db, &Cart::empty(user_id)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_same_item_twice_sums_quantities() {
        let mut items = vec![];
        merge_item(&mut items, "m1", 2);
        merge_item(&mut items, "m1", 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn different_items_get_separate_lines() {
        let mut items = vec![];
        merge_item(&mut items, "m1", 1);
        merge_item(&mut items, "m2", 1);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn zero_quantity_is_clamped_to_one() {
        let mut items = vec![];
        merge_item(&mut items, "m1", 0);
        assert_eq!(items[0].quantity, 1);
    }
}
