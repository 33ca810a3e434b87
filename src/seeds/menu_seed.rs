use crate::database::MongoDB;
use crate::models::MenuItem;
use mongodb::bson::doc;

/// Seed the starter menu into MongoDB.
/// Idempotent: only inserts when the collection is empty.
pub async fn seed_default_menu(db: &MongoDB) {
    let collection = db.collection::<MenuItem>("menu_items");

    let count = collection.count_documents(doc! {}).await.unwrap_or(0);
    if count > 0 {
        log::info!(
            "🍽️  Menu: {} items already in DB — skipping seed",
            count
        );
        return;
    }

    log::info!("🍽️  Menu: seeding starter items into MongoDB...");

    match collection.insert_many(&build_default_menu()).await {
        Ok(result) => {
            log::info!(
                "   ✅ Inserted {} starter items into menu_items collection",
                result.inserted_ids.len()
            );
        }
        Err(e) => {
            log::error!("   ❌ Failed to seed menu: {}", e);
        }
    }
}

fn build_default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: None,
            name: "Chicken Biriyani".into(),
            description: "Aromatic chicken biriyani".into(),
            price: 99.0,
            image: "/chicken-biriyani.jpeg".into(),
            category: "biriyani".into(),
            is_veg: false,
            available: true,
            popular: true,
            rating: Some(4.8),
            delivery_time: Some("30-40 min".into()),
        },
        MenuItem {
            id: None,
            name: "Mutton Biriyani".into(),
            description: "Aromatic mutton biriyani".into(),
            price: 179.0,
            image: "/mutton-biriyani.jpeg".into(),
            category: "biriyani".into(),
            is_veg: false,
            available: true,
            popular: true,
            rating: Some(4.7),
            delivery_time: Some("25-35 min".into()),
        },
        MenuItem {
            id: None,
            name: "Veg Thali".into(),
            description: "Rice, roti, sabzi, dal and salad".into(),
            price: 99.0,
            image: "https://source.unsplash.com/400x300/?indian-food".into(),
            category: "meals".into(),
            is_veg: true,
            available: true,
            popular: false,
            rating: None,
            delivery_time: None,
        },
        MenuItem {
            id: None,
            name: "Paneer Butter Masala".into(),
            description: "Creamy curry with soft paneer cubes".into(),
            price: 149.0,
            image: "https://source.unsplash.com/400x300/?paneer".into(),
            category: "curry".into(),
            is_veg: true,
            available: true,
            popular: false,
            rating: None,
            delivery_time: None,
        },
        MenuItem {
            id: None,
            name: "Gulab Jamun (2 pc)".into(),
            description: "Soft khoya balls in rose-scented syrup".into(),
            price: 60.0,
            image: "https://source.unsplash.com/400x300/?gulab-jamun".into(),
            category: "dessert".into(),
            is_veg: true,
            available: true,
            popular: false,
            rating: None,
            delivery_time: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_menu_has_popular_items() {
        let menu = build_default_menu();
        assert!(menu.iter().any(|item| item.popular));
        assert!(menu.iter().all(|item| item.price > 0.0));
        assert!(menu.iter().all(|item| item.available));
    }
}
