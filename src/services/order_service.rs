use crate::{
    database::MongoDB,
    models::{
        Cart, DeliveryAddress, MenuItem, Order, OrderItem, OrderStatus, PaymentMethod,
        PlaceOrderRequest, PlaceOrderResponse, Pricing,
    },
    services::{
        cart_service, notification_service,
        order_events::{OrderEvent, OrderEvents},
    },
};
use chrono::{Duration, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

const PLATFORM_FEE: f64 = 2.5;
const STANDARD_DELIVERY_FEE: f64 = 50.0;
const BASE_DELIVERY_MINUTES: i64 = 30;
const ADMIN_LIST_LIMIT: i64 = 50;

fn free_delivery_threshold() -> f64 {
    std::env::var("FREE_DELIVERY_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500.0)
}

/// Flat-formula pricing, computed once at checkout. University deliveries
/// ship free; regular deliveries are free above the threshold.
pub fn compute_pricing(items: &[OrderItem], university_delivery: bool) -> Pricing {
    let subtotal: f64 = items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();

    let delivery_fee = if university_delivery || subtotal > free_delivery_threshold() {
        0.0
    } else {
        STANDARD_DELIVERY_FEE
    };

    let platform_fee = PLATFORM_FEE;
    let taxes = 0.0; // COD orders, no GST collected

    Pricing {
        subtotal,
        delivery_fee,
        platform_fee,
        taxes,
        total: subtotal + delivery_fee + platform_fee + taxes,
    }
}

/// Regular addresses need the postal fields; university addresses need the
/// campus drop-off fields instead.
pub fn validate_delivery_address(address: &DeliveryAddress) -> Result<(), String> {
    if address.is_university() {
        if address.university.as_deref().unwrap_or("").trim().is_empty() {
            return Err("Please select a university".to_string());
        }
        if address.location.as_deref().unwrap_or("").trim().is_empty() {
            return Err("Please select a location".to_string());
        }
        if address.department.as_deref().unwrap_or("").trim().is_empty() {
            return Err("Department is required".to_string());
        }
        if address
            .building_number
            .as_deref()
            .unwrap_or("")
            .trim()
            .is_empty()
        {
            return Err("Building number is required".to_string());
        }
        return Ok(());
    }

    let mut missing = Vec::new();
    if address.street.trim().is_empty() {
        missing.push("street");
    }
    if address.city.trim().is_empty() {
        missing.push("city");
    }
    if address.state.trim().is_empty() {
        missing.push("state");
    }
    if address.pincode.trim().is_empty() {
        missing.push("pincode");
    }
    if !missing.is_empty() {
        return Err(format!(
            "Missing required address fields: {}",
            missing.join(", ")
        ));
    }

    if address.pincode.len() != 6 || !address.pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err("Pincode must be 6 digits".to_string());
    }

    Ok(())
}

/// Minutes left on the clock for a live order, scaled down as the order
/// moves through the kitchen. Terminal orders have no estimate.
pub fn estimated_minutes_remaining(status: OrderStatus) -> Option<i64> {
    let multiplier = match status {
        OrderStatus::Pending => 1.0,
        OrderStatus::Confirmed => 0.9,
        OrderStatus::Preparing => 0.7,
        OrderStatus::OutForDelivery => 0.3,
        OrderStatus::Delivered | OrderStatus::Cancelled => return None,
    };
    Some((BASE_DELIVERY_MINUTES as f64 * multiplier).ceil() as i64)
}

/// Checkout. Reads the caller's stored cart, prices it against the live
/// menu, writes the order and clears the cart. No idempotency key — a
/// client retry after a network blip can duplicate the order (known risk).
pub async fn place_order(
    db: &MongoDB,
    events: &OrderEvents,
    user_id: &str,
    request: &PlaceOrderRequest,
) -> Result<PlaceOrderResponse, String> {
    if request.payment_method != PaymentMethod::CashOnDelivery {
        return Err("Online payment is not available yet. Please use cash on delivery".to_string());
    }

    validate_delivery_address(&request.delivery_address)?;

    if request.contact_number.trim().is_empty() {
        return Err("Contact number is required".to_string());
    }

    let cart = cart_service::get_cart(db, user_id).await?;
    if cart.is_empty() {
        return Err("Cart is empty".to_string());
    }

    let items = enrich_cart_items(db, &cart).await?;
    let pricing = compute_pricing(&items, request.delivery_address.is_university());

    let now = Utc::now();
    let order = Order {
        id: None,
        user_id: user_id.to_string(),
        auth_uid: user_id.to_string(),
        items,
        delivery_address: request.delivery_address.clone(),
        contact_number: request.contact_number.clone(),
        payment_method: request.payment_method,
        special_instructions: request.special_instructions.clone(),
        pricing: pricing.clone(),
        status: OrderStatus::Pending,
        order_number: format!("ORD-{}", now.timestamp_millis()),
        created_at: Some(now),
        updated_at: Some(now),
        estimated_delivery_time: Some(now + Duration::minutes(BASE_DELIVERY_MINUTES)),
    };

    let collection = db.collection::<Order>("orders");
    let result = collection
        .insert_one(&order)
        .await
        .map_err(|e| format!("Failed to place order: {}", e))?;

    let order_id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    log::info!(
        "🧾 Order {} placed by {} — total {:.2}",
        order.order_number,
        user_id,
        pricing.total
    );

    // Cart is consumed by the order
    cart_service::clear_cart(db, user_id).await?;

    let mut stored = order.clone();
    stored.id = result.inserted_id.as_object_id();

    events.publish(OrderEvent {
        order_id: order_id.clone(),
        user_id: user_id.to_string(),
        auth_uid: user_id.to_string(),
        status: OrderStatus::Pending,
        order: stored.to_public_json(),
    });

    // Admin email is best-effort and never fails the order
    let notify_order = stored.clone();
    tokio::spawn(async move {
        if let Err(e) = notification_service::notify_admin_new_order(&notify_order).await {
            log::error!("❌ Admin notification failed: {}", e);
        }
    });

    Ok(PlaceOrderResponse {
        success: true,
        order_id,
        order_number: order.order_number,
        status: OrderStatus::Pending,
        pricing,
        estimated_delivery_time: order.estimated_delivery_time,
        message: "Order placed successfully!".to_string(),
    })
}

/// Resolve cart lines against the live menu. Missing or unavailable items
/// fail the checkout rather than silently dropping lines.
async fn enrich_cart_items(db: &MongoDB, cart: &Cart) -> Result<Vec<OrderItem>, String> {
    let menu = db.collection::<MenuItem>("menu_items");
    let mut items = Vec::with_capacity(cart.items.len());

    for line in &cart.items {
        let oid = ObjectId::parse_str(&line.menu_item_id)
            .map_err(|_| format!("Invalid menu item id: {}", line.menu_item_id))?;

        let menu_item = menu
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| format!("Database error: {}", e))?
            .ok_or_else(|| format!("Menu item not found: {}", line.menu_item_id))?;

        if !menu_item.available {
            return Err(format!(
                "{} is currently unavailable. Please remove it from your cart",
                menu_item.name
            ));
        }

        items.push(OrderItem {
            menu_item_id: line.menu_item_id.clone(),
            name: menu_item.name,
            price: menu_item.price,
            quantity: line.quantity,
            image: menu_item.image,
            category: menu_item.category,
        });
    }

    Ok(items)
}

/// Caller's order history, newest first. Sorted here rather than in the
/// query so no compound index is needed.
pub async fn get_user_orders(db: &MongoDB, user_id: &str) -> Result<Vec<Order>, String> {
    let collection = db.collection::<Order>("orders");

    let mut orders: Vec<Order> = collection
        .find(doc! { "auth_uid": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .try_collect()
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

pub async fn get_order(db: &MongoDB, order_id: &str) -> Result<Order, String> {
    let oid =
        ObjectId::parse_str(order_id).map_err(|_| format!("Invalid order id: {}", order_id))?;

    db.collection::<Order>("orders")
        .find_one(doc! { "_id": oid })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "Order not found".to_string())
}

/// Plain field overwrite — any status can be set from any status. There is
/// deliberately no transition guard on this path; cancel is the only
/// guarded edge (see `cancel_order`).
pub async fn update_status(
    db: &MongoDB,
    events: &OrderEvents,
    order_id: &str,
    status: OrderStatus,
) -> Result<Order, String> {
    let oid =
        ObjectId::parse_str(order_id).map_err(|_| format!("Invalid order id: {}", order_id))?;

    let collection = db.collection::<Order>("orders");
    let now = mongodb::bson::to_bson(&Utc::now())
        .map_err(|e| format!("Serialization error: {}", e))?;

    let result = collection
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": { "status": status.as_str(), "updated_at": &now } },
        )
        .await
        .map_err(|e| format!("Failed to update order status: {}", e))?;

    if result.matched_count == 0 {
        return Err("Order not found".to_string());
    }

    let order = get_order(db, order_id).await?;

    log::info!("📦 Order {} → {}", order.order_number, status);

    events.publish(OrderEvent {
        order_id: order_id.to_string(),
        user_id: order.user_id.clone(),
        auth_uid: order.auth_uid.clone(),
        status,
        order: order.to_public_json(),
    });

    Ok(order)
}

/// Customer-initiated cancel, allowed only before the kitchen starts.
pub async fn cancel_order(
    db: &MongoDB,
    events: &OrderEvents,
    order_id: &str,
    user_id: &str,
) -> Result<Order, String> {
    let order = get_order(db, order_id).await?;

    if order.auth_uid != user_id {
        return Err("Order not found".to_string());
    }

    if !order.status.is_cancellable() {
        return Err("Order cannot be cancelled at this stage".to_string());
    }

    update_status(db, events, order_id, OrderStatus::Cancelled).await
}

/// Admin listing, optionally filtered by status. Newest first, capped at 50 —
/// the sort must happen in the query, or the cap would keep the oldest rows.
pub async fn get_all_orders(
    db: &MongoDB,
    status: Option<OrderStatus>,
) -> Result<Vec<Order>, String> {
    let collection = db.collection::<Order>("orders");

    let filter = match status {
        Some(s) => doc! { "status": s.as_str() },
        None => doc! {},
    };

    // created_at is an RFC 3339 string, so the index sort is chronological
    let orders: Vec<Order> = collection
        .find(filter)
        .sort(doc! { "created_at": -1 })
        .limit(ADMIN_LIST_LIMIT)
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .try_collect()
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            menu_item_id: "m1".to_string(),
            name: "Chicken Biriyani".to_string(),
            price,
            quantity,
            image: String::new(),
            category: "biriyani".to_string(),
        }
    }

    fn regular_address() -> DeliveryAddress {
        DeliveryAddress {
            street: "12 MG Road".to_string(),
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            pincode: "682001".to_string(),
            landmark: String::new(),
            address_type: "regular".to_string(),
            university: None,
            location: None,
            department: None,
            building_number: None,
            room_number: None,
        }
    }

    fn university_address() -> DeliveryAddress {
        DeliveryAddress {
            street: "CUSAT - Main Gate".to_string(),
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            pincode: String::new(),
            landmark: String::new(),
            address_type: "university".to_string(),
            university: Some("cusat".to_string()),
            location: Some("Main Gate".to_string()),
            department: Some("CS".to_string()),
            building_number: Some("4".to_string()),
            room_number: None,
        }
    }

    #[test]
    fn university_order_gets_free_delivery_plus_platform_fee() {
        // cart [{price:100, qty:2}] → subtotal 200, fee 0, platform 2.5
        let pricing = compute_pricing(&[item(100.0, 2)], true);
        assert_eq!(pricing.subtotal, 200.0);
        assert_eq!(pricing.delivery_fee, 0.0);
        assert_eq!(pricing.platform_fee, 2.5);
        assert_eq!(pricing.taxes, 0.0);
        assert_eq!(pricing.total, 202.5);
    }

    #[test]
    fn regular_order_below_threshold_pays_delivery() {
        let pricing = compute_pricing(&[item(100.0, 2)], false);
        assert_eq!(pricing.delivery_fee, 50.0);
        assert_eq!(pricing.total, 252.5);
    }

    #[test]
    fn regular_order_above_threshold_ships_free() {
        let pricing = compute_pricing(&[item(179.0, 3)], false);
        assert_eq!(pricing.subtotal, 537.0);
        assert_eq!(pricing.delivery_fee, 0.0);
        assert_eq!(pricing.total, 539.5);
    }

    #[test]
    fn pricing_invariant_holds() {
        for (items, university) in [
            (vec![item(99.0, 1)], false),
            (vec![item(99.0, 1), item(179.0, 2)], false),
            (vec![item(250.0, 4)], true),
        ] {
            let p = compute_pricing(&items, university);
            assert_eq!(p.total, p.subtotal + p.delivery_fee + p.platform_fee + p.taxes);
        }
    }

    #[test]
    fn empty_cart_prices_to_platform_fee_only() {
        // The checkout path rejects empty carts before pricing; this pins
        // down the formula itself.
        let pricing = compute_pricing(&[], true);
        assert_eq!(pricing.subtotal, 0.0);
        assert_eq!(pricing.total, 2.5);
    }

    #[test]
    fn validates_regular_address_fields() {
        assert!(validate_delivery_address(&regular_address()).is_ok());

        let mut missing_city = regular_address();
        missing_city.city = String::new();
        let err = validate_delivery_address(&missing_city).unwrap_err();
        assert!(err.contains("city"));

        let mut bad_pincode = regular_address();
        bad_pincode.pincode = "68200".to_string();
        assert_eq!(
            validate_delivery_address(&bad_pincode).unwrap_err(),
            "Pincode must be 6 digits"
        );
    }

    #[test]
    fn validates_university_address_fields() {
        assert!(validate_delivery_address(&university_address()).is_ok());

        let mut no_building = university_address();
        no_building.building_number = None;
        assert_eq!(
            validate_delivery_address(&no_building).unwrap_err(),
            "Building number is required"
        );
    }

    fn pending_order(auth_uid: &str) -> Order {
        let now = Utc::now();
        Order {
            id: None,
            user_id: auth_uid.to_string(),
            auth_uid: auth_uid.to_string(),
            items: vec![item(100.0, 2)],
            delivery_address: regular_address(),
            contact_number: "+919876543210".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            special_instructions: String::new(),
            pricing: compute_pricing(&[item(100.0, 2)], false),
            status: OrderStatus::Pending,
            order_number: format!("ORD-{}", now.timestamp_millis()),
            created_at: Some(now),
            updated_at: Some(now),
            estimated_delivery_time: Some(now + Duration::minutes(30)),
        }
    }

    async fn test_db() -> crate::database::MongoDB {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/DabbaApp".to_string());
        crate::database::MongoDB::new(&uri).await.unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn status_overwrite_allows_pending_to_delivered() {
        let db = test_db().await;
        let events = OrderEvents::new();

        let inserted = db
            .collection::<Order>("orders")
            .insert_one(&pending_order("status-overwrite-test"))
            .await
            .unwrap();
        let order_id = inserted.inserted_id.as_object_id().unwrap().to_hex();

        // Plain overwrite, no transition guard: delivered straight from pending
        let updated = update_status(&db, &events, &order_id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);

        let fetched = get_order(&db, &order_id).await.unwrap();
        assert_eq!(fetched.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn checkout_with_empty_cart_is_rejected() {
        let db = test_db().await;
        let events = OrderEvents::new();

        let user_id = format!("empty-cart-test-{}", ObjectId::new().to_hex());
        cart_service::clear_cart(&db, &user_id).await.unwrap();

        let request = PlaceOrderRequest {
            delivery_address: university_address(),
            contact_number: "+919876543210".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            special_instructions: String::new(),
        };

        let err = place_order(&db, &events, &user_id, &request)
            .await
            .unwrap_err();
        assert_eq!(err, "Cart is empty");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn admin_listing_returns_newest_first() {
        let db = test_db().await;

        let marker = format!("listing-test-{}", ObjectId::new().to_hex());
        let collection = db.collection::<Order>("orders");
        for _ in 0..3 {
            collection.insert_one(&pending_order(&marker)).await.unwrap();
        }

        let orders = get_all_orders(&db, None).await.unwrap();
        assert!(orders.len() <= ADMIN_LIST_LIMIT as usize);
        assert!(orders
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn delivery_estimate_shrinks_with_progress() {
        assert_eq!(estimated_minutes_remaining(OrderStatus::Pending), Some(30));
        assert_eq!(estimated_minutes_remaining(OrderStatus::Confirmed), Some(27));
        assert_eq!(estimated_minutes_remaining(OrderStatus::Preparing), Some(21));
        assert_eq!(
            estimated_minutes_remaining(OrderStatus::OutForDelivery),
            Some(9)
        );
        assert_eq!(estimated_minutes_remaining(OrderStatus::Delivered), None);
        assert_eq!(estimated_minutes_remaining(OrderStatus::Cancelled), None);
    }
}
