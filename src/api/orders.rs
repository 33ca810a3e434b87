use crate::{
    api::metrics,
    database::MongoDB,
    middleware::auth::Claims,
    models::{Order, OrderStatus, PlaceOrderRequest, UpdateOrderStatusRequest},
    services::{order_events::OrderEvents, order_service},
};
use actix_web::{web, HttpResponse};
use futures::{stream, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

fn is_admin(user: &Claims) -> bool {
    user.roles.iter().any(|r| r == "admin")
}

fn sse_frame(event: &str, data: &serde_json::Value) -> web::Bytes {
    web::Bytes::from(format!("event: {}\ndata: {}\n\n", event, data))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed"),
        (status = 400, description = "Empty cart, invalid address or unavailable item")
    ),
    security(("bearer_auth" = []))
)]
pub async fn place_order(
    db: web::Data<MongoDB>,
    events: web::Data<OrderEvents>,
    user: web::ReqData<Claims>,
    request: web::Json<PlaceOrderRequest>,
) -> HttpResponse {
    log::info!("🧾 POST /orders by {}", user.sub);

    match order_service::place_order(&db, &events, &user.sub, &request).await {
        Ok(response) => {
            metrics::increment_orders_placed();
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Checkout failed for {}: {}", user.sub, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Caller's orders, newest first")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_orders(db: web::Data<MongoDB>, user: web::ReqData<Claims>) -> HttpResponse {
    match order_service::get_user_orders(&db, &user.sub).await {
        Ok(orders) => {
            let orders: Vec<serde_json::Value> =
                orders.iter().map(Order::to_public_json).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": orders.len(),
                "orders": orders
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to list orders for {}: {}", user.sub, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    responses(
        (status = 200, description = "Order detail"),
        (status = 404, description = "Not found or not the caller's order")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let order_id = path.into_inner();

    match order_service::get_order(&db, &order_id).await {
        Ok(order) => {
            if order.auth_uid != user.sub && !is_admin(&user) {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "success": false,
                    "error": "Order not found"
                }));
            }

            let mut body = order.to_public_json();
            if let Some(map) = body.as_object_mut() {
                map.insert(
                    "estimated_minutes_remaining".to_string(),
                    serde_json::json!(order_service::estimated_minutes_remaining(order.status)),
                );
            }

            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "order": body
            }))
        }
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    tag = "Orders",
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 400, description = "Order past the cancellable stage"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_order(
    db: web::Data<MongoDB>,
    events: web::Data<OrderEvents>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let order_id = path.into_inner();

    match order_service::cancel_order(&db, &events, &order_id, &user.sub).await {
        Ok(order) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "order": order.to_public_json()
        })),
        Err(e) if e == "Order not found" => {
            HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}/status",
    tag = "Orders",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    db: web::Data<MongoDB>,
    events: web::Data<OrderEvents>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> HttpResponse {
    let order_id = path.into_inner();
    log::info!("📦 PATCH /orders/{}/status by {}", order_id, user.sub);

    match order_service::update_status(&db, &events, &order_id, request.status).await {
        Ok(order) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "order": order.to_public_json()
        })),
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AdminOrdersQuery {
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/all",
    tag = "Orders",
    params(AdminOrdersQuery),
    responses(
        (status = 200, description = "All orders, newest first, capped at 50"),
        (status = 400, description = "Unknown status value")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_all_orders(
    db: web::Data<MongoDB>,
    query: web::Query<AdminOrdersQuery>,
) -> HttpResponse {
    let status = match &query.status {
        Some(raw) => match OrderStatus::parse(raw) {
            Some(s) => Some(s),
            None => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "success": false,
                    "error": format!("Unknown order status: {}", raw)
                }));
            }
        },
        None => None,
    };

    match order_service::get_all_orders(&db, status).await {
        Ok(orders) => {
            let orders: Vec<serde_json::Value> =
                orders.iter().map(Order::to_public_json).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": orders.len(),
                "orders": orders
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to list all orders: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

/// Live tracking for one order. Sends the current document first, then an
/// update frame on every status change until the client disconnects.
pub async fn order_event_stream(
    db: web::Data<MongoDB>,
    events: web::Data<OrderEvents>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let order_id = path.into_inner();

    // Subscribe before reading the snapshot so nothing slips between the two
    let rx = events.subscribe();

    let order = match order_service::get_order(&db, &order_id).await {
        Ok(order) => order,
        Err(e) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": e
            }));
        }
    };

    if order.auth_uid != user.sub && !is_admin(&user) {
        return HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Order not found"
        }));
    }

    let snapshot = sse_frame("snapshot", &order.to_public_json());

    // Stream closes after a terminal status — there is nothing left to track
    let done = order.status.is_terminal();
    let updates = stream::unfold((rx, order_id, done), |(mut rx, order_id, done)| async move {
        if done {
            return None;
        }
        loop {
            match rx.recv().await {
                Ok(event) if event.order_id == order_id => {
                    let finished = event.status.is_terminal();
                    let frame = sse_frame("update", &event.order);
                    return Some((frame, (rx, order_id, finished)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("⚠️ Order stream lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let body = stream::once(async move { snapshot })
        .chain(updates)
        .map(Ok::<web::Bytes, actix_web::Error>);

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("cache-control", "no-cache"))
        .streaming(body)
}

/// Live tracking for everything the caller has ordered. Snapshot of the
/// order history first, then every update to one of their orders.
pub async fn user_orders_event_stream(
    db: web::Data<MongoDB>,
    events: web::Data<OrderEvents>,
    user: web::ReqData<Claims>,
) -> HttpResponse {
    let rx = events.subscribe();

    let orders = match order_service::get_user_orders(&db, &user.sub).await {
        Ok(orders) => orders,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }));
        }
    };

    let snapshot_body =
        serde_json::Value::Array(orders.iter().map(Order::to_public_json).collect());
    let snapshot = sse_frame("snapshot", &snapshot_body);

    let user_id = user.sub.clone();
    let updates = stream::unfold((rx, user_id), |(mut rx, user_id)| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.auth_uid == user_id => {
                    let frame = sse_frame("update", &event.order);
                    return Some((frame, (rx, user_id)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("⚠️ Orders stream lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let body = stream::once(async move { snapshot })
        .chain(updates)
        .map(Ok::<web::Bytes, actix_web::Error>);

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("cache-control", "no-cache"))
        .streaming(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_frames_are_newline_delimited() {
        let frame = sse_frame("update", &serde_json::json!({"status": "confirmed"}));
        let text = String::from_utf8(frame.to_vec()).unwrap();
        assert!(text.starts_with("event: update\ndata: "));
        assert!(text.ends_with("\n\n"));
    }
}
