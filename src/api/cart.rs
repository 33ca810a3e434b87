use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    models::{AddCartItemRequest, CartResponse, UpdateCartItemRequest},
    services::cart_service,
};
use actix_web::{web, HttpResponse};

fn cart_error(e: String) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": e
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Current cart", body = CartResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_cart(db: web::Data<MongoDB>, user: web::ReqData<Claims>) -> HttpResponse {
    match cart_service::get_cart(&db, &user.sub).await {
        Ok(cart) => HttpResponse::Ok().json(CartResponse {
            success: true,
            items: cart.items,
        }),
        Err(e) => {
            log::error!("❌ Failed to load cart for {}: {}", user.sub, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    tag = "Cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_item(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<AddCartItemRequest>,
) -> HttpResponse {
    match cart_service::add_item(&db, &user.sub, &request.menu_item_id, request.quantity).await {
        Ok(cart) => HttpResponse::Ok().json(CartResponse {
            success: true,
            items: cart.items,
        }),
        Err(e) => cart_error(e),
    }
}

pub async fn update_item_quantity(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    request: web::Json<UpdateCartItemRequest>,
) -> HttpResponse {
    let menu_item_id = path.into_inner();

    match cart_service::update_item_quantity(&db, &user.sub, &menu_item_id, request.quantity).await
    {
        Ok(cart) => HttpResponse::Ok().json(CartResponse {
            success: true,
            items: cart.items,
        }),
        Err(e) => cart_error(e),
    }
}

pub async fn remove_item(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let menu_item_id = path.into_inner();

    match cart_service::remove_item(&db, &user.sub, &menu_item_id).await {
        Ok(cart) => HttpResponse::Ok().json(CartResponse {
            success: true,
            items: cart.items,
        }),
        Err(e) => cart_error(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart cleared")
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_cart(db: web::Data<MongoDB>, user: web::ReqData<Claims>) -> HttpResponse {
    match cart_service::clear_cart(&db, &user.sub).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Cart cleared"
        })),
        Err(e) => cart_error(e),
    }
}
