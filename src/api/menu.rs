use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    models::{CreateMenuItemRequest, MenuQuery},
    services::menu_service,
};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/v1/menu",
    tag = "Menu",
    params(crate::models::MenuQuery),
    responses(
        (status = 200, description = "Menu items")
    )
)]
pub async fn list_menu(db: web::Data<MongoDB>, query: web::Query<MenuQuery>) -> HttpResponse {
    match menu_service::list_menu(&db, &query).await {
        Ok(items) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": items.len(),
            "items": items
        })),
        Err(e) => {
            log::error!("❌ Failed to list menu: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/menu/popular",
    tag = "Menu",
    responses(
        (status = 200, description = "Popular items")
    )
)]
pub async fn popular_items(db: web::Data<MongoDB>) -> HttpResponse {
    match menu_service::popular_items(&db).await {
        Ok(items) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": items.len(),
            "items": items
        })),
        Err(e) => {
            log::error!("❌ Failed to load popular items: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

pub async fn get_menu_item(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let item_id = path.into_inner();

    match menu_service::get_menu_item(&db, &item_id).await {
        Ok(item) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "item": item
        })),
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/menu",
    tag = "Menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created"),
        (status = 400, description = "Invalid item")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_menu_item(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<CreateMenuItemRequest>,
) -> HttpResponse {
    log::info!("🍽️  POST /menu by {}", user.sub);

    match menu_service::create_menu_item(&db, &request).await {
        Ok(item) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "item": item
        })),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}
