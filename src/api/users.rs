use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    models::{AddAddressRequest, UpdateProfileRequest},
    services::user_service,
};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Caller's profile"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(db: web::Data<MongoDB>, user: web::ReqData<Claims>) -> HttpResponse {
    match user_service::get_profile(&db, &user.sub).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": profile
        })),
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    match user_service::update_profile(&db, &user.sub, &request).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": profile
        })),
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/me/addresses",
    tag = "Users",
    request_body = AddAddressRequest,
    responses(
        (status = 201, description = "Address saved"),
        (status = 400, description = "Invalid address")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_address(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<AddAddressRequest>,
) -> HttpResponse {
    match user_service::add_address(&db, &user.sub, &request).await {
        Ok(address) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "address": address
        })),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}
