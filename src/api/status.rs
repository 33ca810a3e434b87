use crate::{
    database::MongoDB, middleware::auth::Claims, models::SetAppStatusRequest,
    services::status_service,
};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "Status",
    responses(
        (status = 200, description = "Whether the shop is taking orders")
    )
)]
pub async fn get_app_status(db: web::Data<MongoDB>) -> HttpResponse {
    let status = status_service::get_app_status(&db).await;
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": status
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/status",
    tag = "Status",
    request_body = SetAppStatusRequest,
    responses(
        (status = 200, description = "App status updated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_app_status(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<SetAppStatusRequest>,
) -> HttpResponse {
    match status_service::set_app_status(&db, &user.sub, &request).await {
        Ok(status) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "status": status
        })),
        Err(e) => {
            log::error!("❌ Failed to set app status: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}
