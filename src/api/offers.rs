use crate::{
    database::MongoDB, middleware::auth::Claims, models::CreateOfferRequest,
    services::offer_service,
};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/v1/offers",
    tag = "Offers",
    responses(
        (status = 200, description = "Active offers")
    )
)]
pub async fn list_offers(db: web::Data<MongoDB>) -> HttpResponse {
    match offer_service::list_offers(&db).await {
        Ok(offers) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": offers.len(),
            "offers": offers
        })),
        Err(e) => {
            log::error!("❌ Failed to list offers: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/offers",
    tag = "Offers",
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created"),
        (status = 400, description = "Invalid offer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_offer(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<CreateOfferRequest>,
) -> HttpResponse {
    log::info!("🏷️ POST /offers by {}", user.sub);

    match offer_service::create_offer(&db, &request).await {
        Ok(offer) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "offer": offer
        })),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}
