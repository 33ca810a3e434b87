use crate::{
    database::MongoDB, middleware::auth::Claims, models::CreateTicketRequest,
    services::support_service,
};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/v1/support/tickets",
    tag = "Support",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket opened"),
        (status = 400, description = "Missing subject or message")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_ticket(
    db: web::Data<MongoDB>,
    user: web::ReqData<Claims>,
    request: web::Json<CreateTicketRequest>,
) -> HttpResponse {
    match support_service::create_ticket(&db, &user.sub, &request).await {
        Ok(ticket) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "ticket": ticket
        })),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e
        })),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/support/tickets",
    tag = "Support",
    responses(
        (status = 200, description = "Caller's tickets, newest first")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_tickets(db: web::Data<MongoDB>, user: web::ReqData<Claims>) -> HttpResponse {
    match support_service::get_user_tickets(&db, &user.sub).await {
        Ok(tickets) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": tickets.len(),
            "tickets": tickets
        })),
        Err(e) => {
            log::error!("❌ Failed to list tickets for {}: {}", user.sub, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}
