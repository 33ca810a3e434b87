use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    services::auth_service::{
        self, AuthResponse, RequestOtpRequest, RequestOtpResponse, VerifyOtpRequest,
    },
    services::sms_service::SmsSender,
};
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/v1/auth/request-otp",
    tag = "Auth",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = RequestOtpResponse),
        (status = 400, description = "Invalid phone number or rate limited")
    )
)]
pub async fn request_otp(
    db: web::Data<MongoDB>,
    sms: web::Data<dyn SmsSender>,
    request: web::Json<RequestOtpRequest>,
) -> HttpResponse {
    log::info!("📲 POST /auth/request-otp");

    match auth_service::request_otp(&db, sms.as_ref(), &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ OTP request failed: {}", e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    tag = "Auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Wrong or expired code")
    )
)]
pub async fn verify_otp(
    db: web::Data<MongoDB>,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/verify-otp");

    match auth_service::verify_otp(&db, &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ OTP verification failed: {}", e);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

pub async fn refresh_token(
    db: web::Data<MongoDB>,
    request: web::Json<auth_service::RefreshTokenRequest>,
) -> HttpResponse {
    log::info!("🔄 POST /auth/refresh");

    match auth_service::refresh_token(&db, &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Token refresh failed: {}", e);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_token(req: HttpRequest) -> HttpResponse {
    let auth_header = req.headers().get("Authorization");

    if let Some(auth_value) = auth_header {
        if let Ok(auth_str) = auth_value.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                match auth_service::verify_token(token) {
                    Ok(claims) => {
                        return HttpResponse::Ok().json(serde_json::json!({
                            "valid": true,
                            "user_id": claims.sub,
                            "phone_number": claims.phone_number,
                        }));
                    }
                    Err(e) => {
                        log::debug!("Token verification failed: {}", e);
                    }
                }
            }
        }
    }

    HttpResponse::Unauthorized().json(serde_json::json!({
        "valid": false
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user profile"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    match auth_service::get_current_user(&db, &user.sub).await {
        Ok(info) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": info
        })),
        Err(e) => {
            log::warn!("❌ get_me failed for {}: {}", user.sub, e);
            HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}
