use crate::{
    database::MongoDB,
    models::{User, UserInfo},
    services::sms_service::SmsSender,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

const OTP_TTL_MINUTES: i64 = 5;
const OTP_MAX_ATTEMPTS: i32 = 5;
const OTP_RESEND_COOLDOWN_SECONDS: i64 = 30;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub phone_number: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

/// One pending code per phone number, replaced on resend. The hash is
/// bcrypt — the plain code only ever leaves through the SMS sender.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OtpCode {
    pub phone_number: String,
    pub code_hash: String,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RequestOtpRequest {
    pub phone_number: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RequestOtpResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: UserInfo,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "dabba-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "dabba-app".to_string())
}

/// Normalize a phone number to E.164. Numbers without a country code get
/// the +91 default the app ships with.
pub fn normalize_phone_number(raw: &str) -> Result<String, String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 10 || digits.len() > 15 {
        return Err("Please enter a valid phone number".to_string());
    }

    if raw.trim_start().starts_with('+') {
        Ok(format!("+{}", digits))
    } else if digits.len() == 12 && digits.starts_with("91") {
        Ok(format!("+{}", digits))
    } else {
        Ok(format!("+91{}", digits))
    }
}

/// Six-digit numeric code.
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

// Generate JWT token
pub fn generate_jwt(user: &User) -> Result<String, String> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user.user_id.clone(),
        phone_number: user.phone_number.clone(),
        name: if user.name.is_empty() {
            None
        } else {
            Some(user.name.clone())
        },
        roles: user.roles.clone(),
        is_active: user.is_active,
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

// Generate refresh token (longer expiry)
pub fn generate_refresh_token(user_id: &str, phone_number: &str) -> Result<String, String> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::days(30)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user_id.to_string(),
        phone_number: phone_number.to_string(),
        name: None,
        roles: vec![],
        is_active: true,
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| format!("Failed to generate refresh token: {}", e))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Generate a code for the number, store its hash and hand the plain code
/// to the configured SMS sender.
pub async fn request_otp(
    db: &MongoDB,
    sender: &dyn SmsSender,
    request: &RequestOtpRequest,
) -> Result<RequestOtpResponse, String> {
    let phone = normalize_phone_number(&request.phone_number)?;
    let collection = db.collection::<OtpCode>("otp_codes");

    // Resend cooldown — one code per number per 30s window
    if let Some(existing) = collection
        .find_one(doc! { "phone_number": &phone })
        .await
        .map_err(|e| format!("Database error: {}", e))?
    {
        let age = Utc::now() - existing.created_at;
        if age < Duration::seconds(OTP_RESEND_COOLDOWN_SECONDS) && existing.expires_at > Utc::now()
        {
            return Err("Too many attempts. Please try again later".to_string());
        }
    }

    let code = generate_otp_code();
    let code_hash =
        hash(&code, DEFAULT_COST).map_err(|e| format!("Failed to hash OTP: {}", e))?;

    let otp = OtpCode {
        phone_number: phone.clone(),
        code_hash,
        attempts: 0,
        created_at: Utc::now(),
        expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
    };

    collection
        .replace_one(doc! { "phone_number": &phone }, &otp)
        .upsert(true)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    sender
        .send_code(&phone, &code)
        .await
        .map_err(|e| {
            log::error!("❌ OTP delivery failed for {}: {}", phone, e);
            "Failed to send OTP".to_string()
        })?;

    log::info!("📲 OTP sent to {}", phone);

    Ok(RequestOtpResponse {
        success: true,
        message: "OTP sent successfully".to_string(),
    })
}

/// Verify the code and open a session. A wrong code increments the attempt
/// counter and creates no session; first successful verification creates
/// the user profile.
pub async fn verify_otp(
    db: &MongoDB,
    request: &VerifyOtpRequest,
) -> Result<AuthResponse, String> {
    let phone = normalize_phone_number(&request.phone_number)?;
    let collection = db.collection::<OtpCode>("otp_codes");

    let otp = collection
        .find_one(doc! { "phone_number": &phone })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "No OTP requested for this number".to_string())?;

    if otp.expires_at < Utc::now() {
        let _ = collection.delete_one(doc! { "phone_number": &phone }).await;
        return Err("OTP has expired. Please request a new one".to_string());
    }

    if otp.attempts >= OTP_MAX_ATTEMPTS {
        return Err("Too many attempts. Please try again later".to_string());
    }

    let valid = verify(&request.code, &otp.code_hash)
        .map_err(|e| format!("OTP verification error: {}", e))?;

    if !valid {
        collection
            .update_one(
                doc! { "phone_number": &phone },
                doc! { "$inc": { "attempts": 1 } },
            )
            .await
            .map_err(|e| format!("Database error: {}", e))?;
        return Err("Invalid OTP. Please check and try again".to_string());
    }

    // Code is single-use
    let _ = collection.delete_one(doc! { "phone_number": &phone }).await;

    let user = find_or_create_user(db, &phone).await?;

    if !user.is_active {
        return Err("Account is inactive".to_string());
    }

    let token = generate_jwt(&user)?;
    let refresh_token = generate_refresh_token(&user.user_id, &user.phone_number)?;

    log::info!("✅ Login successful for {}", phone);

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token: Some(refresh_token),
        user: user.into(),
    })
}

async fn find_or_create_user(db: &MongoDB, phone: &str) -> Result<User, String> {
    let collection = db.collection::<User>("users");

    if let Some(user) = collection
        .find_one(doc! { "phone_number": phone })
        .await
        .map_err(|e| format!("Database error: {}", e))?
    {
        let now = mongodb::bson::to_bson(&Utc::now())
            .map_err(|e| format!("Serialization error: {}", e))?;
        collection
            .update_one(
                doc! { "user_id": &user.user_id },
                doc! { "$set": { "last_login": &now, "updated_at": &now } },
            )
            .await
            .map_err(|e| format!("Failed to update user: {}", e))?;
        return Ok(user);
    }

    let new_user_id = ObjectId::new().to_hex();
    let new_user = User {
        _id: None,
        user_id: new_user_id.clone(),
        phone_number: phone.to_string(),
        name: String::new(),
        email: String::new(),
        addresses: vec![],
        settings: Default::default(),
        roles: vec!["user".to_string()],
        is_active: true,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
        last_login: Some(Utc::now()),
    };

    collection
        .insert_one(&new_user)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

    log::info!("✅ Created new user {} for {}", new_user_id, phone);

    Ok(new_user)
}

// Refresh token
pub async fn refresh_token(
    db: &MongoDB,
    request: &RefreshTokenRequest,
) -> Result<AuthResponse, String> {
    let claims = verify_token(&request.refresh_token)?;

    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": &claims.sub })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found".to_string())?;

    if !user.is_active {
        return Err("Account is inactive".to_string());
    }

    let token = generate_jwt(&user)?;
    let new_refresh_token = generate_refresh_token(&user.user_id, &user.phone_number)?;

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token: Some(new_refresh_token),
        user: user.into(),
    })
}

// Get current user
pub async fn get_current_user(db: &MongoDB, user_id: &str) -> Result<UserInfo, String> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found".to_string())?;

    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            _id: None,
            user_id: "u-1".to_string(),
            phone_number: "+919876543210".to_string(),
            name: "Asha".to_string(),
            email: String::new(),
            addresses: vec![],
            settings: Default::default(),
            roles: vec!["user".to_string()],
            is_active: true,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            last_login: None,
        }
    }

    #[test]
    fn normalizes_bare_ten_digit_numbers_to_plus_91() {
        assert_eq!(
            normalize_phone_number("98765 43210").unwrap(),
            "+919876543210"
        );
        assert_eq!(
            normalize_phone_number("919876543210").unwrap(),
            "+919876543210"
        );
        assert_eq!(
            normalize_phone_number("+1 415 555 0132").unwrap(),
            "+14155550132"
        );
    }

    #[test]
    fn rejects_short_numbers() {
        assert!(normalize_phone_number("12345").is_err());
        assert!(normalize_phone_number("").is_err());
    }

    #[test]
    fn otp_codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn jwt_roundtrip_carries_user_claims() {
        let user = sample_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.phone_number, "+919876543210");
        assert_eq!(claims.roles, vec!["user".to_string()]);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let user = sample_user();
        let mut token = generate_jwt(&user).unwrap();
        token.push('x');
        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn wrong_otp_fails_bcrypt_check() {
        let code = generate_otp_code();
        let hashed = hash(&code, DEFAULT_COST).unwrap();
        assert!(verify(&code, &hashed).unwrap());
        assert!(!verify("000000", &hashed).unwrap() || code == "000000");
    }
}
