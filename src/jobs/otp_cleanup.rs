use crate::{database::MongoDB, services::auth_service::OtpCode};
use chrono::Utc;
use mongodb::bson::doc;
use tokio::time::{interval, Duration};

const CLEANUP_INTERVAL_SECONDS: u64 = 3600;

/// Start the expired-OTP sweeper. Verification already rejects expired codes;
/// this keeps the collection from growing unbounded.
pub async fn start_otp_cleanup(db: MongoDB) {
    log::info!("🧹 Starting OTP cleanup job (runs every hour)");

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(CLEANUP_INTERVAL_SECONDS));

        loop {
            interval.tick().await;

            match sweep_expired(&db).await {
                Ok(0) => log::debug!("🧹 OTP cleanup: nothing to remove"),
                Ok(removed) => log::info!("🧹 OTP cleanup: removed {} expired codes", removed),
                Err(e) => log::error!("❌ OTP cleanup failed: {}", e),
            }
        }
    });
}

async fn sweep_expired(db: &MongoDB) -> Result<u64, String> {
    // expires_at is stored as an RFC 3339 string, which compares in
    // chronological order
    let now = mongodb::bson::to_bson(&Utc::now())
        .map_err(|e| format!("Serialization error: {}", e))?;

    let result = db
        .collection::<OtpCode>("otp_codes")
        .delete_many(doc! { "expires_at": { "$lt": now } })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(result.deleted_count)
}
