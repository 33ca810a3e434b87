use crate::{
    database::MongoDB,
    models::{AppStatus, SetAppStatusRequest},
};
use chrono::Utc;
use mongodb::bson::doc;

const STATUS_DOC_ID: &str = "app_status";

/// Storefront open/closed flag. Missing document or a read error both
/// resolve to open — never block customers on a flag lookup.
pub async fn get_app_status(db: &MongoDB) -> AppStatus {
    let collection = db.collection::<AppStatus>("settings");

    match collection.find_one(doc! { "_id": STATUS_DOC_ID }).await {
        Ok(Some(status)) => status,
        Ok(None) => AppStatus::default(),
        Err(e) => {
            log::error!("❌ Failed to read app status: {}", e);
            AppStatus::default()
        }
    }
}

pub async fn set_app_status(
    db: &MongoDB,
    updated_by: &str,
    request: &SetAppStatusRequest,
) -> Result<AppStatus, String> {
    let status = AppStatus {
        is_open: request.is_open,
        message: request.message.clone(),
        updated_by: Some(updated_by.to_string()),
        updated_at: Some(Utc::now()),
    };

    db.collection::<AppStatus>("settings")
        .replace_one(doc! { "_id": STATUS_DOC_ID }, &status)
        .upsert(true)
        .await
        .map_err(|e| format!("Failed to update app status: {}", e))?;

    log::info!(
        "🏪 App status set to {} by {}",
        if status.is_open { "open" } else { "closed" },
        updated_by
    );

    Ok(status)
}
