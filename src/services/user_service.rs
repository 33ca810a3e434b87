use crate::{
    database::MongoDB,
    models::{AddAddressRequest, SavedAddress, UpdateProfileRequest, User, UserInfo},
};
use chrono::Utc;
use mongodb::bson::doc;
use uuid::Uuid;

pub async fn get_profile(db: &MongoDB, user_id: &str) -> Result<UserInfo, String> {
    let user = db
        .collection::<User>("users")
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found".to_string())?;

    Ok(user.into())
}

pub async fn update_profile(
    db: &MongoDB,
    user_id: &str,
    request: &UpdateProfileRequest,
) -> Result<UserInfo, String> {
    let collection = db.collection::<User>("users");

    let mut set = doc! {
        "updated_at": mongodb::bson::to_bson(&Utc::now())
            .map_err(|e| format!("Serialization error: {}", e))?,
    };
    if let Some(name) = &request.name {
        set.insert("name", name);
    }
    if let Some(email) = &request.email {
        set.insert("email", email);
    }
    if let Some(settings) = &request.settings {
        set.insert(
            "settings",
            mongodb::bson::to_bson(settings).map_err(|e| format!("Serialization error: {}", e))?,
        );
    }

    let result = collection
        .update_one(doc! { "user_id": user_id }, doc! { "$set": set })
        .await
        .map_err(|e| format!("Failed to update profile: {}", e))?;

    if result.matched_count == 0 {
        return Err("User not found".to_string());
    }

    get_profile(db, user_id).await
}

pub async fn add_address(
    db: &MongoDB,
    user_id: &str,
    request: &AddAddressRequest,
) -> Result<SavedAddress, String> {
    let address = SavedAddress {
        id: Uuid::new_v4().to_string(),
        street: request.street.clone(),
        city: request.city.clone(),
        state: request.state.clone(),
        pincode: request.pincode.clone(),
        landmark: request.landmark.clone(),
        label: request.label.clone(),
        created_at: Some(Utc::now()),
    };

    let address_bson =
        mongodb::bson::to_bson(&address).map_err(|e| format!("Serialization error: {}", e))?;
    let now = mongodb::bson::to_bson(&Utc::now())
        .map_err(|e| format!("Serialization error: {}", e))?;

    let result = db
        .collection::<User>("users")
        .update_one(
            doc! { "user_id": user_id },
            doc! {
                "$push": { "addresses": address_bson },
                "$set": { "updated_at": now },
            },
        )
        .await
        .map_err(|e| format!("Failed to add address: {}", e))?;

    if result.matched_count == 0 {
        return Err("User not found".to_string());
    }

    log::info!("🏠 Address added for user {}", user_id);

    Ok(address)
}
