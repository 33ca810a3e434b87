use crate::{
    database::MongoDB,
    models::{CreateOfferRequest, Offer},
};
use futures::TryStreamExt;
use mongodb::bson::doc;

pub async fn list_offers(db: &MongoDB) -> Result<Vec<Offer>, String> {
    let offers: Vec<Offer> = db
        .collection::<Offer>("offers")
        .find(doc! { "active": true })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .try_collect()
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(offers)
}

pub async fn create_offer(db: &MongoDB, request: &CreateOfferRequest) -> Result<Offer, String> {
    if request.code.trim().is_empty() {
        return Err("Offer code is required".to_string());
    }

    let mut offer = Offer {
        id: None,
        title: request.title.clone(),
        description: request.description.clone(),
        code: request.code.to_uppercase(),
        terms: request.terms.clone(),
        active: request.active,
    };

    let result = db
        .collection::<Offer>("offers")
        .insert_one(&offer)
        .await
        .map_err(|e| format!("Failed to create offer: {}", e))?;

    offer.id = result.inserted_id.as_object_id();

    log::info!("🎟️  Offer created: {}", offer.code);

    Ok(offer)
}
