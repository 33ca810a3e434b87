use crate::{
    database::MongoDB,
    models::{CreateTicketRequest, SupportTicket},
};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;

pub async fn create_ticket(
    db: &MongoDB,
    user_id: &str,
    request: &CreateTicketRequest,
) -> Result<SupportTicket, String> {
    if request.subject.trim().is_empty() || request.message.trim().is_empty() {
        return Err("Subject and message are required".to_string());
    }

    let mut ticket = SupportTicket {
        id: None,
        user_id: user_id.to_string(),
        subject: request.subject.clone(),
        message: request.message.clone(),
        status: "open".to_string(),
        source: "web".to_string(),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    };

    let result = db
        .collection::<SupportTicket>("support_tickets")
        .insert_one(&ticket)
        .await
        .map_err(|e| format!("Failed to create support ticket: {}", e))?;

    ticket.id = result.inserted_id.as_object_id();

    log::info!("🎫 Support ticket opened by {}", user_id);

    Ok(ticket)
}

pub async fn get_user_tickets(db: &MongoDB, user_id: &str) -> Result<Vec<SupportTicket>, String> {
    let mut tickets: Vec<SupportTicket> = db
        .collection::<SupportTicket>("support_tickets")
        .find(doc! { "user_id": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .try_collect()
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tickets)
}
