use crate::models::Order;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Email the admin about a fresh order. Called from a spawned task after
/// checkout; any failure is logged by the caller and never fails the order.
pub async fn notify_admin_new_order(order: &Order) -> Result<(), String> {
    let admin_email = match std::env::var("ADMIN_EMAIL") {
        Ok(v) if !v.is_empty() => v,
        _ => {
            log::warn!("⚠️  ADMIN_EMAIL not configured — skipping order notification");
            return Ok(());
        }
    };

    let smtp_username = std::env::var("SMTP_USERNAME").unwrap_or_default();
    let smtp_password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
    if smtp_username.is_empty() || smtp_password.is_empty() {
        log::warn!("⚠️  SMTP credentials missing — skipping order notification");
        return Ok(());
    }

    let smtp_host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
    let smtp_port: u16 = std::env::var("SMTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(587);

    let order_id = order.id_hex();
    let short_id = &order_id[..order_id.len().min(6)];

    let message = Message::builder()
        .from(
            format!("Dabba App <{}>", smtp_username)
                .parse()
                .map_err(|e| format!("Invalid from address: {}", e))?,
        )
        .to(admin_email
            .parse()
            .map_err(|e| format!("Invalid admin address: {}", e))?)
        .subject(format!("🍽️ New Order Received! - #{}", short_id))
        .header(ContentType::TEXT_PLAIN)
        .body(render_order_summary(order))
        .map_err(|e| format!("Failed to build email: {}", e))?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
        .map_err(|e| format!("SMTP relay error: {}", e))?
        .port(smtp_port)
        .credentials(Credentials::new(smtp_username, smtp_password))
        .build();

    mailer
        .send(message)
        .await
        .map_err(|e| format!("Failed to send email: {}", e))?;

    log::info!("📧 Admin notified of order {}", order.order_number);

    Ok(())
}

fn render_order_summary(order: &Order) -> String {
    let mut body = String::new();
    body.push_str(&format!("New order: {}\n", order.order_number));
    body.push_str(&format!("Customer: {}\n", order.contact_number));
    body.push_str(&format!(
        "Payment: {}\n\n",
        order.payment_method.as_str()
    ));

    body.push_str("Items:\n");
    for item in &order.items {
        body.push_str(&format!(
            "  {} x{} — ₹{:.2}\n",
            item.name,
            item.quantity,
            item.price * f64::from(item.quantity)
        ));
    }

    body.push_str(&format!(
        "\nSubtotal: ₹{:.2}\nDelivery fee: ₹{:.2}\nPlatform fee: ₹{:.2}\nTotal: ₹{:.2}\n\n",
        order.pricing.subtotal,
        order.pricing.delivery_fee,
        order.pricing.platform_fee,
        order.pricing.total
    ));

    let addr = &order.delivery_address;
    if addr.is_university() {
        body.push_str(&format!(
            "Deliver to (campus): {}, {}\n",
            addr.university.as_deref().unwrap_or(""),
            addr.location.as_deref().unwrap_or("")
        ));
        body.push_str(&format!(
            "Department: {}, Building: {}",
            addr.department.as_deref().unwrap_or(""),
            addr.building_number.as_deref().unwrap_or("")
        ));
        if let Some(room) = addr.room_number.as_deref().filter(|r| !r.is_empty()) {
            body.push_str(&format!(", Room: {}", room));
        }
        body.push('\n');
    } else {
        body.push_str(&format!(
            "Deliver to: {}, {}, {} - {}\n",
            addr.street, addr.city, addr.state, addr.pincode
        ));
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DeliveryAddress, OrderItem, OrderStatus, PaymentMethod, Pricing,
    };

    fn sample_order() -> Order {
        Order {
            id: None,
            user_id: "u-1".to_string(),
            auth_uid: "u-1".to_string(),
            items: vec![OrderItem {
                menu_item_id: "m1".to_string(),
                name: "Chicken Biriyani".to_string(),
                price: 99.0,
                quantity: 2,
                image: String::new(),
                category: "biriyani".to_string(),
            }],
            delivery_address: DeliveryAddress {
                street: "12 MG Road".to_string(),
                city: "Kochi".to_string(),
                state: "Kerala".to_string(),
                pincode: "682001".to_string(),
                landmark: String::new(),
                address_type: "regular".to_string(),
                university: None,
                location: None,
                department: None,
                building_number: None,
                room_number: None,
            },
            contact_number: "+919876543210".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            special_instructions: String::new(),
            pricing: Pricing {
                subtotal: 198.0,
                delivery_fee: 50.0,
                platform_fee: 2.5,
                taxes: 0.0,
                total: 250.5,
            },
            status: OrderStatus::Pending,
            order_number: "ORD-1".to_string(),
            created_at: None,
            updated_at: None,
            estimated_delivery_time: None,
        }
    }

    #[test]
    fn summary_lists_items_and_total() {
        let body = render_order_summary(&sample_order());
        assert!(body.contains("Chicken Biriyani x2"));
        assert!(body.contains("Total: ₹250.50"));
        assert!(body.contains("682001"));
    }

    #[test]
    fn campus_summary_lists_campus_fields() {
        let mut order = sample_order();
        order.delivery_address = DeliveryAddress {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            landmark: String::new(),
            address_type: "university".to_string(),
            university: Some("cusat".to_string()),
            location: Some("Main Gate".to_string()),
            department: Some("CS".to_string()),
            building_number: Some("4".to_string()),
            room_number: Some("12".to_string()),
        };

        let body = render_order_summary(&order);
        assert!(body.contains("Deliver to (campus): cusat, Main Gate"));
        assert!(body.contains("Department: CS, Building: 4, Room: 12"));
    }

    #[tokio::test]
    async fn skips_silently_without_configuration() {
        // No ADMIN_EMAIL/SMTP env in tests — must be a no-op, not an error
        let result = notify_admin_new_order(&sample_order()).await;
        assert!(result.is_ok());
    }
}
