use async_trait::async_trait;

/// Delivery channel for OTP codes. The provider is picked once at startup
/// from `OTP_PROVIDER`; handlers only see the trait object.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_code(&self, phone_number: &str, code: &str) -> Result<(), String>;
}

/// Dev-mode sender: the code goes to the log instead of a phone.
pub struct ConsoleSender;

#[async_trait]
impl SmsSender for ConsoleSender {
    async fn send_code(&self, phone_number: &str, code: &str) -> Result<(), String> {
        log::info!("📟 [dev] OTP for {}: {}", phone_number, code);
        Ok(())
    }
}

/// Production sender: POSTs to an SMS gateway endpoint.
pub struct GatewaySender {
    client: reqwest::Client,
    gateway_url: String,
    api_key: Option<String>,
}

impl GatewaySender {
    pub fn new(gateway_url: String, api_key: Option<String>) -> Self {
        GatewaySender {
            client: reqwest::Client::new(),
            gateway_url,
            api_key,
        }
    }
}

#[async_trait]
impl SmsSender for GatewaySender {
    async fn send_code(&self, phone_number: &str, code: &str) -> Result<(), String> {
        let body = serde_json::json!({
            "to": phone_number,
            "message": format!("{} is your Dabba App verification code. Valid for 5 minutes.", code),
        });

        let mut request = self.client.post(&self.gateway_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("SMS gateway request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "SMS gateway returned status {}",
                response.status()
            ));
        }

        Ok(())
    }
}

/// Build the sender from env. Defaults to console delivery so local setups
/// work without a gateway account.
pub fn sender_from_env() -> Box<dyn SmsSender> {
    let provider = std::env::var("OTP_PROVIDER").unwrap_or_else(|_| "console".to_string());

    match provider.as_str() {
        "gateway" => {
            let url = std::env::var("SMS_GATEWAY_URL").unwrap_or_default();
            if url.is_empty() {
                log::warn!("⚠️  OTP_PROVIDER=gateway but SMS_GATEWAY_URL is unset — falling back to console sender");
                return Box::new(ConsoleSender);
            }
            let api_key = std::env::var("SMS_GATEWAY_API_KEY").ok();
            log::info!("📡 OTP delivery via SMS gateway: {}", url);
            Box::new(GatewaySender::new(url, api_key))
        }
        _ => {
            log::info!("📟 OTP delivery via console (dev mode)");
            Box::new(ConsoleSender)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_sender_always_succeeds() {
        let sender = ConsoleSender;
        assert!(sender.send_code("+919876543210", "123456").await.is_ok());
    }
}
