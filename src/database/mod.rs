use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool sized for a single-vendor storefront
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("DabbaApp");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the hot query paths rely on. Order listings filter
    /// by user_id/auth_uid/status; carts and users are point lookups; OTP
    /// codes are looked up per phone and swept by expiry.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let index_specs: Vec<(&str, mongodb::bson::Document)> = vec![
            ("orders", doc! { "user_id": 1 }),
            ("orders", doc! { "auth_uid": 1 }),
            ("orders", doc! { "status": 1 }),
            ("orders", doc! { "created_at": -1 }),
            ("carts", doc! { "user_id": 1 }),
            ("users", doc! { "user_id": 1 }),
            ("users", doc! { "phone_number": 1 }),
            ("menu_items", doc! { "category": 1 }),
            ("otp_codes", doc! { "phone_number": 1 }),
            ("otp_codes", doc! { "expires_at": 1 }),
            ("support_tickets", doc! { "user_id": 1 }),
        ];

        for (collection_name, keys) in index_specs {
            let collection = self
                .db
                .collection::<mongodb::bson::Document>(collection_name);
            let index = IndexModel::builder().keys(keys.clone()).build();

            match collection.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}({:?})", collection_name, keys),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/DabbaApp".to_string());
        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
