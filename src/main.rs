mod api;
mod database;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{guard, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use services::sms_service::SmsSender;
use std::env;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "4000".to_string());
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    log::info!("🚀 Starting Dabba Service...");

    // Initialize MongoDB connection (creates indexes on the way up)
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");

    // 🌱 Seed the starter menu
    seeds::menu_seed::seed_default_menu(&db).await;

    // Background jobs
    log::info!("📅 Starting background jobs...");
    jobs::otp_cleanup::start_otp_cleanup(db.clone()).await;
    log::info!("✅ Background jobs started");

    // In-process hub feeding the order tracking streams
    let events_data = web::Data::new(services::order_events::OrderEvents::new());

    // OTP delivery channel, picked by OTP_PROVIDER
    let sms: Arc<dyn SmsSender> = Arc::from(services::sms_service::sender_from_env());
    let sms_data: web::Data<dyn SmsSender> = web::Data::from(sms);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000") // Frontend web
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:8081")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_origin("http://127.0.0.1:5173")
            .allowed_origin("http://127.0.0.1:8081")
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CACHE_CONTROL,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(events_data.clone())
            .app_data(sms_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Auth endpoints
            .service(
                web::scope("/api/v1/auth")
                    .route("/request-otp", web::post().to(api::auth::request_otp))
                    .route("/verify-otp", web::post().to(api::auth::verify_otp))
                    .route("/refresh", web::post().to(api::auth::refresh_token))
                    .route("/verify", web::get().to(api::auth::verify_token))
                    .service(
                        web::resource("/me")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::get().to(api::auth::get_me)),
                    ),
            )
            // Menu: public browsing, authenticated management. The POST
            // resource carries a method guard so GETs fall through to the
            // public route.
            .service(
                web::scope("/api/v1/menu")
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::post().to(api::menu::create_menu_item)),
                    )
                    .route("", web::get().to(api::menu::list_menu))
                    .route("/popular", web::get().to(api::menu::popular_items))
                    .route("/{id}", web::get().to(api::menu::get_menu_item)),
            )
            // Offers
            .service(
                web::scope("/api/v1/offers")
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::post().to(api::offers::create_offer)),
                    )
                    .route("", web::get().to(api::offers::list_offers)),
            )
            // Shop open/closed flag
            .service(
                web::scope("/api/v1/status")
                    .service(
                        web::resource("")
                            .guard(guard::Put())
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::put().to(api::status::set_app_status)),
                    )
                    .route("", web::get().to(api::status::get_app_status)),
            )
            // Cart
            .service(
                web::scope("/api/v1/cart")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::cart::get_cart))
                    .route("", web::delete().to(api::cart::clear_cart))
                    .route("/items", web::post().to(api::cart::add_item))
                    .route("/items/{id}", web::patch().to(api::cart::update_item_quantity))
                    .route("/items/{id}", web::delete().to(api::cart::remove_item)),
            )
            // Orders — literal paths before the {id} catch-all
            .service(
                web::scope("/api/v1/orders")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::post().to(api::orders::place_order))
                    .route("", web::get().to(api::orders::get_my_orders))
                    .route("/all", web::get().to(api::orders::get_all_orders))
                    .route("/events", web::get().to(api::orders::user_orders_event_stream))
                    .route("/{id}", web::get().to(api::orders::get_order))
                    .route("/{id}/cancel", web::post().to(api::orders::cancel_order))
                    .route("/{id}/status", web::patch().to(api::orders::update_order_status))
                    .route("/{id}/events", web::get().to(api::orders::order_event_stream)),
            )
            // Users
            .service(
                web::scope("/api/v1/users")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/me", web::get().to(api::users::get_profile))
                    .route("/me", web::put().to(api::users::update_profile))
                    .route("/me/addresses", web::post().to(api::users::add_address)),
            )
            // Support tickets
            .service(
                web::scope("/api/v1/support")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/tickets", web::post().to(api::support::create_ticket))
                    .route("/tickets", web::get().to(api::support::get_my_tickets)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
