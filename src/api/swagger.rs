use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dabba Service API",
        version = "1.0.0",
        description = "Campus food delivery backend. \n\n**Authentication:** Phone number + OTP login. Most endpoints require a JWT Bearer token.\n\n**Features:**\n- Menu browsing and popular items\n- Server-side cart\n- Cash-on-delivery checkout with flat-formula pricing\n- Real-time order tracking over SSE\n- Offers, support tickets and shop open/closed status",
        contact(
            name = "Dabba Team",
            email = "support@dabba.app"
        )
    ),
    paths(
        // Auth endpoints
        crate::api::auth::request_otp,
        crate::api::auth::verify_otp,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Menu
        crate::api::menu::list_menu,
        crate::api::menu::popular_items,
        crate::api::menu::create_menu_item,

        // Cart
        crate::api::cart::get_cart,
        crate::api::cart::add_item,
        crate::api::cart::clear_cart,

        // Orders
        crate::api::orders::place_order,
        crate::api::orders::get_my_orders,
        crate::api::orders::get_order,
        crate::api::orders::cancel_order,
        crate::api::orders::update_order_status,
        crate::api::orders::get_all_orders,

        // Users
        crate::api::users::get_profile,
        crate::api::users::update_profile,
        crate::api::users::add_address,

        // Offers, support, status
        crate::api::offers::list_offers,
        crate::api::offers::create_offer,
        crate::api::support::create_ticket,
        crate::api::support::get_my_tickets,
        crate::api::status::get_app_status,
        crate::api::status::set_app_status,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::RequestOtpRequest,
            crate::services::auth_service::RequestOtpResponse,
            crate::services::auth_service::VerifyOtpRequest,
            crate::services::auth_service::AuthResponse,

            // Health & Metrics
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,

            // Menu
            crate::models::CreateMenuItemRequest,

            // Cart
            crate::models::CartItem,
            crate::models::AddCartItemRequest,
            crate::models::UpdateCartItemRequest,
            crate::models::CartResponse,

            // Orders
            crate::models::OrderStatus,
            crate::models::PaymentMethod,
            crate::models::OrderItem,
            crate::models::DeliveryAddress,
            crate::models::Pricing,
            crate::models::PlaceOrderRequest,
            crate::models::PlaceOrderResponse,
            crate::models::UpdateOrderStatusRequest,

            // Users
            crate::models::SavedAddress,
            crate::models::UserSettings,
            crate::models::UpdateProfileRequest,
            crate::models::AddAddressRequest,
            crate::models::UserInfo,

            // Offers, support, status
            crate::models::CreateOfferRequest,
            crate::models::CreateTicketRequest,
            crate::models::SetAppStatusRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Phone + OTP login, token verification and refresh."),
        (name = "Health", description = "Health check and system metrics endpoints for monitoring service status."),
        (name = "Menu", description = "Menu catalog. Public browsing, authenticated item management."),
        (name = "Cart", description = "Server-side cart, one document per user."),
        (name = "Orders", description = "Checkout, order history, cancellation, status updates and live tracking."),
        (name = "Users", description = "Profile and saved delivery addresses."),
        (name = "Offers", description = "Display-only discount codes."),
        (name = "Support", description = "Support tickets."),
        (name = "Status", description = "Shop open/closed flag shown in the app."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
