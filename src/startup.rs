use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::Json;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::chat_client::ChatClient;
use crate::configuration::{DatabaseSettings, Settings};
use crate::notifications::NotificationSender;
use crate::rate_limit::{IpRateLimiter, enforce_rate_limit};
use crate::routes::constants::MSG_RESOURCE_NOT_FOUND;
use crate::routes::{ApiError, ApiResponse, chat, health_check, submit_contact, subscribe, unsubscribe};

pub fn get_connection_pool(db_configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(db_configuration.connect_options())
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub notifier: NotificationSender,
    pub chat_client: ChatClient,
    pub rate_limiter: Arc<IpRateLimiter>,
    pub expose_error_details: bool,
}

impl AppState {
    /// Wraps an internal failure according to the configured error-detail
    /// exposure policy.
    pub fn internal_error(&self, source: anyhow::Error, fallback: &str) -> ApiError {
        ApiError::unexpected(source, fallback, self.expose_error_details)
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mentorship API",
        description = "Contact form, newsletter subscription and AI chat backend"
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::contact::submit_contact,
        crate::routes::newsletter::subscribe::subscribe,
        crate::routes::newsletter::unsubscribe::unsubscribe,
        crate::routes::chat::chat,
    ),
    components(schemas(
        crate::routes::ApiResponse,
        crate::routes::contact::ContactForm,
        crate::routes::newsletter::subscribe::SubscribeForm,
        crate::routes::chat::ChatForm,
        crate::routes::health::HealthStatus,
    )),
    tags(
        (name = "system", description = "Service health"),
        (name = "contact", description = "Contact form submission"),
        (name = "newsletter", description = "Newsletter subscription management"),
        (name = "chat", description = "AI assistant passthrough"),
    )
)]
struct ApiDoc;

pub struct Application {
    port: u16,
    listener: TcpListener,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        // Fail fast on configuration problems before binding the port.
        configuration
            .notifications
            .admin()
            .map_err(anyhow::Error::msg)?;
        configuration
            .email_client
            .sender()
            .map_err(anyhow::Error::msg)?;
        configuration.rate_limit.quota().map_err(anyhow::Error::msg)?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        Ok(Self { port, listener })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self, configuration: Settings) -> Result<(), anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database);
        let admin_email = configuration
            .notifications
            .admin()
            .map_err(anyhow::Error::msg)?;
        let notifier = NotificationSender::new(
            configuration.email_client.client(),
            admin_email,
            configuration.notifications.frontend_base_url,
            configuration.notifications.pdf_guide_path,
        );
        let chat_client = configuration.chat_client.client();
        let quota = configuration.rate_limit.quota().map_err(anyhow::Error::msg)?;
        let rate_limiter = Arc::new(IpRateLimiter::new(quota));

        let app_state = AppState {
            db: connection_pool,
            notifier,
            chat_client,
            rate_limiter,
            expose_error_details: configuration.application.expose_error_details,
        };

        let allow_origin = match &configuration.application.frontend_origin {
            Some(origin) => AllowOrigin::exact(origin.parse()?),
            None => AllowOrigin::any(),
        };
        let cors = CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        // The two write-heavy endpoints sit behind the shared rate limiter.
        let rate_limited = Router::new()
            .route("/api/contact", post(submit_contact))
            .route("/api/newsletter/subscribe", post(subscribe))
            .route_layer(axum::middleware::from_fn_with_state(
                app_state.clone(),
                enforce_rate_limit,
            ));

        let app = Router::new()
            .route("/health", get(health_check))
            .route("/api/newsletter/unsubscribe", get(unsubscribe))
            .route("/api/chat", post(chat))
            .merge(rate_limited)
            .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .fallback(not_found)
            .with_state(app_state)
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::from_std(self.listener)?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }
}

async fn not_found() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(MSG_RESOURCE_NOT_FOUND)),
    )
}
