use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use luxestays::config::AppConfig;
use luxestays::db;
use luxestays::handlers;
use luxestays::services::identity::GatewayIdentity;
use luxestays::services::notify::LogNotifier;
use luxestays::services::payment::flow::FlowRegistry;
use luxestays::services::payment::gateway::UpiGatewayProvider;
use luxestays::services::payment::simulated::SimulatedUpiProvider;
use luxestays::services::payment::{run_expiry_loop, PaymentProvider};
use luxestays::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let payment_provider: Box<dyn PaymentProvider> = match config.payment_provider.as_str() {
        "gateway" => {
            tracing::info!("using UPI gateway provider (url: {})", config.payment_gateway_url);
            Box::new(UpiGatewayProvider::new(config.payment_gateway_url.clone()))
        }
        _ => {
            tracing::info!("using simulated UPI provider");
            Box::new(SimulatedUpiProvider::new(1))
        }
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        payments: Mutex::new(FlowRegistry::default()),
        payment_provider,
        identity: Box::new(GatewayIdentity),
        notifier: Box::new(LogNotifier),
    });

    tokio::spawn(run_expiry_loop(Arc::clone(&state)));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/resorts", get(handlers::resorts::list_resorts))
        .route("/api/resorts/:id", get(handlers::resorts::get_resort))
        .route(
            "/api/resorts/:id/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route("/api/bookings/quote", post(handlers::bookings::get_quote))
        .route("/api/bookings", get(handlers::bookings::my_bookings))
        .route("/api/payments", post(handlers::bookings::start_payment))
        .route("/api/payments/:id", get(handlers::bookings::get_payment))
        .route(
            "/api/payments/:id/check",
            post(handlers::bookings::check_payment),
        )
        .route(
            "/api/payments/:id/cancel",
            post(handlers::bookings::cancel_payment),
        )
        .route("/api/settings", get(handlers::contact::get_settings))
        .route("/api/contact", post(handlers::contact::submit_contact))
        .route("/api/admin/resorts", get(handlers::admin::list_resorts))
        .route("/api/admin/resorts", post(handlers::admin::create_resort))
        .route("/api/admin/resorts/:id", put(handlers::admin::update_resort))
        .route(
            "/api/admin/resorts/:id",
            delete(handlers::admin::delete_resort),
        )
        .route(
            "/api/admin/resorts/:id/stay-options",
            post(handlers::admin::create_stay_option),
        )
        .route(
            "/api/admin/stay-options/:id",
            put(handlers::admin::update_stay_option),
        )
        .route(
            "/api/admin/stay-options/:id",
            delete(handlers::admin::delete_stay_option),
        )
        .route("/api/admin/bookings", get(handlers::admin::list_bookings))
        .route("/api/admin/settings", get(handlers::admin::get_settings))
        .route("/api/admin/settings", post(handlers::admin::update_settings))
        .route("/api/admin/messages", get(handlers::admin::list_messages))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
