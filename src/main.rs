use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use spin_match::auth::TokenVerifier;
use spin_match::config::Settings;
use spin_match::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use spin_match::services::{SupabaseClient, SupabaseTables};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
    })?;

    // Initialize logging; LOG_LEVEL and LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Spin Match service...");

    if settings.supabase.jwt_secret.trim().is_empty() {
        error!("supabase.jwt_secret is empty; refusing to accept unsigned sessions");
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "Missing JWT secret"));
    }

    let tables = SupabaseTables {
        profiles: settings.tables.profiles.clone(),
        matches: settings.tables.matches.clone(),
    };

    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.anon_key.clone(),
        settings.supabase.service_key.clone(),
        settings.storage.avatar_bucket.clone(),
        tables,
        Duration::from_secs(settings.supabase.timeout_secs),
    )
    .map_err(|e| {
        error!("Failed to create Supabase client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let supabase = Arc::new(supabase);

    info!("Supabase client initialized for {}", settings.supabase.url);

    let app_state = AppState::new(
        supabase.clone(),
        supabase.clone(),
        supabase.clone(),
        supabase,
        TokenVerifier::new(&settings.supabase.jwt_secret),
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
