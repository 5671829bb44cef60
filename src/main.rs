use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use grant_match::config::Settings;
use grant_match::core::Matcher;
use grant_match::error::{handle_json_payload_error, handle_query_payload_error};
use grant_match::packets::PacketGenerator;
use grant_match::routes::{self, AppState};
use grant_match::services::{InMemoryRepository, MatchingService, PostgresRepository, Repository};

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // LOG_LEVEL / LOG_FORMAT override the configured values
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_tracing(&log_level, &log_format);

    info!("Starting Grant Match service...");
    info!("Configuration loaded successfully");

    let repository: Arc<dyn Repository> = match settings.database.backend.as_str() {
        "memory" => {
            info!("Using in-memory repository");
            Arc::new(InMemoryRepository::new())
        }
        _ => {
            let postgres = PostgresRepository::from_settings(&settings.database)
                .await
                .unwrap_or_else(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    panic!("PostgreSQL connection error: {}", e);
                });
            info!(
                "PostgreSQL repository initialized (max: {} connections)",
                settings.database.max_connections.unwrap_or(10)
            );
            Arc::new(postgres)
        }
    };

    // Initialize matcher with configured gate points
    let points = settings.gate_points();
    let matcher = Matcher::new(points);

    info!("Matcher initialized with points: {:?}", points);

    let matching = MatchingService::new(repository.clone(), matcher)
        .with_catalog_limit(settings.matching.catalog_limit);
    let packets = PacketGenerator::new(repository.clone(), &settings.packets.output_dir);

    info!("Packets will be written to {}", settings.packets.output_dir);

    // Build application state
    let app_state = AppState {
        repository,
        matching,
        packets,
        limits: settings.matching.clone(),
        seed: settings.seed.clone(),
    };

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
