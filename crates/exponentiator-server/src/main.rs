use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exponentiator::bootstrap::bootstrap_exponentiator;
use exponentiator::ExponentiatorConfig;
use exponentiator_server::routes;
use exponentiator_server::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ExponentiatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // The chain is contacted per request, so a down RPC does not stop startup.
    let exponentiator = match bootstrap_exponentiator(&config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to start exponentiator: {e}");
            std::process::exit(1);
        }
    };

    let state = web::Data::new(AppState::new(exponentiator));
    let port = config.port;

    tracing::info!("{} listening on port {port}", config.service_name);
    tracing::info!("  GET  http://localhost:{port}/health");
    tracing::info!("  POST http://localhost:{port}/");
    tracing::info!("  POST http://localhost:{port}/withdraw");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::default().limit(65_536))
            .service(routes::health)
            .service(routes::check)
            .service(routes::withdraw)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
