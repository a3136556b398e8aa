use backend::{config::Config, create_router};
use clap::Parser;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let state = config.app_state().expect("valid upstream configuration");
    if !state.ors.has_api_key() {
        tracing::warn!("ORS_API_KEY is not set, geocoding and routing will fail");
    }

    let mut app = create_router(state);
    if let Some(dir) = &config.static_dir {
        tracing::info!("serving frontend from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("starting backend on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
