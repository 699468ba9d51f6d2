use anyhow::Context;
use clap::Parser;
use recipe_server::config::Config;
use recipe_server::{api, build_router, db, telemetry, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Dump the spec and exit, no database needed
    if config.openapi {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    telemetry::init_telemetry(config.otel_endpoint.as_deref(), &config.otel_service_name);

    let pool = db::create_pool(config.database_url()?)?;

    let state = AppState {
        pool: Arc::new(pool),
        session_ttl_days: config.session_ttl_days,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec available at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
