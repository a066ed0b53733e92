use std::sync::Arc;

use actix_web::{web, HttpServer};
use ja_api::app::create_app;
use ja_api::auth::{AuthGate, RefreshTokenLocator, TokenServiceWrapper};
use ja_api::routes::auth::AppState;
use ja_api::telemetry::init_tracing;
use ja_core::services::token::{TokenService, TokenServiceConfig};
use ja_infra::RedisWhitelistStore;
use ja_shared::AppConfig;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting jwtauth API server");

    let store = RedisWhitelistStore::connect(&config.cache).await?;

    let service_config = TokenServiceConfig::from_jwt_config(&config.auth.jwt)?
        .with_store_timeout(config.cache.response_timeout());
    let token_service: Arc<dyn TokenServiceWrapper> =
        Arc::new(TokenService::new(store, service_config)?);

    let gate = AuthGate::new(token_service, &config.auth.bearer)?;
    let state = web::Data::new(AppState::new(
        gate,
        RefreshTokenLocator::new(&config.auth.refresh),
    ));

    let bind_address = config.server.bind_address();
    info!(bind_address = %bind_address, "Server will bind");

    HttpServer::new(move || create_app(state.clone()))
        .bind(&bind_address)?
        .run()
        .await?;

    Ok(())
}
