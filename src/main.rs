mod config;
mod error;
mod handlers;
mod line_client;
mod models;
mod services;
mod signature;

use config::Config;
use handlers::create_router;
use line_client::LineClient;
use services::WebhookService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing secrets abort here, before anything is bound
    let config = Config::from_env()?;

    let http = LineClient::build_http(config.api_timeout)?;
    let client = LineClient::new(
        http,
        config.api_base_url.clone(),
        config.channel_access_token.clone(),
    );

    let app_state = handlers::AppState {
        webhook_service: WebhookService::new(client, config.channel_secret.as_str()),
    };

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    config.log_startup_info();

    axum::serve(listener, app).await?;

    Ok(())
}
