use std::sync::Arc;

use dotenvy::dotenv;
use log::info;

use taskdesk::auth;
use taskdesk::config::AppConfig;
use taskdesk::shared::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState::new(config));
    auth::bootstrap_admin(&state)
        .await
        .map_err(|e| anyhow::anyhow!("admin bootstrap failed: {}", e))?;

    let app = taskdesk::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("taskdesk listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
