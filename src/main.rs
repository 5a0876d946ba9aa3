use adaptive_interviewer::{
    app,
    config::{get_config, init_config},
    services::question_bank::QuestionBank,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    init_config()?;
    let config = get_config();

    let bank = Arc::new(QuestionBank::load(&config.question_bank_path).await?);
    info!(
        "Interviews will ask up to {} of {} questions using model {}",
        config.interview_length.min(bank.len()),
        bank.len(),
        config.openai_model
    );

    let app_state = AppState::new(bank)?;

    // Session eviction sweeper
    {
        let service = app_state.interview_service.clone();
        let interval = Duration::from_secs(config.session_sweep_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                service.evict_expired(chrono::Utc::now());
            }
        });
    }

    let router = app(app_state, config.public_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
