use mock_server::Config;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if config.uses_dev_secret() {
        tracing::warn!("AISCHOOL_JWT_SECRET not set; signing tokens with the development secret");
    }

    let listener = TcpListener::bind(&config.bind).await?;
    tracing::info!(addr = %config.bind, "AI School mock backend listening");
    mock_server::run_with_config(listener, config).await
}
