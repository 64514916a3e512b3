use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Key accepted when `MOCK_API_KEYS` is not set.
const DEMO_API_KEY: &str = "56c1f1b8-9b5c-41cd-b8f7-872be3500ad3";

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_keys: Vec<String> = std::env::var("MOCK_API_KEYS")
        .map(|keys| keys.split(',').map(|k| k.trim().to_string()).collect())
        .unwrap_or_else(|_| vec![DEMO_API_KEY.to_string()]);

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, keys = api_keys.len(), "mock Cupom Verde API listening");
    cpv_mock_server::run(listener, api_keys).await
}
