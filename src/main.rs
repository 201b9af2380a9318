use clinic_booking::{web, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env_and_args(&args);
    if config.admin_secret.is_none() {
        info!("ADMIN_PASSWORD not set, using the default admin credential");
    }

    info!(port = config.port, "starting web server");
    info!("access the site at http://localhost:{}", config.port);

    web::start_server(config).await?;
    Ok(())
}
