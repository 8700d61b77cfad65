//! Airthings Exporter binary
//!
//! Serves Airthings cloud sensor readings as Prometheus metrics.

use airthings_exporter::{
    api::config::{DEFAULT_API_URL, DEFAULT_SCOPES, DEFAULT_TOKEN_URL},
    start_web_server, AirthingsCollector, ApiConfig, ClientCredentialsTokenSource,
    HttpAirthingsClient, WebConfig, DEFAULT_LISTEN_ADDRESS,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "airthings_exporter")]
#[command(about = "Prometheus exporter for Airthings cloud sensors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Airthings Cloud API Client ID
    #[arg(long = "airthings.cloud.auth.client.id", default_value = "")]
    client_id: String,

    /// Airthings Cloud API Client Secret
    #[arg(long = "airthings.cloud.auth.client.secret", default_value = "")]
    client_secret: String,

    /// Airthings Cloud API Scopes, comma separated
    #[arg(long = "airthings.cloud.auth.scopes", default_value = DEFAULT_SCOPES)]
    scopes: String,

    /// Airthings Cloud API Token URL
    #[arg(long = "airthings.cloud.auth.url", default_value = DEFAULT_TOKEN_URL)]
    token_url: String,

    /// Airthings Cloud API base URL
    #[arg(long = "airthings.cloud.api.url", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Timeout for each Airthings Cloud API request, in seconds
    #[arg(long = "airthings.cloud.timeout", default_value_t = 10)]
    timeout_secs: u64,

    /// Number of devices queried in parallel during a scrape
    #[arg(long = "airthings.cloud.fetch-concurrency", default_value_t = 1)]
    fetch_concurrency: usize,

    /// Address on which to expose metrics and web interface
    #[arg(long = "web.listen-address", default_value = DEFAULT_LISTEN_ADDRESS)]
    listen_address: String,

    /// Only log messages with the given severity or above
    #[arg(long = "log.level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = Level::from(cli.log_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn api_config(cli: &Cli) -> anyhow::Result<ApiConfig> {
    let config = ApiConfig::new(&cli.client_id, &cli.client_secret)?
        .with_scopes(&cli.scopes)
        .with_token_url(&cli.token_url)?
        .with_api_url(&cli.api_url)?
        .with_request_timeout(Duration::from_secs(cli.timeout_secs))
        .with_fetch_concurrency(cli.fetch_concurrency);
    config.validate()?;
    Ok(config)
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting airthings_exporter");

    let config = api_config(cli).context("invalid Airthings cloud configuration")?;
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("failed to build HTTP client")?;

    let collector = AirthingsCollector::new(
        HttpAirthingsClient::with_client(http.clone(), &config),
        ClientCredentialsTokenSource::with_client(http, &config),
    )
    .with_fetch_concurrency(config.fetch_concurrency);

    info!(
        api_url = %config.api_url,
        token_url = %config.token_url,
        scopes = ?config.scopes,
        fetch_concurrency = config.fetch_concurrency,
        "Airthings cloud client configured"
    );

    let web_config = WebConfig::new(&cli.listen_address);
    start_web_server(web_config, Arc::new(collector))
        .await
        .context("Error starting HTTP server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "airthings_exporter",
            "--airthings.cloud.auth.client.id",
            "abc",
            "--airthings.cloud.auth.client.secret",
            "xyz",
            "--web.listen-address",
            "127.0.0.1:9999",
            "--log.level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.client_id, "abc");
        assert_eq!(cli.client_secret, "xyz");
        assert_eq!(cli.listen_address, "127.0.0.1:9999");
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["airthings_exporter"]).unwrap();
        assert_eq!(cli.scopes, "read:device:current_values");
        assert_eq!(cli.token_url, "https://accounts-api.airthings.com/v1/token");
        assert_eq!(cli.listen_address, DEFAULT_LISTEN_ADDRESS);
        assert_eq!(cli.fetch_concurrency, 1);
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let cli = Cli::try_parse_from(["airthings_exporter"]).unwrap();
        assert!(api_config(&cli).is_err());
    }

    #[test]
    fn test_api_config_from_flags() {
        let cli = Cli::try_parse_from([
            "airthings_exporter",
            "--airthings.cloud.auth.client.id",
            "abc",
            "--airthings.cloud.auth.client.secret",
            "xyz",
            "--airthings.cloud.auth.scopes",
            "read:device:current_values,read:device",
            "--airthings.cloud.fetch-concurrency",
            "3",
        ])
        .unwrap();

        let config = api_config(&cli).unwrap();
        assert_eq!(config.scopes.len(), 2);
        assert_eq!(config.fetch_concurrency, 3);
    }
}
