mod api;
mod config;
mod contact;
mod data;
mod error;
mod mpesa;
mod paystack;

use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use anyhow::Result;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use crate::config::Providers;

/// Payment and contact gateway for the AfyaAlert site.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 9999)]
    port: u16,

    /// Upper bound on every outbound provider call.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    http_timeout_secs: u64,

    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(flatten)]
    providers: Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let client = Client::builder()
        .timeout(Duration::from_secs(cli.http_timeout_secs))
        .build()?;

    tracing::info!(
        mpesa_endpoint = %cli.providers.mpesa.endpoint,
        short_code = %cli.providers.mpesa.short_code,
        "config loaded"
    );

    let state = api::AppState::new(client, cli.providers);

    if let Err(err) = api::serve(SocketAddr::new(cli.host, cli.port), state).await {
        tracing::error!(?err, "api_main");
        return Err(err);
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}
