use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dashboard_cli::{AppState, build_app};
use dashboard_core::{Config, Location, RawParams, provider_from_config, render_page};
use inquire::{CustomType, Select, Text};
use tokio::net::TcpListener;
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard renderer")]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve dashboards over HTTP.
    Serve {
        /// Address to bind, overriding the config file.
        #[arg(long)]
        listen: Option<String>,
    },

    /// Render one page and print it to stdout.
    Render {
        /// Query string, e.g. "apikey=...&q=London&mode=hourly".
        query: String,
    },

    /// Interactively set the default location and listen address.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve { listen } => serve(listen).await,
            Command::Render { query } => render(&query).await,
            Command::Configure => configure(),
        }
    }
}

async fn serve(listen: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let addr = listen.unwrap_or_else(|| config.listen_addr().to_string());
    let state = Arc::new(AppState {
        provider: Arc::from(provider_from_config(&config)),
        config,
    });

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "dashboard server listening");

    axum::serve(listener, build_app(state))
        .await
        .context("HTTP server error")
}

async fn render(query: &str) -> Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config);
    let raw = RawParams::from_pairs(url::form_urlencoded::parse(
        query.trim_start_matches('?').as_bytes(),
    ));

    let page = render_page(provider.as_ref(), &raw, &config, Utc::now()).await;
    println!("{}", page.html);
    if page.is_error() {
        anyhow::bail!("rendered an error page ({:?})", page.kind);
    }
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let kinds = vec!["City ID", "Coordinates", "ZIP code", "City", "Free-text query"];
    let kind = Select::new("Default location type:", kinds).prompt()?;

    let location = match kind {
        "City ID" => Location::CityId {
            id: CustomType::<u64>::new("OpenWeather city ID:").prompt()?,
        },
        "Coordinates" => Location::Coordinates {
            lat: CustomType::<f64>::new("Latitude:").prompt()?,
            lon: CustomType::<f64>::new("Longitude:").prompt()?,
        },
        "ZIP code" => Location::Zip {
            zip: Text::new("ZIP / postal code:").prompt()?,
            country: optional(Text::new("Country code (optional):").prompt()?),
        },
        "City" => Location::City {
            city: Text::new("City:").prompt()?,
            state: optional(Text::new("State (optional):").prompt()?),
            country: optional(Text::new("Country code (optional):").prompt()?),
        },
        _ => Location::Query {
            q: Text::new("Query, e.g. \"London,GB\":").prompt()?,
        },
    };
    config.set_default_location(location);

    let listen = Text::new("Listen address:")
        .with_default(config.listen_addr())
        .prompt()?;
    config.server.listen = Some(listen);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
