use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use std::sync::Arc;
use weather_core::{
    ApiClient, ApiError, Config, FileStorage, Heartbeat, MemoryStorage, RecentSearchStore,
    SearchRequest, Storage, WeatherSearch, config::validate_base_url,
};

use crate::{dashboard, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard")]
pub struct Cli {
    /// API base URL for this run (overrides WEATHER_API_BASE_URL and the config file).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Keep recent searches in memory only.
    #[arg(long, global = true)]
    pub no_history: bool,

    /// Defaults to the interactive dashboard.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather for a city.
    City {
        /// City name, e.g. "Berlin".
        name: String,
    },

    /// Show weather for a latitude/longitude pair.
    Coords {
        /// Latitude in degrees, -90 to 90.
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees, -180 to 180.
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// List recent searches.
    Recent,

    /// Check API health.
    Health {
        /// Keep polling and print every status change until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },

    /// Interactive dashboard with a live health badge.
    Dashboard,

    /// Interactively set the API base URL and polling intervals.
    Configure,
}

/// Everything a command needs, resolved from config, environment and flags.
pub struct AppContext {
    pub config: Config,
    pub client: Arc<ApiClient>,
    pub recent: Arc<RecentSearchStore>,
}

impl AppContext {
    fn build(base_url: Option<&str>, no_history: bool, config: Config) -> anyhow::Result<Self> {
        let base_url = config.base_url(base_url)?;
        let client = Arc::new(ApiClient::with_timeout(base_url, config.request_timeout()));

        let storage: Arc<dyn Storage> = if no_history {
            Arc::new(MemoryStorage::default())
        } else {
            Arc::new(FileStorage::new(Config::data_dir()?))
        };
        let recent = Arc::new(RecentSearchStore::load(storage));

        tracing::debug!(base_url = client.base_url(), "context ready");
        Ok(Self {
            config,
            client,
            recent,
        })
    }

    pub fn session(&self) -> WeatherSearch {
        WeatherSearch::new(self.client.clone(), self.recent.clone())
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let command = self.command.unwrap_or(Command::Dashboard);

        if let Command::Configure = command {
            return configure(config).await;
        }

        let ctx = AppContext::build(self.base_url.as_deref(), self.no_history, config)?;

        match command {
            Command::Dashboard | Command::Configure => dashboard::run(&ctx).await,
            Command::City { name } => {
                let request = SearchRequest::city(&name)?;
                show(&ctx, request).await
            }
            Command::Coords { lat, lon } => {
                let request = SearchRequest::coordinates(lat, lon)?;
                show(&ctx, request).await
            }
            Command::Recent => {
                println!("{}", render::recent_list(&ctx.recent.entries()));
                Ok(())
            }
            Command::Health { watch: false } => {
                let health = ctx.client.fetch_health(None).await.map_err(api_failure)?;
                println!(
                    "● Healthy · {} v{} ({})",
                    health.service, health.version, health.timestamp
                );
                Ok(())
            }
            Command::Health { watch: true } => watch_health(&ctx).await,
        }
    }
}

async fn show(ctx: &AppContext, request: SearchRequest) -> anyhow::Result<()> {
    let mut session = ctx.session();

    if let Err(err) = session.search(request).await {
        return Err(api_failure(err.clone()));
    }
    if let Some(weather) = session.data() {
        dashboard::print_weather(weather);
    }
    Ok(())
}

fn api_failure(err: ApiError) -> anyhow::Error {
    anyhow!("{} [{}]", err.message(), err.code())
}

async fn watch_health(ctx: &AppContext) -> anyhow::Result<()> {
    let heartbeat = Heartbeat::spawn(ctx.client.clone(), ctx.config.heartbeat_interval());
    let mut rx = heartbeat.subscribe();

    println!("{}", render::health_badge(&rx.borrow()));
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", render::health_badge(&rx.borrow_and_update()));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    heartbeat.shutdown().await;
    Ok(())
}

async fn configure(mut config: Config) -> anyhow::Result<()> {
    let current_url = config.base_url(None)?;
    let timeout = config.request_timeout().as_secs();
    let interval = config.heartbeat_interval().as_secs();

    let answers = tokio::task::spawn_blocking(move || -> anyhow::Result<(String, u64, u64)> {
        let url = Text::new("API base URL:")
            .with_default(&current_url)
            .with_validator(|input: &str| {
                Ok(match validate_base_url(input) {
                    Ok(_) => inquire::validator::Validation::Valid,
                    Err(err) => inquire::validator::Validation::Invalid(err.to_string().into()),
                })
            })
            .prompt()?;
        let timeout = CustomType::<u64>::new("Request timeout (seconds):")
            .with_default(timeout)
            .prompt()?;
        let interval = CustomType::<u64>::new("Health check interval (seconds):")
            .with_default(interval)
            .prompt()?;
        Ok((url, timeout, interval))
    })
    .await
    .context("configuration prompt panicked")??;

    let (url, timeout, interval) = answers;
    config.api_base_url = Some(validate_base_url(&url)?);
    config.request_timeout_secs = Some(timeout);
    config.heartbeat_interval_secs = Some(interval);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
