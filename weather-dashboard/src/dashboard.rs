//! Interactive dashboard: search tabs, result panels and a live health badge.

use anyhow::Context;
use inquire::{CustomType, InquireError, Select, Text};
use std::fmt;
use weather_core::{Heartbeat, SearchRequest, WeatherResponse, WeatherSearch};

use crate::{cli::AppContext, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    City,
    Coordinates,
    Recent,
    Quit,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::City, Tab::Coordinates, Tab::Recent, Tab::Quit];
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tab::City => "City search",
            Tab::Coordinates => "Coordinates search",
            Tab::Recent => "Recent searches",
            Tab::Quit => "Quit",
        })
    }
}

/// Run a blocking prompt off the async workers. `None` means the user backed out.
async fn prompt<T, F>(f: F) -> anyhow::Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await.context("prompt task panicked")? {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn print_weather(weather: &WeatherResponse) {
    println!("{}", render::current_card(weather));
    println!();
    println!("{}", render::forecast_grid(weather));
    println!();
    println!(
        "Map: {}",
        render::map_link(weather.location.latitude, weather.location.longitude)
    );
}

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let heartbeat = Heartbeat::spawn(ctx.client.clone(), ctx.config.heartbeat_interval());
    let mut session = ctx.session();

    loop {
        println!();
        println!("Weather dashboard  {}", render::health_badge(&heartbeat.current()));
        if let Some(banner) = render::status_banner(&session) {
            println!("{banner}");
        }

        let tab = prompt(|| Select::new("Search type:", Tab::ALL.to_vec()).prompt()).await?;
        let request = match tab {
            None | Some(Tab::Quit) => break,
            Some(Tab::City) => ask_city().await?,
            Some(Tab::Coordinates) => ask_coordinates().await?,
            Some(Tab::Recent) => pick_recent(&session).await?,
        };

        if let Some(request) = request {
            search(&mut session, request).await;
        }
    }

    heartbeat.shutdown().await;
    Ok(())
}

async fn search(session: &mut WeatherSearch, request: SearchRequest) {
    println!("Fetching forecast…");
    match session.search(request).await {
        Ok(weather) => {
            println!();
            print_weather(weather);
        }
        Err(err) => tracing::debug!(code = err.code(), "search failed"),
    }
}

async fn ask_city() -> anyhow::Result<Option<SearchRequest>> {
    loop {
        let Some(name) = prompt(|| {
            Text::new("City name:")
                .with_placeholder("e.g. Berlin")
                .with_help_message("Use any major city worldwide.")
                .prompt()
        })
        .await?
        else {
            return Ok(None);
        };

        match SearchRequest::city(&name) {
            Ok(request) => return Ok(Some(request)),
            Err(err) => println!("{err}"),
        }
    }
}

async fn ask_coordinates() -> anyhow::Result<Option<SearchRequest>> {
    loop {
        let Some(latitude) = prompt(|| {
            CustomType::<f64>::new("Latitude:")
                .with_default(52.52)
                .with_help_message("Range: -90 to 90")
                .prompt()
        })
        .await?
        else {
            return Ok(None);
        };

        let Some(longitude) = prompt(|| {
            CustomType::<f64>::new("Longitude:")
                .with_default(13.41)
                .with_help_message("Range: -180 to 180")
                .prompt()
        })
        .await?
        else {
            return Ok(None);
        };

        match SearchRequest::coordinates(latitude, longitude) {
            Ok(request) => return Ok(Some(request)),
            Err(err) => println!("{err}"),
        }
    }
}

async fn pick_recent(session: &WeatherSearch) -> anyhow::Result<Option<SearchRequest>> {
    let entries = session.recent().entries();
    if entries.is_empty() {
        println!("{}", render::recent_list(&entries));
        return Ok(None);
    }

    let options: Vec<SearchRequest> = entries.into_iter().map(|entry| entry.params).collect();
    prompt(move || Select::new("Repeat a recent search:", options).prompt()).await
}
