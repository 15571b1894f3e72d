use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

use vane_core::Config;
use vane_weather::{
    DirStore, FavoriteSet, Forecast, ForecastCache, ForecastProvider, LocationKey, TcpProbe,
    WeatherService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    vane_core::init()?;

    let (config, _) = Config::load_validated()?;
    let service = build_service(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();

    match argv.as_slice() {
        ["fav", "add", city, country] => {
            let key = LocationKey::new(*city, *country);
            fail_on_weather_error(service.add_favorite(&key));
            println!("Added favorite: {}", key);
        }
        ["fav", "remove", city, country] => {
            let key = LocationKey::new(*city, *country);
            let removed = fail_on_weather_error(service.remove_favorite(&key));
            if removed {
                println!("Removed favorite: {}", key);
            } else {
                println!("{} was not a favorite", key);
            }
        }
        ["fav", "list"] => {
            let favorites = service.favorites();
            if favorites.is_empty() {
                println!("No favorites yet");
            }
            for key in favorites {
                println!("{}", key);
            }
        }
        ["refresh", city, country] => {
            refresh(&service, city, country).await;
        }
        ["watch", city, country] => {
            watch(&service, &config, city, country).await;
        }
        [city, country] => {
            lookup(&service, city, country).await;
        }
        _ => usage(),
    }

    Ok(())
}

fn build_service(config: &Config) -> Result<WeatherService> {
    let weather = &config.weather;
    let cache = ForecastCache::new(Box::new(DirStore::new(config.weather_cache_dir())));
    let favorites = FavoriteSet::new(Box::new(DirStore::new(config.config_dir.clone())));
    let probe = TcpProbe::new(
        config.connectivity.probe_addr.as_str(),
        config.connectivity.probe_timeout(),
    );
    let provider = ForecastProvider::with_base_url(
        weather.api_key.as_str(),
        weather.fetch_timeout(),
        weather.forecast_days,
        &weather.api_base_url,
    )?;

    Ok(WeatherService::new(
        cache,
        favorites,
        Box::new(probe),
        provider,
        weather.cache_max_age(),
    ))
}

async fn lookup(service: &WeatherService, city: &str, country: &str) {
    let key = LocationKey::new(city, country);

    // Refresh pinned locations opportunistically on startup.
    service.refresh_favorites_if_needed(&service.favorites()).await;

    let is_favorite = service.is_favorite(&key);
    match service.forecast(&key, is_favorite).await {
        Ok(forecast) => {
            print_forecast(&forecast, service.last_updated(&key, is_favorite));
        }
        Err(e) => {
            tracing::debug!("Lookup for {} failed: {}", key, e);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

async fn refresh(service: &WeatherService, city: &str, country: &str) {
    let key = LocationKey::new(city, country);

    let is_favorite = service.is_favorite(&key);
    match service.force_refresh(&key, is_favorite).await {
        Ok(forecast) => print_forecast(&forecast, service.last_updated(&key, is_favorite)),
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

async fn watch(service: &WeatherService, config: &Config, city: &str, country: &str) {
    let key = LocationKey::new(city, country);
    let minutes = config.weather.refresh_minutes.max(1);
    let interval = Duration::from_secs(u64::from(minutes) * 60);

    loop {
        service.refresh_favorites_if_needed(&service.favorites()).await;

        let is_favorite = service.is_favorite(&key);
        match service.forecast(&key, is_favorite).await {
            Ok(forecast) => print_forecast(&forecast, service.last_updated(&key, is_favorite)),
            Err(e) => eprintln!("{}", e.user_message()),
        }

        tokio::time::sleep(interval).await;
    }
}

fn print_forecast(forecast: &Forecast, updated: Option<DateTime<Utc>>) {
    println!("{}, {}", forecast.location_name, forecast.location_country);
    if let Some(ts) = updated {
        println!("Last updated: {}", ts.format("%Y-%m-%d %H:%M UTC"));
    }
    for day in &forecast.days {
        println!(
            "  {}  {:>5.1}\u{b0}C  {:>3.0}% humidity  UV {:>4.1}  {}",
            day.date, day.avg_temp_c, day.avg_humidity_pct, day.uv_index, day.condition
        );
    }
}

fn fail_on_weather_error<T>(result: Result<T, vane_weather::WeatherError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  vane <city> <country>             look up a forecast");
    eprintln!("  vane refresh <city> <country>     drop the cached entry and refetch");
    eprintln!("  vane watch <city> <country>       look up on a refresh interval");
    eprintln!("  vane fav add <city> <country>     pin a location");
    eprintln!("  vane fav remove <city> <country>  unpin a location");
    eprintln!("  vane fav list                     show pinned locations");
    std::process::exit(2);
}
