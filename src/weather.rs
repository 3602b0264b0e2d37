// Air-Sentinel - Remote Weather
//
// Builds the open-meteo current-weather query for the stored coordinates and
// turns its JSON reply into the temperature and condition shown on screen.

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::config::WEATHER_URL;
use crate::events::WeatherReport;

// ---------------------------------------------------------------------------
// Open-Meteo JSON structures
// ---------------------------------------------------------------------------
#[derive(Deserialize)]
struct ForecastRoot {
    current_weather: Option<CurrentWeather>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    weathercode: Option<i32>,
}

// ---------------------------------------------------------------------------
// Condition mapping
// ---------------------------------------------------------------------------
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloud",
        3 => "Overcast",
        61 => "Rainy",
        _ => "Cloudy",
    }
}

pub fn current_weather_url(latitude: &str, longitude: &str) -> String {
    format!(
        "{}?latitude={}&longitude={}&current_weather=true",
        WEATHER_URL, latitude, longitude
    )
}

/// Parse an Open-Meteo forecast body. Temperature is truncated to whole
/// degrees Celsius.
pub fn parse_current_weather(json: &str) -> Result<WeatherReport> {
    let root: ForecastRoot = serde_json::from_str(json)?;
    let current = root
        .current_weather
        .ok_or_else(|| anyhow!("response has no current_weather"))?;
    let temperature = current
        .temperature
        .ok_or_else(|| anyhow!("current_weather has no temperature"))?;
    let code = current
        .weathercode
        .ok_or_else(|| anyhow!("current_weather has no weathercode"))?;

    Ok(WeatherReport {
        temperature: format!("{}C", temperature.trunc() as i32),
        description: describe_weather_code(code).to_string(),
    })
}
