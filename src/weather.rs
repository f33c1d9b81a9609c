use anyhow::Context;
use chrono::{NaiveDateTime, Timelike};
use log::info;
use serde::Deserialize;
use std::time::Duration;

/// Number of hours shown in the forecast strip, and considered for
/// precipitation and UV maximums
pub const FORECAST_HOURS: usize = 6;

/// Everything the weather widget shows. Built fresh on every poll
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherSnapshot {
    /// Current temperature, °C
    pub temp: i32,
    /// Apparent temperature, °C
    pub feels: i32,
    pub wind_kmh: i32,
    /// Highest probability of precipitation over the next few hours, percent
    pub pop: i32,
    /// Highest UV index over the next few hours
    pub uv: f64,
    pub desc: String,
    pub forecast: Vec<ForecastHour>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForecastHour {
    pub label: String,
    pub temp: i32,
}

impl WeatherSnapshot {
    /// Canned data for when there's no live provider
    pub fn mock() -> Self {
        let hour = |label: &str, temp| ForecastHour {
            label: label.into(),
            temp,
        };
        Self {
            temp: 22,
            feels: 24,
            wind_kmh: 18,
            pop: 30,
            uv: 5.0,
            desc: "Partly cloudy with a slight chance of melodrama".into(),
            forecast: vec![
                hour("1 PM", 23),
                hour("2 PM", 24),
                hour("3 PM", 25),
                hour("4 PM", 25),
                hour("5 PM", 24),
                hour("6 PM", 22),
            ],
        }
    }
}

/// Map a WMO weather code to a short description. Only the common codes are
/// covered
pub fn describe_code(code: u16) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime fog",
        51 => "Drizzle",
        61 => "Rain",
        71 => "Snow",
        80 => "Showers",
        95 => "Thunderstorms",
        _ => "Weather-ish",
    }
}

/// Client for the Open-Meteo forecast API. Calls are blocking, so run them
/// off the async runtime.
/// https://open-meteo.com/en/docs
#[derive(Clone, Debug)]
pub struct OpenMeteo {
    agent: ureq::Agent,
    url: String,
}

impl OpenMeteo {
    const URL: &'static str = "https://api.open-meteo.com/v1/forecast";
    /// Kept short, since a fetch in flight holds up shutdown
    const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self::with_url(Self::URL)
    }

    /// Client for a different forecast endpoint, e.g. a self-hosted
    /// Open-Meteo instance
    pub fn with_url(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent("stationbreak")
            .timeout(Self::TIMEOUT)
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }

    /// Fetch current conditions and the hourly forecast for a location
    pub fn fetch(&self, lat: f64, lon: f64) -> anyhow::Result<WeatherSnapshot> {
        info!("Fetching weather for ({lat}, {lon})");
        let response: ForecastResponse = self
            .agent
            .get(&self.url)
            .query("latitude", &lat.to_string())
            .query("longitude", &lon.to_string())
            .query(
                "hourly",
                "temperature_2m,precipitation_probability,uv_index",
            )
            .query(
                "current",
                "temperature_2m,apparent_temperature,wind_speed_10m,weather_code",
            )
            .query("temperature_unit", "celsius")
            .query("windspeed_unit", "kmh")
            .query("timezone", "auto")
            .call()
            .with_context(|| {
                format!("Error fetching forecast from {}", self.url)
            })?
            .into_json()
            .context("Error parsing forecast as JSON")?;
        Ok(response.into())
    }
}

impl Default for OpenMeteo {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Current,
    hourly: Hourly,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    apparent_temperature: f64,
    wind_speed_10m: f64,
    weather_code: u16,
}

/// Parallel arrays, one entry per hour. Open-Meteo uses null for hours it
/// doesn't have a value for
#[derive(Debug, Deserialize)]
struct Hourly {
    /// Local time, formatted like `2024-05-24T13:00`
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    uv_index: Vec<Option<f64>>,
}

impl From<ForecastResponse> for WeatherSnapshot {
    fn from(response: ForecastResponse) -> Self {
        let ForecastResponse { current, hourly } = response;
        let forecast = hourly
            .time
            .iter()
            .zip(&hourly.temperature_2m)
            .take(FORECAST_HOURS)
            .map(|(time, temp)| ForecastHour {
                label: hour_label(time),
                temp: round(temp.unwrap_or_default()),
            })
            .collect();

        Self {
            temp: round(current.temperature_2m),
            feels: round(current.apparent_temperature),
            wind_kmh: round(current.wind_speed_10m),
            pop: round(max_upcoming(&hourly.precipitation_probability)),
            uv: max_upcoming(&hourly.uv_index),
            desc: describe_code(current.weather_code).into(),
            forecast,
        }
    }
}

/// Highest value in the upcoming forecast window. Missing values count as 0
fn max_upcoming(values: &[Option<f64>]) -> f64 {
    values
        .iter()
        .take(FORECAST_HOURS)
        .map(|value| value.unwrap_or_default())
        .fold(0.0, f64::max)
}

fn round(value: f64) -> i32 {
    value.round() as i32
}

/// Format an hourly timestamp as a short label, e.g. `1 p.m.`. If the API
/// gives us something unparseable, just show it as-is
fn hour_label(time: &str) -> String {
    match NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M") {
        Ok(time) => {
            let (pm, hour) = time.hour12();
            format!("{hour} {}", if pm { "p.m." } else { "a.m." })
        }
        Err(_) => time.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_code() {
        assert_eq!(describe_code(0), "Clear");
        assert_eq!(describe_code(61), "Rain");
        assert_eq!(describe_code(95), "Thunderstorms");
        assert_eq!(describe_code(999), "Weather-ish");
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label("2024-05-24T00:00"), "12 a.m.");
        assert_eq!(hour_label("2024-05-24T09:00"), "9 a.m.");
        assert_eq!(hour_label("2024-05-24T12:00"), "12 p.m.");
        assert_eq!(hour_label("2024-05-24T13:00"), "1 p.m.");
        assert_eq!(hour_label("tomorrow"), "tomorrow");
    }

    #[test]
    fn test_from_response() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{
                "current": {
                    "time": "2024-05-24T13:00",
                    "temperature_2m": 21.6,
                    "apparent_temperature": 23.4,
                    "wind_speed_10m": 14.2,
                    "weather_code": 61
                },
                "hourly": {
                    "time": [
                        "2024-05-24T13:00", "2024-05-24T14:00",
                        "2024-05-24T15:00", "2024-05-24T16:00",
                        "2024-05-24T17:00", "2024-05-24T18:00",
                        "2024-05-24T19:00"
                    ],
                    "temperature_2m": [21.6, 22.4, 23.0, null, 22.5, 21.1, 19.0],
                    "precipitation_probability": [10, 40, null, 25, 5, 0, 90],
                    "uv_index": [5.2, 6.05, 4.0, 3.1, 1.0, 0.2, 9.0]
                }
            }"#,
        )
        .unwrap();
        let snapshot: WeatherSnapshot = response.into();

        assert_eq!(snapshot.temp, 22);
        assert_eq!(snapshot.feels, 23);
        assert_eq!(snapshot.wind_kmh, 14);
        // The 7th hour is outside the window
        assert_eq!(snapshot.pop, 40);
        assert_eq!(snapshot.uv, 6.05);
        assert_eq!(snapshot.desc, "Rain");
        assert_eq!(
            snapshot.forecast,
            vec![
                ForecastHour {
                    label: "1 p.m.".into(),
                    temp: 22
                },
                ForecastHour {
                    label: "2 p.m.".into(),
                    temp: 22
                },
                ForecastHour {
                    label: "3 p.m.".into(),
                    temp: 23
                },
                ForecastHour {
                    label: "4 p.m.".into(),
                    temp: 0
                },
                ForecastHour {
                    label: "5 p.m.".into(),
                    temp: 23
                },
                ForecastHour {
                    label: "6 p.m.".into(),
                    temp: 21
                },
            ]
        );
    }
}
