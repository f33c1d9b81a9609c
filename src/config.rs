use crate::util::Color;
use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;
use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

/// Everything the overlay needs to know, loaded once at startup and never
/// modified afterward. Every section is optional, so a config only has to
/// mention the modules it cares about.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub branding: Branding,
    pub location: Location,
    pub modules: Modules,
    pub weather: WeatherConfig,
    pub traffic: TrafficConfig,
    pub transit: TransitConfig,
    pub ticker: TickerConfig,
    pub tts: TtsConfig,
    /// Where to dump rendered HTML. Omit to disable snapshots
    pub snapshot: Option<SnapshotConfig>,
}

impl Config {
    const PATH: &'static str = "./config.json";
    const SAMPLE_PATH: &'static str = "./config.sample.json";

    /// Load config from the local file, or the bundled sample if that fails
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Self::PATH, Self::SAMPLE_PATH)
    }

    /// Load config from `primary`. Any failure to read or parse it falls back
    /// to `fallback`. Failure to load the fallback is returned to the caller.
    pub fn load_from(
        primary: impl AsRef<Path>,
        fallback: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        match Self::load_file(primary.as_ref()) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("{err:#}; using {}", fallback.as_ref().display());
                Self::load_file(fallback.as_ref())
            }
        }
    }

    fn load_file(path: &Path) -> anyhow::Result<Self> {
        info!("Loading config from `{}`", path.display());
        let file = File::open(path).with_context(|| {
            format!("Error opening config file {}", path.display())
        })?;
        serde_json::from_reader(file).with_context(|| {
            format!("Error parsing config file {}", path.display())
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Branding {
    #[serde(default)]
    pub accent: Option<Color>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// IANA name, e.g. `America/Toronto`
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
}

impl Location {
    /// Label shown in the header. Region wins over city
    pub fn label(&self) -> &str {
        self.region
            .as_deref()
            .filter(|region| !region.is_empty())
            .or(self.city.as_deref())
            .unwrap_or_default()
    }
}

/// Enable flags. Anything missing is off
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Modules {
    pub clock: bool,
    pub weather: bool,
    pub traffic: bool,
    pub transit: bool,
    pub ticker: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub provider: WeatherProviderKind,
    #[serde(default)]
    pub update_seconds: Option<u64>,
}

impl WeatherConfig {
    pub fn update_interval(&self) -> Duration {
        seconds_or(self.update_seconds, 300)
    }
}

/// Open-Meteo is the only live source. Any other name gets canned data
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum WeatherProviderKind {
    OpenMeteo,
    Mock(String),
}

/// No provider means canned data
impl Default for WeatherProviderKind {
    fn default() -> Self {
        Self::Mock(String::new())
    }
}

impl From<String> for WeatherProviderKind {
    fn from(value: String) -> Self {
        if value == "open-meteo" {
            Self::OpenMeteo
        } else {
            Self::Mock(value)
        }
    }
}

/// Traffic and transit only have mock data. Any other provider name is a
/// source that hasn't been wired up yet
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum ProviderKind {
    Mock,
    Other(String),
}

/// No provider means no data source, same as an unknown one
impl Default for ProviderKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ProviderKind {
    fn from(value: String) -> Self {
        if value == "mock" {
            Self::Mock
        } else {
            Self::Other(value)
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrafficConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub update_seconds: Option<u64>,
}

impl TrafficConfig {
    pub fn update_interval(&self) -> Duration {
        seconds_or(self.update_seconds, 120)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Route {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TransitConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Cap on rendered rows. Unset shows everything
    #[serde(default)]
    pub max_rows: Option<usize>,
    #[serde(default)]
    pub update_seconds: Option<u64>,
}

impl TransitConfig {
    pub fn update_interval(&self) -> Duration {
        seconds_or(self.update_seconds, 60)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TickerConfig {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub speed_px_per_sec: Option<f64>,
    /// Width of the visible area
    #[serde(default)]
    pub viewport_px: Option<f64>,
    /// Average rendered width of one character, used to measure the strip
    #[serde(default)]
    pub glyph_px: Option<f64>,
}

impl TickerConfig {
    pub fn speed(&self) -> f64 {
        positive_or(self.speed_px_per_sec, 80.0)
    }

    pub fn viewport(&self) -> f64 {
        positive_or(self.viewport_px, 1920.0)
    }

    pub fn glyph_width(&self) -> f64 {
        positive_or(self.glyph_px, 14.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub voice_hint: Option<String>,
    #[serde(default)]
    pub every_seconds: Option<u64>,
}

impl TtsConfig {
    pub fn interval(&self) -> Duration {
        seconds_or(self.every_seconds, 45)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub every_seconds: Option<u64>,
}

impl SnapshotConfig {
    pub fn interval(&self) -> Duration {
        seconds_or(self.every_seconds, 1)
    }
}

/// Zero counts as unset
fn seconds_or(seconds: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(seconds.filter(|&s| s > 0).unwrap_or(default))
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|&v| v > 0.0).unwrap_or(default)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// Same document as the bundled sample, so tests don't depend on the
    /// working directory
    pub const SAMPLE: &str = include_str!("../config.sample.json");

    pub fn sample() -> Config {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_load_primary() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("config.json");
        fs::write(
            &primary,
            SAMPLE.replace("\"Morning Drive\"", "\"Evening Drive\""),
        )
        .unwrap();

        let config =
            Config::load_from(&primary, dir.path().join("nope.json")).unwrap();
        assert_eq!(config.branding.title, "Evening Drive");
    }

    #[test]
    fn test_fallback_missing_primary() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("config.sample.json");
        fs::write(&fallback, SAMPLE).unwrap();

        let config =
            Config::load_from(dir.path().join("config.json"), &fallback)
                .unwrap();
        assert_eq!(config.branding.title, "Morning Drive");
    }

    #[test]
    fn test_fallback_invalid_primary() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("config.json");
        let fallback = dir.path().join("config.sample.json");
        fs::write(&primary, "<html>404 Not Found</html>").unwrap();
        fs::write(&fallback, SAMPLE).unwrap();

        let config = Config::load_from(&primary, &fallback).unwrap();
        assert_eq!(config.branding.title, "Morning Drive");
    }

    #[test]
    fn test_fallback_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(
            dir.path().join("config.json"),
            dir.path().join("config.sample.json"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "branding": {"title": "T", "subtitle": "S"},
                "location": {"city": "Waterloo", "lat": 43.46, "lon": -80.52},
                "weather": {"provider": "mock", "update_seconds": 0},
                "traffic": {"provider": "google"},
                "transit": {"provider": "mock"},
                "ticker": {"items": []},
                "tts": {}
            }"#,
        )
        .unwrap();

        assert!(!config.modules.clock);
        assert_eq!(config.branding.accent, None);
        assert_eq!(config.location.label(), "Waterloo");
        assert_eq!(
            config.weather.provider,
            WeatherProviderKind::Mock("mock".into())
        );
        assert_eq!(config.weather.update_interval(), Duration::from_secs(300));
        assert_eq!(
            config.traffic.provider,
            ProviderKind::Other("google".into())
        );
        assert_eq!(config.traffic.update_interval(), Duration::from_secs(120));
        assert_eq!(config.transit.update_interval(), Duration::from_secs(60));
        assert_eq!(config.transit.max_rows, None);
        assert_eq!(config.ticker.speed(), 80.0);
        assert!(!config.tts.enabled);
        assert_eq!(config.tts.interval(), Duration::from_secs(45));
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn test_partial_primary_kept() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("config.json");
        let fallback = dir.path().join("config.sample.json");
        fs::write(
            &primary,
            r#"{
                "branding": {"title": "My Show"},
                "modules": {"clock": true},
                "weather": {"update_seconds": 600}
            }"#,
        )
        .unwrap();
        fs::write(&fallback, SAMPLE).unwrap();

        let config = Config::load_from(&primary, &fallback).unwrap();
        assert_eq!(config.branding.title, "My Show");
        assert!(config.modules.clock);
        assert!(!config.modules.weather);
        assert_eq!(
            config.weather.provider,
            WeatherProviderKind::Mock(String::new())
        );
        assert_eq!(config.weather.update_interval(), Duration::from_secs(600));
        assert_eq!(config.traffic.provider, ProviderKind::Other(String::new()));
        assert!(config.traffic.routes.is_empty());
        assert_eq!(config.transit.max_rows, None);
        assert!(config.ticker.items.is_empty());
        assert!(!config.tts.enabled);
        assert_eq!(config.location.label(), "");
    }

    #[test]
    fn test_sample() {
        let config = sample();
        assert_eq!(config.weather.provider, WeatherProviderKind::OpenMeteo);
        assert_eq!(config.branding.accent, Some(Color::DEFAULT_ACCENT));
        assert_eq!(config.location.label(), "Waterloo Region");
        assert!(config.modules.ticker);
    }
}
