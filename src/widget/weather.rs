use crate::{
    config::WeatherProviderKind,
    overlay::Context,
    surface::{Field, ListState, Row, Surface},
    weather::{OpenMeteo, WeatherSnapshot},
    widget::Widget,
};
use anyhow::Context as _;
use std::{sync::Arc, time::Duration};
use tokio::task;

/// Where weather data comes from
#[derive(Clone, Debug)]
pub enum WeatherProvider {
    OpenMeteo(OpenMeteo),
    Mock,
}

/// Current conditions, details, and a short hourly forecast
pub struct Weather {
    provider: WeatherProvider,
    lat: f64,
    lon: f64,
    interval: Duration,
    surface: Arc<dyn Surface>,
}

impl Weather {
    pub fn new(context: &Context) -> Self {
        let config = &context.config;
        let provider = match config.weather.provider {
            WeatherProviderKind::OpenMeteo => {
                WeatherProvider::OpenMeteo(OpenMeteo::new())
            }
            WeatherProviderKind::Mock(_) => WeatherProvider::Mock,
        };
        Self {
            provider,
            lat: config.location.lat,
            lon: config.location.lon,
            interval: config.weather.update_interval(),
            surface: Arc::clone(&context.surface),
        }
    }

    async fn fetch(&self) -> anyhow::Result<WeatherSnapshot> {
        match &self.provider {
            WeatherProvider::OpenMeteo(client) => {
                let client = client.clone();
                let (lat, lon) = (self.lat, self.lon);
                task::spawn_blocking(move || client.fetch(lat, lon))
                    .await
                    .context("Weather fetch task failed")?
            }
            WeatherProvider::Mock => Ok(WeatherSnapshot::mock()),
        }
    }
}

impl Widget for Weather {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn period(&self) -> Duration {
        self.interval
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        // If the fetch fails, bail before touching anything so the last
        // good render stays up
        let snapshot = self.fetch().await?;
        render(&snapshot, &*self.surface);
        Ok(())
    }
}

/// Write a snapshot into every weather field
pub fn render(snapshot: &WeatherSnapshot, surface: &dyn Surface) {
    let WeatherSnapshot {
        temp,
        feels,
        wind_kmh,
        pop,
        uv,
        desc,
        forecast,
    } = snapshot;
    surface.set_text(Field::WeatherTemp, &format!("{temp}°"));
    surface.set_text(Field::WeatherDesc, desc);
    surface.set_text(Field::DetailTemp, &temp.to_string());
    surface.set_text(Field::DetailFeels, &format!("{feels}°C"));
    surface.set_text(Field::DetailWind, &format!("{wind_kmh} km/h"));
    surface.set_text(Field::DetailPrecip, &format!("{pop}%"));
    surface.set_text(Field::DetailUv, &uv.to_string());
    surface.set_text(Field::DetailDesc, desc);

    let cells = forecast
        .iter()
        .map(|hour| Row {
            name: hour.label.clone(),
            status: format!("{}°", hour.temp),
            severity: None,
            badge: None,
        })
        .collect();
    surface.set_list(Field::Forecast, ListState::Rows(cells));
}
