use crate::{
    config::{ProviderKind, Route},
    overlay::Context,
    surface::{Field, ListState, Row, Surface},
    util::Severity,
    widget::Widget,
};
use log::warn;
use std::{sync::Arc, time::Duration};

/// Drive times for the configured routes
pub struct Traffic {
    provider: ProviderKind,
    routes: Vec<Route>,
    interval: Duration,
    surface: Arc<dyn Surface>,
}

impl Traffic {
    /// Mock drive times, cycled across routes
    const MOCK_MINUTES: [u32; 3] = [22, 35, 48];

    pub fn new(context: &Context) -> Self {
        let config = &context.config.traffic;
        if let ProviderKind::Other(name) = &config.provider {
            warn!("Traffic provider `{name}` is not supported yet");
        }
        Self {
            provider: config.provider.clone(),
            routes: config.routes.clone(),
            interval: config.update_interval(),
            surface: Arc::clone(&context.surface),
        }
    }

    /// Build the full list for this cycle
    fn list(&self) -> ListState {
        match self.provider {
            ProviderKind::Mock => ListState::Rows(
                self.routes
                    .iter()
                    .zip(Self::MOCK_MINUTES.iter().cycle())
                    .map(|(route, &minutes)| route_row(route, minutes))
                    .collect(),
            ),
            ProviderKind::Other(_) => ListState::Unavailable,
        }
    }
}

impl Widget for Traffic {
    fn name(&self) -> &'static str {
        "traffic"
    }

    fn period(&self) -> Duration {
        self.interval
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        self.surface.set_list(Field::TravelList, self.list());
        Ok(())
    }
}

fn route_row(route: &Route, minutes: u32) -> Row {
    let severity = Severity::from_minutes(minutes);
    Row {
        name: route.name.clone(),
        status: format!("{minutes} min"),
        severity: Some(severity),
        badge: Some(severity.badge().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::tests::sample, overlay::tests::context,
        surface::MemorySurface,
    };

    fn routes(names: &[&str]) -> Vec<Route> {
        names
            .iter()
            .map(|name| Route {
                name: (*name).into(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_mock() {
        let surface = Arc::new(MemorySurface::default());
        let mut config = sample();
        config.traffic.routes = routes(&["A", "B", "C", "D"]);
        let mut traffic = Traffic::new(&context(config, &surface));
        traffic.update().await.unwrap();

        let Some(ListState::Rows(rows)) = surface.list(Field::TravelList)
        else {
            panic!("Travel list not rendered");
        };
        let summary: Vec<_> = rows
            .iter()
            .map(|row| (row.name.as_str(), row.status.as_str(), row.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A", "22 min", Some(Severity::Good)),
                ("B", "35 min", Some(Severity::Warn)),
                ("C", "48 min", Some(Severity::Bad)),
                ("D", "22 min", Some(Severity::Good)),
            ]
        );
        assert_eq!(rows[1].badge.as_deref(), Some("Slow"));
    }

    #[tokio::test]
    async fn test_rebuilds_list() {
        let surface = Arc::new(MemorySurface::default());
        let mut config = sample();
        config.traffic.routes = routes(&["A"]);
        let mut traffic = Traffic::new(&context(config, &surface));
        traffic.update().await.unwrap();
        traffic.update().await.unwrap();
        assert_eq!(surface.text(Field::TravelList), "A 22 min Normal");
    }

    #[tokio::test]
    async fn test_unsupported_provider() {
        let surface = Arc::new(MemorySurface::default());
        surface.set_list(
            Field::TravelList,
            ListState::Rows(vec![route_row(
                &Route { name: "Old".into() },
                30,
            )]),
        );
        let mut config = sample();
        config.traffic.provider = ProviderKind::Other("here".into());
        let mut traffic = Traffic::new(&context(config, &surface));
        traffic.update().await.unwrap();

        // Stale rows are replaced, not left up
        assert_eq!(
            surface.list(Field::TravelList),
            Some(ListState::Unavailable)
        );
    }
}
