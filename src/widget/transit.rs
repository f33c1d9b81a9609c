use crate::{
    config::ProviderKind,
    overlay::Context,
    surface::{Field, ListState, Row, Surface},
    util::Severity,
    widget::Widget,
};
use log::warn;
use std::{sync::Arc, time::Duration};

/// Service status for local transit routes
pub struct Transit {
    provider: ProviderKind,
    max_rows: usize,
    interval: Duration,
    surface: Arc<dyn Surface>,
}

impl Transit {
    /// (route, status, severity)
    const MOCK_ROWS: &'static [(&'static str, &'static str, Severity)] = &[
        ("ION 301", "10 min delay at Fairway", Severity::Warn),
        ("7 Mainline", "15 min delay due to traffic", Severity::Bad),
        ("201 Fischer-Hallman iXpress", "On time", Severity::Good),
    ];

    pub fn new(context: &Context) -> Self {
        let config = &context.config.transit;
        if let ProviderKind::Other(name) = &config.provider {
            warn!("Transit provider `{name}` is not supported yet");
        }
        Self {
            provider: config.provider.clone(),
            max_rows: config.max_rows.unwrap_or(usize::MAX),
            interval: config.update_interval(),
            surface: Arc::clone(&context.surface),
        }
    }

    fn list(&self) -> ListState {
        match self.provider {
            ProviderKind::Mock => ListState::Rows(
                Self::MOCK_ROWS
                    .iter()
                    .take(self.max_rows)
                    .map(|&(route, status, severity)| Row {
                        name: route.into(),
                        status: status.into(),
                        severity: Some(severity),
                        badge: None,
                    })
                    .collect(),
            ),
            ProviderKind::Other(_) => ListState::Unavailable,
        }
    }
}

impl Widget for Transit {
    fn name(&self) -> &'static str {
        "transit"
    }

    fn period(&self) -> Duration {
        self.interval
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        self.surface.set_list(Field::TransitList, self.list());
        Ok(())
    }
}
