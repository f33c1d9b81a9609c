use crate::{
    overlay::Context,
    surface::{Field, Surface},
    widget::Widget,
};
use chrono::{NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use log::warn;
use std::{sync::Arc, time::Duration};

/// Wall clock, in the overlay's configured timezone
pub struct Clock {
    timezone: Tz,
    surface: Arc<dyn Surface>,
}

impl Clock {
    const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Toronto;

    pub fn new(context: &Context) -> Self {
        let timezone = match context.config.location.timezone.as_deref() {
            None | Some("") => Self::DEFAULT_TIMEZONE,
            Some(name) => name.parse().unwrap_or_else(|err| {
                warn!(
                    "Unknown timezone `{name}` ({err}), using {}",
                    Self::DEFAULT_TIMEZONE
                );
                Self::DEFAULT_TIMEZONE
            }),
        };
        Self {
            timezone,
            surface: Arc::clone(&context.surface),
        }
    }
}

impl Widget for Clock {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn period(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        let now = Utc::now().with_timezone(&self.timezone).time();
        self.surface.set_text(Field::Clock, &format_clock(now));
        Ok(())
    }
}

/// Two-digit 12-hour time, Canadian style: `09:05 a.m.`
pub fn format_clock(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    let suffix = if pm { "p.m." } else { "a.m." };
    format!("{hour:02}:{:02} {suffix}", time.minute())
}
