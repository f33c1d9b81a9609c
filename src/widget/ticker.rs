use crate::{
    overlay::Context,
    surface::{strip_text, Field, Surface},
    widget::Widget,
};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

/// Horizontally scrolling strip of announcements. The strip enters from the
/// right edge of the viewport, scrolls left, and starts over once it's fully
/// off screen.
pub struct Ticker {
    items: Vec<String>,
    /// px/s
    speed: f64,
    viewport: f64,
    strip_width: f64,
    /// Left edge of the strip, relative to the left edge of the viewport
    position: f64,
    last_frame: Option<Instant>,
    surface: Arc<dyn Surface>,
}

impl Ticker {
    /// Roughly 60 frames per second. Speed doesn't depend on this, only
    /// smoothness
    const FRAME: Duration = Duration::from_millis(16);

    pub fn new(context: &Context) -> Self {
        let config = &context.config.ticker;
        let viewport = config.viewport();
        let strip_width = strip_text(&config.items).chars().count() as f64
            * config.glyph_width();
        Self {
            items: config.items.clone(),
            speed: config.speed(),
            viewport,
            strip_width,
            position: viewport,
            last_frame: None,
            surface: Arc::clone(&context.surface),
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Move the strip by however far it travels in `elapsed`. Once the strip
    /// has completely left the viewport, it jumps back to the right edge.
    pub fn advance(&mut self, elapsed: Duration) -> f64 {
        self.position -= self.speed * elapsed.as_secs_f64();
        if self.position < -self.strip_width {
            self.position = self.viewport;
        }
        self.position
    }
}

impl Widget for Ticker {
    fn name(&self) -> &'static str {
        "ticker"
    }

    fn period(&self) -> Duration {
        Self::FRAME
    }

    fn on_start(&mut self) -> anyhow::Result<()> {
        self.surface.set_strip(Field::Ticker, &self.items);
        self.surface.set_offset(Field::Ticker, self.position);
        Ok(())
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let elapsed = self
            .last_frame
            .map(|last_frame| now - last_frame)
            .unwrap_or_default();
        self.last_frame = Some(now);

        let position = self.advance(elapsed);
        self.surface.set_offset(Field::Ticker, position);
        Ok(())
    }
}
