//! The overlay ties everything together: it owns the application context and
//! a handle to every running widget.

use crate::{
    config::Config,
    speaker::Speaker,
    surface::{Field, Surface},
    util::Color,
    widget::{
        self, clock::Clock, speech::Speech, ticker::Ticker, traffic::Traffic,
        transit::Transit, weather::Weather, WidgetHandle,
    },
};
use indexmap::IndexMap;
use log::info;
use std::sync::Arc;

/// Everything a widget needs to build itself. Cheap to clone
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub surface: Arc<dyn Surface>,
    pub speaker: Arc<dyn Speaker>,
}

impl Context {
    pub fn new(
        config: Config,
        surface: Arc<dyn Surface>,
        speaker: Arc<dyn Speaker>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            surface,
            speaker,
        }
    }
}

/// Each independently startable piece of the overlay
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Module {
    Clock,
    Weather,
    Traffic,
    Transit,
    Ticker,
    Speech,
}

impl Module {
    pub const ALL: &'static [Self] = &[
        Self::Clock,
        Self::Weather,
        Self::Traffic,
        Self::Transit,
        Self::Ticker,
        Self::Speech,
    ];

    /// Should this module run at startup? Speech has its own switch
    pub fn is_enabled(self, config: &Config) -> bool {
        let modules = &config.modules;
        match self {
            Self::Clock => modules.clock,
            Self::Weather => modules.weather,
            Self::Traffic => modules.traffic,
            Self::Transit => modules.transit,
            Self::Ticker => modules.ticker,
            Self::Speech => config.tts.enabled,
        }
    }
}

/// A running overlay
pub struct Overlay {
    context: Context,
    widgets: IndexMap<Module, WidgetHandle>,
}

impl Overlay {
    /// Apply branding, then start every enabled module. Must be called from
    /// within a tokio runtime.
    pub fn start(context: Context) -> Self {
        apply_branding(&context.config, &*context.surface);
        let mut overlay = Self {
            context,
            widgets: IndexMap::new(),
        };
        for &module in Module::ALL {
            if module.is_enabled(&overlay.context.config) {
                overlay.spawn(module);
            }
        }
        overlay
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Modules that are currently running, in start order
    pub fn running(&self) -> impl '_ + Iterator<Item = Module> {
        self.widgets.keys().copied()
    }

    /// Stop a module. Returns whether it was running
    pub async fn stop(&mut self, module: Module) -> bool {
        match self.widgets.shift_remove(&module) {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => false,
        }
    }

    /// Stop a module if it's running, then start a fresh instance of it. This
    /// works for modules that weren't enabled at startup too.
    pub async fn restart(&mut self, module: Module) {
        self.stop(module).await;
        self.spawn(module);
    }

    /// Stop every module
    pub async fn shutdown(mut self) {
        info!("Shutting down overlay");
        for (_, handle) in self.widgets.drain(..) {
            handle.stop().await;
        }
    }

    fn spawn(&mut self, module: Module) {
        let context = &self.context;
        let handle = match module {
            Module::Clock => widget::spawn(Clock::new(context)),
            Module::Weather => widget::spawn(Weather::new(context)),
            Module::Traffic => widget::spawn(Traffic::new(context)),
            Module::Transit => widget::spawn(Transit::new(context)),
            Module::Ticker => widget::spawn(Ticker::new(context)),
            Module::Speech => widget::spawn(Speech::new(context)),
        };
        self.widgets.insert(module, handle);
    }
}

/// Write branding into the header. Safe to call more than once
pub fn apply_branding(config: &Config, surface: &dyn Surface) {
    let branding = &config.branding;
    surface.set_accent(branding.accent.unwrap_or(Color::DEFAULT_ACCENT));
    surface.set_text(Field::Title, &branding.title);
    surface.set_text(Field::Subtitle, &branding.subtitle);
    surface.set_text(Field::Location, config.location.label());
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        config::{tests::sample, WeatherProviderKind},
        speaker::LogSpeaker,
        surface::MemorySurface,
    };
    use std::time::Duration;
    use tokio::time;

    pub fn context(config: Config, surface: &Arc<MemorySurface>) -> Context {
        context_with_speaker(config, surface, Arc::new(LogSpeaker))
    }

    pub fn context_with_speaker(
        config: Config,
        surface: &Arc<MemorySurface>,
        speaker: Arc<dyn Speaker>,
    ) -> Context {
        Context::new(config, Arc::clone(surface) as Arc<dyn Surface>, speaker)
    }

    /// Sample config, minus anything that would hit the network
    fn offline() -> Config {
        let mut config = sample();
        config.weather.provider = WeatherProviderKind::Mock("mock".into());
        config
    }

    #[test]
    fn test_branding() {
        let surface = MemorySurface::default();
        let config = sample();
        apply_branding(&config, &surface);
        let html = surface.render_html();
        apply_branding(&config, &surface);

        assert_eq!(surface.render_html(), html);
        assert_eq!(surface.text(Field::Title), "Morning Drive");
        assert_eq!(surface.text(Field::Subtitle), "Live from the studio");
        assert_eq!(surface.text(Field::Location), "Waterloo Region");
        assert_eq!(surface.accent(), Some(Color::DEFAULT_ACCENT));
    }

    #[test]
    fn test_branding_defaults() {
        let surface = MemorySurface::default();
        let mut config = sample();
        config.branding.accent = None;
        config.location.region = None;
        apply_branding(&config, &surface);

        assert_eq!(surface.accent(), Some(Color::DEFAULT_ACCENT));
        assert_eq!(surface.text(Field::Location), "Kitchener");
    }

    #[test]
    fn test_is_enabled() {
        let mut config = sample();
        config.modules.transit = false;
        config.tts.enabled = true;
        assert!(Module::Clock.is_enabled(&config));
        assert!(!Module::Transit.is_enabled(&config));
        assert!(Module::Speech.is_enabled(&config));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start() {
        let surface = Arc::new(MemorySurface::default());
        let mut config = offline();
        config.modules.traffic = false;
        let overlay = Overlay::start(context(config, &surface));

        assert_eq!(
            overlay.running().collect::<Vec<_>>(),
            vec![Module::Clock, Module::Weather, Module::Transit, Module::Ticker]
        );
        time::sleep(Duration::from_millis(100)).await;

        assert_eq!(surface.text(Field::Title), "Morning Drive");
        assert_eq!(surface.text(Field::WeatherTemp), "22°");
        assert_eq!(surface.text(Field::TravelList), "");
        assert!(!surface.text(Field::Clock).is_empty());
        assert!(surface.offset(Field::Ticker).is_some());
        overlay.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_restart() {
        let surface = Arc::new(MemorySurface::default());
        let mut config = offline();
        config.modules = Default::default();
        let mut overlay = Overlay::start(context(config, &surface));
        assert_eq!(overlay.running().count(), 0);
        assert!(!overlay.stop(Module::Traffic).await);

        overlay.restart(Module::Traffic).await;
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            surface.text(Field::TravelList).lines().next(),
            Some("Hwy 8 to Cambridge 22 min Normal")
        );

        assert!(overlay.stop(Module::Traffic).await);
        assert_eq!(overlay.running().count(), 0);
        overlay.shutdown().await;
    }
}
