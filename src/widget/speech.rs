use crate::{
    overlay::Context,
    speaker::{Speaker, Utterance, Voice},
    surface::{Field, Surface},
    widget::Widget,
};
use std::{sync::Arc, time::Duration};

/// Periodically reads the rendered weather and travel info out loud
pub struct Speech {
    voice_hint: String,
    interval: Duration,
    surface: Arc<dyn Surface>,
    speaker: Arc<dyn Speaker>,
}

impl Speech {
    pub fn new(context: &Context) -> Self {
        let config = &context.config.tts;
        Self {
            voice_hint: config.voice_hint.clone().unwrap_or_default(),
            interval: config.interval(),
            surface: Arc::clone(&context.surface),
            speaker: Arc::clone(&context.speaker),
        }
    }
}

impl Widget for Speech {
    fn name(&self) -> &'static str {
        "speech"
    }

    fn period(&self) -> Duration {
        self.interval
    }

    /// Give the other widgets a moment to render something worth reading
    fn initial_delay(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn update(&mut self) -> anyhow::Result<()> {
        let text = summary(&*self.surface);
        let voices = self.speaker.voices();
        let voice = select_voice(&voices, &self.voice_hint).cloned();
        // Newest summary wins, never queue behind a stale one
        self.speaker.cancel();
        self.speaker.speak(Utterance { text, voice })
    }
}

/// Build the spoken summary from what's currently on screen
pub fn summary(surface: &dyn Surface) -> String {
    let travel = surface.text(Field::TravelList).replace('\n', ". ");
    let desc = surface.text(Field::DetailDesc);
    let temp = surface.text(Field::DetailTemp);
    format!("Weather: {desc}, {temp} degrees. Travel times: {travel}.")
}

/// Pick the first voice whose name contains the hint, ignoring case. If
/// nothing matches, use the first voice available.
pub fn select_voice<'a>(voices: &'a [Voice], hint: &str) -> Option<&'a Voice> {
    let hint = hint.to_lowercase();
    voices
        .iter()
        .find(|voice| voice.name.to_lowercase().contains(&hint))
        .or_else(|| voices.first())
}
