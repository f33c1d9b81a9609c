//! Text-to-speech output. The speech widget decides *what* to say; a
//! [Speaker] is responsible for actually saying it.

use log::{info, trace};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Voice {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Voice to speak with. `None` uses the platform default
    pub voice: Option<Voice>,
}

/// A speech synthesizer
pub trait Speaker: Send + Sync {
    /// Voices available on this system, in platform order
    fn voices(&self) -> Vec<Voice>;

    /// Stop anything currently being spoken. No-op if nothing is
    fn cancel(&self);

    /// Start speaking. Returns once speech has been queued, not once it's
    /// finished
    fn speak(&self, utterance: Utterance) -> anyhow::Result<()>;
}

/// Speaker that writes utterances to the log instead of playing audio. Used
/// when no synthesizer is hooked up
#[derive(Debug, Default)]
pub struct LogSpeaker;

impl LogSpeaker {
    const VOICE: &'static str = "log";
}

impl Speaker for LogSpeaker {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: Self::VOICE.into(),
        }]
    }

    fn cancel(&self) {
        trace!("Cancelling speech");
    }

    fn speak(&self, utterance: Utterance) -> anyhow::Result<()> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|voice| voice.name.as_str())
            .unwrap_or("default");
        info!("Speaking ({voice}): {}", utterance.text);
        Ok(())
    }
}
