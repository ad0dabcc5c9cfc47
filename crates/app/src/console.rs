use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use drill_core::model::VoiceParams;
use services::speech::{FeedbackCue, SpeechInput, SpeechOutput};
use services::SpeechError;

/// Terminal stand-in for a speaker: numbers are printed instead of voiced.
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

#[async_trait]
impl SpeechOutput for ConsoleSpeaker {
    async fn speak(&self, text: &str, lang: &str, voice: VoiceParams) -> Result<(), SpeechError> {
        debug!(text, lang, rate = voice.rate, "speak");
        println!("  ♪ {text}");
        Ok(())
    }

    async fn play_cue(&self, cue: FeedbackCue) -> Result<(), SpeechError> {
        if cue == FeedbackCue::Correct {
            // Terminal bell.
            print!("\x07");
        }
        Ok(())
    }
}

/// Terminal stand-in for a microphone: hears the last typed line.
#[derive(Debug, Default)]
pub struct TypedMicrophone {
    pending: Mutex<Option<String>>,
}

impl TypedMicrophone {
    pub fn feed(&self, line: String) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(line);
        }
    }
}

#[async_trait]
impl SpeechInput for TypedMicrophone {
    async fn listen(&self) -> Result<String, SpeechError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| SpeechError::Backend(e.to_string()))?;
        pending.take().ok_or(SpeechError::NoSpeech)
    }
}
