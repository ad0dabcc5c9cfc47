//! Speech contracts the game flow talks to.
//!
//! Backends are injected as trait objects; the flow only ever calls them
//! through the bounded helpers here, so a stuck or failing backend costs at
//! most one timeout and a log line.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use drill_core::model::VoiceParams;

use crate::error::SpeechError;

/// Short sound played after an answer is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    Correct,
    Encourage,
}

impl FeedbackCue {
    #[must_use]
    pub fn for_result(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Encourage
        }
    }
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text` in the BCP 47 language `lang` with the given voice.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the backend cannot speak.
    async fn speak(&self, text: &str, lang: &str, voice: VoiceParams) -> Result<(), SpeechError>;

    /// Play a feedback cue. Backends without sounds can keep the default.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the backend fails to play the cue.
    async fn play_cue(&self, _cue: FeedbackCue) -> Result<(), SpeechError> {
        Ok(())
    }
}

#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Listen once and return the recognised transcript.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if nothing was recognised or the backend failed.
    async fn listen(&self) -> Result<String, SpeechError>;
}

/// Backend that speaks nothing and hears nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

#[async_trait]
impl SpeechOutput for SilentSpeech {
    async fn speak(&self, _text: &str, _lang: &str, _voice: VoiceParams) -> Result<(), SpeechError> {
        Ok(())
    }
}

#[async_trait]
impl SpeechInput for SilentSpeech {
    async fn listen(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Speak and always resolve: failures and timeouts are logged.
pub async fn speak_bounded(
    output: &dyn SpeechOutput,
    text: &str,
    lang: &str,
    voice: VoiceParams,
    timeout: Duration,
) {
    match tokio::time::timeout(timeout, output.speak(text, lang, voice)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(text, error = %err, "speech output failed"),
        Err(_) => warn!(text, ?timeout, "speech output timed out"),
    }
}

/// Play a cue and always resolve: failures and timeouts are logged.
pub async fn play_cue_bounded(output: &dyn SpeechOutput, cue: FeedbackCue, timeout: Duration) {
    match tokio::time::timeout(timeout, output.play_cue(cue)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(?cue, error = %err, "feedback cue failed"),
        Err(_) => warn!(?cue, ?timeout, "feedback cue timed out"),
    }
}

/// Listen once, bounded by `timeout`.
///
/// # Errors
///
/// Returns the backend's `SpeechError`, or `SpeechError::Timeout` when the
/// backend does not answer in time.
pub async fn listen_bounded(
    input: &dyn SpeechInput,
    timeout: Duration,
) -> Result<String, SpeechError> {
    tokio::time::timeout(timeout, input.listen())
        .await
        .map_err(|_| SpeechError::Timeout(timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl SpeechOutput for Stalled {
        async fn speak(
            &self,
            _text: &str,
            _lang: &str,
            _voice: VoiceParams,
        ) -> Result<(), SpeechError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[async_trait]
    impl SpeechInput for Stalled {
        async fn listen(&self) -> Result<String, SpeechError> {
            std::future::pending::<()>().await;
            Ok(String::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_output_resolves_after_timeout() {
        speak_bounded(
            &Stalled,
            "42",
            "zh-CN",
            VoiceParams::default(),
            Duration::from_millis(8000),
        )
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_input_reports_timeout() {
        let err = listen_bounded(&Stalled, Duration::from_millis(8000))
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Timeout(_)));
    }

    #[tokio::test]
    async fn silent_backend_cannot_listen() {
        assert!(matches!(
            SilentSpeech.listen().await,
            Err(SpeechError::Unsupported)
        ));
        assert!(SilentSpeech
                .speak("7", "zh-CN", VoiceParams::default()).await.is_ok());
        assert!(SilentSpeech.play_cue(FeedbackCue::Correct).await.is_ok());
    }

    #[test]
    fn cue_follows_result() {
        assert_eq!(FeedbackCue::for_result(true), FeedbackCue::Correct);
        assert_eq!(FeedbackCue::for_result(false), FeedbackCue::Encourage);
    }
}
