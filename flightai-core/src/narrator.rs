// flightai-core/src/narrator.rs
use crate::audio::AudioPlayer;
use crate::providers::SpeechSynthesizer;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Speaks assistant replies aloud. Best effort: nothing here can fail a turn.
pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            synthesizer,
            player,
        }
    }

    /// Synthesizes `text` and plays it to completion. Errors are logged and
    /// swallowed.
    pub async fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            debug!("Nothing to speak.");
            return;
        }
        info!(chars = text.chars().count(), "Speaking reply.");

        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Error in speech synthesis.");
                return;
            }
        };

        // Playback blocks until the clip ends, keep it off the runtime threads.
        let player = Arc::clone(&self.player);
        match tokio::task::spawn_blocking(move || player.play(&audio)).await {
            Ok(Ok(())) => debug!("Finished playing reply."),
            Ok(Err(e)) => error!(error = %format!("{:#}", e), "Error in audio playback."),
            Err(e) => error!(error = %e, "Audio playback task failed."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeSynthesizer {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(anyhow!("tts offline"))
            } else {
                Ok(text.as_bytes().to_vec())
            }
        }
    }

    struct RecordingPlayer {
        fail: bool,
        played: Mutex<Vec<Vec<u8>>>,
    }

    impl AudioPlayer for RecordingPlayer {
        fn play(&self, audio: &[u8]) -> Result<()> {
            self.played.lock().unwrap().push(audio.to_vec());
            if self.fail {
                Err(anyhow!("no speakers"))
            } else {
                Ok(())
            }
        }
    }

    fn narrator(synth_fails: bool, player_fails: bool) -> (Narrator, Arc<FakeSynthesizer>, Arc<RecordingPlayer>) {
        let synthesizer = Arc::new(FakeSynthesizer {
            fail: synth_fails,
            calls: Mutex::new(Vec::new()),
        });
        let player = Arc::new(RecordingPlayer {
            fail: player_fails,
            played: Mutex::new(Vec::new()),
        });
        (
            Narrator::new(synthesizer.clone(), player.clone()),
            synthesizer,
            player,
        )
    }

    #[tokio::test]
    async fn test_speak_plays_synthesized_audio() {
        let (narrator, synthesizer, player) = narrator(false, false);
        narrator.speak("Berlin is $499.").await;
        assert_eq!(*synthesizer.calls.lock().unwrap(), vec!["Berlin is $499.".to_string()]);
        assert_eq!(*player.played.lock().unwrap(), vec![b"Berlin is $499.".to_vec()]);
    }

    #[tokio::test]
    async fn test_speak_swallows_synthesis_failure() {
        let (narrator, synthesizer, player) = narrator(true, false);
        narrator.speak("hello").await;
        assert_eq!(synthesizer.calls.lock().unwrap().len(), 1);
        assert!(player.played.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_speak_swallows_playback_failure() {
        let (narrator, _, player) = narrator(false, true);
        narrator.speak("hello").await;
        assert_eq!(player.played.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_speak_skips_blank_text() {
        let (narrator, synthesizer, _) = narrator(false, false);
        narrator.speak("   ").await;
        assert!(synthesizer.calls.lock().unwrap().is_empty());
    }
}
