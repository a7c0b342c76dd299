// flightai-core/src/audio.rs

//! Local playback of synthesized speech.
//!
//! The speech service returns MP3. With the `audio` feature the player decodes
//! it, re-encodes it as 16-bit PCM WAV in a temporary file and plays that file
//! on the default output device, blocking until playback ends.

use crate::errors::FlightAiError;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Plays encoded audio to completion. Blocking; callers run it off the async
/// runtime.
pub trait AudioPlayer: Send + Sync {
    fn play(&self, audio: &[u8]) -> Result<()>;
}

/// The best player this build supports.
pub fn default_player() -> Arc<dyn AudioPlayer> {
    #[cfg(feature = "audio")]
    {
        Arc::new(RodioPlayer)
    }
    #[cfg(not(feature = "audio"))]
    {
        Arc::new(SilentPlayer)
    }
}

/// Stand-in used when the crate is built without the `audio` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&self, audio: &[u8]) -> Result<()> {
        debug!(bytes = audio.len(), "Discarding audio, playback not compiled in.");
        Err(FlightAiError::Audio(
            "audio playback is unavailable (built without the `audio` feature)".to_string(),
        )
        .into())
    }
}

/// Runs `f` with the path of a fresh temporary file ending in `suffix`, then
/// removes the file whether or not `f` succeeded. A failed removal is logged
/// and does not change the result.
pub fn with_temp_file<T, F>(suffix: &str, f: F) -> Result<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    let temp = tempfile::Builder::new()
        .prefix("flightai-speech-")
        .suffix(suffix)
        .tempfile()
        .context("Failed to create temporary audio file")?;
    let path = temp.path().to_path_buf();
    debug!(path = %path.display(), "Created temporary audio file.");

    let result = f(&path);

    if let Err(e) = temp.close() {
        warn!(path = %path.display(), error = %e, "Failed to remove temporary audio file.");
    }
    result
}

#[cfg(feature = "audio")]
pub use rodio_player::{transcode_to_wav, RodioPlayer};

#[cfg(feature = "audio")]
mod rodio_player {
    use super::{with_temp_file, AudioPlayer};
    use crate::errors::FlightAiError;
    use anyhow::{Context, Result};
    use rodio::{Decoder, OutputStream, Sink, Source};
    use std::fs::File;
    use std::io::{BufReader, Cursor};
    use std::path::Path;
    use tracing::{debug, info};

    /// Plays through the default output device with `rodio`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RodioPlayer;

    impl AudioPlayer for RodioPlayer {
        fn play(&self, audio: &[u8]) -> Result<()> {
            with_temp_file(".wav", |wav_path| {
                transcode_to_wav(audio, wav_path)?;
                play_wav(wav_path)
            })
        }
    }

    /// Decodes compressed audio and writes it out as 16-bit PCM WAV.
    pub fn transcode_to_wav(audio: &[u8], wav_path: &Path) -> Result<()> {
        let decoder = Decoder::new(Cursor::new(audio.to_vec()))
            .map_err(|e| FlightAiError::Audio(format!("Failed to decode audio: {}", e)))?;
        let spec = hound::WavSpec {
            channels: decoder.channels(),
            sample_rate: decoder.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        debug!(channels = spec.channels, sample_rate = spec.sample_rate, "Transcoding audio to WAV.");

        let mut writer = hound::WavWriter::create(wav_path, spec)
            .with_context(|| format!("Failed to create WAV file {}", wav_path.display()))?;
        for sample in decoder {
            writer.write_sample(sample).context("Failed to write WAV sample")?;
        }
        writer.finalize().context("Failed to finalize WAV file")?;
        Ok(())
    }

    fn play_wav(wav_path: &Path) -> Result<()> {
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| FlightAiError::Audio(format!("No audio output device: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| FlightAiError::Audio(format!("Failed to open audio sink: {}", e)))?;
        let file = File::open(wav_path)
            .with_context(|| format!("Failed to open {}", wav_path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| FlightAiError::Audio(format!("Failed to read WAV: {}", e)))?;
        sink.append(source);
        info!("Playing synthesized speech.");
        sink.sleep_until_end();
        Ok(())
    }
}
