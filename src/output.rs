//! Delivery of synthesized audio to a file or the default audio device.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use rodio::{Decoder, OutputStreamBuilder, Sink};
use tracing::{debug, info};

use crate::error::{Result, SpeakError};

/// Where synthesized audio goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AudioOutput {
    /// The default audio device
    #[default]
    Speaker,
    File(PathBuf),
}

impl AudioOutput {
    pub fn is_speaker(&self) -> bool {
        matches!(self, Self::Speaker)
    }

    /// Write or play `audio`, returning once it is fully delivered.
    pub async fn deliver(&self, audio: &[u8]) -> Result<()> {
        match self {
            Self::File(path) => {
                tokio::fs::write(path, audio).await?;
                info!("Wrote {} bytes of audio to {}", audio.len(), path.display());
                Ok(())
            }
            Self::Speaker => {
                let audio = audio.to_vec();
                tokio::task::spawn_blocking(move || play(audio))
                    .await
                    .map_err(|e| SpeakError::Playback(format!("playback task failed: {e}")))?
            }
        }
    }
}

/// Decode and play on the default device. Blocks until playback ends.
fn play(audio: Vec<u8>) -> Result<()> {
    let t0 = Instant::now();

    let stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| SpeakError::Playback(format!("failed to open audio output: {e}")))?;
    let source = Decoder::new(Cursor::new(audio))
        .map_err(|e| SpeakError::Playback(format!("failed to decode audio: {e}")))?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    debug!("Playback started");
    sink.sleep_until_end();

    debug!("Playback finished in {}ms", t0.elapsed().as_millis());
    Ok(())
}
