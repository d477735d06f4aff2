//! Output format identifiers and the container/quality lookup table.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{Result, SpeakError};

/// Output format identifiers understood by the synthesis service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[non_exhaustive]
pub enum AudioFormat {
    #[strum(serialize = "amr-wb-16000hz")]
    AmrWb16000Hz,
    #[strum(serialize = "audio-16khz-128kbitrate-mono-mp3")]
    Audio16Khz128KBitRateMonoMp3,
    #[strum(serialize = "audio-16khz-16bit-32kbps-mono-opus")]
    Audio16Khz16Bit32KbpsMonoOpus,
    #[strum(serialize = "audio-16khz-32kbitrate-mono-mp3")]
    Audio16Khz32KBitRateMonoMp3,
    #[strum(serialize = "audio-16khz-64kbitrate-mono-mp3")]
    Audio16Khz64KBitRateMonoMp3,
    #[strum(serialize = "audio-24khz-160kbitrate-mono-mp3")]
    Audio24Khz160KBitRateMonoMp3,
    #[strum(serialize = "audio-24khz-16bit-24kbps-mono-opus")]
    Audio24Khz16Bit24KbpsMonoOpus,
    #[strum(serialize = "audio-24khz-16bit-48kbps-mono-opus")]
    Audio24Khz16Bit48KbpsMonoOpus,
    #[strum(serialize = "audio-24khz-48kbitrate-mono-mp3")]
    Audio24Khz48KBitRateMonoMp3,
    #[strum(serialize = "audio-24khz-96kbitrate-mono-mp3")]
    Audio24Khz96KBitRateMonoMp3,
    #[strum(serialize = "audio-48khz-192kbitrate-mono-mp3")]
    Audio48Khz192KBitRateMonoMp3,
    #[strum(serialize = "audio-48khz-96kbitrate-mono-mp3")]
    Audio48Khz96KBitRateMonoMp3,
    #[strum(serialize = "ogg-16khz-16bit-mono-opus")]
    Ogg16Khz16BitMonoOpus,
    #[strum(serialize = "ogg-24khz-16bit-mono-opus")]
    Ogg24Khz16BitMonoOpus,
    #[strum(serialize = "ogg-48khz-16bit-mono-opus")]
    Ogg48Khz16BitMonoOpus,
    #[strum(serialize = "raw-16khz-16bit-mono-pcm")]
    Raw16Khz16BitMonoPcm,
    #[strum(serialize = "raw-16khz-16bit-mono-truesilk")]
    Raw16Khz16BitMonoTrueSilk,
    #[strum(serialize = "raw-22050hz-16bit-mono-pcm")]
    Raw22050Hz16BitMonoPcm,
    #[strum(serialize = "raw-24khz-16bit-mono-pcm")]
    Raw24Khz16BitMonoPcm,
    #[strum(serialize = "raw-24khz-16bit-mono-truesilk")]
    Raw24Khz16BitMonoTrueSilk,
    #[strum(serialize = "raw-44100hz-16bit-mono-pcm")]
    Raw44100Hz16BitMonoPcm,
    #[strum(serialize = "raw-48khz-16bit-mono-pcm")]
    Raw48Khz16BitMonoPcm,
    #[strum(serialize = "raw-8khz-16bit-mono-pcm")]
    Raw8Khz16BitMonoPcm,
    #[strum(serialize = "raw-8khz-8bit-mono-alaw")]
    Raw8Khz8BitMonoALaw,
    #[strum(serialize = "raw-8khz-8bit-mono-mulaw")]
    Raw8Khz8BitMonoMULaw,
    #[strum(serialize = "riff-16khz-16bit-mono-pcm")]
    Riff16Khz16BitMonoPcm,
    #[strum(serialize = "riff-22050hz-16bit-mono-pcm")]
    Riff22050Hz16BitMonoPcm,
    #[default]
    #[strum(serialize = "riff-24khz-16bit-mono-pcm")]
    Riff24Khz16BitMonoPcm,
    #[strum(serialize = "riff-44100hz-16bit-mono-pcm")]
    Riff44100Hz16BitMonoPcm,
    #[strum(serialize = "riff-48khz-16bit-mono-pcm")]
    Riff48Khz16BitMonoPcm,
    #[strum(serialize = "riff-8khz-16bit-mono-pcm")]
    Riff8Khz16BitMonoPcm,
    #[strum(serialize = "riff-8khz-8bit-mono-alaw")]
    Riff8Khz8BitMonoALaw,
    #[strum(serialize = "riff-8khz-8bit-mono-mulaw")]
    Riff8Khz8BitMonoMULaw,
    #[strum(serialize = "webm-16khz-16bit-mono-opus")]
    Webm16Khz16BitMonoOpus,
    #[strum(serialize = "webm-24khz-16bit-24kbps-mono-opus")]
    Webm24Khz16Bit24KbpsMonoOpus,
    #[strum(serialize = "webm-24khz-16bit-mono-opus")]
    Webm24Khz16BitMonoOpus,
}

impl AudioFormat {
    /// The service identifier, e.g. `riff-24khz-16bit-mono-pcm`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parse a raw format override, naming the bad value on failure.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| {
            SpeakError::Validation(format!(
                "Invalid format: {name}. Run with --list-qualities-and-formats to see available formats."
            ))
        })
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// True for RIFF (WAV) formats, the only ones the speaker path decodes.
    pub fn is_riff(self) -> bool {
        self.as_str().starts_with("riff-")
    }
}

/// Audio container selected with `--wav`/`--mp3`/`--ogg`/`--webm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum Container {
    #[default]
    Wav,
    Mp3,
    Ogg,
    Webm,
}

impl Container {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Webm => "webm",
        }
    }

    /// The quality table of this container, lowest quality first.
    pub fn qualities(self) -> &'static [(i32, AudioFormat)] {
        use AudioFormat::*;

        match self {
            Self::Wav => &[
                (-2, Riff8Khz16BitMonoPcm),
                (-1, Riff16Khz16BitMonoPcm),
                (0, Riff24Khz16BitMonoPcm),
                (1, Riff24Khz16BitMonoPcm),
            ],
            Self::Mp3 => &[
                (-4, Audio16Khz32KBitRateMonoMp3),
                (-3, Audio16Khz64KBitRateMonoMp3),
                (-2, Audio16Khz128KBitRateMonoMp3),
                (-1, Audio24Khz48KBitRateMonoMp3),
                (0, Audio24Khz96KBitRateMonoMp3),
                (1, Audio24Khz160KBitRateMonoMp3),
                (2, Audio48Khz96KBitRateMonoMp3),
                (3, Audio48Khz192KBitRateMonoMp3),
            ],
            Self::Ogg => &[
                (-1, Ogg16Khz16BitMonoOpus),
                (0, Ogg24Khz16BitMonoOpus),
                (1, Ogg48Khz16BitMonoOpus),
            ],
            Self::Webm => &[
                (-1, Webm16Khz16BitMonoOpus),
                (0, Webm24Khz16BitMonoOpus),
                (1, Webm24Khz16Bit24KbpsMonoOpus),
            ],
        }
    }

    /// Inclusive (min, max) quality accepted by this container.
    pub fn quality_range(self) -> (i32, i32) {
        let table = self.qualities();
        (table[0].0, table[table.len() - 1].0)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Container {
    type Err = SpeakError;

    fn from_str(name: &str) -> Result<Self> {
        Self::all()
            .find(|container| container.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                SpeakError::Validation(format!(
                    "Unknown container: {name}. Expected one of wav, mp3, ogg, webm."
                ))
            })
    }
}

/// Resolve a container and quality to a concrete format.
pub fn resolve(container: Container, quality: i32) -> Result<AudioFormat> {
    container
        .qualities()
        .iter()
        .find(|(q, _)| *q == quality)
        .map(|(_, format)| *format)
        .ok_or_else(|| {
            let (min, max) = container.quality_range();
            SpeakError::Validation(format!(
                "Invalid quality {quality} for {container}. Valid qualities are {min}..={max}."
            ))
        })
}

/// Resolve by container name, rejecting unknown containers.
pub fn resolve_named(container: &str, quality: i32) -> Result<AudioFormat> {
    resolve(container.parse()?, quality)
}

/// wav, quality 0.
pub fn resolve_default() -> AudioFormat {
    AudioFormat::Riff24Khz16BitMonoPcm
}
