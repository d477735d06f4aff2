//! Command-line arguments and their value parsers.

use std::path::PathBuf;

use azspeak::{AudioFormat, Prosody, Role};
use clap::{Parser, ValueEnum};
use strum::IntoEnumIterator;

const RATE_WORDS: [&str; 6] = ["default", "x-slow", "slow", "medium", "fast", "x-fast"];
const PITCH_WORDS: [&str; 6] = ["default", "x-low", "low", "medium", "high", "x-high"];

#[derive(Parser, Debug)]
#[command(
    name = "azspeak",
    version,
    about = "Speak text with the Azure Speech trial token",
    after_help = "Audio longer than 10 minutes is truncated by the service without an error."
)]
pub struct Args {
    /// List available voices, filtered by --locale and --voice
    #[arg(short = 'L', long, conflicts_with_all = ["list_qualities_and_formats", "text", "ssml"])]
    pub list_voices: bool,

    /// List available qualities and formats
    #[arg(short = 'Q', long, conflicts_with_all = ["text", "ssml", "locale", "voice"])]
    pub list_qualities_and_formats: bool,

    /// Text to speak. Leave blank to read from --file or stdin
    #[arg(short, long, num_args = 0..=1, value_name = "TEXT", conflicts_with = "ssml")]
    pub text: Option<Option<String>>,

    /// SSML to speak. Leave blank to read from --file or stdin
    #[arg(short, long, num_args = 0..=1, value_name = "SSML")]
    pub ssml: Option<Option<String>>,

    /// Pitch: 0.1, 10%, +20Hz, -2st, x-high ... (default 0)
    #[arg(short, long, value_parser = parse_pitch, allow_hyphen_values = true)]
    pub pitch: Option<Prosody>,

    /// Speaking rate: 0.5, 50%, 1.2f, x-slow ... (default 0)
    #[arg(short, long, value_parser = parse_rate, allow_hyphen_values = true)]
    pub rate: Option<Prosody>,

    /// Speaking style (default "general")
    #[arg(short = 'S', long)]
    pub style: Option<String>,

    /// Role-play persona, only some zh-CN voices honour it
    #[arg(short = 'R', long, value_parser = parse_role)]
    pub role: Option<Role>,

    /// Style intensity in [0.01, 2], only some zh-CN voices honour it
    #[arg(short = 'd', long, value_parser = parse_style_degree)]
    pub style_degree: Option<f32>,

    /// Text/SSML file to speak, `-` for stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Encoding of --file (stdin is always UTF-8)
    #[arg(short, long, value_enum)]
    pub encoding: Option<Encoding>,

    /// Write audio to this file instead of playing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Locale, default en-US
    #[arg(short, long)]
    pub locale: Option<String>,

    #[arg(short, long)]
    pub voice: Option<String>,

    /// WAV output (default)
    #[arg(long, conflicts_with_all = ["mp3", "ogg", "webm", "format"])]
    pub wav: bool,

    /// MP3 output, file only
    #[arg(long, conflicts_with_all = ["ogg", "webm", "format"])]
    pub mp3: bool,

    /// OGG/Opus output, file only
    #[arg(long, conflicts_with_all = ["webm", "format"])]
    pub ogg: bool,

    /// WebM/Opus output, file only
    #[arg(long, conflicts_with = "format")]
    pub webm: bool,

    /// Raw service output format (experts only)
    #[arg(short = 'F', long, value_parser = parse_format)]
    pub format: Option<AudioFormat>,

    /// Output quality for the chosen container, default 0
    #[arg(short, long, allow_negative_numbers = true, conflicts_with = "format")]
    pub quality: Option<i32>,

    /// Path to a profile (azspeak.yaml)
    #[arg(short, long, conflicts_with = "no_profile")]
    pub config: Option<PathBuf>,

    /// Ignore any profile
    #[arg(long)]
    pub no_profile: bool,

    /// Enable verbose (debug) logging
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    /// Options that only make sense for synthesis, by flag name.
    pub fn synthesis_only_flags(&self) -> Vec<&'static str> {
        [
            ("--pitch", self.pitch.is_some()),
            ("--rate", self.rate.is_some()),
            ("--style", self.style.is_some()),
            ("--role", self.role.is_some()),
            ("--style-degree", self.style_degree.is_some()),
            ("--quality", self.quality.is_some()),
            ("--format", self.format.is_some()),
            ("--encoding", self.encoding.is_some()),
            ("--file", self.file.is_some()),
            ("--output", self.output.is_some()),
            ("--wav", self.wav),
            ("--mp3", self.mp3),
            ("--ogg", self.ogg),
            ("--webm", self.webm),
        ]
        .into_iter()
        .filter_map(|(flag, set)| set.then_some(flag))
        .collect()
    }

    pub fn has_text_options(&self) -> bool {
        self.pitch.is_some()
            || self.rate.is_some()
            || self.style.is_some()
            || self.role.is_some()
            || self.style_degree.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Encoding {
    #[default]
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
    #[value(name = "utf-16le")]
    Utf16Le,
    #[value(name = "utf-16be")]
    Utf16Be,
    #[value(name = "latin1", alias = "iso-8859-1")]
    Latin1,
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A multiplier that still renders as a finite percentage.
fn parse_multiplier(s: &str) -> Option<f64> {
    parse_finite(s).filter(|v| (v * 100.0).is_finite())
}

pub fn parse_rate(arg: &str) -> Result<Prosody, String> {
    if let Some(pct) = arg.strip_suffix('%') {
        if parse_finite(pct).is_some() {
            return Ok(Prosody::Raw(arg.to_owned()));
        }
    }
    if RATE_WORDS.contains(&arg) {
        return Ok(Prosody::Raw(arg.to_owned()));
    }
    if let Some(multiplier) = parse_multiplier(arg) {
        return Ok(Prosody::Relative(multiplier));
    }
    // Raw multiplier, passed to the service as is: 1.2f -> 1.2
    if let Some(raw) = arg.strip_suffix('f') {
        if parse_finite(raw).is_some() {
            return Ok(Prosody::Raw(raw.to_owned()));
        }
    }
    Err(format!("Invalid rate: {arg}"))
}

pub fn parse_pitch(arg: &str) -> Result<Prosody, String> {
    let valid_raw = if let Some(hz) = arg.strip_suffix("Hz") {
        parse_finite(hz).is_some()
    } else if let Some(pct) = arg.strip_suffix('%') {
        parse_finite(pct).is_some()
    } else if let Some(st) = arg.strip_suffix("st") {
        (st.starts_with('+') || st.starts_with('-')) && parse_finite(st).is_some()
    } else {
        false
    };
    if valid_raw {
        return Ok(Prosody::Raw(arg.to_owned()));
    }
    if let Some(multiplier) = parse_multiplier(arg) {
        return Ok(Prosody::Relative(multiplier));
    }
    if PITCH_WORDS.contains(&arg) {
        return Ok(Prosody::Raw(arg.to_owned()));
    }
    Err(format!("Invalid pitch: {arg}"))
}

pub fn parse_style_degree(arg: &str) -> Result<f32, String> {
    let degree: f32 = arg
        .parse()
        .map_err(|_| format!("Invalid style degree: {arg}"))?;
    if (0.01..=2.0).contains(&degree) {
        Ok(degree)
    } else {
        Err(format!("Style degree {arg} is out of range 0.01..=2"))
    }
}

pub fn parse_role(arg: &str) -> Result<Role, String> {
    arg.parse().map_err(|_| {
        let roles: Vec<&'static str> = Role::iter().map(Into::into).collect();
        format!("Invalid role: {arg}. Valid roles are {}", roles.join(", "))
    })
}

pub fn parse_format(arg: &str) -> Result<AudioFormat, String> {
    AudioFormat::parse(arg).map_err(|e| e.to_string())
}
