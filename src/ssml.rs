//! SSML document construction for plain-text input.
//!
//! The document shape is fixed: `speak` → `voice` → `mstts:express-as` →
//! `prosody` → escaped text. Only attribute values vary.

use std::borrow::Cow;
use std::fmt::Write as _;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_STYLE: &str = "general";

/// Speaking rate or pitch.
#[derive(Debug, Clone, PartialEq)]
pub enum Prosody {
    /// Multiplier relative to the voice default; `0.1` renders as `10%`.
    Relative(f64),
    /// Emitted verbatim (`+10Hz`, `-2st`, `120%`, `x-slow`, ...).
    Raw(String),
}

impl Prosody {
    fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Relative(multiplier) => Cow::Owned(percentage(*multiplier)),
            Self::Raw(value) => Cow::Borrowed(value),
        }
    }
}

impl Default for Prosody {
    fn default() -> Self {
        Self::Relative(0.0)
    }
}

impl From<f64> for Prosody {
    fn from(multiplier: f64) -> Self {
        Self::Relative(multiplier)
    }
}

impl From<&str> for Prosody {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_owned())
    }
}

impl From<String> for Prosody {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

/// Role-play persona, honoured by a few zh-CN voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Role {
    Girl,
    Boy,
    YoungAdultFemale,
    YoungAdultMale,
    OlderAdultFemale,
    OlderAdultMale,
    SeniorFemale,
    SeniorMale,
}

/// Voice, prosody and style options for plain-text input.
///
/// `None` means "not supplied"; defaults are applied only when the document
/// is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOptions {
    pub voice: Option<String>,
    pub locale: Option<String>,
    pub rate: Option<Prosody>,
    pub pitch: Option<Prosody>,
    pub style: Option<String>,
    pub style_degree: Option<f32>,
    pub role: Option<Role>,
}

impl TextOptions {
    /// True when any option that only makes sense for plain text is set.
    pub fn has_text_only_options(&self) -> bool {
        self.rate.is_some()
            || self.pitch.is_some()
            || self.style.is_some()
            || self.style_degree.is_some()
            || self.role.is_some()
    }
}

/// Escape the XML reserved characters of a raw value.
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Render a multiplier as a percentage rounded to at most 2 decimals.
fn percentage(multiplier: f64) -> String {
    let pct = multiplier * 100.0;
    let rounded = (pct * 100.0).round() / 100.0;
    // Huge values have no decimals left to round
    let pct = if rounded.is_finite() { rounded } else { pct };
    // -0.0 would print as "-0"
    let pct = if pct == 0.0 { 0.0 } else { pct };
    format!("{pct}%")
}

/// Build the SSML document for `text`.
///
/// Raw values (text and attribute values) are escaped exactly once here.
pub fn build(text: &str, options: &TextOptions) -> String {
    let locale = options.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
    let style = options.style.as_deref().unwrap_or(DEFAULT_STYLE);
    let rate = options.rate.clone().unwrap_or_default();
    let pitch = options.pitch.clone().unwrap_or_default();

    let mut ssml = String::with_capacity(text.len() + 384);
    ssml.push_str(
        r#"<speak xmlns="http://www.w3.org/2001/10/synthesis" xmlns:mstts="http://www.w3.org/2001/mstts" xmlns:emo="http://www.w3.org/2009/10/emotionml" version="1.0""#,
    );
    // Writing into a String cannot fail.
    let _ = write!(ssml, r#" xml:lang="{}">"#, escape(locale));

    match options.voice.as_deref() {
        Some(voice) => {
            let _ = write!(ssml, r#"<voice name="{}">"#, escape(voice));
        }
        None => ssml.push_str("<voice>"),
    }

    let _ = write!(ssml, r#"<mstts:express-as style="{}""#, escape(style));
    if let Some(degree) = options.style_degree {
        let _ = write!(ssml, r#" styledegree="{degree}""#);
    }
    if let Some(role) = options.role {
        let _ = write!(ssml, r#" role="{role}""#);
    }
    ssml.push('>');

    let _ = write!(
        ssml,
        r#"<prosody rate="{}" pitch="{}">{}</prosody>"#,
        escape(&rate.render()),
        escape(&pitch.render()),
        escape(text)
    );
    ssml.push_str("</mstts:express-as></voice></speak>");
    ssml
}
