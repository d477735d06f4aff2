//! Voice catalog: the per-region list of voices offered by the service.

use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::http_client::bearer;
use crate::provider::TokenProvider;
use crate::synthesizer::ServiceEndpoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Voice {
    pub name: String,
    pub display_name: String,
    pub local_name: String,
    pub short_name: String,
    pub gender: String,
    pub locale: String,
    pub locale_name: String,
    pub voice_type: String,
    pub status: String,
    #[serde(default)]
    pub sample_rate_hertz: Option<String>,
    #[serde(default)]
    pub words_per_minute: Option<String>,
    #[serde(default)]
    pub style_list: Option<Vec<String>>,
    #[serde(default)]
    pub role_play_list: Option<Vec<String>>,
}

impl Voice {
    /// Matches an optional locale and an optional voice (short or full name).
    pub fn matches(&self, locale: Option<&str>, voice: Option<&str>) -> bool {
        let locale_ok = locale.is_none_or(|l| self.locale.eq_ignore_ascii_case(l));
        let voice_ok = voice.is_none_or(|v| self.short_name == v || self.name == v);
        locale_ok && voice_ok
    }
}

/// The multi-line listing block. `Styles` uses the double-quoted list form
/// (`["chat", "sad"]`) so each entry stays unambiguous when it contains spaces.
impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = match &self.style_list {
            Some(styles) => format!("{styles:?}"),
            None => "None".to_string(),
        };
        writeln!(f, "{}", self.name)?;
        writeln!(f, "Display Name: {}", self.display_name)?;
        writeln!(f, "Local Name: {} @ {}", self.local_name, self.locale)?;
        writeln!(f, "Locale: {}", self.locale_name)?;
        writeln!(f, "Gender: {}", self.gender)?;
        writeln!(f, "ID: {}", self.short_name)?;
        writeln!(f, "Styles: {styles}")?;
        writeln!(f, "Voice Type: {}", self.voice_type)?;
        writeln!(f, "Status: {}", self.status)
    }
}

/// Fetch every voice available in the current token's region.
pub async fn list_voices(
    client: &Client,
    provider: &TokenProvider,
    endpoint: &ServiceEndpoint,
) -> Result<Vec<Voice>> {
    let token = provider.current_token().await?;
    let url = endpoint.voices_url(token.region());
    debug!("Fetching voice list from {url}");

    let voices: Vec<Voice> = client
        .get(&url)
        .header(reqwest::header::AUTHORIZATION, bearer(token.credential()))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    debug!("Received {} voices", voices.len());
    Ok(voices)
}
