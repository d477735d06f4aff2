//! Synthesis façade.
//!
//! Every call picks a valid token, builds a fresh [`SynthesisConfig`] from it,
//! turns plain text into SSML, hands the document to a [`SpeechEngine`] and
//! delivers completed audio to the configured [`AudioOutput`].

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use strum::Display;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::audio::AudioFormat;
use crate::error::{Result, SpeakError};
use crate::http_client::{self, bearer};
use crate::output::AudioOutput;
use crate::provider::TokenProvider;
use crate::ssml::{self, TextOptions};
use crate::token::Token;

const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const SSML_CONTENT_TYPE: &str = "application/ssml+xml";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Host serving synthesis and the voice list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceEndpoint {
    /// `https://{region}.tts.speech.microsoft.com`, region taken from the token
    #[default]
    Regional,
    /// A fixed base URL (proxies, tests)
    Fixed(String),
}

impl ServiceEndpoint {
    fn base(&self, region: &str) -> String {
        match self {
            Self::Regional => format!("https://{region}.tts.speech.microsoft.com"),
            Self::Fixed(base) => base.trim_end_matches('/').to_string(),
        }
    }

    pub fn synthesis_url(&self, region: &str) -> String {
        format!("{}/cognitiveservices/v1", self.base(region))
    }

    pub fn voices_url(&self, region: &str) -> String {
        format!("{}/cognitiveservices/voices/list", self.base(region))
    }
}

/// Per-call service configuration, scoped to one token.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub region: String,
    pub credential: SecretString,
    pub format: AudioFormat,
}

impl SynthesisConfig {
    pub fn from_token(token: &Token, format: AudioFormat) -> Self {
        Self {
            region: token.region().to_owned(),
            credential: SecretString::from(token.credential().to_owned()),
            format,
        }
    }
}

/// What to speak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechInput {
    /// Plain text, wrapped in SSML built from [`TextOptions`]
    Text(String),
    /// A complete SSML document, sent as is
    Ssml(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CancellationReason {
    Unauthorized,
    TooManyRequests,
    BadRequest,
    Error,
}

impl CancellationReason {
    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => Self::TooManyRequests,
            StatusCode::BAD_REQUEST => Self::BadRequest,
            _ => Self::Error,
        }
    }
}

/// Result of one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Audio in the requested format
    Completed(Vec<u8>),
    /// The service refused or aborted the call
    Canceled {
        reason: CancellationReason,
        error_details: Option<String>,
    },
    /// A response the façade does not know how to interpret
    Unexpected(String),
}

/// The remote speech engine. Owns the wire protocol and audio encoding.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, config: &SynthesisConfig, ssml: &str) -> Result<SynthesisOutcome>;
}

/// Engine backed by the service's REST synthesis endpoint.
#[derive(Debug, Clone)]
pub struct RestEngine {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl RestEngine {
    pub fn new(client: Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl SpeechEngine for RestEngine {
    async fn synthesize(&self, config: &SynthesisConfig, ssml: &str) -> Result<SynthesisOutcome> {
        let url = self.endpoint.synthesis_url(&config.region);
        debug!(
            "Synthesis request: url={url}, format={}, ssml_len={}",
            config.format,
            ssml.len()
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, bearer(config.credential.expose_secret()))
            .header(CONTENT_TYPE, SSML_CONTENT_TYPE)
            .header(OUTPUT_FORMAT_HEADER, config.format.as_str())
            .body(ssml.to_owned())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read error body of canceled synthesis: {e}");
                    String::new()
                }
            };
            warn!("Synthesis canceled by service ({status}): {body}");

            let body = body.trim();
            let error_details = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            };
            return Ok(SynthesisOutcome::Canceled {
                reason: CancellationReason::from_status(status),
                error_details: Some(error_details),
            });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Ok(SynthesisOutcome::Unexpected(format!(
                "service answered {status} with an empty audio payload"
            )));
        }

        debug!("Synthesis complete, {} bytes", audio.len());
        Ok(SynthesisOutcome::Completed(audio.to_vec()))
    }
}

/// Speaks into one output target. The target is fixed at construction so
/// `speak` is only reachable once it is known.
pub struct SpeechService<E = RestEngine> {
    provider: Arc<TokenProvider>,
    engine: E,
    output: AudioOutput,
    format: AudioFormat,
}

impl<E: SpeechEngine> SpeechService<E> {
    pub fn new(provider: Arc<TokenProvider>, engine: E, output: AudioOutput) -> Self {
        Self {
            provider,
            engine,
            output,
            format: AudioFormat::default(),
        }
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Synthesize `input` and deliver the audio. Blocks the calling task
    /// until the service answers and delivery finishes.
    pub async fn speak(&self, input: &SpeechInput, options: &TextOptions) -> Result<SynthesisOutcome> {
        let ssml = match input {
            SpeechInput::Text(text) => Cow::Owned(ssml::build(text, options)),
            SpeechInput::Ssml(document) => {
                if options.has_text_only_options() {
                    return Err(SpeakError::Validation(
                        "Rate, pitch, style, style degree and role only apply to plain text. \
                         Set them in your SSML instead."
                            .into(),
                    ));
                }
                Cow::Borrowed(document.as_str())
            }
        };

        let token = self.provider.current_token().await?;
        let config = SynthesisConfig::from_token(&token, self.format);
        let outcome = self.engine.synthesize(&config, &ssml).await?;

        if let SynthesisOutcome::Completed(audio) = &outcome {
            self.output.deliver(audio).await?;
        }
        Ok(outcome)
    }
}

impl<E: SpeechEngine + 'static> SpeechService<E> {
    /// Start `speak` on the runtime and return a handle to wait on.
    pub fn spawn_speak(
        self: &Arc<Self>,
        input: SpeechInput,
        options: TextOptions,
    ) -> JoinHandle<Result<SynthesisOutcome>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.speak(&input, &options).await })
    }
}

/// One-shot form: speak through the REST engine on the token's regional host.
pub async fn speak(
    provider: Arc<TokenProvider>,
    output: AudioOutput,
    input: &SpeechInput,
    options: &TextOptions,
    format: AudioFormat,
) -> Result<SynthesisOutcome> {
    let engine = RestEngine::new(http_client::build(DEFAULT_TIMEOUT)?, ServiceEndpoint::Regional);
    SpeechService::new(provider, engine, output)
        .with_format(format)
        .speak(input, options)
        .await
}
