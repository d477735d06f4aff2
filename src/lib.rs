//! azspeak: text-to-speech through the Azure Speech trial endpoint.
//!
//! A [`TokenProvider`] keeps a valid trial token, [`ssml::build`] turns plain
//! text into a markup document, [`audio::resolve`] maps a container and
//! quality onto a service output format, and [`SpeechService`] ties them
//! together for one output target.

pub mod audio;
pub mod config;
pub mod error;
pub mod http_client;
pub mod output;
pub mod provider;
pub mod ssml;
pub mod synthesizer;
pub mod token;
pub mod voice;

pub use audio::{AudioFormat, Container};
pub use error::{Result, SpeakError};
pub use output::AudioOutput;
pub use provider::{TokenProvider, TokenState};
pub use ssml::{Prosody, Role, TextOptions};
pub use synthesizer::{
    speak, CancellationReason, RestEngine, ServiceEndpoint, SpeechEngine, SpeechInput,
    SpeechService, SynthesisConfig, SynthesisOutcome,
};
pub use token::{Token, TokenFetcher};
pub use voice::{list_voices, Voice};
