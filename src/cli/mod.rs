//! Command-line front end: turns parsed arguments and the profile into one
//! listing or one synthesis call, and maps the result to an exit code.

pub mod args;
mod input;
mod listing;

use std::process::ExitCode;
use std::sync::Arc;

use azspeak::config::{Config, OutputConfig, TextConfig};
use azspeak::{
    audio, http_client, list_voices, AudioFormat, AudioOutput, Container, RestEngine,
    ServiceEndpoint, SpeakError, SpeechInput, SpeechService, SynthesisOutcome, TextOptions,
    TokenFetcher, TokenProvider,
};
use clap::error::ErrorKind;
use clap::CommandFactory;
use tracing::{debug, info};

use args::{parse_pitch, parse_rate, parse_role, parse_style_degree, Args};

const EXIT_CANCELED: u8 = 2;
const EXIT_UNEXPECTED: u8 = 3;
const EXIT_ERROR: u8 = 4;

#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Reported like an argument error: usage line, exit code 2
    #[error("{1}")]
    Usage(ErrorKind, String),
    #[error(transparent)]
    Speak(#[from] SpeakError),
}

fn usage(kind: ErrorKind, message: impl Into<String>) -> CliError {
    CliError::Usage(kind, message.into())
}

pub async fn run(args: Args) -> ExitCode {
    let config = if args.no_profile {
        Config::default()
    } else {
        Config::load(args.config.as_deref())
    };

    ExitCode::from(exit_code(execute(&args, &config).await))
}

/// Usage errors exit through clap; everything else becomes a status code.
fn exit_code(result: Result<u8, CliError>) -> u8 {
    match result {
        Ok(code) => code,
        Err(CliError::Usage(kind, message)) => Args::command().error(kind, message).exit(),
        Err(CliError::Speak(e)) => {
            eprintln!("Error: {e}");
            EXIT_ERROR
        }
    }
}

async fn execute(args: &Args, config: &Config) -> Result<u8, CliError> {
    let client = http_client::build(config.service.timeout())?;
    let endpoint = match &config.service.base_url {
        Some(base) => ServiceEndpoint::Fixed(base.clone()),
        None => ServiceEndpoint::Regional,
    };
    let provider = Arc::new(
        TokenProvider::new(TokenFetcher::new(client.clone(), config.auth.trial_url.as_str()))
            .with_margin(config.auth.margin()),
    );

    if args.list_qualities_and_formats {
        reject_for_listing(args, "--list-qualities-and-formats")?;
        print!("{}", listing::render_qualities_and_formats());
        return Ok(0);
    }

    if args.list_voices {
        reject_for_listing(args, "--list-voices")?;
        let voices = list_voices(&client, &provider, &endpoint).await?;
        print!(
            "{}",
            listing::render_voices(&voices, args.locale.as_deref(), args.voice.as_deref())
        );
        return Ok(0);
    }

    let format = output_format(args, &config.output)?;
    let output = match &args.output {
        Some(path) => AudioOutput::File(path.clone()),
        None => AudioOutput::Speaker,
    };
    let (input, options) = prepare_input(args, &config.text).await?;
    info!("Synthesizing as {format} to {output:?}");

    let engine = RestEngine::new(client, endpoint);
    let service = SpeechService::new(provider, engine, output).with_format(format);
    let outcome = service.speak(&input, &options).await?;
    Ok(report(&outcome))
}

fn reject_for_listing(args: &Args, mode: &str) -> Result<(), CliError> {
    let flags = args.synthesis_only_flags();
    if flags.is_empty() {
        return Ok(());
    }
    Err(usage(
        ErrorKind::ArgumentConflict,
        format!("You can't use argument(s) {} with {mode}.", flags.join(", ")),
    ))
}

/// Pick the output format: `--format`, then a container flag with
/// `--quality`, then the profile, then wav quality 0.
fn output_format(args: &Args, profile: &OutputConfig) -> Result<AudioFormat, CliError> {
    if let Some(format) = args.format {
        return playable(args, format);
    }

    let flagged = [
        (args.wav, Container::Wav),
        (args.mp3, Container::Mp3),
        (args.ogg, Container::Ogg),
        (args.webm, Container::Webm),
    ]
    .into_iter()
    .find_map(|(set, container)| set.then_some(container));

    if flagged.is_none() && args.quality.is_none() {
        if let Some(name) = &profile.format {
            return playable(args, AudioFormat::parse(name)?);
        }
    }

    let container = match flagged {
        Some(container) => container,
        None => profile
            .container
            .as_deref()
            .map(str::parse::<Container>)
            .transpose()?
            .unwrap_or_default(),
    };

    if container != Container::Wav && args.output.is_none() {
        return Err(usage(
            ErrorKind::ArgumentConflict,
            format!("{container} format is only supported when outputting to a file (--output)."),
        ));
    }

    match args.quality {
        Some(quality) => audio::resolve(container, quality)
            .map_err(|e| usage(ErrorKind::ValueValidation, e.to_string())),
        None => Ok(audio::resolve(container, profile.quality.unwrap_or(0))?),
    }
}

/// Only RIFF audio can go to the speaker; everything else needs `--output`.
fn playable(args: &Args, format: AudioFormat) -> Result<AudioFormat, CliError> {
    if !format.is_riff() && args.output.is_none() {
        return Err(usage(
            ErrorKind::ArgumentConflict,
            format!("{format} can't be played on the speaker, use --output to write it to a file."),
        ));
    }
    Ok(format)
}

/// Resolve the input source and the plain-text options.
async fn prepare_input(args: &Args, profile: &TextConfig) -> Result<(SpeechInput, TextOptions), CliError> {
    let (is_ssml, inline) = match (&args.text, &args.ssml) {
        (_, Some(ssml)) => (true, ssml.clone()),
        (Some(text), None) => (false, text.clone()),
        // Neither flag: plain text from --file or stdin
        (None, None) => (false, None),
    };

    if inline.is_some() && args.file.is_some() {
        return Err(usage(
            ErrorKind::ArgumentConflict,
            "You can only specify one input source.",
        ));
    }
    if is_ssml && args.has_text_options() {
        return Err(usage(
            ErrorKind::ArgumentConflict,
            "You can only use text options with --text. Please set these settings in your SSML.",
        ));
    }

    let content = match inline {
        Some(content) => content,
        None => {
            debug!("Reading input from {:?}", args.file);
            input::read_source(args.file.as_deref(), args.encoding.unwrap_or_default()).await?
        }
    };

    if is_ssml {
        return Ok((SpeechInput::Ssml(content), TextOptions::default()));
    }

    let options = text_options(args, profile)?;
    if options.has_text_only_options() && options.voice.is_none() {
        return Err(usage(
            ErrorKind::MissingRequiredArgument,
            "Voice must be specified when using options for --text.",
        ));
    }
    Ok((SpeechInput::Text(content), options))
}

/// Merge command-line options over profile defaults. Profile values go
/// through the same parsers as the flags.
fn text_options(args: &Args, profile: &TextConfig) -> Result<TextOptions, SpeakError> {
    let invalid = |message: String| SpeakError::Validation(format!("profile: {message}"));

    let rate = match (&args.rate, &profile.rate) {
        (Some(rate), _) => Some(rate.clone()),
        (None, Some(raw)) => Some(parse_rate(raw).map_err(invalid)?),
        (None, None) => None,
    };
    let pitch = match (&args.pitch, &profile.pitch) {
        (Some(pitch), _) => Some(pitch.clone()),
        (None, Some(raw)) => Some(parse_pitch(raw).map_err(invalid)?),
        (None, None) => None,
    };
    let role = match (args.role, &profile.role) {
        (Some(role), _) => Some(role),
        (None, Some(raw)) => Some(parse_role(raw).map_err(invalid)?),
        (None, None) => None,
    };
    let style_degree = match (args.style_degree, profile.style_degree) {
        (Some(degree), _) => Some(degree),
        (None, Some(degree)) => Some(parse_style_degree(&degree.to_string()).map_err(invalid)?),
        (None, None) => None,
    };

    Ok(TextOptions {
        voice: args.voice.clone().or_else(|| profile.voice.clone()),
        locale: args.locale.clone().or_else(|| profile.locale.clone()),
        rate,
        pitch,
        style: args.style.clone().or_else(|| profile.style.clone()),
        style_degree,
        role,
    })
}

/// Exit code for a synthesis outcome, with details on stderr.
fn report(outcome: &SynthesisOutcome) -> u8 {
    match outcome {
        SynthesisOutcome::Completed(_) => 0,
        SynthesisOutcome::Canceled {
            reason,
            error_details,
        } => {
            eprintln!("Error: Speech synthesis canceled: {reason}");
            if let Some(details) = error_details {
                eprintln!("{details}");
            }
            EXIT_CANCELED
        }
        SynthesisOutcome::Unexpected(detail) => {
            eprintln!("Error: Unexpected result: {detail}");
            EXIT_UNEXPECTED
        }
    }
}

#[cfg(test)]
mod tests {
    use azspeak::{CancellationReason, Prosody, Role};
    use clap::Parser;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("azspeak").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn default_format_is_wav_quality_zero() {
        let format = output_format(&parse(&[]), &OutputConfig::default()).unwrap();
        assert_eq!(format, AudioFormat::Riff24Khz16BitMonoPcm);
    }

    #[test]
    fn container_flag_and_quality() {
        let args = parse(&["--mp3", "-q", "3", "-o", "a.mp3"]);
        let format = output_format(&args, &OutputConfig::default()).unwrap();
        assert_eq!(format.as_str(), "audio-48khz-192kbitrate-mono-mp3");
    }

    #[test]
    fn out_of_range_quality_is_a_usage_error() {
        let args = parse(&["--ogg", "-q", "2", "-o", "a.ogg"]);
        let err = output_format(&args, &OutputConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Usage(ErrorKind::ValueValidation, ref m) if m.contains("Invalid quality 2 for ogg")));
    }

    #[test]
    fn compressed_containers_need_a_file() {
        let err = output_format(&parse(&["--webm"]), &OutputConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Usage(ErrorKind::ArgumentConflict, _)));
    }

    #[test]
    fn raw_formats_need_a_file_unless_riff() {
        let err = output_format(&parse(&["-F", "raw-24khz-16bit-mono-pcm"]), &OutputConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Usage(ErrorKind::ArgumentConflict, ref m) if m.contains("--output")));

        let riff = output_format(&parse(&["-F", "riff-48khz-16bit-mono-pcm"]), &OutputConfig::default()).unwrap();
        assert_eq!(riff, AudioFormat::Riff48Khz16BitMonoPcm);

        let to_file = parse(&["-F", "raw-24khz-16bit-mono-pcm", "-o", "out.raw"]);
        assert_eq!(
            output_format(&to_file, &OutputConfig::default()).unwrap(),
            AudioFormat::Raw24Khz16BitMonoPcm
        );
    }

    #[test]
    fn profile_output_defaults() {
        let profile = OutputConfig {
            container: Some("ogg".into()),
            quality: Some(1),
            format: None,
        };
        let format = output_format(&parse(&["-o", "x.ogg"]), &profile).unwrap();
        assert_eq!(format, AudioFormat::Ogg48Khz16BitMonoOpus);

        let flagged = output_format(&parse(&["--wav", "-q", "-2"]), &profile).unwrap();
        assert_eq!(flagged, AudioFormat::Riff8Khz16BitMonoPcm);

        let raw = OutputConfig {
            format: Some("riff-44100hz-16bit-mono-pcm".into()),
            ..Default::default()
        };
        assert_eq!(
            output_format(&parse(&[]), &raw).unwrap(),
            AudioFormat::Riff44100Hz16BitMonoPcm
        );
    }

    #[tokio::test]
    async fn inline_text_with_options() {
        let args = parse(&["-t", "hello", "-v", "en-US-GuyNeural", "-r", "0.2", "-R", "Boy"]);
        let (input, options) = prepare_input(&args, &TextConfig::default()).await.unwrap();
        assert_eq!(input, SpeechInput::Text("hello".into()));
        assert_eq!(options.voice.as_deref(), Some("en-US-GuyNeural"));
        assert_eq!(options.rate, Some(Prosody::Relative(0.2)));
        assert_eq!(options.role, Some(Role::Boy));
    }

    #[tokio::test]
    async fn text_options_require_a_voice() {
        let args = parse(&["-t", "hello", "-S", "cheerful"]);
        let err = prepare_input(&args, &TextConfig::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Usage(ErrorKind::MissingRequiredArgument, _)));

        let profile = TextConfig {
            voice: Some("en-US-JennyNeural".into()),
            ..Default::default()
        };
        let (_, options) = prepare_input(&args, &profile).await.unwrap();
        assert_eq!(options.style.as_deref(), Some("cheerful"));
    }

    #[tokio::test]
    async fn ssml_rejects_text_options() {
        let args = parse(&["-s", "<speak/>", "-p", "high"]);
        let err = prepare_input(&args, &TextConfig::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Usage(ErrorKind::ArgumentConflict, ref m) if m.contains("SSML")));
    }

    #[tokio::test]
    async fn ssml_ignores_profile_text_defaults() {
        let args = parse(&["-s", "<speak/>"]);
        let profile = TextConfig {
            voice: Some("en-US-JennyNeural".into()),
            rate: Some("fast".into()),
            ..Default::default()
        };
        let (input, options) = prepare_input(&args, &profile).await.unwrap();
        assert_eq!(input, SpeechInput::Ssml("<speak/>".into()));
        assert_eq!(options, TextOptions::default());
    }

    #[tokio::test]
    async fn inline_value_and_file_conflict() {
        let args = parse(&["-t", "hello", "-f", "in.txt"]);
        let err = prepare_input(&args, &TextConfig::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Usage(_, ref m) if m.contains("one input source")));
    }

    #[tokio::test]
    async fn text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "from a file").unwrap();
        let path = path.to_string_lossy().into_owned();

        let args = parse(&["-f", &path]);
        let (input, _) = prepare_input(&args, &TextConfig::default()).await.unwrap();
        assert_eq!(input, SpeechInput::Text("from a file".into()));
    }

    #[test]
    fn flags_override_profile_and_profile_values_are_checked() {
        let profile = TextConfig {
            voice: Some("en-US-JennyNeural".into()),
            pitch: Some("+2st".into()),
            rate: Some("slow".into()),
            ..Default::default()
        };
        let options = text_options(&parse(&["-r", "0.5"]), &profile).unwrap();
        assert_eq!(options.rate, Some(Prosody::Relative(0.5)));
        assert_eq!(options.pitch, Some(Prosody::Raw("+2st".into())));

        let bad = TextConfig {
            role: Some("Wizard".into()),
            ..Default::default()
        };
        let err = text_options(&parse(&[]), &bad).unwrap_err();
        assert!(matches!(err, SpeakError::Validation(ref m) if m.starts_with("profile: Invalid role")));
    }

    #[test]
    fn listing_rejects_synthesis_options() {
        let err = reject_for_listing(&parse(&["-L", "-q", "1"]), "--list-voices").unwrap_err();
        assert!(matches!(err, CliError::Usage(_, ref m) if m == "You can't use argument(s) --quality with --list-voices."));
        assert!(reject_for_listing(&parse(&["-L", "-l", "en-US"]), "--list-voices").is_ok());
    }

    #[tokio::test]
    async fn unreachable_token_exits_with_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav").to_string_lossy().into_owned();
        let args = parse(&["-t", "hello", "-o", &out, "--no-profile"]);
        let mut config = Config::default();
        config.auth.trial_url = server.uri();

        let result = execute(&args, &config).await;
        assert!(matches!(
            result,
            Err(CliError::Speak(SpeakError::TokenRetrieval { status: 500, .. }))
        ));
        assert_eq!(exit_code(result), EXIT_ERROR);
        assert!(!dir.path().join("out.wav").exists());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(report(&SynthesisOutcome::Completed(vec![1])), 0);
        let canceled = SynthesisOutcome::Canceled {
            reason: CancellationReason::Unauthorized,
            error_details: Some("HTTP 401".into()),
        };
        assert_eq!(report(&canceled), EXIT_CANCELED);
        assert_eq!(report(&SynthesisOutcome::Unexpected("?".into())), EXIT_UNEXPECTED);
    }
}
