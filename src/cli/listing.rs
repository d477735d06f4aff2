//! `--list-voices` and `--list-qualities-and-formats`.

use std::fmt::Write as _;

use azspeak::{AudioFormat, Container, Voice};

/// Voice blocks for every voice matching the optional filters, separated
/// by blank lines. Styles print as a double-quoted list, `["chat", "sad"]`,
/// or `None` when the voice has no styles.
pub fn render_voices(voices: &[Voice], locale: Option<&str>, voice: Option<&str>) -> String {
    voices
        .iter()
        .filter(|v| v.matches(locale, voice))
        .map(Voice::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_qualities_and_formats() -> String {
    let mut out = String::from("Available qualities:\n");
    for container in Container::all() {
        let _ = writeln!(out, "Qualities for {container}:");
        for (quality, format) in container.qualities() {
            let _ = writeln!(out, "{quality:2}: {format}");
        }
    }
    out.push_str("\nAvailable formats:\n");
    for format in AudioFormat::all() {
        let _ = writeln!(out, "- {format}");
    }
    out
}
