//! Reading text or SSML from the command line, a file or stdin.

use std::path::Path;

use azspeak::{Result, SpeakError};
use tokio::io::AsyncReadExt;

use super::args::Encoding;

/// Read the whole input source. `None` or `-` means stdin, always UTF-8.
pub async fn read_source(file: Option<&Path>, encoding: Encoding) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            let bytes = tokio::fs::read(path).await?;
            decode(&bytes, encoding)
        }
        _ => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        }
    }
}

/// Decode file contents. A UTF-8 BOM is dropped; UTF-16 BOMs must match the
/// requested byte order when present.
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Utf8 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8(bytes.to_vec())
                .map_err(|e| invalid(format!("input is not valid UTF-8: {e}")))
        }
        Encoding::Utf16Le => decode_utf16(bytes, b"\xFF\xFE", u16::from_le_bytes),
        Encoding::Utf16Be => decode_utf16(bytes, b"\xFE\xFF", u16::from_be_bytes),
        Encoding::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
    }
}

fn decode_utf16(bytes: &[u8], bom: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let bytes = bytes.strip_prefix(bom).unwrap_or(bytes);
    if bytes.len() % 2 != 0 {
        return Err(invalid("input has an odd number of bytes for UTF-16".into()));
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| invalid(format!("input is not valid UTF-16: {e}")))
}

fn invalid(message: String) -> SpeakError {
    SpeakError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_with_and_without_bom() {
        assert_eq!(decode("héllo".as_bytes(), Encoding::Utf8).unwrap(), "héllo");
        assert_eq!(decode(b"\xEF\xBB\xBFhi", Encoding::Utf8).unwrap(), "hi");
        assert!(decode(b"\xFF\xFF", Encoding::Utf8).is_err());
    }

    #[test]
    fn utf16_both_orders() {
        let le: Vec<u8> = "你好".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let be: Vec<u8> = "你好".encode_utf16().flat_map(u16::to_be_bytes).collect();
        assert_eq!(decode(&le, Encoding::Utf16Le).unwrap(), "你好");
        assert_eq!(decode(&be, Encoding::Utf16Be).unwrap(), "你好");

        let mut with_bom = b"\xFF\xFE".to_vec();
        with_bom.extend_from_slice(&le);
        assert_eq!(decode(&with_bom, Encoding::Utf16Le).unwrap(), "你好");
    }

    #[test]
    fn utf16_rejects_odd_length_and_lone_surrogates() {
        assert!(decode(b"a\0b", Encoding::Utf16Le).is_err());
        assert!(decode(&0xD800u16.to_le_bytes(), Encoding::Utf16Le).is_err());
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        assert_eq!(decode(b"caf\xE9", Encoding::Latin1).unwrap(), "café");
    }

    #[tokio::test]
    async fn reads_files_with_their_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"na\xEFve").unwrap();
        let text = read_source(Some(path.as_path()), Encoding::Latin1).await.unwrap();
        assert_eq!(text, "naïve");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(Some(dir.path().join("gone.txt").as_path()), Encoding::Utf8)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeakError::Io(_)));
    }
}
