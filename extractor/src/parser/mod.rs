//! Reading input files: byte decoding and JSON parsing.
//!
//! Strict decoding only accepts UTF-8. Lenient decoding never fails: mostly
//! UTF-8 input keeps its valid characters and only bad sequences become
//! U+FFFD, while input with no UTF-8 at all goes through encoding detection.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::config::ErrorPolicy;
use crate::error::{DecodeError, DecodeResult, FileResult, RecordError, RecordResult};
use crate::models::value_kind;

const BOM: char = '\u{FEFF}';

/// Decoded file content with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    /// Encoding actually used
    pub encoding: String,
    /// Whether the text differs from a clean UTF-8 reading: replacement
    /// characters were introduced or another encoding had to be guessed
    pub lossy: bool,
}

/// Detect the encoding of raw bytes using chardet, as a WHATWG label
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _confidence, _language) = chardet::detect(bytes);
    chardet::charset2encoding(&charset).to_lowercase()
}

/// Decode bytes with the named encoding, replacing what cannot be decoded.
///
/// Labels resolve the WHATWG way (`iso-8859-1` is windows-1252). Unknown
/// labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> Decoded {
    // JSON structure is ASCII; a UTF-16 guess on BOM-less input is never right.
    let enc = encoding_rs::Encoding::for_label(encoding.trim().as_bytes())
        .filter(|enc| enc.is_ascii_compatible())
        .unwrap_or(encoding_rs::UTF_8);
    let (text, used, lossy) = enc.decode(bytes);

    Decoded {
        text: text.into_owned(),
        encoding: used.name().to_lowercase(),
        lossy,
    }
}

/// Decode as UTF-8 or fail.
pub fn decode_strict(bytes: &[u8]) -> DecodeResult<Decoded> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        DecodeError::Encoding(format!("invalid UTF-8 at byte {}", e.valid_up_to()))
    })?;

    Ok(Decoded {
        text: text.strip_prefix(BOM).unwrap_or(text).to_string(),
        encoding: "utf-8".to_string(),
        lossy: false,
    })
}

/// Decode best-effort. Never fails.
///
/// Input that holds any valid multi-byte UTF-8 is read as UTF-8 with only
/// the bad sequences replaced. Otherwise the encoding is detected.
pub fn decode_lenient(bytes: &[u8]) -> Decoded {
    if let Ok(decoded) = decode_strict(bytes) {
        return decoded;
    }

    let mut decoded = if has_utf8_multibyte(bytes) {
        Decoded {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding: "utf-8".to_string(),
            lossy: true,
        }
    } else {
        decode_content(bytes, &detect_encoding(bytes))
    };

    decoded.lossy = true;
    if decoded.text.starts_with(BOM) {
        decoded.text.remove(0);
    }
    decoded
}

/// Whether any valid non-ASCII UTF-8 character occurs in `bytes`.
fn has_utf8_multibyte(mut bytes: &[u8]) -> bool {
    loop {
        match std::str::from_utf8(bytes) {
            Ok(rest) => return !rest.is_ascii(),
            Err(e) => {
                let valid = e.valid_up_to();
                if !bytes[..valid].is_ascii() {
                    return true;
                }
                match e.error_len() {
                    Some(len) => bytes = &bytes[valid + len..],
                    None => return false,
                }
            }
        }
    }
}

/// Decode according to the error policy.
pub fn decode(bytes: &[u8], policy: ErrorPolicy) -> DecodeResult<Decoded> {
    match policy {
        ErrorPolicy::Strict => decode_strict(bytes),
        ErrorPolicy::Lenient => Ok(decode_lenient(bytes)),
    }
}

/// Read a whole file.
pub fn read_bytes(path: impl AsRef<Path>) -> DecodeResult<Vec<u8>> {
    Ok(fs::read(path.as_ref())?)
}

/// Parse text as a JSON document whose top level is an object.
pub fn parse_record(text: &str) -> RecordResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(object) => Ok(object),
        other => Err(RecordError::NotAnObject(value_kind(&other))),
    }
}

/// Read, decode and parse one file under the given policy.
///
/// Strict reading rejects empty files and anything that is not UTF-8.
pub fn read_record(path: impl AsRef<Path>, policy: ErrorPolicy) -> FileResult<Map<String, Value>> {
    let bytes = read_bytes(path)?;
    if bytes.is_empty() && policy == ErrorPolicy::Strict {
        return Err(DecodeError::EmptyFile.into());
    }
    let decoded = decode(&bytes, policy)?;
    Ok(parse_record(&decoded.text)?)
}

/// Read, decode (leniently) and parse one file.
///
/// # Example
/// ```ignore
/// let object = parse_file("/data/jobs/123.json")?;
/// println!("{} top-level keys", object.len());
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> FileResult<Map<String, Value>> {
    read_record(path, ErrorPolicy::Lenient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use tempfile::tempdir;

    #[test]
    fn test_strict_accepts_utf8() {
        let decoded = decode_strict("{\"by\": \"Søren\"}".as_bytes()).unwrap();
        assert_eq!(decoded.text, "{\"by\": \"Søren\"}");
        assert_eq!(decoded.encoding, "utf-8");
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_strict_rejects_invalid_utf8() {
        let bytes: &[u8] = b"{\"name\": \"Soci\xe9t\xe9\"}";
        let err = decode_strict(bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Encoding(_)));
        assert!(err.to_string().contains("byte 14"));
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBF{\"a\": 1}";
        assert_eq!(decode_strict(bytes).unwrap().text, "{\"a\": 1}");
        assert_eq!(decode_lenient(bytes).text, "{\"a\": 1}");
    }

    #[test]
    fn test_lenient_recovers_invalid_utf8() {
        let bytes: &[u8] = b"{\"name\": \"Soci\xe9t\xe9\"}";
        let decoded = decode_lenient(bytes);

        let object = parse_record(&decoded.text).unwrap();
        let name = object["name"].as_str().unwrap();
        assert!(name.starts_with("Soci"));
        assert!(decoded.lossy);
    }

    #[test]
    fn test_lenient_keeps_valid_utf8_around_stray_bytes() {
        let bytes: &[u8] = b"{\"by\": \"S\xc3\xb8ren\", \"city\": \"Soci\xe9t\xe9\"}";
        let decoded = decode_lenient(bytes);

        assert_eq!(decoded.encoding, "utf-8");
        assert!(decoded.lossy);
        let object = parse_record(&decoded.text).unwrap();
        assert_eq!(object["by"], "Søren");
        assert_eq!(object["city"], "Soci\u{FFFD}t\u{FFFD}");
    }

    #[test]
    fn test_utf8_multibyte_detection() {
        assert!(has_utf8_multibyte("Søren".as_bytes()));
        assert!(has_utf8_multibyte(b"\xe9 then S\xc3\xb8ren"));
        assert!(!has_utf8_multibyte(b"Soci\xe9t\xe9"));
        assert!(!has_utf8_multibyte(b"plain ascii"));
        assert!(!has_utf8_multibyte(b"truncated \xc3"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded.text, "Société");
        assert_eq!(decoded.encoding, "windows-1252");
        assert!(!decoded.lossy);

        // 0xA4 is the currency sign, not the euro sign of ISO-8859-15
        assert_eq!(decode_content(&[0xA4], "latin1").text, "\u{A4}");
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        let decoded = decode_content(b"ok \xff", "no-such-encoding");
        assert_eq!(decoded.text, "ok \u{FFFD}");
        assert!(decoded.lossy);
    }

    #[test]
    fn test_parse_record() {
        let object = parse_record(r#"{"b": 1, "a": {"c": [true]}}"#).unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["b", "a"]);

        assert!(matches!(parse_record("[1, 2]"), Err(RecordError::NotAnObject("an array"))));
        assert!(matches!(parse_record("\"text\""), Err(RecordError::NotAnObject("a string"))));
        assert!(matches!(parse_record("{oops"), Err(RecordError::Json(_))));
        assert!(matches!(parse_record("   "), Err(RecordError::Json(_))));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, r#"{"title": "Engineer"}"#).unwrap();

        let object = parse_file(&path).unwrap();
        assert_eq!(object["title"], "Engineer");

        assert!(parse_file(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_read_record_follows_policy() {
        let dir = tempdir().unwrap();
        let latin1 = dir.path().join("latin1.json");
        std::fs::write(&latin1, b"{\"name\": \"Soci\xe9t\xe9\"}").unwrap();
        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "").unwrap();

        assert!(matches!(
            read_record(&latin1, ErrorPolicy::Strict),
            Err(FileError::Decode(DecodeError::Encoding(_)))
        ));
        assert!(read_record(&latin1, ErrorPolicy::Lenient).is_ok());

        assert!(matches!(
            read_record(&empty, ErrorPolicy::Strict),
            Err(FileError::Decode(DecodeError::EmptyFile))
        ));
        assert!(matches!(
            read_record(&empty, ErrorPolicy::Lenient),
            Err(FileError::Record(RecordError::Json(_)))
        ));
    }
}
