use std::fmt;

use bincode::error::{DecodeError, EncodeError};
use bincode::{Decode, Encode};
use serde::Deserialize;
use serde_json::Value;

use crate::{FieldKind, SavedField};

pub const LAYOUT_FILE_MAGIC: [u8; 4] = *b"DBLY";
pub const LAYOUT_FILE_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode, serde::Serialize, serde::Deserialize)]
pub struct LayoutFileData {
    pub fields: Vec<SavedField>,
}

/// Leading record of a layout file. The magic is a fixed array, so it is
/// written as its raw four bytes and a file can be sniffed by prefix.
#[derive(Encode, Decode)]
struct LayoutFileHeader {
    magic: [u8; 4],
    version: u32,
}

impl LayoutFileHeader {
    fn current() -> Self {
        Self {
            magic: LAYOUT_FILE_MAGIC,
            version: LAYOUT_FILE_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutDecodeError {
    UnsupportedVersion(u32),
    InvalidData,
}

impl fmt::Display for LayoutDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutDecodeError::UnsupportedVersion(version) => {
                write!(f, "unsupported layout version {version}")
            }
            LayoutDecodeError::InvalidData => f.write_str("invalid layout data"),
        }
    }
}

impl std::error::Error for LayoutDecodeError {}

impl From<DecodeError> for LayoutDecodeError {
    fn from(_: DecodeError) -> Self {
        LayoutDecodeError::InvalidData
    }
}

/// Header then field list, both in bincode's standard encoding.
pub fn encode_layout_file(data: &LayoutFileData) -> Result<Vec<u8>, EncodeError> {
    let config = bincode::config::standard();
    let mut bytes = bincode::encode_to_vec(LayoutFileHeader::current(), config)?;
    bytes.extend(bincode::encode_to_vec(data, config)?);
    Ok(bytes)
}

pub fn decode_layout_file(payload: &[u8]) -> Result<LayoutFileData, LayoutDecodeError> {
    let config = bincode::config::standard();
    let (header, read): (LayoutFileHeader, usize) = bincode::decode_from_slice(payload, config)?;
    if header.magic != LAYOUT_FILE_MAGIC {
        return Err(LayoutDecodeError::InvalidData);
    }
    if header.version != LAYOUT_FILE_VERSION {
        return Err(LayoutDecodeError::UnsupportedVersion(header.version));
    }
    let (data, _) = bincode::decode_from_slice(&payload[read..], config)?;
    Ok(data)
}

/// Accepts a binary layout file, or UTF-8 text holding either layout JSON
/// shape.
pub fn parse_layout_bytes(payload: &[u8]) -> Result<Vec<SavedField>, LayoutDecodeError> {
    if payload.starts_with(&LAYOUT_FILE_MAGIC) {
        return decode_layout_file(payload).map(|data| data.fields);
    }
    let text = std::str::from_utf8(payload).map_err(|_| LayoutDecodeError::InvalidData)?;
    parse_layout_json(text)
}

/// Parses the page's layout JSON: a bare array of field records, or a
/// `{"version": 1, "fields": [...]}` object. Blank text and `null` are an
/// empty layout. Records that do not look like a field, or that have no
/// key, are skipped.
pub fn parse_layout_json(text: &str) -> Result<Vec<SavedField>, LayoutDecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(trimmed).map_err(|_| LayoutDecodeError::InvalidData)?;
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        Value::Object(mut object) => {
            if let Some(version) = object.get("version").and_then(Value::as_u64) {
                if version != u64::from(LAYOUT_FILE_VERSION) {
                    return Err(LayoutDecodeError::UnsupportedVersion(
                        u32::try_from(version).unwrap_or(u32::MAX),
                    ));
                }
            }
            match object.remove("fields") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(LayoutDecodeError::InvalidData),
            }
        }
        _ => return Err(LayoutDecodeError::InvalidData),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawField>(entry).ok())
        .filter_map(RawField::into_saved)
        .collect())
}

#[derive(Deserialize)]
struct RawField {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    w: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    font_size: Option<f64>,
}

impl RawField {
    fn into_saved(self) -> Option<SavedField> {
        let key = self.key.filter(|key| !key.trim().is_empty())?;
        let label = self.label.unwrap_or_else(|| key.clone());
        Some(SavedField {
            kind: FieldKind::from_type_attr(self.kind.as_deref()),
            x: self.x.map(round_px).unwrap_or(0),
            y: self.y.map(round_px).unwrap_or(0),
            w: self.w.filter(|w| *w > 0.0).map(round_px),
            h: self.h.filter(|h| *h > 0.0).map(round_px),
            font_size: self
                .font_size
                .filter(|size| *size >= 1.0)
                .map(|size| size.round() as u32),
            key,
            label,
        })
    }
}

fn round_px(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key: &str) -> SavedField {
        SavedField {
            key: key.to_string(),
            label: key.to_uppercase(),
            kind: FieldKind::Text,
            x: 10,
            y: 20,
            w: Some(160),
            h: Some(30),
            font_size: Some(18),
        }
    }

    #[test]
    fn layout_file_decodes_what_it_encodes() {
        let data = LayoutFileData {
            fields: vec![field("nome"), field("cpf")],
        };
        let bytes = encode_layout_file(&data).unwrap();
        assert!(bytes.starts_with(&LAYOUT_FILE_MAGIC));
        assert_eq!(decode_layout_file(&bytes), Ok(data));
    }

    fn file_with_version(version: u32) -> Vec<u8> {
        let config = bincode::config::standard();
        let header = LayoutFileHeader {
            magic: LAYOUT_FILE_MAGIC,
            version,
        };
        let mut bytes = bincode::encode_to_vec(header, config).unwrap();
        bytes.extend(bincode::encode_to_vec(LayoutFileData::default(), config).unwrap());
        bytes
    }

    #[test]
    fn future_layout_version_is_rejected() {
        assert_eq!(
            decode_layout_file(&file_with_version(7)),
            Err(LayoutDecodeError::UnsupportedVersion(7))
        );
        assert_eq!(
            decode_layout_file(&file_with_version(LAYOUT_FILE_VERSION)),
            Ok(LayoutFileData::default())
        );
    }

    #[test]
    fn truncated_body_is_invalid() {
        let mut bytes = file_with_version(LAYOUT_FILE_VERSION);
        bytes.pop();
        assert_eq!(decode_layout_file(&bytes), Err(LayoutDecodeError::InvalidData));
    }

    #[test]
    fn truncated_file_is_invalid() {
        assert_eq!(decode_layout_file(b"DBL"), Err(LayoutDecodeError::InvalidData));
        assert_eq!(decode_layout_file(b"XXXX\x01\0"), Err(LayoutDecodeError::InvalidData));
    }

    #[test]
    fn page_json_is_parsed_leniently() {
        let text = r#"[
            {"key": "nome", "label": "Nome", "type": "text", "x": 12.4, "y": 7.6, "w": null, "h": null, "font_size": 20},
            {"key": "foto", "label": "Foto", "type": "image", "x": 1, "y": 2, "w": 140, "h": 100},
            {"key": "", "label": "Sem chave", "x": 1, "y": 2},
            {"label": "Sem chave"},
            42
        ]"#;
        let fields = parse_layout_json(text).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].x, 12);
        assert_eq!(fields[0].y, 8);
        assert_eq!(fields[0].w, None);
        assert_eq!(fields[0].font_size, Some(20));
        assert_eq!(fields[1].kind, FieldKind::Image);
        assert_eq!(fields[1].font_size, None);
    }

    #[test]
    fn blank_and_null_are_empty_layouts() {
        assert_eq!(parse_layout_json(""), Ok(Vec::new()));
        assert_eq!(parse_layout_json("  null "), Ok(Vec::new()));
        assert_eq!(parse_layout_json("[]"), Ok(Vec::new()));
    }

    #[test]
    fn non_list_json_is_invalid() {
        assert_eq!(parse_layout_json("{\"a\": 1}"), Err(LayoutDecodeError::InvalidData));
        assert_eq!(parse_layout_json("\"fields\""), Err(LayoutDecodeError::InvalidData));
        assert_eq!(parse_layout_json("[{"), Err(LayoutDecodeError::InvalidData));
    }

    #[test]
    fn versioned_json_object_is_accepted() {
        let text = r#"{"version": 1, "fields": [{"key": "rg", "x": 3, "y": 4}]}"#;
        let fields = parse_layout_json(text).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].label, "rg");
        assert_eq!(
            parse_layout_json(r#"{"version": 2, "fields": []}"#),
            Err(LayoutDecodeError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn bytes_fall_back_to_json_text() {
        let fields = parse_layout_bytes(br#"[{"key": "cep", "x": 5, "y": 6}]"#).unwrap();
        assert_eq!(fields[0].key, "cep");
        let binary = encode_layout_file(&LayoutFileData {
            fields: vec![field("cep")],
        })
        .unwrap();
        assert_eq!(parse_layout_bytes(&binary).unwrap(), vec![field("cep")]);
        assert_eq!(parse_layout_bytes(&[0xff, 0xfe]), Err(LayoutDecodeError::InvalidData));
    }
}
