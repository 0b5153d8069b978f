use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod designer;
mod layout_format;

pub use config::DesignerConfig;
pub use designer::{BackgroundMetrics, Designer, PanelPlacement};
pub use layout_format::{
    decode_layout_file, encode_layout_file, parse_layout_bytes, parse_layout_json,
    LayoutDecodeError, LayoutFileData, LAYOUT_FILE_MAGIC, LAYOUT_FILE_VERSION,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True unless both dimensions are finite and strictly positive.
    pub fn is_empty(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, Default, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Image,
}

impl FieldKind {
    /// Reads a palette `data-type` or saved `type` value. Anything that is
    /// not `image` is a text field.
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("image") => FieldKind::Image,
            _ => FieldKind::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Image => "image",
        }
    }
}

/// A palette entry that can be dropped onto the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Designer-local handle of a placed field. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u32);

impl FieldId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A field on the surface. Position and size are in surface pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedField {
    pub id: FieldId,
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub position: Point,
    pub size: Size,
    pub font_size: u32,
    /// Font size in image pixels as read from a saved layout. Saved back
    /// unchanged until the font size is edited.
    pub saved_font_size: Option<u32>,
}

impl PlacedField {
    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.right()
            && point.y >= self.position.y
            && point.y <= self.bottom()
    }
}

/// Persisted form of a placed field, in the background image's natural
/// pixel grid. This is the JSON record exchanged with the page.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct SavedField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub x: i64,
    pub y: i64,
    pub w: Option<i64>,
    pub h: Option<i64>,
    pub font_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_reads_as_text() {
        assert_eq!(FieldKind::from_type_attr(None), FieldKind::Text);
        assert_eq!(FieldKind::from_type_attr(Some("")), FieldKind::Text);
        assert_eq!(FieldKind::from_type_attr(Some("signature")), FieldKind::Text);
        assert_eq!(FieldKind::from_type_attr(Some(" image ")), FieldKind::Image);
    }

    #[test]
    fn saved_field_uses_page_field_names() {
        let field = SavedField {
            key: "nome".to_string(),
            label: "Nome".to_string(),
            kind: FieldKind::Image,
            x: 1,
            y: 2,
            w: Some(3),
            h: Some(4),
            font_size: Some(18),
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["font_size"], 18);
        assert_eq!(json["w"], 3);
    }

    #[test]
    fn empty_size_detection() {
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(f64::NAN, 10.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }
}
