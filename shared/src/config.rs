use serde::{Deserialize, Serialize};

use crate::{FieldKind, Size};

pub const DEFAULT_FONT_SIZE: u32 = 18;
pub const MIN_SAVED_FONT_SIZE: u32 = 8;

/// Tunables of the designer. Every field has a default, so a partial JSON
/// object is a valid config.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DesignerConfig {
    pub default_font_size: u32,
    /// Serialized font sizes never go below this after scaling.
    pub min_saved_font_size: u32,
    pub text_size: Size,
    pub image_size: Size,
    /// Space between the selected field and the control panel.
    pub panel_gap: f64,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            min_saved_font_size: MIN_SAVED_FONT_SIZE,
            text_size: Size::new(160.0, 30.0),
            image_size: Size::new(140.0, 100.0),
            panel_gap: 8.0,
        }
    }
}

impl DesignerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    pub fn default_size(&self, kind: FieldKind) -> Size {
        match kind {
            FieldKind::Text => self.text_size,
            FieldKind::Image => self.image_size,
        }
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.default_font_size == 0 {
            self.default_font_size = defaults.default_font_size;
        }
        if self.min_saved_font_size == 0 {
            self.min_saved_font_size = 1;
        }
        if self.text_size.is_empty() {
            self.text_size = defaults.text_size;
        }
        if self.image_size.is_empty() {
            self.image_size = defaults.image_size;
        }
        if !self.panel_gap.is_finite() || self.panel_gap < 0.0 {
            self.panel_gap = defaults.panel_gap;
        }
        self
    }
}
