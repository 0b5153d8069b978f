use web_sys::{Document, Event, HtmlElement, HtmlInputElement};

use docboard_shared::{Designer, PlacedField};

use crate::dom::{element_size, event_within, find_element, set_px};

pub const PANEL_ID: &str = "doc-field-panel";
pub const FONT_SIZE_ID: &str = "doc-font-size";
pub const WIDTH_ID: &str = "doc-field-width";
pub const HEIGHT_ID: &str = "doc-field-height";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelInput {
    FontSize,
    Width,
    Height,
}

impl PanelInput {
    pub const ALL: [PanelInput; 3] = [PanelInput::FontSize, PanelInput::Width, PanelInput::Height];

    /// Font size, width and height arguments for one edited input.
    pub fn arguments(self, value: Option<f64>) -> (Option<f64>, Option<f64>, Option<f64>) {
        match self {
            PanelInput::FontSize => (value, None, None),
            PanelInput::Width => (None, value, None),
            PanelInput::Height => (None, None, value),
        }
    }
}

/// Floating font size / width / height editor for the selected field.
pub struct ControlPanel {
    root: HtmlElement,
    font_size: HtmlInputElement,
    width: HtmlInputElement,
    height: HtmlInputElement,
}

impl ControlPanel {
    pub fn find(document: &Document) -> Option<Self> {
        Some(Self {
            root: find_element(document, PANEL_ID)?,
            font_size: find_element(document, FONT_SIZE_ID)?,
            width: find_element(document, WIDTH_ID)?,
            height: find_element(document, HEIGHT_ID)?,
        })
    }

    pub fn input(&self, which: PanelInput) -> &HtmlInputElement {
        match which {
            PanelInput::FontSize => &self.font_size,
            PanelInput::Width => &self.width,
            PanelInput::Height => &self.height,
        }
    }

    pub fn read(&self, which: PanelInput) -> Option<f64> {
        self.input(which).value().trim().parse::<f64>().ok()
    }

    pub fn contains(&self, event: &Event) -> bool {
        event_within(event, &self.root)
    }

    pub fn show_values(&self, field: Option<&PlacedField>) {
        let Some(field) = field else {
            self.root.set_hidden(true);
            return;
        };
        self.font_size.set_value(&field.font_size.to_string());
        self.width.set_value(&format!("{:.0}", field.size.width));
        self.height.set_value(&format!("{:.0}", field.size.height));
    }

    pub fn place(&self, designer: &Designer) {
        if designer.selected_field().is_none() {
            self.root.set_hidden(true);
            return;
        }
        self.root.set_hidden(false);
        let Some(placement) = designer.panel_placement(element_size(&self.root)) else {
            self.root.set_hidden(true);
            return;
        };
        set_px(&self.root, "left", placement.left);
        set_px(&self.root, "top", placement.top);
        let side = if placement.flipped { "left" } else { "right" };
        let _ = self.root.set_attribute("data-side", side);
    }
}
