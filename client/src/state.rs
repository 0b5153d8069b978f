use std::collections::HashMap;

use web_sys::{HtmlElement, HtmlImageElement};

use docboard_shared::{Designer, FieldId};

use crate::panel::ControlPanel;

pub struct State {
    pub designer: Designer,
    pub surface: HtmlElement,
    pub background: HtmlImageElement,
    /// Rendered element of each placed field.
    pub elements: HashMap<FieldId, HtmlElement>,
    pub panel: Option<ControlPanel>,
    /// Pointer that owns the active drag.
    pub drag_pointer: Option<i32>,
    pub debug: bool,
}

impl State {
    pub fn new(
        designer: Designer,
        surface: HtmlElement,
        background: HtmlImageElement,
        panel: Option<ControlPanel>,
        debug: bool,
    ) -> Self {
        Self {
            designer,
            surface,
            background,
            elements: HashMap::new(),
            panel,
            drag_pointer: None,
            debug,
        }
    }

    /// Refreshes the panel inputs from the selected field. Called when the
    /// selection changes, not on every render, so typing is not overwritten.
    pub fn sync_panel_values(&self) {
        if let Some(panel) = &self.panel {
            panel.show_values(self.designer.selected_field());
        }
    }
}
