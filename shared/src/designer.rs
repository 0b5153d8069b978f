//! Field placement designer.
//!
//! The designer owns every placed field, the single selection and the
//! single active drag. Positions and sizes are kept in surface pixels;
//! [`Designer::serialize`] and [`Designer::load_layout`] convert to and
//! from the background image's natural pixel grid.

use crate::config::DesignerConfig;
use crate::layout_format::{parse_layout_json, LayoutDecodeError};
use crate::{FieldDescriptor, FieldId, PlacedField, Point, SavedField, Size};

/// Rendered and intrinsic size of the background image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BackgroundMetrics {
    pub rendered: Size,
    /// `None` while the image has no intrinsic size, e.g. before it loads.
    pub natural: Option<Size>,
}

impl BackgroundMetrics {
    /// Natural-over-rendered ratio per axis, 1:1 on any axis that cannot be
    /// measured.
    pub fn scale(&self) -> (f64, f64) {
        let Some(natural) = self.natural else {
            return (1.0, 1.0);
        };
        (
            axis_ratio(natural.width, self.rendered.width),
            axis_ratio(natural.height, self.rendered.height),
        )
    }
}

fn axis_ratio(natural: f64, rendered: f64) -> f64 {
    if natural.is_finite() && rendered.is_finite() && natural > 0.0 && rendered > 0.0 {
        natural / rendered
    } else {
        1.0
    }
}

/// Where the floating control panel goes, in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPlacement {
    pub left: f64,
    pub top: f64,
    /// Placed on the left of the field because the right side overflowed.
    pub flipped: bool,
}

#[derive(Clone, Copy, Debug)]
struct DragSession {
    id: FieldId,
    offset: Point,
}

#[derive(Debug)]
pub struct Designer {
    config: DesignerConfig,
    surface: Size,
    background: BackgroundMetrics,
    fields: Vec<PlacedField>,
    selected: Option<FieldId>,
    drag: Option<DragSession>,
    next_id: u32,
    layout_loaded: bool,
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}

impl Designer {
    pub fn new(config: DesignerConfig) -> Self {
        Self {
            config,
            surface: Size::default(),
            background: BackgroundMetrics::default(),
            fields: Vec::new(),
            selected: None,
            drag: None,
            next_id: 1,
            layout_loaded: false,
        }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn surface(&self) -> Size {
        self.surface
    }

    /// Records the surface size without touching placed fields.
    pub fn set_surface(&mut self, size: Size) {
        self.surface = size;
    }

    /// Records a new surface size and rescales placed fields so their place
    /// on the background image stays the same. Font sizes are left alone.
    pub fn resize_surface(&mut self, size: Size) {
        let previous = self.surface;
        self.surface = size;
        if previous.is_empty() || size.is_empty() {
            return;
        }
        let rx = size.width / previous.width;
        let ry = size.height / previous.height;
        for field in &mut self.fields {
            field.position.x *= rx;
            field.position.y *= ry;
            field.size.width *= rx;
            field.size.height *= ry;
        }
    }

    pub fn background(&self) -> BackgroundMetrics {
        self.background
    }

    pub fn set_background(&mut self, metrics: BackgroundMetrics) {
        self.background = metrics;
    }

    pub fn fields(&self) -> &[PlacedField] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&PlacedField> {
        self.fields.iter().find(|field| field.id == id)
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut PlacedField> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&PlacedField> {
        self.selected.and_then(|id| self.field(id))
    }

    pub fn dragging(&self) -> Option<FieldId> {
        self.drag.map(|drag| drag.id)
    }

    /// Whether a saved layout has been read, even an empty or malformed one.
    pub fn layout_loaded(&self) -> bool {
        self.layout_loaded
    }

    fn allocate_id(&mut self) -> FieldId {
        let id = FieldId::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Replaces all placed fields with a saved layout. Saved coordinates are
    /// in image pixels and are scaled down into surface pixels. Returns the
    /// number of fields placed.
    pub fn load_layout(&mut self, saved: &[SavedField]) -> usize {
        self.fields.clear();
        self.selected = None;
        self.drag = None;
        self.layout_loaded = true;
        let (sx, sy) = self.background.scale();
        for entry in saved {
            if entry.key.trim().is_empty() {
                continue;
            }
            let default_size = self.config.default_size(entry.kind);
            let width = entry
                .w
                .filter(|w| *w > 0)
                .map(|w| w as f64 / sx)
                .unwrap_or(default_size.width);
            let height = entry
                .h
                .filter(|h| *h > 0)
                .map(|h| h as f64 / sy)
                .unwrap_or(default_size.height);
            let saved_font_size = entry.font_size.filter(|size| *size >= 1);
            let font_size = saved_font_size
                .map(|size| ((f64::from(size) / sx).round() as u32).max(1))
                .unwrap_or(self.config.default_font_size);
            let id = self.allocate_id();
            self.fields.push(PlacedField {
                id,
                key: entry.key.clone(),
                label: entry.label.clone(),
                kind: entry.kind,
                position: Point::new(entry.x as f64 / sx, entry.y as f64 / sy),
                size: Size::new(width, height),
                font_size,
                saved_font_size,
            });
        }
        self.fields.len()
    }

    /// Loads the page's layout JSON. Malformed input leaves the surface
    /// empty; the error is returned only so the caller can log it.
    pub fn load_layout_json(&mut self, text: &str) -> Result<usize, LayoutDecodeError> {
        match parse_layout_json(text) {
            Ok(saved) => Ok(self.load_layout(&saved)),
            Err(err) => {
                self.load_layout(&[]);
                Err(err)
            }
        }
    }

    /// Places a palette descriptor at `point` and selects it. Descriptors
    /// without a key are ignored.
    pub fn accept_drop(&mut self, descriptor: &FieldDescriptor, point: Point) -> Option<FieldId> {
        if descriptor.key.trim().is_empty() || !point.is_finite() {
            return None;
        }
        let id = self.allocate_id();
        self.fields.push(PlacedField {
            id,
            key: descriptor.key.clone(),
            label: descriptor.label.clone(),
            kind: descriptor.kind,
            position: point,
            size: self.config.default_size(descriptor.kind),
            font_size: self.config.default_font_size,
            saved_font_size: None,
        });
        self.selected = Some(id);
        Some(id)
    }

    /// Starts dragging `id` with the pointer at `pointer` (surface pixels).
    /// Refused while another drag is active.
    pub fn begin_drag(&mut self, id: FieldId, pointer: Point) -> bool {
        if self.drag.is_some() || !pointer.is_finite() {
            return false;
        }
        let Some(field) = self.field(id) else {
            return false;
        };
        let offset = Point::new(pointer.x - field.position.x, pointer.y - field.position.y);
        self.drag = Some(DragSession { id, offset });
        true
    }

    /// Moves the dragged field so it follows the pointer, keeping its whole
    /// box on the surface. Returns whether a field moved.
    pub fn update_drag(&mut self, pointer: Point) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        if !pointer.is_finite() {
            return false;
        }
        let surface = self.surface;
        let Some(field) = self.field_mut(drag.id) else {
            self.drag = None;
            return false;
        };
        let left = clamp_axis(pointer.x - drag.offset.x, field.size.width, surface.width);
        let top = clamp_axis(pointer.y - drag.offset.y, field.size.height, surface.height);
        field.position = Point::new(left, top);
        true
    }

    pub fn end_drag(&mut self) -> Option<FieldId> {
        self.drag.take().map(|drag| drag.id)
    }

    /// Sets the single selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<FieldId>) {
        self.selected = id.filter(|id| self.field(*id).is_some());
    }

    /// Applies control panel values to the selected field. Font sizes below
    /// 1 and non-positive dimensions are ignored individually. Returns
    /// whether anything changed.
    pub fn apply_size_or_font(
        &mut self,
        font_size: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Some(field) = self.field_mut(id) else {
            return false;
        };
        let mut changed = false;
        if let Some(font_size) = font_size.filter(|size| size.is_finite() && *size >= 1.0) {
            field.font_size = font_size.round() as u32;
            field.saved_font_size = None;
            changed = true;
        }
        if let Some(width) = width.filter(|width| width.is_finite() && *width > 0.0) {
            field.size.width = width;
            changed = true;
        }
        if let Some(height) = height.filter(|height| height.is_finite() && *height > 0.0) {
            field.size.height = height;
            changed = true;
        }
        changed
    }

    /// Control panel position next to the selected field: on its right, or
    /// on its left when the right side would run past the surface edge.
    pub fn panel_placement(&self, panel: Size) -> Option<PanelPlacement> {
        let field = self.selected_field()?;
        let gap = self.config.panel_gap;
        let right_side = field.right() + gap;
        if right_side + panel.width <= self.surface.width {
            return Some(PanelPlacement {
                left: right_side,
                top: field.position.y,
                flipped: false,
            });
        }
        Some(PanelPlacement {
            left: (field.position.x - panel.width - gap).max(0.0),
            top: field.position.y,
            flipped: true,
        })
    }

    /// Converts every placed field into the background image's natural pixel
    /// grid, rounding to whole pixels.
    pub fn serialize(&self) -> Vec<SavedField> {
        let (sx, sy) = self.background.scale();
        let min_font = f64::from(self.config.min_saved_font_size);
        self.fields
            .iter()
            .map(|field| SavedField {
                key: field.key.clone(),
                label: field.label.clone(),
                kind: field.kind,
                x: round_px(field.position.x * sx),
                y: round_px(field.position.y * sy),
                w: Some(round_px(field.size.width * sx)),
                h: Some(round_px(field.size.height * sy)),
                font_size: Some(
                    field
                        .saved_font_size
                        .map(f64::from)
                        .unwrap_or(f64::from(field.font_size) * sx)
                        .max(min_font)
                        .round() as u32,
                ),
            })
            .collect()
    }

    pub fn serialize_json(&self) -> String {
        serde_json::to_string(&self.serialize()).unwrap_or_else(|_| "[]".to_string())
    }

    /// JSON for the page's save field, or `None` before any saved layout has
    /// been read so that an unloaded surface cannot replace stored positions.
    pub fn save_payload(&self) -> Option<String> {
        self.layout_loaded.then(|| self.serialize_json())
    }
}

fn clamp_axis(value: f64, extent: f64, limit: f64) -> f64 {
    value.min(limit - extent).max(0.0)
}

fn round_px(value: f64) -> i64 {
    value.round() as i64
}
