use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlImageElement, Node};

use docboard_shared::{BackgroundMetrics, FieldId, Point, Size};

use crate::debug::debug_log;
use crate::state::State;

pub const FIELD_ID_ATTR: &str = "data-field-id";

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn find_element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    get_element(document, id).ok()
}

pub fn element_size(element: &Element) -> Size {
    let rect = element.get_bounding_client_rect();
    Size::new(rect.width(), rect.height())
}

/// True once the image has finished loading or failed to. A broken image
/// has no intrinsic size and measures 1:1.
pub fn background_ready(image: &HtmlImageElement) -> bool {
    image.complete()
}

pub fn background_metrics(image: &HtmlImageElement) -> BackgroundMetrics {
    let natural = if image.natural_width() > 0 && image.natural_height() > 0 {
        Some(Size::new(
            f64::from(image.natural_width()),
            f64::from(image.natural_height()),
        ))
    } else {
        None
    };
    BackgroundMetrics {
        rendered: element_size(image),
        natural,
    }
}

/// Client coordinates to surface pixels.
pub fn surface_point(surface: &Element, client_x: i32, client_y: i32) -> Option<Point> {
    let rect = surface.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let point = Point::new(
        f64::from(client_x) - rect.left(),
        f64::from(client_y) - rect.top(),
    );
    point.is_finite().then_some(point)
}

pub fn set_px(element: &HtmlElement, property: &str, value: f64) {
    let _ = element.style().set_property(property, &format!("{value}px"));
}

pub fn field_id_from_event(event: &Event) -> Option<FieldId> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let field = target.closest(&format!("[{FIELD_ID_ATTR}]")).ok()??;
    field
        .get_attribute(FIELD_ID_ATTR)?
        .parse::<u32>()
        .ok()
        .map(FieldId::from_raw)
}

pub fn event_within(event: &Event, container: &Element) -> bool {
    let Some(target) = event.target().and_then(|target| target.dyn_into::<Node>().ok()) else {
        return false;
    };
    let container: &Node = container.as_ref();
    container.contains(Some(&target))
}

/// Re-reads the surface and background sizes. Placed fields follow a
/// surface size change so they stay put on the background image.
pub fn measure_surface(state: &mut State) {
    let size = element_size(&state.surface);
    let previous = state.designer.surface();
    if size != previous {
        debug_log(
            state.debug,
            &format!(
                "Resizing surface from {}x{} to {}x{}",
                previous.width, previous.height, size.width, size.height
            ),
        );
        state.designer.resize_surface(size);
    }
    state
        .designer
        .set_background(background_metrics(&state.background));
}
