use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DataTransfer, DragEvent, Element};

use docboard_shared::{FieldDescriptor, FieldKind};

pub const PILL_SELECTOR: &str = ".doc-field-pill";
pub const KEY_FORMAT: &str = "text/key";
pub const LABEL_FORMAT: &str = "text/label";
pub const TYPE_FORMAT: &str = "text/type";

pub fn descriptor_from_pill(pill: &Element) -> FieldDescriptor {
    let key = pill.get_attribute("data-key").unwrap_or_default();
    let label = pill.text_content().unwrap_or_default().trim().to_string();
    let kind = FieldKind::from_type_attr(pill.get_attribute("data-type").as_deref());
    FieldDescriptor { key, label, kind }
}

/// Reads a descriptor back from a drop. A missing key reads as empty and is
/// left for the designer to ignore.
pub fn descriptor_from_transfer(transfer: &DataTransfer) -> FieldDescriptor {
    let key = transfer.get_data(KEY_FORMAT).unwrap_or_default();
    let label = transfer.get_data(LABEL_FORMAT).unwrap_or_default();
    let kind = transfer.get_data(TYPE_FORMAT).ok();
    FieldDescriptor {
        key,
        label,
        kind: FieldKind::from_type_attr(kind.as_deref()),
    }
}

fn write_transfer(transfer: &DataTransfer, descriptor: &FieldDescriptor) {
    let _ = transfer.set_data(KEY_FORMAT, &descriptor.key);
    let _ = transfer.set_data(LABEL_FORMAT, &descriptor.label);
    let _ = transfer.set_data(TYPE_FORMAT, descriptor.kind.as_str());
    transfer.set_effect_allowed("copy");
}

/// Puts the dragged pill's descriptor on the drag. Returns the number of
/// pills found in the palette.
pub fn bind_palette(palette: &Element) -> Result<u32, JsValue> {
    let ondragstart = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
        let Some(pill) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|element| element.closest(PILL_SELECTOR).ok().flatten())
        else {
            return;
        };
        let Some(transfer) = event.data_transfer() else {
            return;
        };
        write_transfer(&transfer, &descriptor_from_pill(&pill));
    });
    palette.add_event_listener_with_callback("dragstart", ondragstart.as_ref().unchecked_ref())?;
    ondragstart.forget();
    Ok(palette.query_selector_all(PILL_SELECTOR)?.length())
}
