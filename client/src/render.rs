use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use docboard_shared::{FieldKind, PlacedField};

use crate::dom::{set_px, FIELD_ID_ATTR};
use crate::state::State;

fn field_class(field: &PlacedField, selected: bool, dragging: bool) -> String {
    let mut class_name = String::from("doc-field");
    if field.kind == FieldKind::Image {
        class_name.push_str(" doc-field-image");
    }
    if selected {
        class_name.push_str(" is-selected");
    }
    if dragging {
        class_name.push_str(" is-dragging");
    }
    class_name
}

fn create_field_element(document: &Document, field: &PlacedField) -> Option<HtmlElement> {
    let element = document
        .create_element("div")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let _ = element.set_attribute(FIELD_ID_ATTR, &field.id.raw().to_string());
    Some(element)
}

fn project_field(element: &HtmlElement, field: &PlacedField, selected: bool, dragging: bool) {
    element.set_class_name(&field_class(field, selected, dragging));
    if element.text_content().as_deref() != Some(field.label.as_str()) {
        element.set_text_content(Some(&field.label));
    }
    let _ = element.set_attribute("data-key", &field.key);
    let _ = element.set_attribute("data-type", field.kind.as_str());
    set_px(element, "left", field.position.x);
    set_px(element, "top", field.position.y);
    set_px(element, "width", field.size.width);
    set_px(element, "height", field.size.height);
    set_px(element, "font-size", f64::from(field.font_size));
}

/// Brings the surface's field elements in line with the designer.
pub fn render_fields(document: &Document, state: &mut State) {
    let State {
        designer,
        surface,
        elements,
        panel,
        ..
    } = state;

    elements.retain(|id, element| {
        let keep = designer.field(*id).is_some();
        if !keep {
            element.remove();
        }
        keep
    });

    let selected = designer.selected();
    let dragging = designer.dragging();
    for field in designer.fields() {
        let element = match elements.get(&field.id) {
            Some(element) => element.clone(),
            None => {
                let Some(element) = create_field_element(document, field) else {
                    continue;
                };
                let _ = surface.append_child(&element);
                elements.insert(field.id, element.clone());
                element
            }
        };
        project_field(
            &element,
            field,
            selected == Some(field.id),
            dragging == Some(field.id),
        );
    }

    if let Some(panel) = panel {
        panel.place(designer);
    }
}
