use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    DragEvent, Element, Event, FileReader, HtmlButtonElement, HtmlElement, HtmlImageElement,
    HtmlInputElement, PointerEvent, ProgressEvent,
};

use docboard_shared::{parse_layout_bytes, Designer};

use crate::debug::{debug_enabled, debug_log, set_debug_mark, warn};
use crate::dom::{
    background_ready, field_id_from_event, find_element, get_element, measure_surface,
    surface_point,
};
use crate::palette::{bind_palette, descriptor_from_transfer};
use crate::panel::{ControlPanel, PanelInput};
use crate::persistence::{
    download_layout_file, read_designer_config, read_import_payload, read_initial_layout,
    write_positions,
};
use crate::render::render_fields;
use crate::state::State;

const SURFACE_ID: &str = "doc-canvas";
const BACKGROUND_ID: &str = "doc-background";
const PALETTE_ID: &str = "doc-fields";
const SAVE_FORM_ID: &str = "doc-save-form";
const SAVE_INPUT_ID: &str = "doc-positions";
const EXPORT_BUTTON_ID: &str = "doc-layout-export";
const IMPORT_BUTTON_ID: &str = "doc-layout-import";
const IMPORT_FILE_ID: &str = "doc-layout-file";

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() != Some("loading") {
        started.set(true);
        return start_designer();
    }

    let onready_started = started.clone();
    let onready = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onready_started.replace(true) {
            return;
        }
        if let Err(err) = start_designer() {
            web_sys::console::error_1(&err);
        }
    });
    document.add_event_listener_with_callback(
        "DOMContentLoaded",
        onready.as_ref().unchecked_ref(),
    )?;
    onready.forget();

    Ok(())
}

fn start_designer() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    set_debug_mark(&window, "run:start");
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let debug = debug_enabled(&window);

    // The designer only runs when all three of its targets are on the page.
    let targets = (
        get_element::<HtmlElement>(&document, SURFACE_ID),
        get_element::<HtmlImageElement>(&document, BACKGROUND_ID),
        get_element::<Element>(&document, PALETTE_ID),
    );
    let (surface, background, palette) = match targets {
        (Ok(surface), Ok(background), Ok(palette)) => (surface, background, palette),
        (surface, background, palette) => {
            for err in [surface.err(), background.err(), palette.err()]
                .into_iter()
                .flatten()
            {
                if let Some(message) = err.as_string() {
                    debug_log(debug, &format!("Designer disabled: {message}"));
                }
            }
            set_debug_mark(&window, "run:disabled");
            return Ok(());
        }
    };

    let config = read_designer_config(&document);
    let panel = ControlPanel::find(&document);
    if panel.is_none() {
        debug_log(debug, "Control panel not found, size controls disabled");
    }
    let state = Rc::new(RefCell::new(State::new(
        Designer::new(config),
        surface.clone(),
        background.clone(),
        panel,
        debug,
    )));
    {
        let mut state = state.borrow_mut();
        measure_surface(&mut state);
        render_fields(&document, &mut state);
        state.sync_panel_values();
    }

    let pills = bind_palette(&palette)?;
    debug_log(debug, &format!("Palette bound with {pills} fields"));
    set_debug_mark(&window, "run:palette");

    {
        let layout_loaded = Rc::new(Cell::new(false));
        let ready_state = state.clone();
        let ready_document = document.clone();
        let on_background_ready = Rc::new(move || {
            let mut state = ready_state.borrow_mut();
            measure_surface(&mut state);
            if !layout_loaded.replace(true) {
                let text = read_initial_layout(&ready_document).unwrap_or_default();
                match state.designer.load_layout_json(&text) {
                    Ok(count) => debug_log(state.debug, &format!("Loaded {count} saved fields")),
                    Err(err) => warn(&format!("Ignoring saved field positions: {err}")),
                }
                state.sync_panel_values();
            }
            render_fields(&ready_document, &mut state);
        });

        let on_image_event = on_background_ready.clone();
        let onimage = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_image_event();
        });
        background.add_event_listener_with_callback("load", onimage.as_ref().unchecked_ref())?;
        background.add_event_listener_with_callback("error", onimage.as_ref().unchecked_ref())?;
        onimage.forget();

        if background_ready(&background) {
            on_background_ready();
        } else {
            debug_log(debug, "Waiting for background image before loading fields");
        }
    }

    {
        let ondragover = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
            event.prevent_default();
        });
        surface.add_event_listener_with_callback("dragover", ondragover.as_ref().unchecked_ref())?;
        ondragover.forget();
    }

    {
        let drop_state = state.clone();
        let drop_surface = surface.clone();
        let drop_document = document.clone();
        let ondrop = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
            event.prevent_default();
            let Some(transfer) = event.data_transfer() else {
                return;
            };
            let descriptor = descriptor_from_transfer(&transfer);
            let Some(point) = surface_point(&drop_surface, event.client_x(), event.client_y())
            else {
                return;
            };
            let mut state = drop_state.borrow_mut();
            match state.designer.accept_drop(&descriptor, point) {
                Some(id) => {
                    debug_log(
                        state.debug,
                        &format!(
                            "Placed {} as field {} at {:.0},{:.0}",
                            descriptor.key,
                            id.raw(),
                            point.x,
                            point.y
                        ),
                    );
                    render_fields(&drop_document, &mut state);
                    state.sync_panel_values();
                }
                None => debug_log(state.debug, "Ignoring drop without a field key"),
            }
        });
        surface.add_event_listener_with_callback("drop", ondrop.as_ref().unchecked_ref())?;
        ondrop.forget();
    }

    {
        let down_state = state.clone();
        let down_surface = surface.clone();
        let down_document = document.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let mut state = down_state.borrow_mut();
            if state
                .panel
                .as_ref()
                .is_some_and(|panel| panel.contains(&event))
            {
                return;
            }
            let Some(point) = surface_point(&down_surface, event.client_x(), event.client_y())
            else {
                return;
            };
            let previous = state.designer.selected();
            match field_id_from_event(&event) {
                Some(id) => {
                    event.prevent_default();
                    state.designer.select(Some(id));
                    if state.designer.begin_drag(id, point) {
                        state.drag_pointer = Some(event.pointer_id());
                        let _ = down_surface.set_pointer_capture(event.pointer_id());
                    }
                }
                None => state.designer.select(None),
            }
            if state.designer.selected() != previous {
                state.sync_panel_values();
            }
            render_fields(&down_document, &mut state);
        });
        surface.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_surface = surface.clone();
        let move_document = document.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = move_state.borrow_mut();
            if state.drag_pointer != Some(event.pointer_id()) {
                return;
            }
            event.prevent_default();
            let Some(point) = surface_point(&move_surface, event.client_x(), event.client_y())
            else {
                return;
            };
            if state.designer.update_drag(point) {
                render_fields(&move_document, &mut state);
            }
        });
        surface.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let stop_state = state.clone();
        let stop_surface = surface.clone();
        let stop_document = document.clone();
        let onstop = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = stop_state.borrow_mut();
            if state.drag_pointer != Some(event.pointer_id()) {
                return;
            }
            state.drag_pointer = None;
            if stop_surface.has_pointer_capture(event.pointer_id()) {
                let _ = stop_surface.release_pointer_capture(event.pointer_id());
            }
            if let Some(id) = state.designer.end_drag() {
                debug_log(state.debug, &format!("Drag of field {} ended", id.raw()));
            }
            render_fields(&stop_document, &mut state);
        });
        for name in ["pointerup", "pointercancel", "pointerleave", "lostpointercapture"] {
            surface.add_event_listener_with_callback(name, onstop.as_ref().unchecked_ref())?;
        }
        onstop.forget();
    }

    let panel_inputs = {
        let state = state.borrow();
        let inputs = state
            .panel
            .as_ref()
            .map(|panel| PanelInput::ALL.map(|which| (which, panel.input(which).clone())));
        inputs
    };
    for (which, input) in panel_inputs.into_iter().flatten() {
        let input_state = state.clone();
        let input_document = document.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = input_state.borrow_mut();
            let value = state.panel.as_ref().and_then(|panel| panel.read(which));
            let (font_size, width, height) = which.arguments(value);
            if state.designer.apply_size_or_font(font_size, width, height) {
                render_fields(&input_document, &mut state);
            }
        });
        input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    if let (Some(form), Some(save_input)) = (
        find_element::<Element>(&document, SAVE_FORM_ID),
        find_element::<HtmlInputElement>(&document, SAVE_INPUT_ID),
    ) {
        let save_state = state.clone();
        let onsubmit = Closure::<dyn FnMut(Event)>::new(move |_| {
            let state = save_state.borrow();
            if write_positions(&save_input, &state.designer) {
                debug_log(
                    state.debug,
                    &format!("Saving {} field positions", state.designer.fields().len()),
                );
            } else {
                warn("Saved layout not loaded yet, keeping stored field positions");
            }
        });
        form.add_event_listener_with_callback("submit", onsubmit.as_ref().unchecked_ref())?;
        onsubmit.forget();
    }

    if let Some(export_button) = find_element::<HtmlButtonElement>(&document, EXPORT_BUTTON_ID) {
        let export_state = state.clone();
        let export_document = document.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let state = export_state.borrow();
            if let Err(err) = download_layout_file(&export_document, &state.designer) {
                web_sys::console::error_1(&err);
            }
        });
        export_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    if let (Some(import_button), Some(import_file)) = (
        find_element::<HtmlButtonElement>(&document, IMPORT_BUTTON_ID),
        find_element::<HtmlInputElement>(&document, IMPORT_FILE_ID),
    ) {
        {
            let import_file = import_file.clone();
            let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
                import_file.set_value("");
                import_file.click();
            });
            import_button
                .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
            onclick.forget();
        }

        let import_file_cb = import_file.clone();
        let import_state = state.clone();
        let import_document = document.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Some(file) = import_file_cb.files().and_then(|list| list.get(0)) else {
                return;
            };
            let Ok(reader) = FileReader::new() else {
                return;
            };
            let load_state = import_state.clone();
            let load_document = import_document.clone();
            let onload = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
                let Some(payload) = read_import_payload(&event) else {
                    warn("Layout import produced no data");
                    return;
                };
                let fields = match parse_layout_bytes(&payload) {
                    Ok(fields) => fields,
                    Err(err) => {
                        warn(&format!("Ignoring imported layout: {err}"));
                        return;
                    }
                };
                let mut state = load_state.borrow_mut();
                measure_surface(&mut state);
                let count = state.designer.load_layout(&fields);
                debug_log(state.debug, &format!("Imported {count} fields"));
                state.sync_panel_values();
                render_fields(&load_document, &mut state);
            });
            reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
            let _ = reader.read_as_array_buffer(&file);
        });
        import_file.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let resize_state = state.clone();
        let resize_document = document.clone();
        let onresize = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = resize_state.borrow_mut();
            measure_surface(&mut state);
            render_fields(&resize_document, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    set_debug_mark(&window, "run:ready");
    Ok(())
}
