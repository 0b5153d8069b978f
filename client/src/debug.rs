use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::Window;

pub fn debug_enabled(window: &Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1")
        || search.contains("debug=true")
        || search.contains("log=1")
        || search.contains("log=true")
}

pub fn set_debug_mark(window: &Window, mark: &str) {
    let _ = Reflect::set(
        window.as_ref(),
        &JsValue::from_str("__docboard_last_mark"),
        &JsValue::from_str(mark),
    );
}

pub fn debug_log(debug: bool, message: &str) {
    if debug {
        web_sys::console::log_1(&message.into());
    }
}

pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}
