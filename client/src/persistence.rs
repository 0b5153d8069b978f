use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Blob, BlobPropertyBag, Document, FileReader, HtmlAnchorElement, HtmlInputElement,
    ProgressEvent, Url,
};

use docboard_shared::{encode_layout_file, Designer, DesignerConfig, LayoutFileData};

use crate::debug::warn;

pub const POSITIONS_DATA_ID: &str = "doc-positions-data";
pub const CONFIG_DATA_ID: &str = "doc-designer-config";
pub const LAYOUT_FILE_NAME: &str = "layout.dbly";

/// Text of the page's embedded layout, if the page has one.
pub fn read_initial_layout(document: &Document) -> Option<String> {
    document
        .get_element_by_id(POSITIONS_DATA_ID)
        .and_then(|script| script.text_content())
}

pub fn read_designer_config(document: &Document) -> DesignerConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_DATA_ID)
        .and_then(|script| script.text_content())
    else {
        return DesignerConfig::default();
    };
    match DesignerConfig::from_json(&text) {
        Ok(config) => config,
        Err(err) => {
            warn(&format!("Ignoring designer config: {err}"));
            DesignerConfig::default()
        }
    }
}

/// Fills the hidden save input. Left untouched until the saved layout has
/// been read, so submitting early keeps the stored positions. Returns
/// whether the input was written.
pub fn write_positions(input: &HtmlInputElement, designer: &Designer) -> bool {
    let Some(payload) = designer.save_payload() else {
        return false;
    };
    input.set_value(&payload);
    true
}

pub fn download_layout_file(document: &Document, designer: &Designer) -> Result<(), JsValue> {
    let bytes = encode_layout_file(&LayoutFileData {
        fields: designer.serialize(),
    })
    .map_err(|err| JsValue::from_str(&format!("Could not encode layout: {err}")))?;
    let parts = Array::of1(&Uint8Array::from(bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type("application/octet-stream");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(LAYOUT_FILE_NAME);
    anchor.click();
    Url::revoke_object_url(&url)
}

pub fn read_import_payload(event: &ProgressEvent) -> Option<Vec<u8>> {
    let reader: FileReader = event.target()?.dyn_into().ok()?;
    let buffer = reader.result().ok()?;
    if buffer.is_null() || buffer.is_undefined() {
        return None;
    }
    Some(Uint8Array::new(&buffer).to_vec())
}
