use wasm_bindgen::prelude::*;
use web_sys::{window, Document, Element, Window};

/// Get window and document, failing when not running in a page
pub fn page() -> Result<(Window, Document), JsValue> {
    let win = window().ok_or("no global `window` exists")?;
    let doc = win.document().ok_or("should have a document on window")?;
    Ok((win, doc))
}

/// Look up a required element; a missing id is an error naming it
pub fn element_by_id(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("element #{id} not found")))
}
