//! Bindings for the Huebee color picker loaded by the page

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

#[wasm_bindgen]
extern "C" {
    /// `window.Huebee`
    pub type Huebee;

    #[wasm_bindgen(constructor, catch)]
    fn new(anchor: &Element, options: &JsValue) -> Result<Huebee, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Huebee, event: &str, listener: &js_sys::Function);
}

/// Picker options recognized by Huebee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    pub notation: &'static str,
    pub saturations: u32,
    pub static_open: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            notation: "hex",
            saturations: 1,
            static_open: true,
        }
    }
}

impl PickerOptions {
    fn to_js(&self) -> Result<JsValue, JsValue> {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"notation".into(), &self.notation.into())?;
        js_sys::Reflect::set(&obj, &"saturations".into(), &self.saturations.into())?;
        js_sys::Reflect::set(&obj, &"staticOpen".into(), &self.static_open.into())?;
        Ok(obj.into())
    }
}

/// Attach a picker to `anchor` and call `on_change` whenever the color changes.
///
/// Huebee passes `(color, hue, sat, lum)`; only the event itself matters here,
/// the new value is read back from the input by the form submission.
pub fn attach<F>(anchor: &Element, options: &PickerOptions, mut on_change: F) -> Result<Huebee, JsValue>
where
    F: FnMut() + 'static,
{
    let picker = Huebee::new(anchor, &options.to_js()?)?;

    let callback = Closure::wrap(Box::new(move |_color: JsValue, _hue: JsValue, _sat: JsValue, _lum: JsValue| {
        on_change();
    }) as Box<dyn FnMut(JsValue, JsValue, JsValue, JsValue)>);
    picker.on("change", callback.as_ref().unchecked_ref());
    callback.forget();

    Ok(picker)
}
