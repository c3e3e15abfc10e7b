//! Marquee control panel
//!
//! Binds the color picker and the brightness/speed inputs of the control page
//! so that every change posts the matching form to the marquee host.

pub mod binding;
mod dom;
pub mod picker;
mod submit;

use std::rc::Rc;

use marquee_protocol::{ControlBinding, Trigger};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event};

use crate::binding::{bind_all, FormSubmitter, Page};
use crate::picker::PickerOptions;
use crate::submit::FetchTransport;

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let (window, document) = dom::page()?;
    let submitter = Rc::new(FormSubmitter::new(FetchTransport::new(window, document.clone())));

    bind_all(&DomPage { document }, &submitter)
        .inspect_err(|e| web_sys::console::error_2(&"[controls] setup stopped:".into(), e))
}

/// The live document
struct DomPage {
    document: Document,
}

impl Page for DomPage {
    type Error = JsValue;

    fn listen(&self, binding: &ControlBinding, mut on_change: Box<dyn FnMut()>) -> Result<(), JsValue> {
        let input = dom::element_by_id(&self.document, binding.input_id)?;

        match binding.trigger {
            Trigger::PickerChange => {
                // The picker lives as long as the page
                picker::attach(&input, &PickerOptions::default(), on_change)?;
            }
            Trigger::InputChange => {
                let onchange = Closure::wrap(Box::new(move |_e: Event| {
                    on_change();
                }) as Box<dyn FnMut(_)>);
                input.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
                onchange.forget();
            }
        }

        Ok(())
    }
}
