use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, FormData, HtmlFormElement, RequestInit, Window};

use crate::binding::FormTransport;
use crate::dom::element_by_id;

/// `FormData` over `fetch`, fire-and-forget
pub struct FetchTransport {
    window: Window,
    document: Document,
}

impl FetchTransport {
    pub const fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}

impl FormTransport for FetchTransport {
    type Body = FormData;
    type Error = JsValue;

    fn read_form(&self, form_id: &str) -> Result<FormData, JsValue> {
        let form = element_by_id(&self.document, form_id)?.dyn_into::<HtmlFormElement>()?;
        FormData::new_with_form(&form)
    }

    fn post(&self, endpoint: &str, body: FormData) -> Result<(), JsValue> {
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&body);

        let request = self.window.fetch_with_str_and_init(endpoint, &init);
        spawn_local(async move {
            // Neither the response nor a network error is observed
            let _ = JsFuture::from(request).await;
        });
        Ok(())
    }

    fn report(&self, endpoint: &str, error: JsValue) {
        web_sys::console::error_2(&format!("[controls] {endpoint} not sent:").into(), &error);
    }
}
