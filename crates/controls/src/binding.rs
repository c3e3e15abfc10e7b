//! Change-to-submit handlers
//!
//! Each control forwards its change events, one request per event, to a
//! `Submitter`. Nothing is debounced, awaited or retried.
//!
//! The page and the network sit behind `Page` and `FormTransport` so the
//! wiring runs natively in tests.

use std::rc::Rc;

use marquee_protocol::{ControlBinding, CONTROLS};

/// Sends a control's form to its endpoint.
///
/// Implementations fire the request and return; the outcome is never
/// reported back.
pub trait Submitter {
    fn submit(&self, binding: &ControlBinding);
}

/// Handler attached to one control
pub struct ChangeToSubmit<S: Submitter> {
    binding: ControlBinding,
    submitter: Rc<S>,
}

impl<S: Submitter> ChangeToSubmit<S> {
    pub const fn new(binding: ControlBinding, submitter: Rc<S>) -> Self {
        Self { binding, submitter }
    }

    pub const fn binding(&self) -> &ControlBinding {
        &self.binding
    }

    /// Called for every change event on the bound control
    pub fn on_change(&self) {
        self.submitter.submit(&self.binding);
    }
}

/// The document holding the controls
pub trait Page {
    type Error;

    /// Run `on_change` for every change of the binding's input. Fails when
    /// the input is not on the page.
    fn listen(&self, binding: &ControlBinding, on_change: Box<dyn FnMut()>) -> Result<(), Self::Error>;
}

/// Install every control in order. The first missing element aborts setup,
/// leaving the controls after it unbound.
pub fn bind_all<P, S>(page: &P, submitter: &Rc<S>) -> Result<(), P::Error>
where
    P: Page,
    S: Submitter + 'static,
{
    for binding in CONTROLS {
        let handler = ChangeToSubmit::new(binding, submitter.clone());
        page.listen(&binding, Box::new(move || handler.on_change()))?;
    }
    Ok(())
}

/// Reads a form off the page and sends it
pub trait FormTransport {
    type Body;
    type Error;

    fn read_form(&self, form_id: &str) -> Result<Self::Body, Self::Error>;

    /// Start the request; its outcome is not awaited
    fn post(&self, endpoint: &str, body: Self::Body) -> Result<(), Self::Error>;

    fn report(&self, endpoint: &str, error: Self::Error);
}

/// Posts the control's whole form, read when the change happens, to its
/// endpoint
pub struct FormSubmitter<T> {
    transport: T,
}

impl<T: FormTransport> FormSubmitter<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: FormTransport> Submitter for FormSubmitter<T> {
    fn submit(&self, binding: &ControlBinding) {
        let sent = self
            .transport
            .read_form(binding.form_id)
            .and_then(|body| self.transport.post(binding.endpoint, body));
        if let Err(e) = sent {
            self.transport.report(binding.endpoint, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use marquee_protocol::ControlKind;

    use super::*;

    #[derive(Default)]
    struct RecordingSubmitter {
        sent: RefCell<Vec<&'static str>>,
    }

    impl Submitter for RecordingSubmitter {
        fn submit(&self, binding: &ControlBinding) {
            self.sent.borrow_mut().push(binding.endpoint);
        }
    }

    /// Every request "fails"; the handler must not care
    #[derive(Default)]
    struct FailingSubmitter {
        attempts: Cell<u32>,
    }

    impl Submitter for FailingSubmitter {
        fn submit(&self, _binding: &ControlBinding) {
            self.attempts.set(self.attempts.get() + 1);
        }
    }

    fn handlers(submitter: &Rc<RecordingSubmitter>) -> Vec<ChangeToSubmit<RecordingSubmitter>> {
        CONTROLS
            .iter()
            .map(|b| ChangeToSubmit::new(*b, submitter.clone()))
            .collect()
    }

    #[test]
    fn test_binding_sends_nothing() {
        let submitter = Rc::new(RecordingSubmitter::default());
        let _handlers = handlers(&submitter);
        assert!(submitter.sent.borrow().is_empty());
    }

    #[test]
    fn test_each_change_posts_to_its_endpoint() {
        let submitter = Rc::new(RecordingSubmitter::default());
        let handlers = handlers(&submitter);

        for handler in &handlers {
            handler.on_change();
        }

        assert_eq!(
            *submitter.sent.borrow(),
            vec!["/color", "/brightness", "/speed"]
        );
    }

    #[test]
    fn test_rapid_changes_are_not_coalesced() {
        let submitter = Rc::new(RecordingSubmitter::default());
        let speed = ChangeToSubmit::new(ControlKind::Speed.binding(), submitter.clone());

        for _ in 0..25 {
            speed.on_change();
        }

        let sent = submitter.sent.borrow();
        assert_eq!(sent.len(), 25);
        assert!(sent.iter().all(|e| *e == "/speed"));
    }

    #[test]
    fn test_failed_requests_do_not_stop_later_changes() {
        let submitter = Rc::new(FailingSubmitter::default());
        let color = ChangeToSubmit::new(ControlKind::Color.binding(), submitter.clone());

        color.on_change();
        color.on_change();
        color.on_change();

        assert_eq!(submitter.attempts.get(), 3);
        assert_eq!(color.binding().form_id, "color-form");
    }

    /// Page with a subset of the control inputs. Listeners are kept so
    /// tests can fire them.
    struct FakePage {
        inputs: Vec<&'static str>,
        listeners: RefCell<HashMap<&'static str, Box<dyn FnMut()>>>,
    }

    impl FakePage {
        fn with_inputs(inputs: &[&'static str]) -> Self {
            Self {
                inputs: inputs.to_vec(),
                listeners: RefCell::new(HashMap::new()),
            }
        }

        fn is_bound(&self, input_id: &str) -> bool {
            self.listeners.borrow().contains_key(input_id)
        }

        fn change(&self, input_id: &str) {
            let mut listeners = self.listeners.borrow_mut();
            let listener = listeners.get_mut(input_id).unwrap();
            listener();
        }
    }

    impl Page for FakePage {
        type Error = String;

        fn listen(&self, binding: &ControlBinding, on_change: Box<dyn FnMut()>) -> Result<(), String> {
            if !self.inputs.contains(&binding.input_id) {
                return Err(format!("element #{} not found", binding.input_id));
            }
            self.listeners.borrow_mut().insert(binding.input_id, on_change);
            Ok(())
        }
    }

    const ALL_INPUTS: [&str; 3] = ["color-input", "brightness-input", "speed-input"];

    #[test]
    fn test_bind_all_binds_every_control() {
        let page = FakePage::with_inputs(&ALL_INPUTS);
        let submitter = Rc::new(RecordingSubmitter::default());
        bind_all(&page, &submitter).unwrap();

        assert!(ALL_INPUTS.iter().all(|id| page.is_bound(id)));
        assert!(submitter.sent.borrow().is_empty());

        page.change("speed-input");
        page.change("color-input");
        assert_eq!(*submitter.sent.borrow(), vec!["/speed", "/color"]);
    }

    #[test]
    fn test_missing_input_stops_setup() {
        let page = FakePage::with_inputs(&["color-input", "speed-input"]);
        let submitter = Rc::new(RecordingSubmitter::default());

        let err = bind_all(&page, &submitter).unwrap_err();
        assert!(err.contains("brightness-input"));
        assert!(page.is_bound("color-input"));
        assert!(!page.is_bound("brightness-input"));
        assert!(!page.is_bound("speed-input"));

        // Controls bound before the failure keep working
        page.change("color-input");
        assert_eq!(*submitter.sent.borrow(), vec!["/color"]);
    }

    /// Forms as field values; requests are recorded instead of sent
    #[derive(Default)]
    struct FakeTransport {
        forms: RefCell<HashMap<&'static str, String>>,
        posted: RefCell<Vec<(String, String)>>,
        reported: RefCell<Vec<(String, String)>>,
    }

    impl FakeTransport {
        fn set_value(&self, form_id: &'static str, value: &str) {
            self.forms.borrow_mut().insert(form_id, value.to_string());
        }
    }

    impl FormTransport for &FakeTransport {
        type Body = String;
        type Error = String;

        fn read_form(&self, form_id: &str) -> Result<String, String> {
            self.forms
                .borrow()
                .get(form_id)
                .cloned()
                .ok_or_else(|| format!("element #{form_id} not found"))
        }

        fn post(&self, endpoint: &str, body: String) -> Result<(), String> {
            self.posted.borrow_mut().push((endpoint.to_string(), body));
            Ok(())
        }

        fn report(&self, endpoint: &str, error: String) {
            self.reported.borrow_mut().push((endpoint.to_string(), error));
        }
    }

    #[test]
    fn test_form_read_when_the_change_happens() {
        let transport = FakeTransport::default();
        transport.set_value("brightness-form", "10");
        let submitter = Rc::new(FormSubmitter::new(&transport));
        let brightness = ChangeToSubmit::new(ControlKind::Brightness.binding(), submitter);

        transport.set_value("brightness-form", "200");
        brightness.on_change();
        transport.set_value("brightness-form", "35");
        brightness.on_change();

        assert_eq!(
            *transport.posted.borrow(),
            vec![
                ("/brightness".to_string(), "200".to_string()),
                ("/brightness".to_string(), "35".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_form_is_reported_not_sent() {
        let transport = FakeTransport::default();
        let submitter = FormSubmitter::new(&transport);

        submitter.submit(&ControlKind::Speed.binding());

        assert!(transport.posted.borrow().is_empty());
        let reported = transport.reported.borrow();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].0, "/speed");
        assert!(reported[0].1.contains("speed-form"));
    }
}
