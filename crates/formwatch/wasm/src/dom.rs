//! `web-sys` implementations of the formwatch element traits

use formwatch_core::{
    Element, ErrorSlot, FieldHandle, FormHandle, Handler, SubmitControl, ValidationConfig,
    ValidityState,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement};

macro_rules! impl_element {
    ($ty:ty) => {
        impl Element for $ty {
            fn add_class(&self, class: &str) {
                if let Err(err) = self.0.class_list().add_1(class) {
                    tracing::warn!(class, error = ?err, "failed to add class");
                }
            }

            fn remove_class(&self, class: &str) {
                if let Err(err) = self.0.class_list().remove_1(class) {
                    tracing::warn!(class, error = ?err, "failed to remove class");
                }
            }

            fn has_class(&self, class: &str) -> bool {
                self.0.class_list().contains(class)
            }
        }
    };
}

/// Elements under `root` matching `selector`; an invalid selector matches nothing
fn query_all(root: &web_sys::Element, selector: &str) -> Vec<web_sys::Element> {
    let list = match root.query_selector_all(selector) {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(selector, error = ?err, "invalid selector");
            return Vec::new();
        }
    };

    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect()
}

fn query_one(root: &web_sys::Element, selector: &str) -> Option<web_sys::Element> {
    match root.query_selector(selector) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(selector, error = ?err, "invalid selector");
            None
        }
    }
}

/// Forms in `document` matching `selector`
pub fn query_forms(document: &Document, selector: &str) -> Vec<DomForm> {
    let Some(root) = document.document_element() else {
        return Vec::new();
    };

    let mut forms = Vec::new();
    if root.matches(selector).unwrap_or(false) {
        forms.push(DomForm(root.clone()));
    }
    forms.extend(query_all(&root, selector).into_iter().map(DomForm));
    forms
}

/// A `<form>` (or any container) element
#[derive(Clone, Debug)]
pub struct DomForm(pub web_sys::Element);

impl DomForm {
    pub fn is_same(&self, element: &web_sys::Element) -> bool {
        self.0.is_same_node(Some(element))
    }
}

impl FormHandle for DomForm {
    type Field = DomField;
    type Submit = DomSubmit;
    type Error = DomErrorSlot;

    fn query_fields(&self, selector: &str) -> Vec<DomField> {
        query_all(&self.0, selector)
            .into_iter()
            .filter_map(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(DomField)
            .collect()
    }

    fn query_submit(&self, selector: &str) -> Option<DomSubmit> {
        query_one(&self.0, selector).map(DomSubmit)
    }

    fn query_error_slot(&self, field_name: &str) -> Option<DomErrorSlot> {
        query_one(&self.0, &ValidationConfig::error_selector(field_name)).map(DomErrorSlot)
    }
}

/// An `<input>` element
#[derive(Clone, Debug)]
pub struct DomField(pub HtmlInputElement);

impl_element!(DomField);

impl DomField {
    fn listen(&self, event: &str, handler: Handler) {
        let closure = Closure::<dyn FnMut()>::new(move || handler());

        if let Err(err) = self
            .0
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event, error = ?err, "failed to register listener");
            return;
        }

        // Listeners live as long as the page
        closure.forget();
    }
}

impl FieldHandle for DomField {
    fn name(&self) -> String {
        self.0.name()
    }

    fn input_type(&self) -> String {
        self.0.type_()
    }

    fn value(&self) -> String {
        self.0.value()
    }

    fn validity(&self) -> ValidityState {
        let native = self.0.validity();
        let mut state = ValidityState::default();
        state.value_missing = native.value_missing();
        state.type_mismatch = native.type_mismatch();
        state.pattern_mismatch = native.pattern_mismatch();
        state.too_short = native.too_short();
        state.too_long = native.too_long();
        state.range_underflow = native.range_underflow();
        state.range_overflow = native.range_overflow();
        state.step_mismatch = native.step_mismatch();
        state.bad_input = native.bad_input();

        if native.custom_error() {
            state.set_custom_validity(&self.validation_message());
        }
        state
    }

    fn validation_message(&self) -> String {
        self.0.validation_message().unwrap_or_default()
    }

    fn set_custom_validity(&self, message: &str) {
        self.0.set_custom_validity(message);
    }

    fn data_error_message(&self) -> Option<String> {
        self.0.get_attribute("data-error-message")
    }

    fn on_input(&self, handler: Handler) {
        self.listen("input", handler);
    }

    fn on_blur(&self, handler: Handler) {
        self.listen("blur", handler);
    }
}

/// The submit control, toggled through its `disabled` attribute
#[derive(Clone, Debug)]
pub struct DomSubmit(pub web_sys::Element);

impl_element!(DomSubmit);

impl SubmitControl for DomSubmit {
    fn set_disabled(&self, disabled: bool) {
        let result = if disabled {
            self.0.set_attribute("disabled", "")
        } else {
            self.0.remove_attribute("disabled")
        };

        if let Err(err) = result {
            tracing::warn!(error = ?err, "failed to toggle disabled");
        }
    }

    fn is_disabled(&self) -> bool {
        self.0.has_attribute("disabled")
    }
}

/// The `.{name}-error` element of a field
#[derive(Clone, Debug)]
pub struct DomErrorSlot(pub web_sys::Element);

impl_element!(DomErrorSlot);

impl ErrorSlot for DomErrorSlot {
    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }
}
