//! Host element traits
//!
//! The controller never touches a concrete DOM. Browsers implement these
//! traits over `web-sys` elements (see `formwatch-wasm`); tests and other
//! hosts use the in-memory implementation in [`crate::memory`].
//!
//! Handles are cheap clones of a shared element, so a handler closure can
//! own the handles it needs.

use crate::validity::{InputKind, ValidityState};

/// Callback registered for an input or blur notification
pub type Handler = Box<dyn Fn()>;

/// Anything with a class list
pub trait Element: Clone + 'static {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
}

/// Element that displays a field's error text
pub trait ErrorSlot: Element {
    fn set_text(&self, text: &str);
    fn text(&self) -> String;
}

/// The control that submits a form
pub trait SubmitControl: Element {
    fn set_disabled(&self, disabled: bool);
    fn is_disabled(&self) -> bool;
}

/// An input with native constraint validation
pub trait FieldHandle: Element {
    fn name(&self) -> String;

    /// Raw `type` attribute
    fn input_type(&self) -> String;

    fn kind(&self) -> InputKind {
        InputKind::parse(&self.input_type())
    }

    fn value(&self) -> String;

    /// Current validity, custom override included
    fn validity(&self) -> ValidityState;

    fn validation_message(&self) -> String {
        self.validity().validation_message()
    }

    /// An empty message clears the override
    fn set_custom_validity(&self, message: &str);

    /// The `data-error-message` attribute, used for pattern mismatches
    fn data_error_message(&self) -> Option<String>;

    /// Called on every value change
    fn on_input(&self, handler: Handler);

    /// Called when the field loses focus
    fn on_blur(&self, handler: Handler);
}

/// A form container queried with CSS selectors
pub trait FormHandle: Clone + 'static {
    type Field: FieldHandle;
    type Submit: SubmitControl;
    type Error: ErrorSlot;

    fn query_fields(&self, selector: &str) -> Vec<Self::Field>;

    fn query_submit(&self, selector: &str) -> Option<Self::Submit>;

    /// Element matching `.{field_name}-error` inside this form
    fn query_error_slot(&self, field_name: &str) -> Option<Self::Error>;
}
