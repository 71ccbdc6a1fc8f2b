//! In-memory DOM
//!
//! Forms, fields, submit controls and error elements held in memory, with
//! the same constraint validation a browser applies. Useful for tests and
//! for driving the controller outside a browser.
//!
//! Supported selectors: `*`, `tag`, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, compounds of those (`input.popup__input[name=link]`) and
//! comma-separated lists. Combinators are not supported and never match.

use crate::dom::{Element, ErrorSlot, FieldHandle, FormHandle, Handler, SubmitControl};
use crate::image_check::{ImageProbe, ProbeError, TaskSpawner};
use crate::url::{is_absolute_url, is_email_address};
use crate::validity::{InputKind, ValidityState};
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl CompoundSelector {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }

        let mut selector = CompoundSelector::default();
        let mut rest = input;

        // Leading tag name or universal selector
        let tag_end = rest.find(&['.', '#', '['][..]).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && tag != "*" {
            selector.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(first) = rest.chars().next() {
            match first {
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body.find(&['.', '#', '['][..]).unwrap_or(body.len());
                    let name = &body[..end];
                    if name.is_empty() {
                        return None;
                    }
                    if first == '.' {
                        selector.classes.push(name.to_string());
                    } else {
                        selector.id = Some(name.to_string());
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest.find(']')?;
                    let inner = &rest[1..close];
                    let attr = match inner.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                            (name.trim().to_string(), Some(value.to_string()))
                        }
                        None => (inner.trim().to_string(), None),
                    };
                    selector.attrs.push(attr);
                    rest = &rest[close + 1..];
                }
                _ => return None,
            }
        }

        Some(selector)
    }

    fn matches(&self, data: &ElementData) -> bool {
        if let Some(ref tag) = self.tag {
            if *tag != data.tag {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if data.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| data.classes.contains(class)) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| match expected {
            Some(value) => data.attrs.get(name) == Some(value),
            None => data.attrs.contains_key(name),
        })
    }
}

fn selector_matches(selector: &str, data: &ElementData) -> bool {
    selector.split(',').any(|part| match CompoundSelector::parse(part) {
        Some(compound) => compound.matches(data),
        None => false,
    })
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

macro_rules! impl_element {
    ($ty:ty) => {
        impl Element for $ty {
            fn add_class(&self, class: &str) {
                self.inner.data.borrow_mut().add_class(class);
            }

            fn remove_class(&self, class: &str) {
                self.inner.data.borrow_mut().remove_class(class);
            }

            fn has_class(&self, class: &str) -> bool {
                self.inner.data.borrow().has_class(class)
            }
        }

        impl $ty {
            /// Add a class (builder form)
            pub fn class(self, class: &str) -> Self {
                self.inner.data.borrow_mut().add_class(class);
                self
            }

            /// Set an attribute (builder form)
            pub fn attr(self, name: &str, value: &str) -> Self {
                self.inner
                    .data
                    .borrow_mut()
                    .attrs
                    .insert(name.to_string(), value.to_string());
                self
            }

            pub fn get_attr(&self, name: &str) -> Option<String> {
                self.inner.data.borrow().attrs.get(name).cloned()
            }

            pub fn classes(&self) -> Vec<String> {
                self.inner.data.borrow().classes.clone()
            }

            #[allow(dead_code)]
            fn matches(&self, selector: &str) -> bool {
                selector_matches(selector, &self.inner.data.borrow())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FieldInner {
    data: RefCell<ElementData>,
    value: RefCell<String>,
    custom_message: RefCell<String>,
    pattern: RefCell<Option<Regex>>,
    input_handlers: RefCell<Vec<Rc<dyn Fn()>>>,
    blur_handlers: RefCell<Vec<Rc<dyn Fn()>>>,
}

/// An `<input>` with browser-style constraint validation
#[derive(Clone)]
pub struct MemoryField {
    inner: Rc<FieldInner>,
}

impl_element!(MemoryField);

impl MemoryField {
    pub fn new(name: &str) -> Self {
        let field = Self {
            inner: Rc::new(FieldInner {
                data: RefCell::new(ElementData::new("input")),
                ..Default::default()
            }),
        };
        field.attr("name", name)
    }

    pub fn with_type(self, kind: &str) -> Self {
        self.attr("type", kind)
    }

    pub fn required(self) -> Self {
        self.attr("required", "")
    }

    /// Whole-value pattern; an invalid expression is ignored as browsers do
    pub fn pattern(self, pattern: &str) -> Self {
        let compiled = Regex::new(&format!("^(?:{})$", pattern)).ok();
        if compiled.is_none() {
            tracing::warn!(pattern, "ignoring invalid pattern");
        }
        *self.inner.pattern.borrow_mut() = compiled;
        self.attr("pattern", pattern)
    }

    pub fn min_length(self, min: usize) -> Self {
        self.attr("minlength", &min.to_string())
    }

    pub fn max_length(self, max: usize) -> Self {
        self.attr("maxlength", &max.to_string())
    }

    pub fn error_message(self, message: &str) -> Self {
        self.attr("data-error-message", message)
    }

    /// Initial value (builder form, no events)
    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    /// Change the value without dispatching events
    pub fn set_value(&self, value: &str) {
        *self.inner.value.borrow_mut() = value.to_string();
    }

    /// Change the value and dispatch `input`
    pub fn type_text(&self, value: &str) {
        self.set_value(value);
        self.dispatch_input();
    }

    pub fn dispatch_input(&self) {
        let handlers = self.inner.input_handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }

    /// Dispatch `blur`
    pub fn blur(&self) {
        let handlers = self.inner.blur_handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }

    fn length_attr(&self, name: &str) -> Option<usize> {
        self.get_attr(name).and_then(|v| v.parse().ok())
    }
}

impl FieldHandle for MemoryField {
    fn name(&self) -> String {
        self.get_attr("name").unwrap_or_default()
    }

    fn input_type(&self) -> String {
        self.get_attr("type").unwrap_or_else(|| "text".to_string())
    }

    fn value(&self) -> String {
        self.inner.value.borrow().clone()
    }

    fn validity(&self) -> ValidityState {
        let value = self.value();
        let mut state = ValidityState::valid_state();

        if value.is_empty() {
            state.value_missing = self.get_attr("required").is_some();
        } else {
            state.type_mismatch = match self.kind() {
                InputKind::Url => !is_absolute_url(&value),
                InputKind::Email => !is_email_address(&value),
                _ => false,
            };

            if let Some(ref pattern) = *self.inner.pattern.borrow() {
                state.pattern_mismatch = !pattern.is_match(&value);
            }

            let length = value.chars().count();
            if let Some(min) = self.length_attr("minlength") {
                state.too_short = length < min;
            }
            if let Some(max) = self.length_attr("maxlength") {
                state.too_long = length > max;
            }
        }

        state.set_custom_validity(&self.inner.custom_message.borrow());
        state
    }

    fn set_custom_validity(&self, message: &str) {
        *self.inner.custom_message.borrow_mut() = message.to_string();
    }

    fn data_error_message(&self) -> Option<String> {
        self.get_attr("data-error-message")
    }

    fn on_input(&self, handler: Handler) {
        self.inner.input_handlers.borrow_mut().push(Rc::from(handler));
    }

    fn on_blur(&self, handler: Handler) {
        self.inner.blur_handlers.borrow_mut().push(Rc::from(handler));
    }
}

// ---------------------------------------------------------------------------
// Submit control and error slot
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ButtonInner {
    data: RefCell<ElementData>,
    disabled: Cell<bool>,
}

/// A submit `<button>`
#[derive(Clone)]
pub struct MemoryButton {
    inner: Rc<ButtonInner>,
}

impl_element!(MemoryButton);

impl MemoryButton {
    pub fn new() -> Self {
        let button = Self {
            inner: Rc::new(ButtonInner {
                data: RefCell::new(ElementData::new("button")),
                disabled: Cell::new(false),
            }),
        };
        button.attr("type", "submit")
    }
}

impl Default for MemoryButton {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitControl for MemoryButton {
    fn set_disabled(&self, disabled: bool) {
        self.inner.disabled.set(disabled);
    }

    fn is_disabled(&self) -> bool {
        self.inner.disabled.get()
    }
}

#[derive(Default)]
struct SlotInner {
    data: RefCell<ElementData>,
    text: RefCell<String>,
}

/// A `<span>` showing a field's error text
#[derive(Clone)]
pub struct MemoryErrorSlot {
    inner: Rc<SlotInner>,
}

impl_element!(MemoryErrorSlot);

impl MemoryErrorSlot {
    /// Error element for `field_name`, carrying class `{field_name}-error`
    pub fn for_field(field_name: &str) -> Self {
        let slot = Self {
            inner: Rc::new(SlotInner {
                data: RefCell::new(ElementData::new("span")),
                text: RefCell::new(String::new()),
            }),
        };
        slot.class(&format!("{}-error", field_name))
    }
}

impl ErrorSlot for MemoryErrorSlot {
    fn set_text(&self, text: &str) {
        *self.inner.text.borrow_mut() = text.to_string();
    }

    fn text(&self) -> String {
        self.inner.text.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Form and document
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FormInner {
    data: RefCell<ElementData>,
    fields: RefCell<Vec<MemoryField>>,
    buttons: RefCell<Vec<MemoryButton>>,
    slots: RefCell<Vec<MemoryErrorSlot>>,
}

/// A `<form>` and the elements inside it
#[derive(Clone)]
pub struct MemoryForm {
    inner: Rc<FormInner>,
}

impl_element!(MemoryForm);

impl MemoryForm {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(FormInner {
                data: RefCell::new(ElementData::new("form")),
                ..Default::default()
            }),
        }
    }

    pub fn with_field(self, field: MemoryField) -> Self {
        self.inner.fields.borrow_mut().push(field);
        self
    }

    /// Add a field together with its `{name}-error` element
    pub fn with_field_and_slot(self, field: MemoryField) -> Self {
        let slot = MemoryErrorSlot::for_field(&field.name());
        self.with_field(field).with_error_slot(slot)
    }

    pub fn with_button(self, button: MemoryButton) -> Self {
        self.inner.buttons.borrow_mut().push(button);
        self
    }

    pub fn with_error_slot(self, slot: MemoryErrorSlot) -> Self {
        self.inner.slots.borrow_mut().push(slot);
        self
    }

    /// Field by `name` attribute
    pub fn field(&self, name: &str) -> Option<MemoryField> {
        self.inner
            .fields
            .borrow()
            .iter()
            .find(|field| field.name() == name)
            .cloned()
    }

    /// First button in the form
    pub fn button(&self) -> Option<MemoryButton> {
        self.inner.buttons.borrow().first().cloned()
    }
}

impl Default for MemoryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FormHandle for MemoryForm {
    type Field = MemoryField;
    type Submit = MemoryButton;
    type Error = MemoryErrorSlot;

    fn query_fields(&self, selector: &str) -> Vec<MemoryField> {
        self.inner
            .fields
            .borrow()
            .iter()
            .filter(|field| field.matches(selector))
            .cloned()
            .collect()
    }

    fn query_submit(&self, selector: &str) -> Option<MemoryButton> {
        self.inner
            .buttons
            .borrow()
            .iter()
            .find(|button| button.matches(selector))
            .cloned()
    }

    fn query_error_slot(&self, field_name: &str) -> Option<MemoryErrorSlot> {
        let class = format!("{}-error", field_name);
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|slot| slot.has_class(&class))
            .cloned()
    }
}

/// A page holding forms
#[derive(Clone, Default)]
pub struct MemoryDocument {
    forms: Vec<MemoryForm>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(mut self, form: MemoryForm) -> Self {
        self.forms.push(form);
        self
    }

    /// Forms matching `selector`, in document order
    pub fn query_forms(&self, selector: &str) -> Vec<MemoryForm> {
        self.forms
            .iter()
            .filter(|form| form.matches(selector))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Image probes and spawner
// ---------------------------------------------------------------------------

/// Answers image loads from a fixed set of reachable URLs
#[derive(Clone, Default)]
pub struct StaticImageProbe {
    reachable: Rc<RefCell<HashSet<String>>>,
    attempts: Rc<RefCell<Vec<String>>>,
}

impl StaticImageProbe {
    pub fn new<I, S>(reachable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reachable: Rc::new(RefCell::new(reachable.into_iter().map(Into::into).collect())),
            attempts: Rc::default(),
        }
    }

    pub fn allow(&self, url: &str) {
        self.reachable.borrow_mut().insert(url.to_string());
    }

    /// URLs that were actually loaded, in order
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ImageProbe for StaticImageProbe {
    async fn load(&self, url: &str) -> Result<(), ProbeError> {
        self.attempts.borrow_mut().push(url.to_string());

        if self.reachable.borrow().contains(url) {
            Ok(())
        } else {
            Err(ProbeError {
                url: url.to_string(),
            })
        }
    }
}

/// Image loads that stay pending until resolved by hand
///
/// Lets callers settle overlapping loads in any order.
#[derive(Clone, Default)]
pub struct ManualImageProbe {
    pending: Rc<RefCell<Vec<(String, oneshot::Sender<bool>)>>>,
}

impl ManualImageProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Settle the oldest pending load of `url`; returns false if none is pending
    pub fn resolve(&self, url: &str, loaded: bool) -> bool {
        let mut pending = self.pending.borrow_mut();
        let Some(index) = pending.iter().position(|(pending_url, _)| pending_url == url) else {
            return false;
        };
        let (_, sender) = pending.remove(index);
        sender.send(loaded).is_ok()
    }
}

#[async_trait(?Send)]
impl ImageProbe for ManualImageProbe {
    async fn load(&self, url: &str) -> Result<(), ProbeError> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push((url.to_string(), sender));

        match receiver.await {
            Ok(true) => Ok(()),
            _ => Err(ProbeError {
                url: url.to_string(),
            }),
        }
    }
}

impl TaskSpawner for LocalSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = LocalSpawnExt::spawn_local(self, task) {
            tracing::warn!(error = %err, "failed to spawn image check");
        }
    }
}
