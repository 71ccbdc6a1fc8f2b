//! formwatch WASM
//!
//! Browser bindings for the formwatch validation controller.
//!
//! # Example (JavaScript)
//! ```javascript
//! import init, { enableValidation, clearValidation } from './formwatch_wasm.js';
//!
//! await init();
//! enableValidation({
//!     formSelector: '.popup__form',
//!     inputSelector: '.popup__input',
//!     submitButtonSelector: '.popup__button',
//!     inactiveButtonClass: 'popup__button_disabled',
//!     inputErrorClass: 'popup__input_type_error',
//!     errorClass: 'popup__error_visible',
//! });
//!
//! // after a successful submit
//! form.reset();
//! clearValidation(form, config);
//! ```

pub mod dom;
pub mod image;

use dom::{query_forms, DomForm};
use formwatch_core::{clear_validation, enable_validation, Environment, FormValidator, ValidationConfig};
use image::{ImageElementProbe, LocalTaskSpawner};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

thread_local! {
    /// Validators created by `enableValidation`, kept so `clearValidation`
    /// can also drop their in-flight image checks
    static VALIDATORS: RefCell<Vec<FormValidator<DomForm>>> = const { RefCell::new(Vec::new()) };
}

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Config from a JS object; `undefined` and `null` mean defaults
fn parse_config(config: JsValue) -> Result<ValidationConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ValidationConfig::default());
    }

    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse validation config: {}", e)))
}

/// Drop forms an earlier `enableValidation` call already wired up
fn unregistered(forms: Vec<DomForm>) -> Vec<DomForm> {
    VALIDATORS.with(|validators| {
        let validators = validators.borrow();
        forms
            .into_iter()
            .filter(|form| {
                let known = validators
                    .iter()
                    .any(|validator| validator.form().is_same(&form.0));
                if known {
                    tracing::debug!("form already under validation, skipped");
                }
                !known
            })
            .collect()
    })
}

/// Wire validation onto every form matching `config.formSelector`
#[wasm_bindgen(js_name = enableValidation)]
pub fn enable_validation_js(config: JsValue) -> Result<(), JsValue> {
    let config = parse_config(config)?;

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return Err(JsValue::from_str("enableValidation requires a document"));
    };

    let forms = unregistered(query_forms(&document, &config.form_selector));
    let env = Environment::new(ImageElementProbe, LocalTaskSpawner);
    let session = enable_validation(forms, config, &env);

    VALIDATORS.with(|validators| validators.borrow_mut().extend(session.into_validators()));
    Ok(())
}

/// Hide every error in `form` and recompute its submit state
///
/// Image checks still loading for `form` are dropped. Fields and classes come
/// from `config`, queried from the form as it is now.
#[wasm_bindgen(js_name = clearValidation)]
pub fn clear_validation_js(form: web_sys::Element, config: JsValue) -> Result<(), JsValue> {
    let config = parse_config(config)?;

    VALIDATORS.with(|validators| {
        validators
            .borrow()
            .iter()
            .filter(|validator| validator.form().is_same(&form))
            .for_each(|validator| validator.cancel_checks());
    });

    clear_validation(&DomForm(form), &config);
    Ok(())
}

/// Quick check of the scheme rule used for image links
#[wasm_bindgen(js_name = isImageUrlFormat)]
pub fn is_image_url_format_js(url: &str) -> bool {
    formwatch_core::validate_url_format(url).is_ok()
}
