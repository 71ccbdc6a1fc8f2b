//! formwatch core
//!
//! Client-side form validation controller. Keeps each form's submit control
//! disabled until every field satisfies its native constraints (`required`,
//! `pattern`, `type`), shows per-field error messages, and checks on blur
//! that URL fields point to a loadable image.
//!
//! The controller works against the traits in [`dom`], so the same logic
//! drives browser elements (through `formwatch-wasm`) and the in-memory DOM
//! in [`memory`].
//!
//! ## Example
//!
//! ```rust
//! use formwatch_core::memory::{MemoryButton, MemoryField, MemoryForm, StaticImageProbe};
//! use formwatch_core::{enable_validation, Environment, SubmitControl, ValidationConfig};
//! use futures::executor::LocalPool;
//!
//! let form = MemoryForm::new()
//!     .class("popup__form")
//!     .with_field_and_slot(MemoryField::new("title").class("popup__input").required())
//!     .with_button(MemoryButton::new().class("popup__button"));
//!
//! let pool = LocalPool::new();
//! let env = Environment::new(StaticImageProbe::default(), pool.spawner());
//! let session = enable_validation([form.clone()], ValidationConfig::default(), &env);
//!
//! assert_eq!(session.len(), 1);
//! assert!(form.button().unwrap().is_disabled());
//!
//! form.field("title").unwrap().type_text("Lake");
//! assert!(!form.button().unwrap().is_disabled());
//! ```

pub mod config;
pub mod controller;
pub mod dom;
pub mod image_check;
pub mod url;
pub mod validity;

#[cfg(feature = "memory")]
pub mod memory;

pub use config::ValidationConfig;
pub use controller::{
    apply_image_check, check_image_url, check_input_validity, clear_validation,
    enable_validation, has_invalid_input, hide_input_error, show_input_error,
    toggle_button_state, FormValidator, ValidationSession,
};
pub use dom::{Element, ErrorSlot, FieldHandle, FormHandle, Handler, SubmitControl};
pub use image_check::{
    is_url_field, probe_image_url, validate_url_format, CheckToken, Environment, ImageProbe,
    InFlightCheck, ProbeError, TaskSpawner, UrlCheckError,
};
pub use validity::{InputKind, ValidityState};
