// File: src/config.rs
// Purpose: Validation config record, loadable from TOML or a JS object

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Selectors and class names used by the validation controller
///
/// Key names are camelCase so the same record deserializes from the
/// JavaScript object handed to `enableValidation` and from `formwatch.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Selects the forms to manage
    #[serde(default = "default_form_selector")]
    pub form_selector: String,

    /// Selects the fields inside a form
    #[serde(default = "default_input_selector")]
    pub input_selector: String,

    /// Selects the submit control inside a form
    #[serde(default = "default_submit_button_selector")]
    pub submit_button_selector: String,

    /// Added to the submit control while it is disabled
    #[serde(default = "default_inactive_button_class")]
    pub inactive_button_class: String,

    /// Added to a field while it is invalid
    #[serde(default = "default_input_error_class")]
    pub input_error_class: String,

    /// Added to an error element while its text is visible
    #[serde(default = "default_error_class")]
    pub error_class: String,
}

// Default values
fn default_form_selector() -> String {
    ".popup__form".to_string()
}

fn default_input_selector() -> String {
    ".popup__input".to_string()
}

fn default_submit_button_selector() -> String {
    ".popup__button".to_string()
}

fn default_inactive_button_class() -> String {
    "popup__button_disabled".to_string()
}

fn default_input_error_class() -> String {
    "popup__input_type_error".to_string()
}

fn default_error_class() -> String {
    "popup__error_visible".to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            form_selector: default_form_selector(),
            input_selector: default_input_selector(),
            submit_button_selector: default_submit_button_selector(),
            inactive_button_class: default_inactive_button_class(),
            input_error_class: default_input_error_class(),
            error_class: default_error_class(),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from the default path (./formwatch.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("formwatch.toml")
    }

    /// Parse an inline TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ValidationConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Class selector for the error element that belongs to `field_name`
    pub fn error_selector(field_name: &str) -> String {
        format!(".{}-error", field_name)
    }
}
