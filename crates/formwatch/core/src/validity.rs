//! Native constraint validity model

/// Snapshot of a field's constraint validation flags
///
/// Mirrors the browser `ValidityState`: the native flags plus an optional
/// custom override message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityState {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_short: bool,
    pub too_long: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub custom_error: bool,
    custom_message: String,
}

impl ValidityState {
    /// A state with no violations
    pub fn valid_state() -> Self {
        Self::default()
    }

    /// True when no constraint is violated, custom override included
    pub fn valid(&self) -> bool {
        !self.value_missing
            && !self.type_mismatch
            && !self.pattern_mismatch
            && !self.too_short
            && !self.too_long
            && !self.range_underflow
            && !self.range_overflow
            && !self.step_mismatch
            && !self.bad_input
            && !self.custom_error
    }

    /// Message the browser would report for this state
    pub fn validation_message(&self) -> String {
        if self.custom_error {
            return self.custom_message.clone();
        }
        if self.value_missing {
            return "Please fill out this field.".into();
        }
        if self.type_mismatch {
            return "Please enter a valid value.".into();
        }
        if self.pattern_mismatch {
            return "Please match the requested format.".into();
        }
        if self.too_short {
            return "Please lengthen this text.".into();
        }
        if self.too_long {
            return "Please shorten this text.".into();
        }
        if self.range_underflow || self.range_overflow {
            return "Value is out of range.".into();
        }
        if self.step_mismatch || self.bad_input {
            return "Please enter a valid value.".into();
        }
        String::new()
    }

    /// An empty message clears the override
    pub fn set_custom_validity(&mut self, message: &str) {
        self.custom_message = message.to_string();
        self.custom_error = !message.is_empty();
    }

    pub fn custom_message(&self) -> &str {
        &self.custom_message
    }
}

/// Classified `type` attribute of an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Url,
    Email,
    Other(String),
}

impl InputKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => InputKind::Text,
            "url" => InputKind::Url,
            "email" => InputKind::Email,
            other => InputKind::Other(other.to_string()),
        }
    }
}
