// File: src/controller.rs
// Purpose: Form validation controller - per-field checks, submit toggling, clear

use crate::config::ValidationConfig;
use crate::dom::{Element, ErrorSlot, FieldHandle, FormHandle, SubmitControl};
use crate::image_check::{
    is_url_field, probe_image_url, CheckToken, Environment, ImageProbe, InFlightCheck,
    UrlCheckError,
};
use std::rc::Rc;

/// Show `message` under `field` and mark the field invalid
pub fn show_input_error<F: FormHandle>(
    form: &F,
    field: &F::Field,
    message: &str,
    config: &ValidationConfig,
) {
    field.add_class(&config.input_error_class);

    match form.query_error_slot(&field.name()) {
        Some(slot) => {
            slot.set_text(message);
            slot.add_class(&config.error_class);
        }
        None => tracing::warn!(field = %field.name(), "no error element for field"),
    }
}

/// Empty and hide the error under `field` and drop its invalid marking
pub fn hide_input_error<F: FormHandle>(form: &F, field: &F::Field, config: &ValidationConfig) {
    field.remove_class(&config.input_error_class);

    match form.query_error_slot(&field.name()) {
        Some(slot) => {
            slot.remove_class(&config.error_class);
            slot.set_text("");
        }
        None => tracing::warn!(field = %field.name(), "no error element for field"),
    }
}

/// Re-evaluate one field and update its error display
///
/// A pattern mismatch swaps the native message for the field's
/// `data-error-message`; any other state clears the custom override. Only
/// presentation and the override change here, submit state is left to
/// [`toggle_button_state`].
pub fn check_input_validity<F: FormHandle>(form: &F, field: &F::Field, config: &ValidationConfig) {
    if field.validity().pattern_mismatch {
        // Without a data message the native one is shown
        let message = field.data_error_message().unwrap_or_default();
        field.set_custom_validity(&message);
    } else {
        field.set_custom_validity("");
    }

    if field.validity().valid() {
        hide_input_error(form, field, config);
    } else {
        show_input_error(form, field, &field.validation_message(), config);
    }
}

/// True if any field reports itself invalid, custom overrides included
pub fn has_invalid_input<T: FieldHandle>(fields: &[T]) -> bool {
    fields.iter().any(|field| !field.validity().valid())
}

/// Disable the submit control iff some field is invalid
pub fn toggle_button_state<T, S>(fields: &[T], button: Option<&S>, config: &ValidationConfig)
where
    T: FieldHandle,
    S: SubmitControl,
{
    let Some(button) = button else {
        return;
    };

    let invalid = has_invalid_input(fields);
    if invalid {
        button.add_class(&config.inactive_button_class);
    } else {
        button.remove_class(&config.inactive_button_class);
    }
    button.set_disabled(invalid);

    tracing::debug!(disabled = invalid, "submit state updated");
}

/// Apply a finished URL/image check to the field
pub fn apply_image_check<F: FormHandle>(
    form: &F,
    field: &F::Field,
    result: &Result<(), UrlCheckError>,
    config: &ValidationConfig,
) {
    match result {
        Ok(()) => {
            hide_input_error(form, field, config);
            field.set_custom_validity("");
        }
        Err(err) => {
            let message = err.to_string();
            show_input_error(form, field, &message, config);
            field.set_custom_validity(&message);
        }
    }
}

/// One-shot URL/image check on the field's current value
///
/// Returns `None` without touching the field when the value is empty.
/// Submit state is not recomputed; callers holding the field list do that.
pub async fn check_image_url<F: FormHandle>(
    form: &F,
    field: &F::Field,
    config: &ValidationConfig,
    probe: &dyn ImageProbe,
) -> Option<Result<(), UrlCheckError>> {
    let value = field.value();
    if value.is_empty() {
        return None;
    }

    let result = probe_image_url(probe, &value).await;
    apply_image_check(form, field, &result, config);
    Some(result)
}

/// Reset every field's error display in `form`, then recompute submit state
///
/// Field values are left as they are.
pub fn clear_validation<F: FormHandle>(form: &F, config: &ValidationConfig) {
    let fields = form.query_fields(&config.input_selector);
    let submit = form.query_submit(&config.submit_button_selector);

    for field in &fields {
        hide_input_error(form, field, config);
    }
    toggle_button_state(&fields, submit.as_ref(), config);
}

/// Validation wired to a single form
pub struct FormValidator<F: FormHandle> {
    form: F,
    fields: Rc<Vec<F::Field>>,
    submit: Option<F::Submit>,
    config: Rc<ValidationConfig>,
    checks: Vec<InFlightCheck>,
}

impl<F: FormHandle> FormValidator<F> {
    /// Collect the form's fields, apply initial submit state and register
    /// the input and blur handlers
    pub fn attach(form: F, config: Rc<ValidationConfig>, env: &Environment) -> Self {
        let fields = Rc::new(form.query_fields(&config.input_selector));
        let submit = form.query_submit(&config.submit_button_selector);

        if submit.is_none() {
            tracing::warn!(
                selector = %config.submit_button_selector,
                "form has no submit control"
            );
        }

        toggle_button_state(&fields, submit.as_ref(), &config);

        let mut checks = Vec::new();
        for field in fields.iter() {
            let in_flight = is_url_field(field).then(InFlightCheck::new);
            register_input_handler(&form, field, &fields, &submit, &config, in_flight.clone());

            if let Some(in_flight) = in_flight {
                register_blur_handler(&form, field, &fields, &submit, &config, env, &in_flight);
                checks.push(in_flight);
            }
        }

        tracing::debug!(
            fields = fields.len(),
            url_fields = checks.len(),
            "form validation attached"
        );

        Self {
            form,
            fields,
            submit,
            config,
            checks,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn fields(&self) -> &[F::Field] {
        &self.fields
    }

    pub fn submit(&self) -> Option<&F::Submit> {
        self.submit.as_ref()
    }

    /// Aggregate validity of the form
    pub fn is_valid(&self) -> bool {
        !has_invalid_input(&self.fields)
    }

    /// Recompute submit state from the fields as they are now
    pub fn refresh(&self) {
        toggle_button_state(&self.fields, self.submit.as_ref(), &self.config);
    }

    /// Drop every image check still in flight; their results are never applied
    pub fn cancel_checks(&self) {
        for check in &self.checks {
            check.invalidate();
        }
    }

    /// Like [`clear_validation`], and also drops any image check still in flight
    pub fn clear(&self) {
        self.cancel_checks();
        for field in self.fields.iter() {
            hide_input_error(&self.form, field, &self.config);
        }
        self.refresh();
    }
}

fn register_input_handler<F: FormHandle>(
    form: &F,
    field: &F::Field,
    fields: &Rc<Vec<F::Field>>,
    submit: &Option<F::Submit>,
    config: &Rc<ValidationConfig>,
    in_flight: Option<InFlightCheck>,
) {
    let form = form.clone();
    let target = field.clone();
    let fields = Rc::clone(fields);
    let submit = submit.clone();
    let config = Rc::clone(config);

    field.on_input(Box::new(move || {
        // A check started for the previous value no longer describes the field
        if let Some(in_flight) = &in_flight {
            in_flight.invalidate();
        }
        check_input_validity(&form, &target, &config);
        toggle_button_state(&fields, submit.as_ref(), &config);
    }));
}

fn register_blur_handler<F: FormHandle>(
    form: &F,
    field: &F::Field,
    fields: &Rc<Vec<F::Field>>,
    submit: &Option<F::Submit>,
    config: &Rc<ValidationConfig>,
    env: &Environment,
    in_flight: &InFlightCheck,
) {
    let form = form.clone();
    let target = field.clone();
    let fields = Rc::clone(fields);
    let submit = submit.clone();
    let config = Rc::clone(config);
    let env = env.clone();
    let in_flight = in_flight.clone();

    field.on_blur(Box::new(move || {
        // Taken before the empty check so an emptied field also outdates
        // whatever is still loading
        let token = in_flight.begin();
        let value = target.value();
        if value.is_empty() {
            return;
        }

        tracing::debug!(field = %target.name(), url = %value, "image check started");

        let task = run_image_check(
            form.clone(),
            target.clone(),
            Rc::clone(&fields),
            submit.clone(),
            Rc::clone(&config),
            Rc::clone(&env.probe),
            in_flight.clone(),
            token,
            value,
        );
        env.spawner.spawn_local(Box::pin(task));
    }));
}

#[allow(clippy::too_many_arguments)]
async fn run_image_check<F: FormHandle>(
    form: F,
    field: F::Field,
    fields: Rc<Vec<F::Field>>,
    submit: Option<F::Submit>,
    config: Rc<ValidationConfig>,
    probe: Rc<dyn ImageProbe>,
    in_flight: InFlightCheck,
    token: CheckToken,
    value: String,
) {
    let result = probe_image_url(probe.as_ref(), &value).await;

    if !in_flight.is_current(token) {
        tracing::debug!(field = %field.name(), url = %value, "stale image check dropped");
        return;
    }

    apply_image_check(&form, &field, &result, &config);
    toggle_button_state(&fields, submit.as_ref(), &config);
}

/// All forms under validation
pub struct ValidationSession<F: FormHandle> {
    validators: Vec<FormValidator<F>>,
}

impl<F: FormHandle> ValidationSession<F> {
    pub fn validators(&self) -> &[FormValidator<F>] {
        &self.validators
    }

    pub fn into_validators(self) -> Vec<FormValidator<F>> {
        self.validators
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// Wire validation onto every form in `forms`
///
/// Listeners stay registered for the lifetime of the handles, dropping the
/// returned session does not remove them.
pub fn enable_validation<F, I>(
    forms: I,
    config: ValidationConfig,
    env: &Environment,
) -> ValidationSession<F>
where
    F: FormHandle,
    I: IntoIterator<Item = F>,
{
    let config = Rc::new(config);
    let validators: Vec<_> = forms
        .into_iter()
        .map(|form| FormValidator::attach(form, Rc::clone(&config), env))
        .collect();

    if validators.is_empty() {
        tracing::debug!(selector = %config.form_selector, "no forms to validate");
    } else {
        tracing::info!(forms = validators.len(), "form validation enabled");
    }

    ValidationSession { validators }
}
