//! Browser tests, run with `wasm-pack test --headless --firefox`

use formwatch_core::UrlCheckError;
use formwatch_wasm::{clear_validation_js, enable_validation_js};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Event, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

const FORM_HTML: &str = r#"
  <input class="w-input" name="title" required pattern="[A-Za-z ]+"
         data-error-message="Letters only">
  <span class="title-error"></span>
  <button class="w-button" type="submit">Save</button>
"#;

const LINK_FORM_HTML: &str = r#"
  <input class="w-input" type="url" name="link" required>
  <span class="link-error"></span>
  <button class="w-button" type="submit">Save</button>
"#;

fn mount(form_class: &str) -> web_sys::Element {
    mount_html(form_class, FORM_HTML)
}

fn mount_html(form_class: &str, html: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let form = document.create_element("form").unwrap();
    form.set_class_name(form_class);
    form.set_inner_html(html);
    document.body().unwrap().append_child(&form).unwrap();
    form
}

fn config(form_class: &str) -> JsValue {
    let source = format!(
        r#"({{
            formSelector: ".{form_class}",
            inputSelector: ".w-input",
            submitButtonSelector: ".w-button",
            inactiveButtonClass: "off",
            inputErrorClass: "bad",
            errorClass: "shown"
        }})"#
    );
    js_sys::eval(&source).unwrap()
}

fn type_into(form: &web_sys::Element, value: &str) {
    let input: HtmlInputElement = form
        .query_selector(".w-input")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    input.set_value(value);
    input.dispatch_event(&Event::new("input").unwrap()).unwrap();
}

fn error_text(form: &web_sys::Element) -> String {
    slot_text(form, "title")
}

fn slot_text(form: &web_sys::Element, name: &str) -> String {
    form.query_selector(&format!(".{name}-error"))
        .unwrap()
        .unwrap()
        .text_content()
        .unwrap_or_default()
}

fn submit_disabled(form: &web_sys::Element) -> bool {
    form.query_selector(".w-button")
        .unwrap()
        .unwrap()
        .has_attribute("disabled")
}

#[wasm_bindgen_test]
fn test_submit_follows_validity() {
    let form = mount("fw-toggle");
    enable_validation_js(config("fw-toggle")).unwrap();
    assert!(submit_disabled(&form));

    type_into(&form, "Lake");
    assert!(!submit_disabled(&form));

    type_into(&form, "Lake 42");
    assert!(submit_disabled(&form));
    assert_eq!(error_text(&form), "Letters only");
}

#[wasm_bindgen_test]
fn test_clear_hides_errors() {
    let form = mount("fw-clear");
    enable_validation_js(config("fw-clear")).unwrap();

    type_into(&form, "42");
    assert_eq!(error_text(&form), "Letters only");

    clear_validation_js(form.clone(), config("fw-clear")).unwrap();
    assert_eq!(error_text(&form), "");
    assert!(submit_disabled(&form));
}

/// Resolves on the next macrotask, after queued spawned futures have run
async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
async fn test_blur_non_http_url_shows_format_error() {
    let form = mount_html("fw-blur", LINK_FORM_HTML);
    enable_validation_js(config("fw-blur")).unwrap();

    let input: HtmlInputElement = form
        .query_selector(".w-input")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    input.set_value("ftp://example.com/x.png");
    input.dispatch_event(&Event::new("blur").unwrap()).unwrap();
    next_tick().await;

    assert_eq!(slot_text(&form, "link"), UrlCheckError::InvalidFormat.to_string());
    assert!(input.class_list().contains("bad"));
    assert!(submit_disabled(&form));
}

#[wasm_bindgen_test]
fn test_clear_uses_given_config_and_current_fields() {
    let form = mount("fw-reclear");
    enable_validation_js(config("fw-reclear")).unwrap();

    // Appended after enableValidation, marked with a different error class
    let document = web_sys::window().unwrap().document().unwrap();
    let extra = document.create_element("input").unwrap();
    extra.set_class_name("w-input alt-bad");
    extra.set_attribute("name", "extra").unwrap();
    let slot = document.create_element("span").unwrap();
    slot.set_class_name("extra-error alt-shown");
    slot.set_text_content(Some("Stale message"));
    form.append_child(&extra).unwrap();
    form.append_child(&slot).unwrap();

    let other = js_sys::eval(
        r#"({
            formSelector: ".fw-reclear",
            inputSelector: ".w-input",
            submitButtonSelector: ".w-button",
            inactiveButtonClass: "off",
            inputErrorClass: "alt-bad",
            errorClass: "alt-shown"
        })"#,
    )
    .unwrap();
    clear_validation_js(form.clone(), other).unwrap();

    assert_eq!(slot_text(&form, "extra"), "");
    assert!(!slot.class_list().contains("alt-shown"));
    assert!(!extra.class_list().contains("alt-bad"));
}

#[wasm_bindgen_test]
fn test_bad_config_is_rejected() {
    assert!(enable_validation_js(JsValue::from_f64(3.0)).is_err());
}
