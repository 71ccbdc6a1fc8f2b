//! Asynchronous URL/image reachability check
//!
//! A URL-type field is checked on blur in two steps. First the value must
//! carry an `http://` or `https://` prefix. Then the host must be able to
//! load it as an image. Both failures become [`UrlCheckError`], whose
//! `Display` text is the message shown next to the field.
//!
//! Checks on the same field are ordered with [`InFlightCheck`]: each blur
//! takes a fresh [`CheckToken`], and a result carrying an outdated token is
//! dropped instead of applied.

use crate::dom::FieldHandle;
use crate::url::is_http_url;
use crate::validity::InputKind;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

/// Why a URL/image check failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlCheckError {
    /// Value does not start with `http://` or `https://`
    #[error("Enter a valid URL (must start with http:// or https://)")]
    InvalidFormat,

    /// The image resource failed to load
    #[error("Could not load an image from this URL")]
    Unreachable { url: String },
}

/// Load failure reported by an [`ImageProbe`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("image failed to load: {url}")]
pub struct ProbeError {
    pub url: String,
}

/// Loads a URL as an image resource
///
/// Resolves `Ok` on the load signal and `Err` on the error signal. There is
/// no timeout: a pending load waits as long as the host does.
#[async_trait(?Send)]
pub trait ImageProbe {
    async fn load(&self, url: &str) -> Result<(), ProbeError>;
}

/// Runs a check without blocking the event that started it
pub trait TaskSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

/// Host services the controller needs beyond the DOM
#[derive(Clone)]
pub struct Environment {
    pub probe: Rc<dyn ImageProbe>,
    pub spawner: Rc<dyn TaskSpawner>,
}

impl Environment {
    pub fn new(probe: impl ImageProbe + 'static, spawner: impl TaskSpawner + 'static) -> Self {
        Self {
            probe: Rc::new(probe),
            spawner: Rc::new(spawner),
        }
    }
}

/// Identifies one started check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckToken(u64);

/// Per-field generation counter for in-flight checks
#[derive(Debug, Clone, Default)]
pub struct InFlightCheck {
    generation: Rc<Cell<u64>>,
}

impl InFlightCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new check, superseding any earlier one
    pub fn begin(&self) -> CheckToken {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        CheckToken(next)
    }

    /// Supersede the running check without starting a new one
    pub fn invalidate(&self) {
        self.begin();
    }

    pub fn is_current(&self, token: CheckToken) -> bool {
        self.generation.get() == token.0
    }
}

/// URL-type fields get the image check: `type="url"` or `name="link"`
pub fn is_url_field<F: FieldHandle>(field: &F) -> bool {
    field.kind() == InputKind::Url || field.name() == "link"
}

/// Scheme check, the synchronous half of the image check
pub fn validate_url_format(value: &str) -> Result<(), UrlCheckError> {
    if is_http_url(value) {
        Ok(())
    } else {
        Err(UrlCheckError::InvalidFormat)
    }
}

/// Format check followed by an image load
pub async fn probe_image_url(probe: &dyn ImageProbe, value: &str) -> Result<(), UrlCheckError> {
    validate_url_format(value)?;

    probe.load(value).await.map_err(|err| {
        tracing::debug!(error = %err, "image probe failed");
        UrlCheckError::Unreachable {
            url: value.to_string(),
        }
    })
}
