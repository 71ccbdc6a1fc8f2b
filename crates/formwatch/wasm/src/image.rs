//! Image loading and task spawning on the browser event loop

use async_trait::async_trait;
use formwatch_core::{ImageProbe, ProbeError, TaskSpawner};
use futures::future::LocalBoxFuture;
use js_sys::Promise;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

/// Loads URLs through a detached `<img>` element
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageElementProbe;

#[async_trait(?Send)]
impl ImageProbe for ImageElementProbe {
    async fn load(&self, url: &str) -> Result<(), ProbeError> {
        let failed = || ProbeError {
            url: url.to_string(),
        };

        let image = HtmlImageElement::new().map_err(|_| failed())?;

        // onload resolves, onerror rejects
        let promise = Promise::new(&mut |resolve, reject| {
            image.set_onload(Some(&resolve));
            image.set_onerror(Some(&reject));
        });
        image.set_src(url);

        let outcome = JsFuture::from(promise).await;
        image.set_onload(None);
        image.set_onerror(None);

        outcome.map(|_| ()).map_err(|_| failed())
    }
}

/// Spawns onto the page's microtask queue
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTaskSpawner;

impl TaskSpawner for LocalTaskSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
