//! Browser `fetch` for the request based loaders.

use lazyview_core::{FetchCallback, FetchError, FetchRequest, Fetcher};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestCredentials, RequestInit, RequestMode, Response};

/// [`Fetcher`] backed by `window.fetch`. Completion runs on a later task.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebFetcher;

impl WebFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for WebFetcher {
    fn fetch(&self, request: FetchRequest, on_done: FetchCallback) {
        spawn_local(async move {
            let result = perform(&request).await;
            if let Err(err) = &result {
                log::debug!("{err}");
            }
            on_done(result);
        });
    }
}

async fn perform(request: &FetchRequest) -> Result<String, FetchError> {
    let url = request.url.as_str();
    let transport = |reason: String| FetchError::Transport {
        url: url.to_string(),
        reason,
    };

    let opts = RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(RequestMode::Cors);
    if request.with_credentials {
        opts.set_credentials(RequestCredentials::Include);
    }
    if let Some(body) = request.body.as_deref() {
        opts.set_body(&body.into());
    }

    let js_request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| transport(format!("could not create request: {e:?}")))?;
    if request.body.is_some() {
        let _ = js_request
            .headers()
            .set("Content-Type", "application/x-www-form-urlencoded");
    }

    let window = web_sys::window().ok_or_else(|| transport("no window object".into()))?;
    let response = JsFuture::from(window.fetch_with_request(&js_request))
        .await
        .map_err(|e| transport(format!("{e:?}")))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| transport("fetch did not return a Response".into()))?;

    if !response.ok() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let text = response
        .text()
        .map_err(|e| transport(format!("could not read body: {e:?}")))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| transport(format!("could not read body: {e:?}")))?;
    Ok(text.as_string().unwrap_or_default())
}
