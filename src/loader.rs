//! Fragment Loader
//!
//! Fetches the markup for one page section.

use std::future::Future;

use async_trait::async_trait;
use futures::future::{select, Either};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, RequestInit, Response};

use crate::config::{Section, SiteConfig};
use crate::error::{SiteError, SiteResult};

/// Markup fetched for a section
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub section: Section,
    pub markup: String,
}

/// Where fragment markup comes from
#[async_trait(?Send)]
pub trait FragmentSource {
    async fn fetch_text(&self, path: &str) -> SiteResult<String>;
}

/// Browser `fetch`, aborted after a timeout
#[derive(Debug, Clone)]
pub struct HttpFragmentSource {
    timeout_ms: u32,
}

impl HttpFragmentSource {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

async fn fetch_body(path: &str, controller: &AbortController) -> SiteResult<String> {
    let window = web_sys::window().ok_or_else(|| SiteError::fetch(path, "no window"))?;

    let init = RequestInit::new();
    init.set_signal(Some(&controller.signal()));

    let response = JsFuture::from(window.fetch_with_str_and_init(path, &init))
        .await
        .map_err(|e| SiteError::fetch(path, js_reason(&e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| SiteError::fetch(path, "fetch did not return a Response"))?;

    if let Some(e) = status_error(path, response.ok(), response.status()) {
        return Err(e);
    }

    let text = response.text().map_err(|e| SiteError::fetch(path, js_reason(&e)))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| SiteError::fetch(path, js_reason(&e)))?;
    text.as_string()
        .ok_or_else(|| SiteError::fetch(path, "response body is not text"))
}

/// Non-2xx responses are errors
pub fn status_error(path: &str, ok: bool, status: u16) -> Option<SiteError> {
    if ok {
        None
    } else {
        Some(SiteError::HttpStatus {
            path: path.to_string(),
            status,
        })
    }
}

/// Race `request` against `deadline`. `on_timeout` runs before the timeout
/// error is returned, while the losing request is still alive.
pub async fn with_deadline<T, R, D>(
    path: &str,
    timeout_ms: u32,
    request: R,
    deadline: D,
    on_timeout: impl FnOnce(),
) -> SiteResult<T>
where
    R: Future<Output = SiteResult<T>>,
    D: Future<Output = ()>,
{
    let outcome = match select(Box::pin(request), Box::pin(deadline)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => {
            on_timeout();
            Err(SiteError::Timeout {
                path: path.to_string(),
                timeout_ms,
            })
        }
    };
    outcome
}

#[async_trait(?Send)]
impl FragmentSource for HttpFragmentSource {
    async fn fetch_text(&self, path: &str) -> SiteResult<String> {
        let controller = AbortController::new().map_err(|e| SiteError::fetch(path, js_reason(&e)))?;

        // Bound so the pending request is dropped before `controller`
        let outcome = with_deadline(
            path,
            self.timeout_ms,
            fetch_body(path, &controller),
            TimeoutFuture::new(self.timeout_ms),
            || controller.abort(),
        )
        .await;
        outcome
    }
}

/// Fetch one section's fragment
pub async fn load_fragment<S: FragmentSource + ?Sized>(
    source: &S,
    section: Section,
    config: &SiteConfig,
) -> SiteResult<Fragment> {
    let path = config.fragment_path(section);
    tracing::debug!("Fetching {} from {}", section, path);
    let markup = source.fetch_text(&path).await?;
    Ok(Fragment { section, markup })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// Serves canned responses keyed by path; unknown paths fail
    #[derive(Default)]
    pub struct MapSource {
        responses: HashMap<String, SiteResult<String>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl MapSource {
        /// Every section answers with `<p>{name}</p>`
        pub fn complete(config: &SiteConfig) -> Self {
            let mut source = Self::default();
            for section in Section::ALL {
                source.respond(config.fragment_path(section), Ok(format!("<p>{}</p>", section)));
            }
            source
        }

        pub fn respond(&mut self, path: String, response: SiteResult<String>) {
            self.responses.insert(path, response);
        }
    }

    #[async_trait(?Send)]
    impl FragmentSource for MapSource {
        async fn fetch_text(&self, path: &str) -> SiteResult<String> {
            self.requests.borrow_mut().push(path.to_string());
            self.responses
                .get(path)
                .cloned()
                .unwrap_or_else(|| Err(SiteError::HttpStatus { path: path.to_string(), status: 404 }))
        }
    }
}
