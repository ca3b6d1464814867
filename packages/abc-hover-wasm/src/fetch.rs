//! Article content over the MediaWiki action API.

use abc_hover::{content_from_response, revision_query_url, ContentSource, HoverError, Title};
use async_trait::async_trait;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

pub struct ApiContentSource {
    api_path: String,
}

impl ApiContentSource {
    pub fn new(api_path: impl Into<String>) -> Self {
        Self {
            api_path: api_path.into(),
        }
    }

    async fn request(&self, title: &Title) -> Result<String, HoverError> {
        let failure = |message: String| HoverError::FetchFailure {
            title: title.to_string(),
            message,
        };

        let window = web_sys::window().ok_or_else(|| failure("no window".to_string()))?;
        let url = revision_query_url(&self.api_path, title);

        let resp = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(|e| failure(describe(&e)))?;
        let resp: Response = resp
            .dyn_into()
            .map_err(|_| failure("fetch did not return a Response".to_string()))?;
        if !resp.ok() {
            return Err(failure(format!("HTTP {}", resp.status())));
        }

        let text = resp.text().map_err(|e| failure(describe(&e)))?;
        let body = JsFuture::from(text)
            .await
            .map_err(|e| failure(describe(&e)))?
            .as_string()
            .ok_or_else(|| failure("response body is not text".to_string()))?;

        content_from_response(title, &body)
    }
}

#[async_trait(?Send)]
impl ContentSource for ApiContentSource {
    async fn fetch_content(&self, title: &Title) -> Option<String> {
        match self.request(title).await {
            Ok(content) => Some(content),
            Err(err) => {
                debug!(error = %err, "article fetch failed");
                None
            }
        }
    }
}

pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
