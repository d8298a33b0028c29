//! Score reporting client
//!
//! Talks to the leaderboard: `submit` is fire-and-forget, `fetch` resolves
//! to the world and personal record for an address. Nothing here can fail a
//! run; errors are logged and the caller keeps its cached values.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::leaderboard::ScoreBook;

/// World and personal best, as served by the leaderboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Records {
    pub world_record: u64,
    pub personal_record: u64,
}

/// Reporting failures (never fatal to a run)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordsError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("leaderboard answered HTTP {0}")]
    Status(u16),
    #[error("malformed leaderboard response: {0}")]
    Malformed(String),
}

/// Pending records lookup
pub type RecordsFuture = Pin<Box<dyn Future<Output = Result<Records, RecordsError>>>>;

/// Client side of the leaderboard contract
pub trait RecordsClient {
    /// Report a finished run's score. Must not block; failures are logged.
    fn submit(&self, address: &str, score: u64);

    /// Look up world/personal records for `address`
    fn fetch(&self, address: &str) -> RecordsFuture;
}

impl<C: RecordsClient + ?Sized> RecordsClient for Rc<C> {
    fn submit(&self, address: &str, score: u64) {
        (**self).submit(address, score)
    }

    fn fetch(&self, address: &str) -> RecordsFuture {
        (**self).fetch(address)
    }
}

/// Client backed by a score book in the same process
#[derive(Debug, Clone)]
pub struct LocalRecordsClient {
    book: Rc<RefCell<ScoreBook>>,
}

impl LocalRecordsClient {
    pub fn new(book: ScoreBook) -> Self {
        Self {
            book: Rc::new(RefCell::new(book)),
        }
    }

    /// The shared score book (for inspection)
    pub fn book(&self) -> Rc<RefCell<ScoreBook>> {
        Rc::clone(&self.book)
    }
}

impl RecordsClient for LocalRecordsClient {
    fn submit(&self, address: &str, score: u64) {
        match self.book.borrow_mut().save_if_higher(address, score) {
            Ok(true) => log::info!("Score saved: {} -> {}", address, score),
            Ok(false) => log::info!("Score {} kept previous best for {}", score, address),
            Err(e) => log::warn!("Error saving score: {}", e),
        }
    }

    fn fetch(&self, address: &str) -> RecordsFuture {
        let records = self.book.borrow().records(address);
        Box::pin(std::future::ready(Ok(records)))
    }
}

/// Client for the leaderboard HTTP API (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct HttpRecordsClient {
    base_url: String,
}

#[cfg(target_arch = "wasm32")]
impl HttpRecordsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl RecordsClient for HttpRecordsClient {
    fn submit(&self, address: &str, score: u64) {
        let url = format!("{}/api/save-score", self.base_url);
        let body = serde_json::json!({ "address": address, "score": score }).to_string();
        wasm_bindgen_futures::spawn_local(async move {
            match http::post_json(&url, &body).await {
                Ok(()) => log::info!("Score saved: {}", score),
                Err(e) => log::warn!("Error saving score: {}", e),
            }
        });
    }

    fn fetch(&self, address: &str) -> RecordsFuture {
        let encoded: String = js_sys::encode_uri_component(address).into();
        let url = format!("{}/api/get-records?address={}", self.base_url, encoded);
        Box::pin(async move { http::get_json::<Records>(&url).await })
    }
}

#[cfg(target_arch = "wasm32")]
mod http {
    use serde::de::DeserializeOwned;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::RecordsError;

    fn js_error(value: JsValue) -> RecordsError {
        RecordsError::Network(format!("{:?}", value))
    }

    async fn send(request: Request) -> Result<Response, RecordsError> {
        let window = web_sys::window().ok_or_else(|| RecordsError::Network("no window".into()))?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: Response = value
            .dyn_into()
            .map_err(|_| RecordsError::Malformed("fetch did not return a Response".into()))?;
        if !response.ok() {
            return Err(RecordsError::Status(response.status()));
        }
        Ok(response)
    }

    pub async fn post_json(url: &str, body: &str) -> Result<(), RecordsError> {
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&JsValue::from_str(body));

        let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;

        send(request).await.map(|_| ())
    }

    pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, RecordsError> {
        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
        let response = send(request).await?;

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .ok_or_else(|| RecordsError::Malformed("body is not text".into()))?;
        serde_json::from_str(&text).map_err(|e| RecordsError::Malformed(e.to_string()))
    }
}
