//! HTTP surface for medqr.
//!
//! Routes are thin: they extract the request, run the blocking
//! [`ProfileService`] call on tokio's blocking pool and translate the result
//! into a page, an image or a plain-text error.

mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::Router;

use crate::error::{Error, Result};
use crate::service::ProfileService;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<ProfileService>,
    public_url: Option<String>,
    fallback_base: String,
}

impl AppState {
    /// Build handler state.
    ///
    /// `public_url` is preferred for absolute URLs, then the request `Host`
    /// header, then `fallback_base`.
    #[must_use]
    pub fn new(
        service: ProfileService,
        public_url: Option<String>,
        fallback_base: impl Into<String>,
    ) -> Self {
        Self {
            service: Arc::new(service),
            public_url: public_url.map(|url| url.trim_end_matches('/').to_string()),
            fallback_base: fallback_base.into(),
        }
    }

    /// The service behind the routes.
    #[must_use]
    pub fn service(&self) -> &Arc<ProfileService> {
        &self.service
    }

    /// Absolute origin for URLs embedded in QR codes.
    #[must_use]
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.public_url {
            return url.clone();
        }
        headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .filter(|host| is_plain_host(host))
            .map_or_else(|| self.fallback_base.clone(), |host| format!("http://{host}"))
    }
}

/// Accept `host`, `host:port` and bracketed IPv6 literals only.
fn is_plain_host(host: &str) -> bool {
    !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b':' | b'[' | b']'))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/select_template/:name", get(handlers::select_template))
        .route("/generate_profile", post(handlers::generate_profile))
        .route("/profile/:id", get(handlers::view_profile))
        .route("/download_qr", get(handlers::download_by_query))
        .route("/download_qr/:id", get(handlers::download_by_id))
        .route("/download/:id", get(handlers::download_by_id))
        .route("/profiles/:file_name", get(handlers::stored_image))
        .with_state(state)
}

/// Run a blocking store operation off the async runtime.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| Error::internal(format!("blocking task failed: {err}")))?
}
