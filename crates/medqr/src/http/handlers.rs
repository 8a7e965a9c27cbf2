use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error, info};

use crate::config::Backend;
use crate::error::Error;
use crate::profile::ProfileFields;
use crate::service::QrDownload;

use super::{pages, run_blocking, AppState};

const PROFILE_NOT_FOUND: &str = "Profile not found";
const QR_NOT_FOUND: &str = "QR code not found";

fn plain(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}

/// Fields from a raw query string. Repeated keys keep their first value.
fn query_fields(raw: Option<&str>) -> ProfileFields {
    ProfileFields::from_urlencoded(raw.unwrap_or_default().as_bytes())
}

/// Fields from a submitted body. Anything but an urlencoded form reads as empty.
fn form_fields(headers: &HeaderMap, body: &[u8]) -> ProfileFields {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        ProfileFields::from_urlencoded(body)
    } else {
        ProfileFields::default()
    }
}

pub(super) async fn index() -> Html<String> {
    Html(pages::landing())
}

pub(super) async fn healthz() -> &'static str {
    "ok"
}

pub(super) async fn select_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Html<String> {
    Html(pages::profile_form(&name, state.service().collects_medical()))
}

pub(super) async fn generate_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let fields = form_fields(&headers, &body);
    let base_url = state.base_url(&headers);
    let service = state.service().clone();

    match run_blocking(move || service.submit(fields, &base_url)).await {
        Ok(submission) => Html(pages::qr_display(&submission)).into_response(),
        Err(err) if err.is_validation() => {
            debug!("Rejected submission: {}", err);
            plain(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!("Failed to create profile: {}", err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Error creating profile")
        }
    }
}

pub(super) async fn view_profile(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let query = query_fields(raw_query.as_deref());
    let service = state.service().clone();
    let backend = service.backend();
    let id = raw_id.clone();

    match run_blocking(move || service.view(&id, &query)).await {
        Ok(view) => Html(pages::profile_view(&view, backend)).into_response(),
        Err(Error::NotFound) => {
            debug!("Profile {} not found", raw_id);
            plain(StatusCode::NOT_FOUND, PROFILE_NOT_FOUND)
        }
        Err(err) => {
            error!("Failed to load profile {}: {}", raw_id, err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Error loading profile")
        }
    }
}

pub(super) async fn download_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let query = query_fields(raw_query.as_deref());
    download(&state, &headers, Some(raw_id), query).await
}

pub(super) async fn download_by_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let query = query_fields(raw_query.as_deref());
    download(&state, &headers, None, query).await
}

async fn download(
    state: &AppState,
    headers: &HeaderMap,
    raw_id: Option<String>,
    query: ProfileFields,
) -> Response {
    let base_url = state.base_url(headers);
    let service = state.service().clone();
    let backend = service.backend();

    match run_blocking(move || service.download(raw_id.as_deref(), &query, &base_url)).await {
        Ok(download) => {
            info!("Serving QR download for {}", download.id);
            attachment(download)
        }
        Err(Error::NotFound) => plain(StatusCode::NOT_FOUND, QR_NOT_FOUND),
        Err(err) => {
            error!("Failed to produce QR download: {}", err);
            let message = match backend {
                Backend::File => "Error downloading file",
                Backend::Stateless | Backend::Database => "Error generating QR code",
            };
            plain(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

fn attachment(download: QrDownload) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", download.file_name());
    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.png,
    )
        .into_response()
}

pub(super) async fn stored_image(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Response {
    let service = state.service().clone();

    match run_blocking(move || service.stored_image(&file_name)).await {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(Error::NotFound) => plain(StatusCode::NOT_FOUND, QR_NOT_FOUND),
        Err(err) => {
            error!("Failed to read stored QR image: {}", err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Error downloading file")
        }
    }
}
