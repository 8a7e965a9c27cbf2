//! End-to-end tests driving the router for each backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use medqr::storage::{DatabaseStore, FileStore, StatelessStore};
use medqr::{build_router, AppState, ProfileFields, ProfileService, ProfileStore, QrRenderer};
use tower::ServiceExt;

const HOST: &str = "medqr.test";

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn app(store: impl ProfileStore + 'static) -> Router {
    let service = ProfileService::new(Arc::new(store), QrRenderer::default());
    build_router(AppState::new(service, None, "http://127.0.0.1:5000"))
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

async fn get(app: &Router, uri: &str) -> Reply {
    let request = Request::get(uri)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn submit(app: &Router, pairs: &[(&str, &str)]) -> Reply {
    let request = Request::post("/generate_profile")
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(pairs).unwrap()))
        .unwrap();
    send(app, request).await
}

const JANE: [(&str, &str); 5] = [
    ("name", "Jane Doe"),
    ("phone", "555-1234"),
    ("blood_group", "O-"),
    ("template", "basic"),
    ("password", "secret"),
];

fn jane_with_allergies() -> Vec<(&'static str, &'static str)> {
    let mut pairs = JANE.to_vec();
    pairs.push(("allergies", "penicillin"));
    pairs
}

fn jane_query() -> String {
    serde_urlencoded::to_string(&JANE[..]).unwrap()
}

/// Pull the identifier out of the submission page.
fn submitted_id(reply: &Reply) -> String {
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.text());
    let html = reply.text();
    let start = html.find("Profile ID: <code>").unwrap() + "Profile ID: <code>".len();
    let end = start + html[start..].find("</code>").unwrap();
    html[start..end].to_string()
}

fn decode_qr(png: &[u8]) -> String {
    let img = image::load_from_memory(png).unwrap().to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1);
    grids[0].decode().unwrap().1
}

fn database_app(dir: &tempfile::TempDir) -> Router {
    app(DatabaseStore::open(dir.path().join("profiles.db")).unwrap())
}

fn file_app(dir: &tempfile::TempDir) -> Router {
    app(FileStore::open(dir.path().join("profiles")).unwrap())
}

#[tokio::test]
async fn test_landing_and_form() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);

    let landing = get(&app, "/").await;
    assert_eq!(landing.status, StatusCode::OK);
    assert!(landing.text().contains("/select_template/basic"));

    let form = get(&app, "/select_template/basic").await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.text().contains("action=\"/generate_profile\""));
    assert!(form.text().contains("name=\"medications\""));

    assert_eq!(get(&app, "/healthz").await.text(), "ok");
}

#[tokio::test]
async fn test_form_omits_medical_fields_off_database() {
    let app = app(StatelessStore::new());
    let form = get(&app, "/select_template/minimal").await;
    assert!(!form.text().contains("medications"));
}

#[tokio::test]
async fn test_database_submit_and_view() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);

    let id = submitted_id(&submit(&app, &JANE).await);
    assert_eq!(id.len(), 32);

    let view = get(&app, &format!("/profile/{id}")).await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.text().contains("Jane Doe"));
    assert!(!view.text().contains("secret"));

    let missing = get(&app, "/profile/does-not-exist").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), "Profile not found");
}

#[tokio::test]
async fn test_database_ids_differ_per_submission() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);

    let first = submitted_id(&submit(&app, &JANE).await);
    let second = submitted_id(&submit(&app, &JANE).await);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_database_sensitive_fields_need_password() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);
    let id = submitted_id(&submit(&app, &jane_with_allergies()).await);

    let hidden = get(&app, &format!("/profile/{id}")).await;
    assert!(!hidden.text().contains("penicillin"));

    let wrong = get(&app, &format!("/profile/{id}?password=nope")).await;
    assert_eq!(wrong.status, StatusCode::OK);
    assert!(!wrong.text().contains("penicillin"));

    let shown = get(&app, &format!("/profile/{id}?password=secret")).await;
    assert!(shown.text().contains("penicillin"));
    assert!(!shown.text().contains("secret"));
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);
    let pairs: Vec<_> = JANE.iter().copied().filter(|(k, _)| *k != "phone").collect();

    let reply = submit(&app, &pairs).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.text(), "Missing required field: phone");

    let mut empty = JANE.to_vec();
    empty[0] = ("name", "");
    let reply = submit(&app, &empty).await;
    assert_eq!(reply.text(), "Missing required field: name");
}

#[tokio::test]
async fn test_database_download_decodes_to_profile_url() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);
    let id = submitted_id(&submit(&app, &JANE).await);

    let reply = get(&app, &format!("/download_qr/{id}")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        reply.headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"qr_code_{id}.png\"").as_str()
    );
    assert_eq!(decode_qr(&reply.body), format!("http://{HOST}/profile/{id}"));

    let alias = get(&app, &format!("/download/{id}")).await;
    assert_eq!(alias.status, StatusCode::OK);

    let missing = get(&app, "/download_qr/feedface").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), "QR code not found");
}

#[tokio::test]
async fn test_file_ids_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);

    let first = submitted_id(&submit(&app, &JANE).await);
    let second = submitted_id(&submit(&app, &JANE).await);
    assert_eq!(first, second);

    let mut other = JANE.to_vec();
    other[1] = ("phone", "555-0000");
    assert_ne!(submitted_id(&submit(&app, &other).await), first);

    let view = get(&app, &format!("/profile/{first}")).await;
    assert!(view.text().contains("Jane Doe"));
}

#[tokio::test]
async fn test_file_stored_image_and_download() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);
    let reply = submit(&app, &JANE).await;
    let id = submitted_id(&reply);
    assert!(reply.text().contains(&format!("/profiles/{id}_qr.png")));

    let image = get(&app, &format!("/profiles/{id}_qr.png")).await;
    assert_eq!(image.status, StatusCode::OK);
    assert_eq!(image.headers[header::CONTENT_TYPE], "image/png");

    let download = get(&app, &format!("/download_qr/{id}")).await;
    assert_eq!(download.body, image.body);
    assert_eq!(decode_qr(&download.body), format!("http://{HOST}/profile/{id}"));

    let record = get(&app, &format!("/profiles/{id}.json")).await;
    assert_eq!(record.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_download_missing() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);

    let reply = get(&app, "/download_qr/0123456789abcdef").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.text(), "QR code not found");
}

#[tokio::test]
async fn test_stateless_round_trip_through_qr() {
    let app = app(StatelessStore::new());
    let id = submitted_id(&submit(&app, &JANE).await);

    let download = get(&app, &format!("/download_qr?{}", jane_query())).await;
    assert_eq!(download.status, StatusCode::OK);

    let url = decode_qr(&download.body);
    let path = url.strip_prefix(&format!("http://{HOST}")).unwrap();
    let (route, query) = path.split_once('?').unwrap();
    assert_eq!(route, format!("/profile/{id}"));

    let fields: ProfileFields = serde_urlencoded::from_str(query).unwrap();
    assert_eq!(fields.name.as_deref(), Some("Jane Doe"));
    assert_eq!(fields.blood_group.as_deref(), Some("O-"));
    assert_eq!(fields.password.as_deref(), Some("secret"));

    let view = get(&app, path).await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.text().contains("Jane Doe"));
}

#[tokio::test]
async fn test_stateless_missing_param_is_not_found() {
    let app = app(StatelessStore::new());
    let partial = "name=Jane+Doe&phone=555-1234&blood_group=O-&template=basic";

    let view = get(&app, &format!("/profile/anything?{partial}")).await;
    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.text(), "Profile not found");

    let download = get(&app, &format!("/download_qr?{partial}")).await;
    assert_eq!(download.status, StatusCode::NOT_FOUND);
    assert_eq!(download.text(), "QR code not found");
}

#[tokio::test]
async fn test_stateless_ignores_path_id() {
    let app = app(StatelessStore::new());
    let view = get(&app, &format!("/profile/not-the-hash?{}", jane_query())).await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.text().contains("Jane Doe"));
}

#[tokio::test]
async fn test_stateless_has_no_stored_images() {
    let app = app(StatelessStore::new());
    let reply = get(&app, "/profiles/abc_qr.png").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);

    let view = get(&app, "/profile/bad.id").await;
    assert_eq!(view.status, StatusCode::NOT_FOUND);
    assert_eq!(view.text(), "Profile not found");

    let download = get(&app, "/download_qr/bad.id").await;
    assert_eq!(download.text(), "QR code not found");
}

#[tokio::test]
async fn test_stateless_malformed_path_id_uses_query() {
    let app = app(StatelessStore::new());
    let id = submitted_id(&submit(&app, &JANE).await);

    let view = get(&app, &format!("/profile/abc.def?{}", jane_query())).await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.text().contains("Jane Doe"));

    let download = get(&app, &format!("/download_qr/abc.def?{}", jane_query())).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(
        download.headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"qr_code_{id}.png\"").as_str()
    );
}

#[tokio::test]
async fn test_repeated_query_keys_keep_first_value() {
    let dir = tempfile::tempdir().unwrap();
    let database = database_app(&dir);

    let reply = get(&database, "/profile/nope?password=a&password=b").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.text(), "Profile not found");

    let stateless = app(StatelessStore::new());
    let view = get(
        &stateless,
        &format!("/profile/x?{}&name=Other", jane_query()),
    )
    .await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.text().contains("Jane Doe"));
    assert!(!view.text().contains("Other"));

    let download = get(&stateless, &format!("/download_qr?{}&name=Other", jane_query())).await;
    assert_eq!(download.status, StatusCode::OK);
}

#[tokio::test]
async fn test_repeated_form_fields_keep_first_value() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);
    let mut pairs = JANE.to_vec();
    pairs.push(("name", "Other"));

    let id = submitted_id(&submit(&app, &pairs).await);
    assert_eq!(id, submitted_id(&submit(&app, &JANE).await));

    let view = get(&app, &format!("/profile/{id}")).await;
    assert!(view.text().contains("Jane Doe"));
    assert!(!view.text().contains("Other"));
}

#[tokio::test]
async fn test_submit_without_form_body_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = database_app(&dir);
    let request = Request::post("/generate_profile")
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Jane Doe"}"#))
        .unwrap();

    let reply = send(&app, request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.text(), "Missing required field: name");
}

#[tokio::test]
async fn test_file_unreadable_image_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);
    let id = submitted_id(&submit(&app, &JANE).await);

    let image = dir.path().join("profiles").join(format!("{id}_qr.png"));
    std::fs::remove_file(&image).unwrap();
    std::fs::create_dir(&image).unwrap();

    let download = get(&app, &format!("/download_qr/{id}")).await;
    assert_eq!(download.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(download.text(), "Error downloading file");

    let stored = get(&app, &format!("/profiles/{id}_qr.png")).await;
    assert_eq!(stored.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stored.text(), "Error downloading file");
}

#[tokio::test]
async fn test_stateless_record_too_long_for_qr() {
    let app = app(StatelessStore::new());
    let long_name = "x".repeat(3000);
    let mut pairs: Vec<(&str, &str)> = JANE.to_vec();
    pairs[0] = ("name", long_name.as_str());

    let reply = submit(&app, &pairs).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.text(), "Error creating profile");

    let query = serde_urlencoded::to_string(&pairs).unwrap();
    let download = get(&app, &format!("/download_qr?{query}")).await;
    assert_eq!(download.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(download.text(), "Error generating QR code");
}
