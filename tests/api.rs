use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use listing_desk::backend::{ListingBackend, MemoryBackend};
use listing_desk::listings::fallback_listings;
use listing_desk::models::{Property, PropertyStatus, PropertyType};
use listing_desk::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_URL: &str = "https://demo.supabase.co";
const TOKEN: &str = "admin-token";

fn property(id: &str, price: i64, day: u32) -> Property {
    Property {
        id: id.to_string(),
        title: format!("Imóvel {}", id),
        description: String::new(),
        location: "Moema, São Paulo".to_string(),
        price,
        status: Some(PropertyStatus::New),
        property_type: Some(PropertyType::Apartment),
        bedrooms: Some(2),
        suites: Some(1),
        bathrooms: Some(2),
        parking_spots: Some(1),
        area: Some(80.0),
        amenities: vec!["Piscina".to_string()],
        images: vec![],
        created_by: None,
        created_at: Some(Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()),
    }
}

async fn app_with(backend: Arc<MemoryBackend>) -> Router {
    backend.add_user("admin@example.com", "secret", TOKEN).await;
    router(AppState::with_backend(backend, BASE_URL))
}

async fn priced_catalog() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    for (i, price) in [300_000, 500_000, 750_000, 1_000_000, 2_000_000, 5_000_000, 9_000_000]
        .into_iter()
        .enumerate()
    {
        backend
            .seed(property(&format!("p{}", i), price, i as u32 + 1))
            .await;
    }
    backend
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn prices(body: &Value) -> Vec<i64> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["price"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn empty_search_returns_whole_collection() {
    let app = app_with(priced_catalog().await).await;

    let (status, body) = send(
        app,
        get("/api/search?location=&propertyType=&priceRange=&bedrooms="),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 7);
}

#[tokio::test]
async fn closed_price_range_is_inclusive() {
    let app = app_with(priced_catalog().await).await;

    let (status, body) = send(app, get("/api/search?priceRange=500000-1000000")).await;

    assert_eq!(status, StatusCode::OK);
    let prices = prices(&body);
    assert_eq!(prices.len(), 3);
    assert!(prices.iter().all(|p| (500_000..=1_000_000).contains(p)));
}

#[tokio::test]
async fn open_price_range_has_no_upper_bound() {
    let app = app_with(priced_catalog().await).await;

    let (_, body) = send(app, get("/api/search?priceRange=5000000-")).await;

    let prices = prices(&body);
    assert_eq!(prices.len(), 2);
    assert!(prices.iter().all(|p| *p >= 5_000_000));
}

#[tokio::test]
async fn search_is_recorded_in_history() {
    let backend = priced_catalog().await;
    let app = app_with(backend.clone()).await;

    send(
        app,
        get("/api/search?location=moema&propertyType=apartment&suites=1"),
    )
    .await;

    let history = backend.search_history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].location.as_deref(), Some("moema"));
    assert_eq!(history[0].property_type, Some(PropertyType::Apartment));
    assert_eq!(history[0].suites, Some(1));
}

#[tokio::test]
async fn unknown_property_type_is_a_bad_request() {
    let app = app_with(priced_catalog().await).await;
    let response = app
        .oneshot(get("/api/search?propertyType=castle"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn homepage_shows_three_most_recent_without_featured_rows() {
    let app = app_with(priced_catalog().await).await;

    let (status, body) = send(app, get("/api/listings")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "recent");
    let ids: Vec<&str> = body["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p6", "p5", "p4"]);
}

#[tokio::test]
async fn homepage_prefers_active_featured_rows() {
    let backend = priced_catalog().await;
    backend.feature("p1", 2, true).await;
    backend.feature("p3", 1, true).await;
    backend.feature("p5", 0, false).await;
    let app = app_with(backend).await;

    let (status, body) = send(app, get("/api/listings")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "featured");
    let ids: Vec<&str> = body["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p3", "p1"]);
}

#[tokio::test]
async fn failed_search_query_is_a_bad_gateway() {
    let backend = priced_catalog().await;
    backend.fail_reads(true);
    let app = app_with(backend.clone()).await;

    let (status, body) = send(app, get("/api/search?location=moema")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Listing service unavailable");
    assert!(backend.search_history().await.is_empty());
}

#[tokio::test]
async fn fractional_bedroom_count_filters_on_whole_rooms() {
    let app = app_with(priced_catalog().await).await;

    let (status, body) = send(app, get("/api/search?bedrooms=2.5")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 7);
}

#[tokio::test]
async fn preflight_allows_any_origin_by_default() {
    let app = app_with(Arc::new(MemoryBackend::new())).await;

    let response = app.oneshot(preflight("https://site.example")).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn preflight_echoes_configured_origin_only() {
    let backend = Arc::new(MemoryBackend::new());
    let app = router(AppState::new(
        backend,
        BASE_URL,
        vec!["https://site.example".to_string()],
    ));

    let response = app
        .clone()
        .oneshot(preflight("https://site.example"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://site.example"
    );
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));

    let response = app.oneshot(preflight("https://other.example")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/admin/properties")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn homepage_falls_back_to_samples_when_empty() {
    let app = app_with(Arc::new(MemoryBackend::new())).await;

    let (_, body) = send(app, get("/api/listings")).await;

    assert_eq!(body["source"], "fallback");
    assert!(body["error"].is_null());
    let ids: Vec<&str> = body["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn sample_listings_have_detail_views() {
    let app = app_with(Arc::new(MemoryBackend::new())).await;

    let (status, body) = send(app, get("/api/properties/2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], fallback_listings()[1].title);
    assert_eq!(body["status_label"], "Novo");
}

#[tokio::test]
async fn missing_property_is_not_found() {
    let app = app_with(Arc::new(MemoryBackend::new())).await;
    let (status, _) = send(app, get("/api/properties/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn create_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/admin/properties")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let form = json!({
        "title": "Casa no Morumbi",
        "price": 3200000,
        "location": "Morumbi, São Paulo",
        "type": "house",
        "status": "launch",
        "bedrooms": 4,
        "amenities": ["Jardim", "Piscina"]
    });
    builder.body(Body::from(form.to_string())).unwrap()
}

#[tokio::test]
async fn unauthenticated_submit_never_writes() {
    let backend = Arc::new(MemoryBackend::new());
    let app = app_with(backend.clone()).await;

    let (status, _) = send(app.clone(), create_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(app, create_request(Some("expired"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Usuário não autenticado");

    assert_eq!(backend.property_writes(), 0);
}

#[tokio::test]
async fn authenticated_submit_creates_property() {
    let backend = Arc::new(MemoryBackend::new());
    let app = app_with(backend.clone()).await;

    let (status, body) = send(app, create_request(Some(TOKEN))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "house");
    assert!(body["created_by"].is_string());
    assert_eq!(backend.property_writes(), 1);
}

#[tokio::test]
async fn login_returns_session_or_401() {
    let app = app_with(Arc::new(MemoryBackend::new())).await;

    let login = |password: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "admin@example.com", "password": password }).to_string(),
            ))
            .unwrap()
    };

    let (status, body) = send(app.clone(), login("secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], TOKEN);

    let (status, _) = send(app, login("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn multipart_request(uri: &str, files: &[&str]) -> Request<Body> {
    let boundary = "listing-desk-boundary";
    let mut body = Vec::new();
    for name in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"fake image bytes");
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn one_failed_upload_of_three_appends_two_paths() {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed(property("casa", 1_000_000, 1)).await;
    backend.reject_uploads_with_extension("heic").await;
    let app = app_with(backend.clone()).await;

    let (status, body) = send(
        app,
        multipart_request(
            "/api/admin/properties/casa/images",
            &["frente.jpg", "celular.heic", "fundos.jpg"],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failed"], json!(["celular.heic"]));
    assert!(body["error"].as_str().unwrap().starts_with("Erro ao fazer upload"));

    let stored = backend
        .get_property("casa")
        .await
        .unwrap()
        .expect("property still stored");
    assert_eq!(stored.images.len(), 2);
    assert!(stored.images.iter().all(|p| p.starts_with("properties/")));
}

#[tokio::test]
async fn standalone_upload_reports_paths() {
    let backend = Arc::new(MemoryBackend::new());
    let app = app_with(backend.clone()).await;

    let (status, body) = send(
        app,
        multipart_request("/api/admin/images", &["a.jpg", "b.jpg"]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paths"].as_array().unwrap().len(), 2);
    assert!(body["error"].is_null());
    assert_eq!(backend.object_paths().await.len(), 2);
}
