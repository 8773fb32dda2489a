//! # Integration Tests for qazid-api
//!
//! Drives the assembled router in-process (no network, no database):
//! health probes, IIN validation, person save/fetch round trips, duplicate
//! conflicts, paginated name search, and OpenAPI generation.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use qazid_api::state::AppState;

/// Helper: build the test app with no database pool.
fn test_app() -> axum::Router {
    qazid_api::app(AppState::new())
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: GET a path.
async fn get(app: &axum::Router, uri: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Helper: POST a JSON body.
async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn person(name: &str, iin: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "iin": iin, "phone": "77011234567" })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = get(&app, "/health/liveness").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app();
    let response = get(&app, "/health/readiness").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_count_api_requests_but_not_probes() {
    let app = test_app();

    // One accepted and one rejected API request.
    get(&app, "/v1/iin/930214350965").await;
    get(&app, "/v1/iin/930214350968").await;
    // Probes are mounted outside the metrics middleware.
    get(&app, "/health/liveness").await;

    let response = get(&app, "/health/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["requests"], 2);
    assert_eq!(body["errors"], 1);
}

// -- IIN Validation -----------------------------------------------------------

#[tokio::test]
async fn test_check_iin_valid() {
    let app = test_app();
    let response = get(&app, "/v1/iin/930214350965").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["sex"], "male");
    assert_eq!(body["date_of_birth"], "1993-02-14");
}

#[tokio::test]
async fn test_check_iin_valid_female_leap_day() {
    let app = test_app();
    let response = get(&app, "/v1/iin/000229600004").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sex"], "female");
    assert_eq!(body["date_of_birth"], "2000-02-29");
}

#[tokio::test]
async fn test_check_iin_bad_checksum() {
    let app = test_app();
    let response = get(&app, "/v1/iin/930214350968").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("checksum"));
}

#[tokio::test]
async fn test_check_iin_bad_length() {
    let app = test_app();
    let response = get(&app, "/v1/iin/1234").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("12 digits"));
}

#[tokio::test]
async fn test_check_iin_bad_century_code() {
    let app = test_app();
    let response = get(&app, "/v1/iin/930214950965").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("indicator"));
}

#[tokio::test]
async fn test_check_iin_bad_date() {
    let app = test_app();
    let response = get(&app, "/v1/iin/990230300000").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("1999-02-30"));
}

// -- Save & Fetch -------------------------------------------------------------

#[tokio::test]
async fn test_save_person_then_fetch_by_iin() {
    let app = test_app();

    let response = post_json(&app, "/v1/people", person("Dulat Nurmeden", "930214350965")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let saved = body_json(response).await;
    assert_eq!(saved["name"], "Dulat Nurmeden");
    assert_eq!(saved["iin"], "930214350965");
    assert_eq!(saved["phone"], "77011234567");
    assert!(saved["id"].as_str().is_some());

    let response = get(&app, "/v1/people/iin/930214350965").await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["id"], saved["id"]);
    assert_eq!(fetched["name"], "Dulat Nurmeden");
}

#[tokio::test]
async fn test_save_person_duplicate_iin_conflicts() {
    let app = test_app();

    let response = post_json(&app, "/v1/people", person("Dulat Nurmeden", "930214350965")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(&app, "/v1/people", person("Someone Else", "930214350965")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");

    // The original record is untouched.
    let response = get(&app, "/v1/people/iin/930214350965").await;
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "Dulat Nurmeden");
}

#[tokio::test]
async fn test_save_person_invalid_iin_rejected() {
    let app = test_app();
    let response = post_json(&app, "/v1/people", person("Dulat Nurmeden", "930214350968")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored under the rejected IIN's sibling either.
    let response = get(&app, "/v1/people?name=Dulat").await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_save_person_invalid_phone_rejected() {
    let app = test_app();
    let body = serde_json::json!({
        "name": "Dulat Nurmeden",
        "iin": "930214350965",
        "phone": "+7-701-123-45-67"
    });
    let response = post_json(&app, "/v1/people", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_save_person_short_name_rejected() {
    let app = test_app();
    let response = post_json(&app, "/v1/people", person("D", "930214350965")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_save_person_malformed_json_rejected() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/people")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_person_invalid_iin_is_400_not_404() {
    let app = test_app();
    let response = get(&app, "/v1/people/iin/not-an-iin-00").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_missing_person_is_404() {
    let app = test_app();
    let response = get(&app, "/v1/people/iin/930214350965").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// -- Name Search --------------------------------------------------------------

/// Seed three people whose names share the fragment "ur".
async fn seed_people(app: &axum::Router) {
    for (name, iin) in [
        ("Aliya Nurlanova", "050123500100"),
        ("Dulat Nurmeden", "930214350965"),
        ("Gulnur Akhmetova", "851231400001"),
    ] {
        let response = post_json(app, "/v1/people", person(name, iin)).await;
        assert_eq!(response.status(), StatusCode::CREATED, "seeding {name}");
    }
}

#[tokio::test]
async fn test_search_returns_matches_with_envelope() {
    let app = test_app();
    seed_people(&app).await;

    let response = get(&app, "/v1/people?name=nur").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    // Sorted by name.
    assert_eq!(body["data"][0]["name"], "Aliya Nurlanova");
}

#[tokio::test]
async fn test_search_paginates() {
    let app = test_app();
    seed_people(&app).await;

    let response = get(&app, "/v1/people?name=nur&page=1&limit=2").await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = get(&app, "/v1/people?name=nur&page=2&limit=2").await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_search_no_matches_is_empty_page_not_404() {
    let app = test_app();
    seed_people(&app).await;

    let response = get(&app, "/v1/people?name=zzz").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_search_requires_name() {
    let app = test_app();
    let response = get(&app, "/v1/people").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_blank_name() {
    let app = test_app();
    let response = get(&app, "/v1/people?name=%20%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_bad_pagination() {
    let app = test_app();

    let response = get(&app, "/v1/people?name=nur&page=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/v1/people?name=nur&limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/v1/people?name=nur&limit=101").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/v1/people?name=nur&page=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_lists_routes() {
    let app = test_app();
    let response = get(&app, "/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/v1/people"].is_object());
    assert!(body["paths"]["/v1/people/iin/{iin}"].is_object());
    assert!(body["paths"]["/v1/iin/{iin}"].is_object());
}
