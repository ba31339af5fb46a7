//! Procedure-level tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use serde_json::{Value, json};
use skylog_core::{
  store::TelemetryStore,
  user::{User, UserUpsert},
};
use skylog_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{AppState, SessionKey, router, session::SESSION_COOKIE};

async fn state() -> AppState<SqliteStore> {
  AppState {
    store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    sessions: Arc::new(SessionKey::new("test-secret")),
  }
}

/// Seed a user and return it with a valid session cookie header value.
async fn sign_in(state: &AppState<SqliteStore>, open_id: &str) -> (User, String) {
  state.store.upsert_user(UserUpsert::new(open_id)).await.unwrap();
  let user = state.store.user_by_open_id(open_id).await.unwrap().unwrap();
  let cookie = format!("{SESSION_COOKIE}={}", state.sessions.issue(open_id));
  (user, cookie)
}

async fn call(
  state: AppState<SqliteStore>,
  method: &str,
  uri: &str,
  cookie: Option<&str>,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(c) = cookie {
    builder = builder.header(header::COOKIE, c);
  }
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  router(state).oneshot(req).await.unwrap()
}

async fn body_json(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn new_test_body(name: &str) -> Value {
  json!({ "name": name, "testDate": "2024-05-01T09:30:00Z", "aircraft": "N12345" })
}

// ─── Health / auth ───────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
  let resp = call(state().await, "GET", "/api/health", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn me_without_session_is_null_not_an_error() {
  let resp = call(state().await, "GET", "/api/auth.me", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, Value::Null);
}

#[tokio::test]
async fn me_returns_the_current_identity() {
  let st = state().await;
  let (user, cookie) = sign_in(&st, "pilot-1").await;

  let resp = call(st, "GET", "/api/auth.me", Some(&cookie), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = body_json(resp).await;
  assert_eq!(body["openId"], "pilot-1");
  assert_eq!(body["id"], user.id);
}

#[tokio::test]
async fn tampered_cookie_resolves_to_no_identity() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;
  let forged = format!("{cookie}ff");

  let resp = call(st.clone(), "GET", "/api/auth.me", Some(&forged), None).await;
  assert_eq!(body_json(resp).await, Value::Null);

  let resp = call(st, "GET", "/api/flightTests.list", Some(&forged), None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_expires_the_cookie_unconditionally() {
  let resp = call(state().await, "POST", "/api/auth.logout", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let set_cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .unwrap()
    .to_str()
    .unwrap()
    .to_owned();
  assert!(set_cookie.contains("Max-Age=0"), "Set-Cookie: {set_cookie}");
  assert_eq!(body_json(resp).await["success"], true);
}

// ─── Auth gating ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn protected_procedures_reject_anonymous_callers() {
  let st = state().await;

  let resp = call(st.clone(), "GET", "/api/flightTests.list", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let resp = call(
    st.clone(),
    "POST",
    "/api/flightTests.create",
    None,
    Some(new_test_body("T")),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let resp = call(
    st,
    "POST",
    "/api/dataPoints.getByFlightTest",
    None,
    Some(json!({ "flightTestId": 1 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ─── Input validation ────────────────────────────────────────────────────────

#[tokio::test]
async fn get_by_id_without_id_is_invalid_input() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;

  let resp = call(
    st,
    "POST",
    "/api/flightTests.getById",
    Some(&cookie),
    Some(json!({})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn non_numeric_id_is_invalid_input() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;

  let resp = call(
    st,
    "POST",
    "/api/flightTests.delete",
    Some(&cookie),
    Some(json!({ "id": "7" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Flight tests ────────────────────────────────────────────────────────────

async fn create_test(st: &AppState<SqliteStore>, cookie: &str, name: &str) -> i64 {
  let resp = call(
    st.clone(),
    "POST",
    "/api/flightTests.create",
    Some(cookie),
    Some(new_test_body(name)),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  body_json(resp).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn create_then_get_round_trip() {
  let st = state().await;
  let (user, cookie) = sign_in(&st, "pilot-1").await;

  let id = create_test(&st, &cookie, "Stall margin").await;

  let resp = call(
    st,
    "POST",
    "/api/flightTests.getById",
    Some(&cookie),
    Some(json!({ "id": id })),
  )
  .await;
  let body = body_json(resp).await;
  assert_eq!(body["name"], "Stall margin");
  assert_eq!(body["createdBy"], user.id);
  assert_eq!(body["status"], "draft");
}

#[tokio::test]
async fn create_ignores_any_owner_field_in_the_payload() {
  let st = state().await;
  let (user, cookie) = sign_in(&st, "pilot-1").await;

  let mut body = new_test_body("Owned");
  body["createdBy"] = json!(999);
  let resp = call(st.clone(), "POST", "/api/flightTests.create", Some(&cookie), Some(body)).await;
  let id = body_json(resp).await["id"].as_i64().unwrap();

  let resp = call(
    st,
    "POST",
    "/api/flightTests.getById",
    Some(&cookie),
    Some(json!({ "id": id })),
  )
  .await;
  assert_eq!(body_json(resp).await["createdBy"], user.id);
}

#[tokio::test]
async fn other_users_tests_are_invisible() {
  let st = state().await;
  let (_, cookie_a) = sign_in(&st, "pilot-a").await;
  let (_, cookie_b) = sign_in(&st, "pilot-b").await;

  let id = create_test(&st, &cookie_a, "Private").await;

  let resp = call(
    st.clone(),
    "POST",
    "/api/flightTests.getById",
    Some(&cookie_b),
    Some(json!({ "id": id })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, Value::Null);

  let resp = call(st, "GET", "/api/flightTests.list", Some(&cookie_b), None).await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn cross_user_update_reports_success_but_changes_nothing() {
  let st = state().await;
  let (_, cookie_a) = sign_in(&st, "pilot-a").await;
  let (_, cookie_b) = sign_in(&st, "pilot-b").await;

  let id = create_test(&st, &cookie_a, "Original").await;

  let resp = call(
    st.clone(),
    "POST",
    "/api/flightTests.update",
    Some(&cookie_b),
    Some(json!({ "id": id, "name": "Hijacked" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["success"], true);

  let resp = call(
    st,
    "POST",
    "/api/flightTests.getById",
    Some(&cookie_a),
    Some(json!({ "id": id })),
  )
  .await;
  assert_eq!(body_json(resp).await["name"], "Original");
}

#[tokio::test]
async fn update_applies_a_partial_patch() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;
  let id = create_test(&st, &cookie, "Flutter survey").await;

  let resp = call(
    st.clone(),
    "POST",
    "/api/flightTests.update",
    Some(&cookie),
    Some(json!({ "id": id, "status": "in_progress" })),
  )
  .await;
  assert_eq!(body_json(resp).await["success"], true);

  let resp = call(
    st,
    "POST",
    "/api/flightTests.getById",
    Some(&cookie),
    Some(json!({ "id": id })),
  )
  .await;
  let body = body_json(resp).await;
  assert_eq!(body["status"], "in_progress");
  assert_eq!(body["name"], "Flutter survey");
}

#[tokio::test]
async fn delete_then_list_is_empty() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;
  let id = create_test(&st, &cookie, "Short lived").await;

  let resp = call(
    st.clone(),
    "POST",
    "/api/flightTests.delete",
    Some(&cookie),
    Some(json!({ "id": id })),
  )
  .await;
  assert_eq!(body_json(resp).await["success"], true);

  let resp = call(st, "GET", "/api/flightTests.list", Some(&cookie), None).await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn list_is_newest_first() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;
  for name in ["T1", "T2", "T3"] {
    create_test(&st, &cookie, name).await;
  }

  let resp = call(st, "GET", "/api/flightTests.list", Some(&cookie), None).await;
  let names: Vec<String> = body_json(resp)
    .await
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["T3", "T2", "T1"]);
}

// ─── Parameters ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn parameter_listing_is_public_but_creation_is_not() {
  let st = state().await;

  let resp = call(st.clone(), "GET", "/api/parameters.list", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);

  let param = json!({ "name": "Altitude", "unit": "ft" });
  let resp = call(st.clone(), "POST", "/api/parameters.create", None, Some(param.clone())).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let (_, cookie) = sign_in(&st, "pilot-1").await;
  let resp = call(st.clone(), "POST", "/api/parameters.create", Some(&cookie), Some(param)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_json(resp).await["id"].as_i64().is_some());

  let resp = call(st, "GET", "/api/parameters.list", None, None).await;
  let body = body_json(resp).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["unit"], "ft");
}

// ─── Data points ─────────────────────────────────────────────────────────────

async fn create_parameter(st: &AppState<SqliteStore>, cookie: &str) -> i64 {
  let resp = call(
    st.clone(),
    "POST",
    "/api/parameters.create",
    Some(cookie),
    Some(json!({ "name": "Altitude", "unit": "ft" })),
  )
  .await;
  body_json(resp).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn upload_then_read_back_with_parameter_join() {
  let st = state().await;
  let (_, cookie) = sign_in(&st, "pilot-1").await;
  let test_id = create_test(&st, &cookie, "Data run").await;
  let param_id = create_parameter(&st, &cookie).await;

  // Values arrive as text or as raw JSON numbers; both land as text.
  let resp = call(
    st.clone(),
    "POST",
    "/api/dataPoints.create",
    Some(&cookie),
    Some(json!({
      "flightTestId": test_id,
      "points": [
        { "parameterId": param_id, "timestamp": "2024-05-01T09:30:00Z", "value": "1.25e4" },
        { "parameterId": param_id, "timestamp": "2024-05-01T09:30:01Z", "value": 12500 },
      ],
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["inserted"], 2);

  let resp = call(
    st.clone(),
    "POST",
    "/api/dataPoints.getByFlightTest",
    Some(&cookie),
    Some(json!({ "flightTestId": test_id })),
  )
  .await;
  let rows = body_json(resp).await;
  assert_eq!(rows.as_array().unwrap().len(), 2);
  assert_eq!(rows[0]["parameterName"], "Altitude");
  assert_eq!(rows[0]["value"], "1.25e4");
  assert_eq!(rows[1]["value"], "12500");

  let resp = call(
    st,
    "POST",
    "/api/dataPoints.getByFlightTest",
    Some(&cookie),
    Some(json!({ "flightTestId": test_id, "limit": 1 })),
  )
  .await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn uploading_into_another_users_test_is_not_found() {
  let st = state().await;
  let (_, cookie_a) = sign_in(&st, "pilot-a").await;
  let (_, cookie_b) = sign_in(&st, "pilot-b").await;
  let test_id = create_test(&st, &cookie_a, "Private").await;
  let param_id = create_parameter(&st, &cookie_a).await;

  let resp = call(
    st,
    "POST",
    "/api/dataPoints.create",
    Some(&cookie_b),
    Some(json!({
      "flightTestId": test_id,
      "points": [
        { "parameterId": param_id, "timestamp": "2024-05-01T09:30:00Z", "value": "1" },
      ],
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
