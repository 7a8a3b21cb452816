//! Integration tests for the lead endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, LeadDefaults, routes, sha256_hex};
use crate::db::{Database, SqliteDatabase};

/// Create a test app with an in-memory database, keeping a handle on the state
async fn test_app() -> (axum::Router, AppState<SqliteDatabase>) {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let state = AppState::new(Some(db), LeadDefaults::default());
    (routes::create_router(state.clone(), &[]), state)
}

/// Helper to parse JSON response body
async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_lead(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_leads(query: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/leads{}", query))
        .body(Body::empty())
        .unwrap()
}

async fn submit(app: &axum::Router, request: Request<Body>) -> String {
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    body["id"].as_str().expect("Expected id").to_string()
}

async fn seed(state: &AppState<SqliteDatabase>, count: u32) {
    sqlx::query(
        "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?) \
         INSERT INTO leads (id, name, created_at) \
         SELECT printf('seed-%04d', n), 'seed', printf('2025-01-01T00:00:00.%03dZ', n) FROM seq",
    )
    .bind(count)
    .execute(state.db().unwrap().pool())
    .await
    .unwrap();
}

// =============================================================================
// POST /api/leads
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn submit_lead_returns_created_with_id() {
    let (app, _) = test_app().await;

    let response = app
        .oneshot(post_lead(json!({"name": "Sara", "email": "sara@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn submitted_lead_is_listed_with_public_fields_only() {
    let (app, _) = test_app().await;

    let id = submit(
        &app,
        post_lead(json!({
            "name": "Sara",
            "email": "sara@example.com",
            "utm_source": "instagram",
            "notes": "morning sessions"
        })),
    )
    .await;

    let response = app.oneshot(get_leads("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert!(body.get("total").is_none());

    let items = body["items"].as_array().expect("Expected items array");
    let item = items
        .iter()
        .find(|i| i["id"] == id.as_str())
        .expect("Submitted lead should be listed");
    assert_eq!(item["name"], "Sara");
    assert_eq!(item["email"], "sara@example.com");
    assert_eq!(item["product"], "LEADGRESS");
    assert_eq!(item["view"], "waitlist");
    assert!(item["created_at"].is_string());

    let mut keys: Vec<&str> = item.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["created_at", "email", "id", "name", "phone", "product", "view"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn submitted_ids_are_unique() {
    let (app, _) = test_app().await;

    let mut ids = std::collections::HashSet::new();
    for _ in 0..10 {
        let id = submit(&app, post_lead(json!({"name": "Same"}))).await;
        assert!(ids.insert(id), "Duplicate id returned");
    }

    // Retransmission is stored twice, not deduplicated
    let body = json_body(app.oneshot(get_leads("?debug=1")).await.unwrap()).await;
    assert_eq!(body["total"], 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn absent_optional_fields_are_stored_as_null() {
    let (app, state) = test_app().await;

    let id = submit(&app, post_lead(json!({"name": "Sara"}))).await;

    let row: (Option<String>, Option<String>, Option<String>, Option<String>, Option<String>) =
        sqlx::query_as(
            "SELECT email, phone, utm_source, utm_campaign, notes FROM leads WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_one(state.db().unwrap().pool())
        .await
        .unwrap();

    assert_eq!(row, (None, None, None, None, None));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_and_null_fields_count_as_absent() {
    let (app, state) = test_app().await;

    let id = submit(
        &app,
        post_lead(json!({"name": null, "email": "", "product": "", "view": null})),
    )
    .await;

    let row: (String, Option<String>, String, String) =
        sqlx::query_as("SELECT name, email, product, \"view\" FROM leads WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(state.db().unwrap().pool())
            .await
            .unwrap();

    assert_eq!(
        row,
        (
            String::new(),
            None,
            "LEADGRESS".to_string(),
            "waitlist".to_string()
        )
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn omitted_name_is_stored_as_empty_string() {
    let (app, state) = test_app().await;

    let id = submit(&app, post_lead(json!({"email": "anon@example.com"}))).await;

    let name: Option<String> = sqlx::query_scalar("SELECT name FROM leads WHERE id = ?")
        .bind(id.as_str())
        .fetch_one(state.db().unwrap().pool())
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some(""));
}

#[tokio::test(flavor = "multi_thread")]
async fn explicit_product_and_view_are_kept() {
    let (app, state) = test_app().await;

    let id = submit(
        &app,
        post_lead(json!({"name": "Ali", "product": "FitnessTrainerMVP", "view": "pricing"})),
    )
    .await;

    let row: (String, String) =
        sqlx::query_as("SELECT product, \"view\" FROM leads WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(state.db().unwrap().pool())
            .await
            .unwrap();
    assert_eq!(row, ("FitnessTrainerMVP".to_string(), "pricing".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_defaults_apply() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    let state = AppState::new(
        Some(db),
        LeadDefaults {
            product: "FitnessTrainerMVP".to_string(),
            view: "lead-form".to_string(),
        },
    );
    let app = routes::create_router(state, &[]);

    app.clone()
        .oneshot(post_lead(json!({"name": "Huda"})))
        .await
        .unwrap();

    let body = json_body(app.oneshot(get_leads("")).await.unwrap()).await;
    assert_eq!(body["items"][0]["product"], "FitnessTrainerMVP");
    assert_eq!(body["items"][0]["view"], "lead-form");
}

#[tokio::test(flavor = "multi_thread")]
async fn client_fingerprint_is_privacy_reduced() {
    let (app, state) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header("content-type", "application/json")
        .header("cf-connecting-ip", "203.0.113.42")
        .header("user-agent", "Mozilla/5.0 (iPhone)")
        .body(Body::from(r#"{"name":"Sara"}"#))
        .unwrap();
    let id = submit(&app, request).await;

    let (ip_last4, ua_hash): (String, String) =
        sqlx::query_as("SELECT ip_last4, ua_hash FROM leads WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(state.db().unwrap().pool())
            .await
            .unwrap();

    assert_eq!(ip_last4, "42");
    assert_eq!(ua_hash, sha256_hex("Mozilla/5.0 (iPhone)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn request_without_ip_or_agent_stores_empty_fingerprint() {
    let (app, state) = test_app().await;

    let id = submit(&app, post_lead(json!({"name": "Sara"}))).await;

    let (ip_last4, ua_hash): (String, String) =
        sqlx::query_as("SELECT ip_last4, ua_hash FROM leads WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(state.db().unwrap().pool())
            .await
            .unwrap();

    assert_eq!(ip_last4, "");
    assert_eq!(ua_hash, sha256_hex(""));
}

#[tokio::test(flavor = "multi_thread")]
async fn ua_hash_is_deterministic_across_submissions() {
    let (app, state) = test_app().await;

    let with_agent = |agent: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/leads")
            .header("user-agent", agent)
            .body(Body::from("{}"))
            .unwrap()
    };

    let first = submit(&app, with_agent("agent-one")).await;
    let second = submit(&app, with_agent("agent-one")).await;
    let third = submit(&app, with_agent("agent-two")).await;

    let hash_of = |id: String| {
        let pool = state.db().unwrap().pool().clone();
        async move {
            sqlx::query_scalar::<_, String>("SELECT ua_hash FROM leads WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap()
        }
    };

    let (a, b, c) = (hash_of(first).await, hash_of(second).await, hash_of(third).await);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_returns_server_error() {
    let (app, _) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/leads")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "invalid_request_body");
}

#[tokio::test(flavor = "multi_thread")]
async fn storage_failure_returns_generic_error() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    sqlx::query("CREATE TABLE leads (id TEXT PRIMARY KEY, name TEXT)")
        .execute(db.pool())
        .await
        .unwrap();
    let app = routes::create_router(AppState::new(Some(db), LeadDefaults::default()), &[]);

    let response = app.oneshot(post_lead(json!({"name": "Sara"}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body, json!({"ok": false, "error": "storage_error"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_storage_binding_is_a_configuration_error() {
    let state: AppState<SqliteDatabase> = AppState::new(None, LeadDefaults::default());
    let app = routes::create_router(state, &[]);

    let response = app
        .clone()
        .oneshot(post_lead(json!({"name": "Sara"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "storage_not_configured");

    let response = app.oneshot(get_leads("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "storage_not_configured");
}

// =============================================================================
// GET /api/leads
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn list_on_fresh_environment_is_empty_success() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    let app = routes::create_router(AppState::new(Some(db), LeadDefaults::default()), &[]);

    let response = app.oneshot(get_leads("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"ok": true, "items": []}));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_after_table_dropped_is_empty_success() {
    let (app, state) = test_app().await;
    sqlx::query("DROP TABLE leads")
        .execute(state.db().unwrap().pool())
        .await
        .unwrap();

    let response = app.oneshot(get_leads("?debug=1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "items": [], "total": 0})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn list_respects_limit_and_orders_most_recent_first() {
    let (app, _) = test_app().await;

    let mut ids = vec![];
    for i in 0..7 {
        ids.push(submit(&app, post_lead(json!({"name": format!("lead {}", i)}))).await);
    }

    let body = json_body(app.oneshot(get_leads("?limit=5")).await.unwrap()).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);

    let listed: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
    let expected: Vec<&str> = ids.iter().rev().take(5).map(String::as_str).collect();
    assert_eq!(listed, expected);

    let timestamps: Vec<&str> = items
        .iter()
        .map(|i| i["created_at"].as_str().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_limits_fall_back_to_default() {
    let (app, state) = test_app().await;
    seed(&state, 60).await;

    for query in ["", "?limit=0", "?limit=abc", "?limit="] {
        let body = json_body(app.clone().oneshot(get_leads(query)).await.unwrap()).await;
        assert_eq!(
            body["items"].as_array().unwrap().len(),
            50,
            "query {:?} should use the default limit",
            query
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_limit_clamps_to_maximum() {
    let (app, state) = test_app().await;
    seed(&state, 205).await;

    let body = json_body(app.oneshot(get_leads("?limit=9999&debug=1")).await.unwrap()).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 200);
    assert_eq!(body["total"], 205);
    assert_eq!(body["items"][0]["id"], "seed-0205");
}

#[tokio::test(flavor = "multi_thread")]
async fn debug_flag_adds_total() {
    let (app, _) = test_app().await;
    submit(&app, post_lead(json!({"name": "one"}))).await;
    submit(&app, post_lead(json!({"name": "two"}))).await;

    let body = json_body(app.clone().oneshot(get_leads("?limit=1&debug=1")).await.unwrap()).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], 2);

    let body = json_body(app.oneshot(get_leads("?limit=1&debug=0")).await.unwrap()).await;
    assert!(body.get("total").is_none());
}

// =============================================================================
// Pre-existing tables
// =============================================================================

/// App over a table created outside this release, without migrating first
async fn app_with_table(ddl: &str) -> (axum::Router, AppState<SqliteDatabase>) {
    let db = SqliteDatabase::in_memory().await.unwrap();
    sqlx::query(ddl).execute(db.pool()).await.unwrap();
    let state = AppState::new(Some(db), LeadDefaults::default());
    (routes::create_router(state.clone(), &[]), state)
}

#[tokio::test(flavor = "multi_thread")]
async fn partially_migrated_table_round_trips_over_http() {
    let (app, state) = app_with_table(
        r#"CREATE TABLE leads (id TEXT PRIMARY KEY, name TEXT, email TEXT, phone TEXT,
           product TEXT, "view" TEXT, created_at TEXT, ua_hash TEXT, utm_source TEXT)"#,
    )
    .await;

    let id = submit(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/leads")
            .header("content-type", "application/json")
            .header("user-agent", "Mozilla/5.0")
            .body(Body::from(
                r#"{"name":"Sara","email":"sara@example.com","utm_source":"newsletter"}"#,
            ))
            .unwrap(),
    )
    .await;

    let body = json_body(app.oneshot(get_leads("")).await.unwrap()).await;
    assert_eq!(body["items"][0]["id"], id.as_str());
    assert_eq!(body["items"][0]["email"], "sara@example.com");
    assert_eq!(body["items"][0]["product"], "LEADGRESS");

    let (ua_hash, utm_source): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT ua_hash, utm_source FROM leads WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(state.db().unwrap().pool())
            .await
            .unwrap();
    assert_eq!(ua_hash, Some(sha256_hex("Mozilla/5.0")));
    assert_eq!(utm_source.as_deref(), Some("newsletter"));
}

#[tokio::test(flavor = "multi_thread")]
async fn table_without_created_at_lists_over_http() {
    let (app, state) = app_with_table("CREATE TABLE leads (id TEXT PRIMARY KEY, name TEXT)").await;
    sqlx::query("INSERT INTO leads (id, name) VALUES ('a', 'first'), ('b', 'second')")
        .execute(state.db().unwrap().pool())
        .await
        .unwrap();

    let response = app.clone().oneshot(get_leads("?debug=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["id"], "b");
    assert_eq!(body["items"][1]["id"], "a");
    assert!(body["items"][0]["created_at"].is_null());
    assert!(body["items"][0]["email"].is_null());

    // created_at is never dropped, so the insert fails cleanly
    let response = app
        .oneshot(post_lead(json!({"name": "Sara"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"ok": false, "error": "storage_error"})
    );
}

// =============================================================================
// System routes
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn health_reports_ok() {
    let (app, _) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}
