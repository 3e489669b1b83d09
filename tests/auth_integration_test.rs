mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_then_login_sets_http_only_cookie() {
    let app = TestApp::new().await;

    let registered = app
        .request(
            Method::POST,
            "/register",
            Some(json!({
                "username": "alice",
                "password": TEST_PASSWORD,
                "business_name": "Alice Hardware",
            })),
            None,
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["username"], "alice");
    assert!(
        registered.body.get("password_hash").is_none(),
        "password hash must never be serialized"
    );

    let login = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "username": "alice", "password": TEST_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["username"], "alice");
    assert_eq!(login.body["business_name"], "Alice Hardware");
    assert!(login.body["business_id"].is_i64());
    assert!(login.body["creation_date"].is_string());
    // The token itself stays in the HttpOnly cookie.
    assert!(login.body.get("token").is_none());
    assert!(login.body.get("claims").is_none());

    let cookie = login.set_cookie.expect("session cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let app = TestApp::new().await;
    app.signup("bob").await;

    let again = app
        .request(
            Method::POST,
            "/register",
            Some(json!({
                "username": "bob",
                "password": TEST_PASSWORD,
                "business_name": "Another Bob",
            })),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_are_unprocessable() {
    let app = TestApp::new().await;
    app.signup("carol").await;

    let wrong_password = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "username": "carol", "password": "not the password" })),
            None,
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(wrong_password.set_cookie.is_none());

    let unknown = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "username": "nobody", "password": TEST_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn short_password_is_rejected_by_validation() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/register",
            Some(json!({
                "username": "dave",
                "password": "short",
                "business_name": "Dave's",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let missing = app.request(Method::GET, "/employees", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"]["code"], "AUTH_MISSING_TOKEN");

    let forged = app.get("/employees", "token=not.a.jwt").await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.body["error"]["code"], "AUTH_INVALID_TOKEN");
}

#[tokio::test]
async fn bearer_header_is_accepted_as_fallback() {
    let app = TestApp::new().await;
    let cookie = app.signup("erin").await;
    let token = cookie.trim_start_matches("token=");

    let response = app
        .request_with_bearer(Method::GET, "/business", token)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "erin");
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/logout", None, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cookie = response.set_cookie.expect("clearing cookie");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn deleting_the_business_removes_its_data() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("frank", "50").await;
    app.create_product(&cookie, "Hammer", 4, "12.5").await;

    let account = app.get("/getaccountpage", &cookie).await;
    assert_eq!(account.status, StatusCode::OK);
    assert_eq!(account.body["product_count"], 1);
    assert_eq!(account.body["low_stock_count"], 1);

    let deleted = app.delete("/business", &cookie).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.get("/business", &cookie).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    // The username is free again.
    app.signup("frank").await;
}

#[tokio::test]
async fn business_can_be_deleted_by_its_own_id_only() {
    let app = TestApp::new().await;
    let owner = app.signup("gina").await;
    let other = app.signup("hank").await;
    let owner_id = common::id(&app.get("/business", &owner).await.body, "business_id");
    let other_id = common::id(&app.get("/business", &other).await.body, "business_id");

    let foreign = app.delete(&format!("/business/{other_id}"), &owner).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/business", &other).await.status, StatusCode::OK);

    let own = app.delete(&format!("/business/{owner_id}"), &owner).await;
    assert_eq!(own.status, StatusCode::NO_CONTENT);
    assert!(own
        .set_cookie
        .expect("clearing cookie")
        .contains("Max-Age=0"));
    assert_eq!(app.get("/business", &owner).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/business", &other).await.status, StatusCode::OK);
}
