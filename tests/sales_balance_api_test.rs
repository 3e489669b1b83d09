mod common;

use axum::http::StatusCode;
use common::{dec, decimal, id, TestApp};
use serde_json::json;

#[tokio::test]
async fn recording_a_sale_takes_stock_and_credits_the_balance() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("uma", "20").await;
    let product_id = app.create_product(&cookie, "Lamp", 10, "12.5").await;

    let customer = app
        .post(
            "/customers",
            json!({ "first_name": "Vic", "last_name": "Buyer", "email": "vic@example.com" }),
            &cookie,
        )
        .await;
    assert_eq!(customer.status, StatusCode::CREATED, "{:?}", customer.body);
    let customer_id = id(&customer.body, "customer_id");

    let sale = app
        .post(
            "/sales",
            json!({
                "product_id": product_id,
                "quantity": 4,
                "payment_details": "card ending 4242",
                "customer_id": customer_id,
            }),
            &cookie,
        )
        .await;
    assert_eq!(sale.status, StatusCode::CREATED, "{:?}", sale.body);
    assert_eq!(decimal(&sale.body["unit_price"]), dec("12.5"));
    assert_eq!(decimal(&sale.body["total_amount"]), dec("50"));
    assert_eq!(sale.body["customer_id"], customer_id);

    assert_eq!(app.product_quantity(&cookie, product_id).await, 6);
    assert_eq!(app.balance(&cookie).await, dec("70"));

    let listed = app.get("/sales", &cookie).await;
    assert_eq!(listed.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn selling_more_than_in_stock_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("victor", "0").await;
    let product_id = app.create_product(&cookie, "Lamp", 2, "12.5").await;

    let sale = app
        .post(
            "/sales",
            json!({ "product_id": product_id, "quantity": 3, "payment_details": "cash" }),
            &cookie,
        )
        .await;
    assert_eq!(sale.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(app.product_quantity(&cookie, product_id).await, 2);
    assert_eq!(app.balance(&cookie).await, dec("0"));
    assert_eq!(app.get("/sales", &cookie).await.body, json!([]));
}

#[tokio::test]
async fn sale_for_unknown_customer_is_not_found() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("wendy", "0").await;
    let product_id = app.create_product(&cookie, "Lamp", 2, "12.5").await;

    let sale = app
        .post(
            "/sales",
            json!({
                "product_id": product_id,
                "quantity": 1,
                "payment_details": "cash",
                "customer_id": 4242,
            }),
            &cookie,
        )
        .await;
    assert_eq!(sale.status, StatusCode::NOT_FOUND);
    assert_eq!(app.product_quantity(&cookie, product_id).await, 2);
}

#[tokio::test]
async fn editing_a_sale_adjusts_stock_and_balance() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("xavier", "0").await;
    let product_id = app.create_product(&cookie, "Lamp", 10, "10").await;

    let sale = app
        .post(
            "/sales",
            json!({ "product_id": product_id, "quantity": 2, "payment_details": "cash" }),
            &cookie,
        )
        .await;
    let sale_id = id(&sale.body, "sale_id");
    assert_eq!(app.balance(&cookie).await, dec("20"));

    let updated = app
        .put(&format!("/sale/{sale_id}"), json!({ "quantity": 5 }), &cookie)
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(decimal(&updated.body["total_amount"]), dec("50"));
    assert_eq!(app.product_quantity(&cookie, product_id).await, 5);
    assert_eq!(app.balance(&cookie).await, dec("50"));

    let deleted = app.delete(&format!("/sale/{sale_id}"), &cookie).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    // Deleting only removes the record.
    assert_eq!(app.product_quantity(&cookie, product_id).await, 5);
    assert_eq!(app.balance(&cookie).await, dec("50"));
    assert_eq!(
        app.get(&format!("/sale/{sale_id}"), &cookie).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn balance_lifecycle() {
    let app = TestApp::new().await;
    let cookie = app.signup("yara").await;

    let none = app.get("/balance", &cookie).await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    let created = app.post("/balance", json!({ "balance": "100" }), &cookie).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let balance_id = id(&created.body, "balance_id");

    let second = app.post("/balance", json!({ "balance": "5" }), &cookie).await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let added = app
        .put("/addbalance", json!({ "new_balance": "25.5" }), &cookie)
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(decimal(&added.body["balance"]), dec("125.5"));

    let subtracted = app
        .put("/subtractbalance", json!({ "new_balance": "0.5" }), &cookie)
        .await;
    assert_eq!(subtracted.status, StatusCode::OK);
    assert_eq!(decimal(&subtracted.body["balance"]), dec("125"));

    let overdraft = app
        .put("/subtractbalance", json!({ "new_balance": "1000" }), &cookie)
        .await;
    assert_eq!(overdraft.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.balance(&cookie).await, dec("125"));

    let negative = app
        .put("/addbalance", json!({ "new_balance": "-5" }), &cookie)
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let set = app
        .put(&format!("/balance/{balance_id}"), json!({ "new_balance": "7" }), &cookie)
        .await;
    assert_eq!(set.status, StatusCode::OK);
    assert_eq!(decimal(&set.body["balance"]), dec("7"));

    let deleted = app.delete(&format!("/balance/{balance_id}"), &cookie).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/balance", &cookie).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_crud_round_trip() {
    let app = TestApp::new().await;
    let cookie = app.signup("zoe").await;

    let created = app
        .post(
            "/customers",
            json!({ "first_name": "Ann", "last_name": "Smith" }),
            &cookie,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let customer_id = id(&created.body, "customer_id");

    let updated = app
        .put(
            &format!("/customer/{customer_id}"),
            json!({ "address": "2 High Street" }),
            &cookie,
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["address"], "2 High Street");
    assert_eq!(updated.body["first_name"], "Ann");

    assert_eq!(
        app.get("/customers", &cookie).await.body.as_array().map(Vec::len),
        Some(1)
    );

    let deleted = app.delete(&format!("/customer/{customer_id}"), &cookie).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.get(&format!("/customer/{customer_id}"), &cookie).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn balance_amounts_outside_the_money_range_are_rejected() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("amy", "10").await;

    for amount in ["79228162514264337593543950330", "10000000000", "0.001"] {
        let response = app
            .put("/addbalance", json!({ "new_balance": amount }), &cookie)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{amount}");
    }
    assert_eq!(app.balance(&cookie).await, dec("10"));

    let created = app
        .post("/balance", json!({ "balance": "10000000000.00" }), &cookie)
        .await;
    assert_eq!(created.status, StatusCode::BAD_REQUEST);

    // The amount is valid on its own but the new balance does not fit.
    let overflow = app
        .put("/addbalance", json!({ "new_balance": "9999999999.99" }), &cookie)
        .await;
    assert_eq!(overflow.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(&cookie).await, dec("10"));
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("cody", "0").await;
    let product_id = app.create_product(&cookie, "Lamp", 5, "10").await;

    let sell = || {
        app.post(
            "/sales",
            json!({ "product_id": product_id, "quantity": 2, "payment_details": "cash" }),
            &cookie,
        )
    };
    let (a, b, c, d) = tokio::join!(sell(), sell(), sell(), sell());

    let statuses = [a.status, b.status, c.status, d.status];
    let sold = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let refused = statuses
        .iter()
        .filter(|s| **s == StatusCode::UNPROCESSABLE_ENTITY)
        .count();
    assert_eq!((sold, refused), (2, 2), "{statuses:?}");

    assert_eq!(app.product_quantity(&cookie, product_id).await, 1);
    assert_eq!(app.balance(&cookie).await, dec("40"));
    assert_eq!(
        app.get("/sales", &cookie).await.body.as_array().map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn concurrent_withdrawals_never_overdraw() {
    let app = TestApp::new().await;
    let cookie = app.signup_with_balance("dana", "100").await;

    let withdraw = || app.put("/subtractbalance", json!({ "new_balance": "30" }), &cookie);
    let (a, b, c, d) = tokio::join!(withdraw(), withdraw(), withdraw(), withdraw());

    let statuses = [a.status, b.status, c.status, d.status];
    let paid = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(paid, 3, "{statuses:?}");
    assert_eq!(app.balance(&cookie).await, dec("10"));
}
