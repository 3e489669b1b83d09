mod common;

use axum::http::StatusCode;
use common::{dec, id, TestApp};
use serde_json::json;

#[tokio::test]
async fn businesses_never_see_each_others_rows() {
    let app = TestApp::new().await;
    let owner = app.signup_with_balance("owner", "100").await;
    let other = app.signup_with_balance("other", "100").await;

    let supplier_id = app.create_supplier(&owner, "Acme Tools", "Hardware").await;
    let product_id = app.create_product(&owner, "Hammer", 5, "10").await;
    let employee = app
        .post("/employee", json!({ "first_name": "Ada", "last_name": "L" }), &owner)
        .await;
    let employee_id = id(&employee.body, "employee_id");
    let placed = app
        .post(
            "/allOrders",
            json!({
                "supplier_id": supplier_id,
                "products": [{ "product_name": "Hammer", "quantity": 1, "price": "10" }],
            }),
            &owner,
        )
        .await;
    let order_id = id(&placed.body, "order_id");

    for collection in ["/employees", "/suppliers", "/products", "/orders", "/customers", "/sales"] {
        let listed = app.get(collection, &other).await;
        assert_eq!(listed.status, StatusCode::OK, "{collection}");
        assert_eq!(listed.body, json!([]), "{collection} leaked rows");
    }

    for path in [
        format!("/employee/{employee_id}"),
        format!("/suppliers/{supplier_id}"),
        format!("/supplier/{order_id}"),
        format!("/product/{product_id}"),
        format!("/orders/{order_id}"),
        format!("/order-details/{order_id}"),
    ] {
        let fetched = app.get(&path, &other).await;
        assert_eq!(fetched.status, StatusCode::NOT_FOUND, "{path}");
    }

    let hijack = app
        .put(&format!("/product/{product_id}"), json!({ "quantity": 0 }), &other)
        .await;
    assert_eq!(hijack.status, StatusCode::NOT_FOUND);
    let delete = app.delete(&format!("/employee/{employee_id}"), &other).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    // A foreign supplier cannot be used for an order.
    let foreign_order = app
        .post(
            "/allOrders",
            json!({
                "supplier_id": supplier_id,
                "products": [{ "product_name": "Hammer", "quantity": 1, "price": "10" }],
            }),
            &other,
        )
        .await;
    assert_eq!(foreign_order.status, StatusCode::NOT_FOUND);

    // A foreign product cannot be sold.
    let foreign_sale = app
        .post(
            "/sales",
            json!({ "product_id": product_id, "quantity": 1, "payment_details": "cash" }),
            &other,
        )
        .await;
    assert_eq!(foreign_sale.status, StatusCode::NOT_FOUND);

    assert_eq!(app.product_quantity(&owner, product_id).await, 6);
    assert_eq!(app.balance(&owner).await, dec("90"));
    assert_eq!(app.balance(&other).await, dec("100"));
}

#[tokio::test]
async fn deleting_one_business_leaves_the_other_intact() {
    let app = TestApp::new().await;
    let leaving = app.signup_with_balance("leaving", "10").await;
    let staying = app.signup_with_balance("staying", "10").await;
    app.create_product(&leaving, "Hammer", 1, "1").await;
    let kept = app.create_product(&staying, "Hammer", 3, "1").await;

    assert_eq!(app.delete("/business", &leaving).await.status, StatusCode::NO_CONTENT);

    assert_eq!(app.product_quantity(&staying, kept).await, 3);
    assert_eq!(app.balance(&staying).await, dec("10"));
}
