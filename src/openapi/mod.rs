use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TOKEN_COOKIE;

/// Registers the session cookie and the bearer header as security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(TOKEN_COOKIE))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopkeep API",
        version = "1.0.0",
        description = r#"
# Shopkeep Inventory API

Back office for small retail businesses: employees, suppliers, products,
supplier orders, customers, sales and the cash balance.

## Authentication

`POST /login` sets an HttpOnly `token` cookie holding a JWT. Every other
endpoint except `/register`, `/login` and `/health*` requires it. The same
token is accepted as `Authorization: Bearer <token>`.

## Error Handling

Errors share one JSON shape:

```json
{
  "error": "Not Found",
  "message": "Product with id 7 not found",
  "request_id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SecurityAddon),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tags(
        (name = "auth", description = "Registration and sessions"),
        (name = "business", description = "The signed-in business account"),
        (name = "employees", description = "Staff records"),
        (name = "suppliers", description = "Supplier directory"),
        (name = "products", description = "Product catalogue and stock levels"),
        (name = "orders", description = "Purchase orders placed with suppliers"),
        (name = "customers", description = "Customer records"),
        (name = "sales", description = "Sales to customers"),
        (name = "balances", description = "Cash balance of the business")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,

        crate::handlers::business::get_business,
        crate::handlers::business::update_business,
        crate::handlers::business::delete_business,
        crate::handlers::business::delete_business_by_id,
        crate::handlers::business::account_page,

        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,

        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::list_categories,
        crate::handlers::suppliers::suppliers_by_category,
        crate::handlers::suppliers::supplier_for_order,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::products_by_name,
        crate::handlers::products::low_stock_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        crate::handlers::orders::place_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::order_details,
        crate::handlers::orders::orders_by_supplier,
        crate::handlers::orders::orders_by_date,
        crate::handlers::orders::order_details_by_product,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,

        crate::handlers::customers::create_customer,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        crate::handlers::sales::record_sale,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::update_sale,
        crate::handlers::sales::delete_sale,

        crate::handlers::balances::create_balance,
        crate::handlers::balances::get_balance,
        crate::handlers::balances::set_balance,
        crate::handlers::balances::add_balance,
        crate::handlers::balances::subtract_balance,
        crate::handlers::balances::delete_balance,
    ),
    components(
        schemas(
            crate::entities::business::Model,
            crate::entities::employee::Model,
            crate::entities::supplier::Model,
            crate::entities::product::Model,
            crate::entities::order::Model,
            crate::entities::order_detail::Model,
            crate::entities::customer::Model,
            crate::entities::sale::Model,
            crate::entities::balance::Model,

            crate::auth::TokenPayload,
            crate::auth::Claims,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Shopkeep API"));
        for path in [
            "/register",
            "/allOrders",
            "/supplier/{id}",
            "/products/low-stock",
            "/orders-by-date/{date}",
            "/subtractbalance",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(json.contains("cookie_auth"));
        assert!(json.contains("bearer_auth"));
    }
}
