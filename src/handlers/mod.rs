pub mod auth;
pub mod balances;
pub mod business;
pub mod common;
pub mod customers;
pub mod employees;
pub mod orders;
pub mod products;
pub mod sales;
pub mod suppliers;

use crate::db::DbPool;
use crate::services::{
    BalanceService, BusinessService, CustomerService, EmployeeService, OrderService,
    ProductService, SaleService, SupplierService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub business: Arc<BusinessService>,
    pub employees: Arc<EmployeeService>,
    pub suppliers: Arc<SupplierService>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub customers: Arc<CustomerService>,
    pub sales: Arc<SaleService>,
    pub balances: Arc<BalanceService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            business: Arc::new(BusinessService::new(db_pool.clone())),
            employees: Arc::new(EmployeeService::new(db_pool.clone())),
            suppliers: Arc::new(SupplierService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone())),
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            sales: Arc::new(SaleService::new(db_pool.clone())),
            balances: Arc::new(BalanceService::new(db_pool)),
        }
    }
}
