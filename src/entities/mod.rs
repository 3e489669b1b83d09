//! sea-orm entities, one module per table.

pub mod balance;
pub mod business;
pub mod customer;
pub mod employee;
pub mod order;
pub mod order_detail;
pub mod order_supplier;
pub mod product;
pub mod sale;
pub mod supplier;
