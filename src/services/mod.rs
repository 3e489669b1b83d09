//! Data-access services. Every query is scoped by the caller's `business_id`.

use crate::errors::ServiceError;
use rust_decimal::Decimal;
use validator::ValidationError;

// Tenant account
pub mod business;

// People
pub mod customers;
pub mod employees;
pub mod suppliers;

// Stock and money
pub mod balances;
pub mod orders;
pub mod products;
pub mod sales;

pub use balances::BalanceService;
pub use business::BusinessService;
pub use customers::CustomerService;
pub use employees::EmployeeService;
pub use orders::OrderService;
pub use products::ProductService;
pub use sales::SaleService;
pub use suppliers::SupplierService;

/// Largest amount a `DECIMAL(12,2)` money column can hold.
pub(crate) fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Accepts amounts a money column can store: not negative, at most two
/// decimal places and no larger than [`max_money`].
pub(crate) fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    let (code, message) = if value.is_sign_negative() && !value.is_zero() {
        ("non_negative", "must not be negative")
    } else if value.normalize().scale() > 2 {
        ("money_scale", "must have at most two decimal places")
    } else if *value > max_money() {
        ("money_range", "must not exceed 9999999999.99")
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    Err(err)
}

fn out_of_range() -> ServiceError {
    ServiceError::BadRequest("Amount exceeds the supported range".to_string())
}

/// Checks that a computed amount still fits a money column.
pub(crate) fn ensure_money_range(value: Decimal) -> Result<Decimal, ServiceError> {
    if value.abs() > max_money() {
        return Err(out_of_range());
    }
    Ok(value)
}

/// `unit_price * quantity`, rejected when it leaves the money range.
pub(crate) fn line_amount(unit_price: Decimal, quantity: i32) -> Result<Decimal, ServiceError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(out_of_range)
        .and_then(ensure_money_range)
}

/// `a + b`, rejected when it leaves the money range.
pub(crate) fn money_add(a: Decimal, b: Decimal) -> Result<Decimal, ServiceError> {
    a.checked_add(b)
        .ok_or_else(out_of_range)
        .and_then(ensure_money_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("0", true)]
    #[case("-0", true)]
    #[case("12.50", true)]
    #[case("12.500", true)]
    #[case("9999999999.99", true)]
    #[case("-0.01", false)]
    #[case("0.001", false)]
    #[case("10000000000", false)]
    #[case("79228162514264337593543950335", false)]
    fn money_amounts(#[case] raw: &str, #[case] ok: bool) {
        let value = Decimal::from_str(raw).unwrap();
        assert_eq!(validate_money(&value).is_ok(), ok);
    }

    #[test]
    fn money_arithmetic_stays_in_range() {
        let max = max_money();
        assert_eq!(line_amount(Decimal::new(250, 2), 3).unwrap(), Decimal::new(750, 2));
        assert_matches!(line_amount(max, 2), Err(ServiceError::BadRequest(_)));
        assert_matches!(
            line_amount(Decimal::MAX, i32::MAX),
            Err(ServiceError::BadRequest(_))
        );
        assert_eq!(money_add(max, -max).unwrap(), Decimal::ZERO);
        assert_matches!(money_add(max, Decimal::ONE), Err(ServiceError::BadRequest(_)));
        assert_matches!(money_add(Decimal::MAX, Decimal::MAX), Err(ServiceError::BadRequest(_)));
    }
}
