//! # Validation Module
//!
//! Input validation rules for Shopfront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service (Rust)                                               │
//! │  └── THIS MODULE: required fields, lengths, ranges, cart limits        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity_available >= 0)                        │
//! │  └── UNIQUE (email, receipt_id)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartLine, DeviceUpdate, NewDevice, NewSale};
use crate::{
    MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_TEXT_LENGTH, MIN_PASSWORD_LENGTH,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field.
///
/// ## Rules
/// - Must not be blank
/// - At most MAX_TEXT_LENGTH (100) characters after trimming
///
/// ## Example
/// ```rust
/// use shopfront_core::validation::validate_required;
///
/// assert!(validate_required("storeName", "Gadget Hub").is_ok());
/// assert!(validate_required("storeName", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    validate_required(field, email)?;

    let email = email.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be a single address"));
    }

    match domain.find('.') {
        Some(pos) if pos > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid("domain must contain a dot")),
    }
}

/// Validates a new password.
///
/// ## Rules
/// - At least MIN_PASSWORD_LENGTH (8) characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> CoreResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: qty,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0). Zero is allowed (giveaway units).
/// - Must not exceed MAX_PRICE_CENTS
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "priceCents".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_stock(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantityAvailable".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a device before insert.
pub fn validate_new_device(device: &NewDevice) -> ValidationResult<()> {
    validate_required("deviceType", &device.device_type)?;
    validate_required("brand", &device.brand)?;
    validate_required("modelName", &device.model_name)?;
    validate_price_cents(device.price_cents)?;
    validate_stock(device.quantity_available)?;
    Ok(())
}

/// Validates the supplied fields of a partial device update.
pub fn validate_device_update(update: &DeviceUpdate) -> ValidationResult<()> {
    if let Some(device_type) = &update.device_type {
        validate_required("deviceType", device_type)?;
    }
    if let Some(brand) = &update.brand {
        validate_required("brand", brand)?;
    }
    if let Some(model_name) = &update.model_name {
        validate_required("modelName", model_name)?;
    }
    if let Some(price_cents) = update.price_cents {
        validate_price_cents(price_cents)?;
    }
    if let Some(quantity) = update.quantity_available {
        validate_stock(quantity)?;
    }
    Ok(())
}

/// Validates cart shape (not stock; stock is checked inside the transaction).
///
/// ## Rules
/// - At least one line
/// - At most MAX_CART_ITEMS (100) lines
/// - Every quantity passes [`validate_quantity`]
pub fn validate_cart(cart: &[CartLine]) -> CoreResult<()> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if cart.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    for line in cart {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates a sale request before the transaction starts.
pub fn validate_new_sale(sale: &NewSale) -> CoreResult<()> {
    validate_required("customerName", &sale.customer_name)?;
    validate_email("customerEmail", &sale.customer_email)?;
    validate_required("saleAttendant", &sale.sale_attendant)?;
    validate_cart(&sale.cart)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64) -> CartLine {
        CartLine {
            device_id: 1,
            quantity,
            imei: None,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("brand", "Apple").is_ok());
        assert!(validate_required("brand", "").is_err());
        assert!(validate_required("brand", "   ").is_err());
        assert!(validate_required("brand", &"A".repeat(101)).is_err());
        assert!(validate_required("brand", &"A".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "owner@example.com").is_ok());
        assert!(validate_email("email", "first.last@shop.co.uk").is_ok());

        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "no-at-sign.com").is_err());
        assert!(validate_email("email", "@example.com").is_err());
        assert!(validate_email("email", "a@b@example.com").is_err());
        assert!(validate_email("email", "owner@localhost").is_err());
        assert!(validate_email("email", "owner@example.").is_err());
        assert!(validate_email("email", "own er@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct horse").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(matches!(validate_quantity(0), Err(CoreError::Validation(_))));
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(CoreError::QuantityTooLarge { requested: 1000, max: 999 })
        ));
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX / 2 + 1).is_err());

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_cart() {
        assert!(matches!(validate_cart(&[]), Err(CoreError::EmptyCart)));
        assert!(validate_cart(&[line(1), line(5)]).is_ok());
        assert!(validate_cart(&[line(1), line(0)]).is_err());

        let oversized: Vec<CartLine> = (0..=MAX_CART_ITEMS).map(|_| line(1)).collect();
        assert!(matches!(
            validate_cart(&oversized),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_device_update_checks_present_fields_only() {
        let update = DeviceUpdate {
            quantity_available: Some(0),
            ..Default::default()
        };
        assert!(validate_device_update(&update).is_ok());

        let update = DeviceUpdate {
            price_cents: Some(-1),
            ..Default::default()
        };
        assert!(validate_device_update(&update).is_err());

        let update = DeviceUpdate {
            price_cents: Some(MAX_PRICE_CENTS + 1),
            ..Default::default()
        };
        assert!(validate_device_update(&update).is_err());

        let update = DeviceUpdate {
            brand: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(validate_device_update(&update).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let mut sale = NewSale {
            customer_name: "Grace".to_string(),
            customer_email: "grace@example.com".to_string(),
            customer_address: String::new(),
            customer_phone: String::new(),
            sale_attendant: "Sam".to_string(),
            cart: vec![line(2)],
        };
        assert!(validate_new_sale(&sale).is_ok());

        sale.customer_email = "not-an-email".to_string();
        assert!(validate_new_sale(&sale).is_err());
    }
}
